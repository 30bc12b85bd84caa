//! The `error` module defines the error types used within `offsetbus`.
//!
//! Control-plane failures (`BrokerError`) are returned synchronously to the
//! caller of a broker operation. Data-plane failures (`HandlerError`) come back
//! from a subscriber callback and are contained by that subscription's
//! delivery worker.

use thiserror::Error;

use crate::broker::topic::TopicId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("topic with id {0} does not exist")]
    TopicNotFound(TopicId),

    #[error("offset {offset} is past the end of the topic log (length {len})")]
    InvalidOffset { offset: usize, len: usize },
}

/// Error returned by a subscriber's `on_message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

impl From<String> for HandlerError {
    fn from(reason: String) -> Self {
        Self(reason)
    }
}

impl From<&str> for HandlerError {
    fn from(reason: &str) -> Self {
        Self(reason.to_string())
    }
}
