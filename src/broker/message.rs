//! Message definitions for the broker
//!
//! `Message` is the immutable unit stored in a topic log and handed to
//! subscribers. Fields are private so a message cannot change once it has
//! been appended; clones are handed out to delivery workers.
//!
//! Notes on fields:
//! - `payload`: opaque body supplied by the publisher
//! - `timestamp`: milliseconds since UNIX epoch, stamped at construction

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    payload: String,
    timestamp: i64,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl From<&str> for Message {
    fn from(payload: &str) -> Self {
        Self::new(payload)
    }
}

impl From<String> for Message {
    fn from(payload: String) -> Self {
        Self::new(payload)
    }
}
