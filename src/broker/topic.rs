//! Topic management
//!
//! A `Topic` is an append-only log of messages identified by a `TopicId`.
//! The log sits behind a lock scoped to the topic, so appends on unrelated
//! topics never contend. Readers get either a single entry or a copied
//! snapshot; the live `Vec` is never exposed.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::broker::message::Message;

/// Stable identifier assigned by the registry. Starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicId(pub u64);

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct Topic {
    id: TopicId,
    name: String,
    log: RwLock<Vec<Message>>,
}

impl Topic {
    /// Create an empty topic. Ids are handed out by `TopicRegistry`.
    pub(crate) fn new(id: TopicId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            log: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> TopicId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a message and return the offset it was stored at.
    pub fn append(&self, message: Message) -> usize {
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
        log.push(message);
        log.len() - 1
    }

    /// Current number of messages in the log.
    pub fn len(&self) -> usize {
        self.log.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Message stored at `offset`, if the log has grown that far.
    pub fn get(&self, offset: usize) -> Option<Message> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(offset)
            .cloned()
    }

    /// Point-in-time copy of the whole log.
    pub fn snapshot(&self) -> Vec<Message> {
        self.log.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
