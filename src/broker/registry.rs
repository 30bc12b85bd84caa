//! Topic registry
//!
//! Owns every `Topic` created through the broker and hands out ids. Ids come
//! from an atomic counter, so concurrent `create_topic` calls never collide and
//! an id is never reused, even for topics that share a name.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::broker::topic::{Topic, TopicId};

#[derive(Debug)]
pub struct TopicRegistry {
    next_id: AtomicU64,
    topics: RwLock<HashMap<TopicId, Arc<Topic>>>,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            topics: RwLock::new(HashMap::new()),
        }
    }

    pub fn create_topic(&self, name: &str) -> Arc<Topic> {
        let id = TopicId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let topic = Arc::new(Topic::new(id, name));
        self.topics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, topic.clone());
        info!(topic_id = %id, name, "created topic");
        topic
    }

    /// Look up a topic. `None` when the id was never issued.
    pub fn get_topic(&self, id: TopicId) -> Option<Arc<Topic>> {
        self.topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// All topics ordered by id.
    pub fn topics(&self) -> Vec<Arc<Topic>> {
        let mut topics: Vec<_> = self
            .topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        topics.sort_by_key(|t| t.id());
        topics
    }

    pub fn len(&self) -> usize {
        self.topics.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
