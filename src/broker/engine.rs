//! Broker engine
//!
//! This module contains the in-memory broker responsible for:
//! - creating topics through the `TopicRegistry`
//! - starting one delivery worker per subscription
//! - appending published messages and waking every subscription on the topic
//! - moving subscription cursors for replay
//!
//! Concurrency and usage notes:
//! - All methods take `&self`; share the broker as `Arc<Broker>`.
//! - The topic-id -> subscriptions map has its own lock, held only while the
//!   map is read or changed. Subscriber callbacks never run under it.
//! - `subscribe` spawns a tokio task and must be called inside a runtime.
//! - Dropping the broker stops every worker.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::broker::message::Message;
use crate::broker::registry::TopicRegistry;
use crate::broker::subscription::{ResetPolicy, Subscription, SubscriptionHandle};
use crate::broker::topic::{Topic, TopicId};
use crate::broker::worker::DeliveryWorker;
use crate::client::{Publisher, Subscriber};
use crate::config::BrokerSettings;
use crate::utils::error::BrokerError;

#[derive(Debug)]
pub struct Broker {
    registry: TopicRegistry,
    subscriptions: RwLock<HashMap<TopicId, Vec<Arc<Subscription>>>>,
    reset_policy: ResetPolicy,
}

impl Broker {
    pub fn new() -> Self {
        Self::with_reset_policy(ResetPolicy::default())
    }

    pub fn with_reset_policy(reset_policy: ResetPolicy) -> Self {
        Self {
            registry: TopicRegistry::new(),
            subscriptions: RwLock::new(HashMap::new()),
            reset_policy,
        }
    }

    pub fn from_settings(settings: &BrokerSettings) -> Self {
        Self::with_reset_policy(settings.reset_policy)
    }

    pub fn reset_policy(&self) -> ResetPolicy {
        self.reset_policy
    }

    /// Create a topic with a fresh id and an empty subscription list.
    pub fn create_topic(&self, name: &str) -> Arc<Topic> {
        let mut subscriptions = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let topic = self.registry.create_topic(name);
        subscriptions.insert(topic.id(), Vec::new());
        topic
    }

    pub fn topic(&self, topic_id: TopicId) -> Option<Arc<Topic>> {
        self.registry.get_topic(topic_id)
    }

    /// All topics ordered by id.
    pub fn topics(&self) -> Vec<Arc<Topic>> {
        self.registry.topics()
    }

    /// Subscribe starting at offset 0 and start the delivery worker.
    pub fn subscribe(
        &self,
        subscriber: Arc<dyn Subscriber>,
        topic_id: TopicId,
    ) -> Result<SubscriptionHandle, BrokerError> {
        let topic = self
            .registry
            .get_topic(topic_id)
            .ok_or(BrokerError::TopicNotFound(topic_id))?;

        let subscriber_id = subscriber.id().to_string();
        let subscription = Arc::new(Subscription::new(topic.clone(), subscriber));

        // Register before the worker's first length check: a publish that
        // misses the map has already appended, so that check sees it.
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic_id)
            .or_default()
            .push(subscription.clone());

        let handle = DeliveryWorker::new(subscription.clone()).spawn();
        subscription.attach_worker(handle);

        info!(
            topic_id = %topic_id,
            topic = topic.name(),
            subscriber = %subscriber_id,
            "subscribed"
        );
        Ok(SubscriptionHandle::new(subscription, self.reset_policy))
    }

    /// Append `message` to the topic and wake every subscription on it.
    /// Returns the offset the message was stored at. Delivery happens
    /// asynchronously after this returns.
    pub fn publish<P: Publisher + ?Sized>(
        &self,
        publisher: &P,
        topic_id: TopicId,
        message: Message,
    ) -> Result<usize, BrokerError> {
        let topic = self
            .registry
            .get_topic(topic_id)
            .ok_or(BrokerError::TopicNotFound(topic_id))?;

        let offset = topic.append(message);
        let subscribers = self.subscriptions_on(topic_id);
        for sub in &subscribers {
            sub.wake();
        }

        info!(
            topic_id = %topic_id,
            topic = topic.name(),
            publisher = publisher.id(),
            offset,
            woken = subscribers.len(),
            "published"
        );
        Ok(offset)
    }

    /// Move the cursor of every subscription `subscriber_id` holds on the
    /// topic. Returns how many were moved; an unknown topic or subscriber is a
    /// no-op that returns 0.
    pub fn reset_offset(
        &self,
        topic_id: TopicId,
        subscriber_id: &str,
        new_offset: usize,
    ) -> Result<usize, BrokerError> {
        let mut reset = 0;
        for sub in self.subscriptions_on(topic_id) {
            if sub.subscriber_id() == subscriber_id {
                sub.reset_offset(new_offset, self.reset_policy)?;
                reset += 1;
            }
        }
        if reset == 0 {
            debug!(topic_id = %topic_id, subscriber = subscriber_id, "no subscription to reset");
        }
        Ok(reset)
    }

    /// Stop and forget every subscription `subscriber_id` holds on the topic.
    pub fn unsubscribe(&self, topic_id: TopicId, subscriber_id: &str) -> usize {
        let removed: Vec<_> = {
            let mut map = self
                .subscriptions
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            match map.get_mut(&topic_id) {
                Some(subs) => {
                    let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(subs)
                        .into_iter()
                        .partition(|s| s.subscriber_id() == subscriber_id);
                    *subs = kept;
                    removed
                }
                None => Vec::new(),
            }
        };

        for sub in &removed {
            sub.stop();
        }
        if !removed.is_empty() {
            info!(topic_id = %topic_id, subscriber = subscriber_id, "unsubscribed");
        }
        removed.len()
    }

    /// Handles for every live subscription on a topic.
    pub fn subscriptions(&self, topic_id: TopicId) -> Vec<SubscriptionHandle> {
        self.subscriptions_on(topic_id)
            .into_iter()
            .map(|s| SubscriptionHandle::new(s, self.reset_policy))
            .collect()
    }

    /// Stop every delivery worker. Topics and their logs are kept.
    pub fn shutdown(&self) {
        let drained: Vec<_> = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .values_mut()
            .flat_map(std::mem::take)
            .collect();
        for sub in &drained {
            sub.stop();
        }
        if !drained.is_empty() {
            info!(stopped = drained.len(), "broker shut down");
        }
    }

    fn subscriptions_on(&self, topic_id: TopicId) -> Vec<Arc<Subscription>> {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&topic_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Broker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
