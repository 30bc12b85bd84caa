//! Subscriptions
//!
//! A `Subscription` ties one subscriber to one topic and owns the read cursor
//! into that topic's log. The cursor and stop flag sit behind a mutex scoped to
//! the subscription, and each subscription has its own `Notify`, so waking or
//! resetting one subscription never disturbs another.
//!
//! Cursor rules:
//! - only the delivery worker advances `offset`, one message at a time
//! - a reset bumps `epoch`; a delivery that started under an older epoch does
//!   not advance the cursor when it finishes, so the reset target is kept
//! - `stopped` is terminal

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::broker::message::Message;
use crate::broker::topic::{Topic, TopicId};
use crate::client::Subscriber;
use crate::utils::error::BrokerError;

/// What to do with a reset past the end of the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetPolicy {
    /// Move the cursor to the end of the log instead.
    #[default]
    Clamp,
    /// Fail with `BrokerError::InvalidOffset`.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Caught up; the worker is parked until a publish or a reset.
    Waiting,
    /// Messages exist past the cursor.
    Draining,
    Stopped,
}

#[derive(Debug, Default)]
struct Cursor {
    offset: usize,
    epoch: u64,
    stopped: bool,
}

/// A message handed to the worker, tagged with where it was read from.
#[derive(Debug)]
pub(crate) struct Delivery {
    pub offset: usize,
    pub epoch: u64,
    pub message: Message,
}

pub struct Subscription {
    topic: Arc<Topic>,
    subscriber: Arc<dyn Subscriber>,
    cursor: Mutex<Cursor>,
    wake: Notify,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic.id())
            .field("subscriber", &self.subscriber.id())
            .field("cursor", &*self.lock_cursor())
            .finish()
    }
}

impl Subscription {
    pub(crate) fn new(topic: Arc<Topic>, subscriber: Arc<dyn Subscriber>) -> Self {
        Self {
            topic,
            subscriber,
            cursor: Mutex::new(Cursor::default()),
            wake: Notify::new(),
            worker: Mutex::new(None),
        }
    }

    fn lock_cursor(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn topic(&self) -> &Arc<Topic> {
        &self.topic
    }

    pub fn topic_id(&self) -> TopicId {
        self.topic.id()
    }

    pub fn subscriber(&self) -> &Arc<dyn Subscriber> {
        &self.subscriber
    }

    pub fn subscriber_id(&self) -> &str {
        self.subscriber.id()
    }

    /// Index of the next message this subscription will receive.
    pub fn offset(&self) -> usize {
        self.lock_cursor().offset
    }

    pub fn state(&self) -> SubscriptionState {
        let cursor = self.lock_cursor();
        if cursor.stopped {
            SubscriptionState::Stopped
        } else if cursor.offset < self.topic.len() {
            SubscriptionState::Draining
        } else {
            SubscriptionState::Waiting
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.lock_cursor().stopped
    }

    /// Wake the worker so it re-checks the log.
    pub(crate) fn wake(&self) {
        self.wake.notify_one();
    }

    /// Move the cursor and wake the worker. Returns the offset applied.
    pub fn reset_offset(&self, new_offset: usize, policy: ResetPolicy) -> Result<usize, BrokerError> {
        let applied = {
            let mut cursor = self.lock_cursor();
            let len = self.topic.len();
            let applied = match policy {
                _ if new_offset <= len => new_offset,
                ResetPolicy::Clamp => len,
                ResetPolicy::Reject => {
                    return Err(BrokerError::InvalidOffset {
                        offset: new_offset,
                        len,
                    });
                }
            };
            cursor.offset = applied;
            cursor.epoch += 1;
            applied
        };
        if applied != new_offset {
            warn!(
                topic_id = %self.topic.id(),
                subscriber = self.subscriber.id(),
                requested = new_offset,
                applied,
                "offset reset clamped to log length"
            );
        }
        info!(
            topic_id = %self.topic.id(),
            subscriber = self.subscriber.id(),
            offset = applied,
            "offset reset"
        );
        self.wake();
        Ok(applied)
    }

    /// Ask the worker to exit. Takes effect immediately if it is parked, or
    /// once the in-flight handler call returns.
    pub fn stop(&self) {
        let was_stopped = std::mem::replace(&mut self.lock_cursor().stopped, true);
        if !was_stopped {
            debug!(
                topic_id = %self.topic.id(),
                subscriber = self.subscriber.id(),
                "stopping subscription"
            );
        }
        self.wake();
    }

    /// Wait until a message exists at the cursor, or the subscription stops.
    ///
    /// The log length is re-read under the cursor lock after every wake, so
    /// spurious or coalesced notifications are harmless.
    pub(crate) async fn next_delivery(&self) -> Option<Delivery> {
        loop {
            {
                let cursor = self.lock_cursor();
                if cursor.stopped {
                    return None;
                }
                if let Some(message) = self.topic.get(cursor.offset) {
                    return Some(Delivery {
                        offset: cursor.offset,
                        epoch: cursor.epoch,
                        message,
                    });
                }
            }
            self.wake.notified().await;
        }
    }

    /// Step past a delivered message unless a reset happened meanwhile.
    pub(crate) fn advance(&self, delivery: &Delivery) {
        let mut cursor = self.lock_cursor();
        if cursor.epoch == delivery.epoch {
            cursor.offset += 1;
        }
    }

    pub(crate) fn attach_worker(&self, handle: JoinHandle<()>) {
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    fn take_worker(&self) -> Option<JoinHandle<()>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

/// Caller-side handle returned by `Broker::subscribe`.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    subscription: Arc<Subscription>,
    policy: ResetPolicy,
}

impl SubscriptionHandle {
    pub(crate) fn new(subscription: Arc<Subscription>, policy: ResetPolicy) -> Self {
        Self {
            subscription,
            policy,
        }
    }

    pub fn topic_id(&self) -> TopicId {
        self.subscription.topic_id()
    }

    pub fn subscriber_id(&self) -> &str {
        self.subscription.subscriber_id()
    }

    pub fn offset(&self) -> usize {
        self.subscription.offset()
    }

    pub fn state(&self) -> SubscriptionState {
        self.subscription.state()
    }

    pub fn reset_offset(&self, new_offset: usize) -> Result<usize, BrokerError> {
        self.subscription.reset_offset(new_offset, self.policy)
    }

    pub fn stop(&self) {
        self.subscription.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.subscription.is_stopped()
    }

    /// Wait for the delivery worker to exit. Only the first caller waits;
    /// later calls return immediately.
    pub async fn join(&self) {
        if let Some(handle) = self.subscription.take_worker() {
            if let Err(e) = handle.await {
                warn!(
                    topic_id = %self.topic_id(),
                    subscriber = self.subscriber_id(),
                    "delivery worker ended abnormally: {e}"
                );
            }
        }
    }
}
