//! Delivery worker
//!
//! One task per subscription. It parks on the subscription's `Notify` while
//! caught up, then hands messages to the subscriber one at a time in log
//! order. Handler errors and panics are logged and skipped; they never end the
//! task and never reach the publisher.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::broker::subscription::Subscription;

pub struct DeliveryWorker {
    subscription: Arc<Subscription>,
}

impl DeliveryWorker {
    pub fn new(subscription: Arc<Subscription>) -> Self {
        Self { subscription }
    }

    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        let sub = self.subscription;
        debug!(
            topic_id = %sub.topic_id(),
            subscriber = sub.subscriber_id(),
            "delivery worker started"
        );

        while let Some(delivery) = sub.next_delivery().await {
            let outcome = AssertUnwindSafe(sub.subscriber().on_message(&delivery.message))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(
                    topic_id = %sub.topic_id(),
                    subscriber = sub.subscriber_id(),
                    offset = delivery.offset,
                    "message processing failed: {e}"
                ),
                Err(_) => warn!(
                    topic_id = %sub.topic_id(),
                    subscriber = sub.subscriber_id(),
                    offset = delivery.offset,
                    "subscriber panicked while processing message"
                ),
            }

            sub.advance(&delivery);
        }

        debug!(
            topic_id = %sub.topic_id(),
            subscriber = sub.subscriber_id(),
            "delivery worker stopped"
        );
    }
}
