//! Publisher and subscriber capabilities
//!
//! Anything that can receive messages implements `Subscriber`; anything that
//! publishes implements `Publisher`. The broker only ever sees these traits.

use async_trait::async_trait;

use crate::broker::message::Message;
use crate::utils::error::HandlerError;

/// Receives messages from a delivery worker.
///
/// `on_message` is called by exactly one worker per subscription, so a
/// subscriber is never invoked concurrently with itself for the same
/// subscription. The same subscriber value may back several subscriptions, in
/// which case those calls can overlap.
#[async_trait]
pub trait Subscriber: Send + Sync {
    fn id(&self) -> &str;

    async fn on_message(&self, message: &Message) -> Result<(), HandlerError>;
}

/// Identifies the caller of `Broker::publish`.
pub trait Publisher: Send + Sync {
    fn id(&self) -> &str;
}

impl Publisher for str {
    fn id(&self) -> &str {
        self
    }
}

impl Publisher for String {
    fn id(&self) -> &str {
        self
    }
}
