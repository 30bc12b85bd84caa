//! Ready-made clients
//!
//! `ChannelSubscriber` holds the sending side of an unbounded channel and
//! pushes every delivered message into it, much like a connected client with
//! an outbound queue. `LoggingSubscriber` just logs. `BrokerPublisher` is a
//! named publisher bound to a broker.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;
use uuid::Uuid;

use crate::broker::Broker;
use crate::broker::message::Message;
use crate::broker::topic::TopicId;
use crate::client::capability::{Publisher, Subscriber};
use crate::utils::error::{BrokerError, HandlerError};

#[derive(Debug)]
pub struct ChannelSubscriber {
    pub id: String,
    pub sender: UnboundedSender<Message>,
}

impl ChannelSubscriber {
    /// Create a subscriber with a sender channel. The `id` is a UUID.
    pub fn new(sender: UnboundedSender<Message>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), sender)
    }

    pub fn with_id(id: impl Into<String>, sender: UnboundedSender<Message>) -> Self {
        Self {
            id: id.into(),
            sender,
        }
    }
}

#[async_trait]
impl Subscriber for ChannelSubscriber {
    fn id(&self) -> &str {
        &self.id
    }

    async fn on_message(&self, message: &Message) -> Result<(), HandlerError> {
        self.sender
            .send(message.clone())
            .map_err(|_| HandlerError::new(format!("receiver for {} is closed", self.id)))
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSubscriber {
    id: String,
}

impl LoggingSubscriber {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Subscriber for LoggingSubscriber {
    fn id(&self) -> &str {
        &self.id
    }

    async fn on_message(&self, message: &Message) -> Result<(), HandlerError> {
        info!(subscriber = %self.id, payload = message.payload(), "received");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BrokerPublisher {
    id: String,
    broker: Arc<Broker>,
}

impl BrokerPublisher {
    pub fn new(id: impl Into<String>, broker: Arc<Broker>) -> Self {
        Self {
            id: id.into(),
            broker,
        }
    }

    /// Publish through the bound broker. Returns the offset the message landed at.
    pub fn publish(
        &self,
        topic_id: TopicId,
        message: impl Into<Message>,
    ) -> Result<usize, BrokerError> {
        self.broker.publish(self, topic_id, message.into())
    }
}

impl Publisher for BrokerPublisher {
    fn id(&self) -> &str {
        &self.id
    }
}
