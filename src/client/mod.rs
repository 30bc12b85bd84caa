//! The `client` module defines how callers plug into the broker.
//!
//! It provides the `Subscriber` and `Publisher` capabilities together with a
//! few concrete clients: a channel-backed subscriber, a logging subscriber
//! and a publisher bound to a broker instance.

pub mod capability;
pub mod pubsub_client;

pub use capability::{Publisher, Subscriber};
pub use pubsub_client::{BrokerPublisher, ChannelSubscriber, LoggingSubscriber};
