//! # offsetbus
//!
//! `offsetbus` is a minimal in-process message broker. Topics are append-only
//! logs; every subscription keeps its own offset into a topic and is served by
//! its own delivery task, so subscribers consume independently and can replay
//! by moving their offset backwards.
//!
//! ## Core Modules
//!
//! - `broker`: topics, the topic registry, subscriptions, delivery workers and the `Broker` façade.
//! - `client`: the `Subscriber`/`Publisher` capabilities and ready-made clients.
//! - `config`: loading settings from `config/default.*` and the environment.
//! - `utils`: error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod utils;

pub use broker::{Broker, Message, ResetPolicy, SubscriptionHandle, SubscriptionState, TopicId};
pub use client::{BrokerPublisher, ChannelSubscriber, LoggingSubscriber, Publisher, Subscriber};
pub use utils::error::{BrokerError, HandlerError};
