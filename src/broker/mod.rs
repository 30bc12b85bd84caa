pub mod engine;
pub mod message;
pub mod registry;
pub mod subscription;
pub mod topic;
pub mod worker;

pub use engine::Broker;
pub use message::Message;
pub use registry::TopicRegistry;
pub use subscription::{ResetPolicy, Subscription, SubscriptionHandle, SubscriptionState};
pub use topic::{Topic, TopicId};
pub use worker::DeliveryWorker;
