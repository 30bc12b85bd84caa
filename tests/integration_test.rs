use std::sync::Arc;
use std::time::Duration;

use offsetbus::config::load_config_from;
use offsetbus::{Broker, BrokerPublisher, ChannelSubscriber, Message, ResetPolicy, SubscriptionState};
use tokio::sync::mpsc;
use tokio::time::timeout;

async fn next_payload(rx: &mut mpsc::UnboundedReceiver<Message>) -> String {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for delivery")
        .expect("channel closed")
        .payload()
        .to_string()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn integration_pubsub_end_to_end() {
    offsetbus::utils::logging::init("debug");

    let settings = load_config_from("does/not/exist").expect("defaults load");
    assert_eq!(settings.broker.reset_policy, ResetPolicy::Clamp);

    let broker = Arc::new(Broker::from_settings(&settings.broker));
    let orders = broker.create_topic("orders");
    let audit = broker.create_topic("audit");
    assert_ne!(orders.id(), audit.id());

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let sub_a = broker
        .subscribe(Arc::new(ChannelSubscriber::with_id("A", tx_a)), orders.id())
        .unwrap();
    broker
        .subscribe(Arc::new(ChannelSubscriber::with_id("B", tx_b)), audit.id())
        .unwrap();

    let publisher = BrokerPublisher::new("publisher-1", broker.clone());
    publisher.publish(orders.id(), "m1").unwrap();
    publisher.publish(orders.id(), "m2").unwrap();
    publisher.publish(audit.id(), "m3").unwrap();

    assert_eq!(next_payload(&mut rx_a).await, "m1");
    assert_eq!(next_payload(&mut rx_a).await, "m2");
    assert_eq!(next_payload(&mut rx_b).await, "m3");

    broker.reset_offset(orders.id(), "A", 0).unwrap();
    assert_eq!(next_payload(&mut rx_a).await, "m1");
    assert_eq!(next_payload(&mut rx_a).await, "m2");

    publisher.publish(orders.id(), "m4").unwrap();
    assert_eq!(next_payload(&mut rx_a).await, "m4");

    broker.shutdown();
    timeout(Duration::from_secs(2), sub_a.join())
        .await
        .expect("worker did not exit");
    assert_eq!(sub_a.state(), SubscriptionState::Stopped);
}
