//! CLI for offsetbus
//!
//! Subcommands:
//! - `demo`: run a small publish/subscribe/replay scenario against an in-process broker
//! - `config`: print the resolved settings as JSON

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use offsetbus::config::{Settings, load_config};
use offsetbus::{Broker, BrokerPublisher, LoggingSubscriber, Message, Subscriber};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "offsetbus")]
enum Command {
    /// Publish to a topic with two subscribers, then replay one of them
    Demo {
        /// Number of messages to publish (defaults to `demo.messages`)
        #[arg(long)]
        messages: Option<usize>,
    },
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            offsetbus::utils::logging::init("info");
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    offsetbus::utils::logging::init(&config.logging.level);

    let cmd = Command::parse();

    let result = match cmd {
        Command::Demo { messages } => run_demo(&config, messages).await,
        Command::Config => print_config(&config),
    };
    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

async fn run_demo(
    config: &Settings,
    messages: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let count = messages.unwrap_or(config.demo.messages);
    let settle = Duration::from_millis(config.demo.settle_ms);

    let broker = Arc::new(Broker::from_settings(&config.broker));
    let orders = broker.create_topic("orders");
    let audit = broker.create_topic("audit");

    let first: Arc<dyn Subscriber> = Arc::new(LoggingSubscriber::new("subscriber-1"));
    let second: Arc<dyn Subscriber> = Arc::new(LoggingSubscriber::new("subscriber-2"));
    broker.subscribe(first.clone(), orders.id())?;
    broker.subscribe(first.clone(), audit.id())?;
    broker.subscribe(second, orders.id())?;

    let publisher = BrokerPublisher::new("publisher-1", broker.clone());
    for i in 1..=count {
        publisher.publish(orders.id(), Message::new(format!("order m{i}")))?;
    }
    publisher.publish(audit.id(), "audit entry")?;
    tokio::time::sleep(settle).await;

    let reset = broker.reset_offset(orders.id(), first.id(), 0)?;
    info!(reset, "replaying {} from the start", orders.name());
    tokio::time::sleep(settle).await;

    broker.shutdown();
    Ok(())
}

fn print_config(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
