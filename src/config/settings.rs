use serde::{Deserialize, Serialize};

use crate::broker::subscription::ResetPolicy;

/// Top-level configuration settings for the application.
///
/// Includes logging, broker and demo-driver settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub broker: BrokerSettings,
    pub demo: DemoSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Configuration settings for the broker.
///
/// `reset_policy` decides what happens to offset resets past the end of a log.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BrokerSettings {
    pub reset_policy: ResetPolicy,
}

/// Settings for the `demo` command.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DemoSettings {
    pub messages: usize,
    pub settle_ms: u64,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub logging: Option<PartialLoggingSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub demo: Option<PartialDemoSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub reset_policy: Option<ResetPolicy>,
}

#[derive(Debug, Deserialize)]
pub struct PartialDemoSettings {
    pub messages: Option<usize>,
    pub settle_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logging: LoggingSettings {
                level: "info".to_string(),
            },
            broker: BrokerSettings {
                reset_policy: ResetPolicy::Clamp,
            },
            demo: DemoSettings {
                messages: 3,
                settle_ms: 200,
            },
        }
    }
}
