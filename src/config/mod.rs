mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, DemoSettings, LoggingSettings, Settings};

/// Prefix for environment overrides, e.g. `OFFSETBUS_BROKER__RESET_POLICY=reject`.
pub const ENV_PREFIX: &str = "OFFSETBUS";

/// Loads `config/default.*` (optional) and environment overrides, merged over defaults.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Same as [`load_config`] but reads the file source from `path` (extension optional).
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        logging: LoggingSettings {
            level: partial
                .logging
                .and_then(|l| l.level)
                .unwrap_or(default.logging.level),
        },
        broker: BrokerSettings {
            reset_policy: partial
                .broker
                .and_then(|b| b.reset_policy)
                .unwrap_or(default.broker.reset_policy),
        },
        demo: DemoSettings {
            messages: partial
                .demo
                .as_ref()
                .and_then(|d| d.messages)
                .unwrap_or(default.demo.messages),
            settle_ms: partial
                .demo
                .as_ref()
                .and_then(|d| d.settle_ms)
                .unwrap_or(default.demo.settle_ms),
        },
    })
}
