//! Configuration management for the item transformers

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// The harvested source this process transforms records for
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SourceConfig {
    /// Source id, part of every object id
    pub id: String,
    /// Name of the transformer to use (see `transformers::by_name`)
    pub transformer: String,
    /// Hide this source's documents in the combined index
    pub hidden: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables, e.g. OCD_ITEMS__SOURCE__HIDDEN=true
            .add_source(
                Environment::with_prefix("OCD_ITEMS")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("source.id", env::var("SOURCE_ID").ok())?;

        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            id: "kb_watermarks".to_string(),
            transformer: "kb_watermarks".to_string(),
            hidden: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
