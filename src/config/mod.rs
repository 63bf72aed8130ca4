pub mod app;
pub mod failover;
pub mod global;

use thiserror::Error;

pub use app::AppConfig;
pub use failover::FailoverConfig;
pub use global::{
    configuration, configure, failover_patch_enabled, reconnect_with_backoff,
    reset_configuration, schema_reset_patch_enabled,
};

/// Configuration loading and validation error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A value was read but is not acceptable
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Validation hook run after a configuration has been deserialized
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Load the application configuration from files and environment variables
pub fn load() -> Result<AppConfig, ConfigError> {
    app::load_config()
}
