use serde::{Deserialize, Serialize};

use super::{ConfigError, FailoverConfig, Validate};

/// Top-level configuration file layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(Default)]
pub struct AppConfig {
    /// Failover and schema reset behaviour
    #[serde(default)]
    pub failover: FailoverConfig,
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.failover.validate()?;
        Ok(())
    }
}

/// Load configuration from files and environment variables
///
/// Configuration loading follows this precedence (highest to lowest):
/// 1. Environment variables: PG_FAILOVER__FAILOVER__BACKOFF_SCHEDULE=0.5,1,2
/// 2. config/local.toml (git-ignored, developer overrides)
/// 3. config/{APP_ENV}.toml (development/staging/production)
/// 4. config/default.toml (base defaults)
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};

    // Determine the environment
    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

    let config = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", env)).required(false))
        .add_source(File::with_name("config/local").required(false))
        .add_source(
            Environment::with_prefix("PG_FAILOVER")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("failover.backoff_schedule"),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate()?;

    tracing::info!(
        environment = %env,
        failover_patch_enabled = app_config.failover.failover_patch_enabled,
        schema_reset_patch_enabled = app_config.failover.schema_reset_patch_enabled,
        retries = app_config.failover.backoff_schedule.len(),
        "Loaded failover configuration"
    );

    Ok(app_config)
}
