//! Process-wide failover configuration
//!
//! Decorators take an explicit [`FailoverConfig`] snapshot, so this instance is
//! only a convenience for applications that configure once at startup. Mutate
//! it before query traffic begins; connections already built keep the
//! snapshot they were given.
//!
//! # Example
//!
//! ```rust
//! use pg_failover::config;
//!
//! config::configure(|c| {
//!     c.failover_patch_enabled = true;
//!     c.backoff_schedule = vec![0.5, 1.0, 2.0];
//! });
//!
//! assert!(config::failover_patch_enabled());
//! config::reset_configuration();
//! assert!(!config::failover_patch_enabled());
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use super::FailoverConfig;

static CONFIGURATION: Lazy<RwLock<Option<Arc<FailoverConfig>>>> =
    Lazy::new(|| RwLock::new(None));

/// Current process-wide configuration, created with defaults on first use
pub fn configuration() -> Arc<FailoverConfig> {
    if let Some(config) = CONFIGURATION
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return Arc::clone(config);
    }

    let mut slot = CONFIGURATION
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slot.get_or_insert_with(|| Arc::new(FailoverConfig::default())))
}

/// Update the process-wide configuration in place
pub fn configure<F>(f: F)
where
    F: FnOnce(&mut FailoverConfig),
{
    let mut slot = CONFIGURATION
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let mut config = slot.as_deref().cloned().unwrap_or_default();
    f(&mut config);

    tracing::debug!(
        failover_patch_enabled = config.failover_patch_enabled,
        schema_reset_patch_enabled = config.schema_reset_patch_enabled,
        backoff_schedule = ?config.backoff_schedule,
        "Failover configuration updated"
    );

    *slot = Some(Arc::new(config));
}

/// Drop the process-wide configuration; the next read yields defaults
pub fn reset_configuration() {
    *CONFIGURATION
        .write()
        .unwrap_or_else(PoisonError::into_inner) = None;
}

pub fn failover_patch_enabled() -> bool {
    configuration().failover_patch_enabled
}

pub fn schema_reset_patch_enabled() -> bool {
    configuration().schema_reset_patch_enabled
}

pub fn reconnect_with_backoff() -> bool {
    configuration().reconnect_with_backoff()
}
