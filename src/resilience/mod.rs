//! Failure classification for the failover decorators
//!
//! Every failed execution is labelled before the executor decides whether to
//! hand the error back, clear cached schema metadata, or reconnect and retry.
//!
//! # Example
//!
//! ```rust
//! use pg_failover::config::FailoverConfig;
//! use pg_failover::resilience::{classify, ErrorClassification};
//!
//! let config = FailoverConfig::new(true, false, vec![0.5, 1.0]);
//!
//! assert_eq!(
//!     classify("FATAL: the database system is starting up", &config),
//!     ErrorClassification::RetryableConnectionFailure,
//! );
//! assert_eq!(
//!     classify("PG::UndefinedColumn: column does not exist", &config),
//!     ErrorClassification::Unclassified,
//! );
//! ```

mod classifier;

pub use classifier::{
    CONNECTION_ERROR_MARKERS, ErrorClassification, SCHEMA_ERROR_MARKERS, classify,
    is_failover_error, is_missing_column_error, is_supported,
};
