//! Failure classification for failed query executions
//!
//! An error is classified from its message text alone, under a configuration
//! snapshot. A marker only counts when the patch that handles it is enabled,
//! so with both patches off every error is [`ErrorClassification::Unclassified`].

use std::fmt;

use crate::config::FailoverConfig;

/// Message fragments that indicate a lost, refused or read-only connection
pub const CONNECTION_ERROR_MARKERS: &[&str] = &[
    "Lost connection",
    "gone away",
    "read-only",
    "ReadOnlySqlTransaction",
    "UnableToSend",
    "ConnectionBad",
    "the database system is starting up",
    "connection is closed",
    "could not connect",
    "is not currently accepting connections",
    "too many connections",
    "Connection refused",
    "the database system is in recovery mode",
];

/// Message fragments that indicate stale cached column metadata
pub const SCHEMA_ERROR_MARKERS: &[&str] = &["UndefinedColumn"];

/// What the retry executor should do with a failed execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClassification {
    /// Transient infrastructure failure; discard, reconnect and retry
    RetryableConnectionFailure,
    /// Cached schema is stale; clear it and hand the error back
    SchemaMismatch,
    /// Not ours to handle; hand the error back untouched
    Unclassified,
}

impl ErrorClassification {
    pub fn is_supported(&self) -> bool {
        !matches!(self, ErrorClassification::Unclassified)
    }
}

impl fmt::Display for ErrorClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClassification::RetryableConnectionFailure => {
                write!(f, "RetryableConnectionFailure")
            }
            ErrorClassification::SchemaMismatch => write!(f, "SchemaMismatch"),
            ErrorClassification::Unclassified => write!(f, "Unclassified"),
        }
    }
}

fn contains_any(message: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| message.contains(marker))
}

/// True when the message names a connection failure and failover is enabled
pub fn is_failover_error(message: &str, config: &FailoverConfig) -> bool {
    contains_any(message, CONNECTION_ERROR_MARKERS) && config.failover_patch_enabled
}

/// True when the message names a missing column and schema reset is enabled
pub fn is_missing_column_error(message: &str, config: &FailoverConfig) -> bool {
    contains_any(message, SCHEMA_ERROR_MARKERS) && config.schema_reset_patch_enabled
}

/// Classify an error message
///
/// Both predicates are evaluated independently; a schema mismatch wins over a
/// connection failure when a message satisfies both.
pub fn classify(message: &str, config: &FailoverConfig) -> ErrorClassification {
    if is_missing_column_error(message, config) {
        ErrorClassification::SchemaMismatch
    } else if is_failover_error(message, config) {
        ErrorClassification::RetryableConnectionFailure
    } else {
        ErrorClassification::Unclassified
    }
}

pub fn is_supported(message: &str, config: &FailoverConfig) -> bool {
    classify(message, config).is_supported()
}
