//! Counters emitted by the failover decorators
//!
//! The library only records through the `metrics` facade. Applications install
//! whatever recorder they export with; without one every call is a no-op.

use metrics::{Unit, counter, describe_counter};

pub const RETRIES_TOTAL: &str = "pg_failover_retries_total";
pub const CONNECTION_DISCARDS_TOTAL: &str = "pg_failover_connection_discards_total";
pub const SCHEMA_RESETS_TOTAL: &str = "pg_failover_schema_resets_total";
pub const BOOTSTRAP_RETRIES_TOTAL: &str = "pg_failover_bootstrap_retries_total";

/// Register descriptions with the installed recorder
pub fn describe_metrics() {
    describe_counter!(
        RETRIES_TOTAL,
        Unit::Count,
        "Queries re-executed after a connection failure"
    );
    describe_counter!(
        CONNECTION_DISCARDS_TOTAL,
        Unit::Count,
        "Connections discarded after a connection failure"
    );
    describe_counter!(
        SCHEMA_RESETS_TOTAL,
        Unit::Count,
        "Schema cache invalidations after a missing column error"
    );
    describe_counter!(
        BOOTSTRAP_RETRIES_TOTAL,
        Unit::Count,
        "Connection establishment attempts retried after a failure"
    );
}

pub(crate) fn record_retry() {
    counter!(RETRIES_TOTAL).increment(1);
}

pub(crate) fn record_discard() {
    counter!(CONNECTION_DISCARDS_TOTAL).increment(1);
}

pub(crate) fn record_schema_reset() {
    counter!(SCHEMA_RESETS_TOTAL).increment(1);
}

pub(crate) fn record_bootstrap_retry() {
    counter!(BOOTSTRAP_RETRIES_TOTAL).increment(1);
}
