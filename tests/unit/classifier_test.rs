// Classification tests over realistic PostgreSQL driver messages

use pg_failover::config::FailoverConfig;
use pg_failover::resilience::*;

fn config(failover: bool, schema_reset: bool) -> FailoverConfig {
    FailoverConfig::new(failover, schema_reset, vec![0.5])
}

// ============================================================================
// Connection failures
// ============================================================================

#[test]
fn test_driver_messages_are_retryable() {
    let messages = [
        "PG::ConnectionBad: PQconsumeInput() server closed the connection unexpectedly",
        "PG::UnableToSend: no connection to the server",
        "PG::ReadOnlySqlTransaction: ERROR:  cannot execute UPDATE in a read-only transaction",
        "FATAL:  the database system is starting up",
        "FATAL:  the database system is in recovery mode",
        "could not connect to server: Connection refused",
        "FATAL:  sorry, too many connections for role \"app\"",
        "FATAL:  the database is not currently accepting connections",
        "Lost connection to server during query",
        "server has gone away",
    ];

    for message in messages {
        assert_eq!(
            classify(message, &config(true, false)),
            ErrorClassification::RetryableConnectionFailure,
            "{:?}",
            message
        );
        assert!(is_failover_error(message, &config(true, false)));
    }
}

#[test]
fn test_failover_disabled_is_unclassified_for_every_marker() {
    for marker in CONNECTION_ERROR_MARKERS {
        assert_eq!(
            classify(marker, &config(false, true)),
            ErrorClassification::Unclassified
        );
        assert!(!is_supported(marker, &config(false, true)));
    }
}

// ============================================================================
// Schema mismatches
// ============================================================================

#[test]
fn test_every_schema_marker_is_schema_mismatch() {
    for marker in SCHEMA_ERROR_MARKERS {
        assert_eq!(
            classify(marker, &config(false, true)),
            ErrorClassification::SchemaMismatch
        );
    }
}

#[test]
fn test_schema_mismatch_does_not_need_failover() {
    let message = "PG::UndefinedColumn: ERROR:  column posts.slug does not exist";
    assert!(is_supported(message, &config(false, true)));
    assert!(!is_failover_error(message, &config(true, true)));
}

// ============================================================================
// Unsupported errors
// ============================================================================

#[test]
fn test_constraint_violation_is_unsupported() {
    let message = "PG::UniqueViolation: ERROR:  duplicate key value violates unique constraint";
    assert!(!is_supported(message, &config(true, true)));
}

#[test]
fn test_empty_message_is_unsupported() {
    assert_eq!(classify("", &config(true, true)), ErrorClassification::Unclassified);
}
