use std::sync::Arc;

use pg_failover::config::FailoverConfig;
use pg_failover::database::FailoverConnection;
use pg_failover::schema::{ColumnInfo, LocalSchemaCache, SchemaRegistry};
use pg_failover::testing::{MockConnection, MockError, RecordingModel, RecordingSchemaCache};

const MISSING_COLUMN: &str =
    "PG::UndefinedColumn: ERROR:  column users.nickname does not exist";

fn select() -> String {
    "SELECT id, nickname FROM users".to_string()
}

#[tokio::test(start_paused = true)]
async fn test_missing_column_clears_every_cache_and_model() {
    let registry = Arc::new(SchemaRegistry::new());
    let pooled: Vec<Arc<LocalSchemaCache>> =
        (0..3).map(|_| Arc::new(LocalSchemaCache::new())).collect();
    for cache in &pooled {
        cache.insert("users", vec![ColumnInfo::new("id", "uuid", false)]);
        registry.register_cache(cache.clone());
    }
    let users = Arc::new(RecordingModel::new("users"));
    let posts = Arc::new(RecordingModel::new("posts"));
    registry.register_model(users.clone());
    registry.register_model(posts.clone());

    let config = Arc::new(FailoverConfig::new(false, true, vec![]));
    let inner = MockConnection::new().fail_with(MockError::statement_invalid(MISSING_COLUMN));
    let mut connection = FailoverConnection::new(inner, config, registry);

    let error = connection.execute(&select()).await.unwrap_err();

    assert_eq!(error.to_string(), MISSING_COLUMN);
    assert!(pooled.iter().all(|cache| cache.is_empty()));
    assert_eq!(users.reloads(), 1);
    assert_eq!(posts.reloads(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_column_is_never_retried() {
    let registry = Arc::new(SchemaRegistry::new());
    let cache = Arc::new(RecordingSchemaCache::new());
    registry.register_cache(cache.clone());

    let config = Arc::new(FailoverConfig::new(true, true, vec![0.5, 1.0, 2.0]));
    let inner = MockConnection::new()
        .fail_with(MockError::statement_invalid(MISSING_COLUMN))
        .succeed_with("rows");
    let mut connection = FailoverConnection::new(inner, config, registry);

    let error = connection.execute(&select()).await.unwrap_err();

    assert_eq!(error.to_string(), MISSING_COLUMN);
    assert_eq!(cache.clears(), 1);
    assert_eq!(connection.inner().executions(), 1);
    assert_eq!(connection.inner().reconnects(), 0);

    // Re-issuing the query is the caller's job, and it now succeeds
    assert_eq!(connection.execute(&select()).await.unwrap(), "rows");
    assert_eq!(cache.clears(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_schema_reset_disabled_leaves_caches() {
    let registry = Arc::new(SchemaRegistry::new());
    let cache = Arc::new(RecordingSchemaCache::new());
    registry.register_cache(cache.clone());

    let config = Arc::new(FailoverConfig::new(true, false, vec![0.5]));
    let inner = MockConnection::new().fail_with(MockError::statement_invalid(MISSING_COLUMN));
    let mut connection = FailoverConnection::new(inner, config, registry);

    assert!(connection.execute(&select()).await.is_err());
    assert_eq!(cache.clears(), 0);
    assert_eq!(connection.inner().executions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_resets_are_harmless() {
    let registry = Arc::new(SchemaRegistry::new());
    let cache = Arc::new(LocalSchemaCache::new());
    cache.insert("users", vec![ColumnInfo::new("id", "uuid", false)]);
    registry.register_cache(cache.clone());

    let config = Arc::new(FailoverConfig::new(false, true, vec![]));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let mut connection = FailoverConnection::new(
                MockConnection::new().fail_with(MockError::statement_invalid(MISSING_COLUMN)),
                Arc::clone(&config),
                Arc::clone(&registry),
            );
            tokio::spawn(async move { connection.execute(&select()).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_err());
    }

    assert!(cache.is_empty());
    assert_eq!(cache.stats().clears, 8);
}
