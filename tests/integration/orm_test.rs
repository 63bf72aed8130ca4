use std::sync::Arc;

use pg_failover::config::FailoverConfig;
use pg_failover::database::{Connection, DriverError, ErrorKind, FailoverConnection, OrmConnection};
use pg_failover::schema::SchemaRegistry;
use sea_orm::{DbBackend, Statement};

fn statement(sql: &str) -> Statement {
    Statement::from_string(DbBackend::Sqlite, sql)
}

async fn failover_connection(config: FailoverConfig) -> FailoverConnection<OrmConnection> {
    let config = Arc::new(config);
    let inner = OrmConnection::establish("sqlite::memory:", &config)
        .await
        .expect("Failed to create in-memory database");

    FailoverConnection::new(inner, config, Arc::new(SchemaRegistry::new()))
}

#[tokio::test]
async fn test_query_through_decorator() {
    let mut connection = failover_connection(FailoverConfig::new(true, true, vec![0.1])).await;

    let rows = connection.execute(&statement("SELECT 1 AS one")).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_statement_errors_pass_through() {
    let mut connection = failover_connection(FailoverConfig::new(true, true, vec![0.1])).await;

    let err = connection
        .execute(&statement("SELECT nickname FROM missing_table"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StatementInvalid);
    assert!(connection.inner().is_connected());
}

#[tokio::test]
async fn test_discarded_connection_recovers_on_next_call() {
    let mut connection = failover_connection(FailoverConfig::new(true, false, vec![0.05])).await;

    // A closed connection fails with "connection is closed", which is retryable
    connection.inner_mut().discard().await;
    assert!(!connection.inner().is_connected());

    let rows = connection.execute(&statement("SELECT 1 AS one")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(connection.inner().is_connected());
}

#[tokio::test]
async fn test_statements_run_inside_open_transaction() {
    let mut connection = failover_connection(FailoverConfig::new(true, false, vec![0.05])).await;

    connection.inner_mut().begin().await.unwrap();
    assert!(connection.is_in_transaction());

    connection
        .execute(&statement("CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT)"))
        .await
        .unwrap();
    connection
        .execute(&statement("INSERT INTO posts (title) VALUES ('hello')"))
        .await
        .unwrap();
    let rows = connection.execute(&statement("SELECT title FROM posts")).await.unwrap();
    assert_eq!(rows.len(), 1);

    connection.inner_mut().rollback().await.unwrap();
    assert!(!connection.is_in_transaction());

    let err = connection
        .execute(&statement("SELECT title FROM posts"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StatementInvalid);
}
