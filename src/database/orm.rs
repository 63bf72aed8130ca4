//! SeaORM-backed connection
//!
//! [`OrmConnection`] owns one `DatabaseConnection` plus the options needed to
//! rebuild it, and at most one open transaction. While that transaction is
//! open every statement runs inside it and the connection reports itself as
//! in a transaction, which is what stops the failover decorator from retrying.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pg_failover::config::FailoverConfig;
//! use pg_failover::database::{FailoverConnection, OrmConnection};
//! use pg_failover::schema::SchemaRegistry;
//! use sea_orm::{DbBackend, Statement};
//!
//! # async fn example() -> Result<(), sea_orm::DbErr> {
//! let config = Arc::new(FailoverConfig::new(true, true, vec![0.5, 1.0, 2.0]));
//! let inner = OrmConnection::establish("postgres://localhost/app", &config).await?;
//!
//! let mut connection = FailoverConnection::new(inner, config, Arc::new(SchemaRegistry::new()));
//! let _rows = connection
//!     .execute(&Statement::from_string(DbBackend::Postgres, "SELECT 1"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use sea_orm::{
    ConnAcquireErr, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DatabaseTransaction, DbErr, QueryResult, RuntimeErr, Statement, TransactionTrait,
};

use super::bootstrap::establish_connection;
use super::connection::{Connection, DriverError, ErrorKind};
use crate::config::FailoverConfig;

/// A SeaORM connection that can be discarded and rebuilt
pub struct OrmConnection {
    options: ConnectOptions,
    connection: Option<DatabaseConnection>,
    transaction: Option<DatabaseTransaction>,
}

impl OrmConnection {
    /// Connect, retrying with the configured backoff while the server is unreachable
    #[tracing::instrument(skip(options, config))]
    pub async fn establish(
        options: impl Into<ConnectOptions>,
        config: &FailoverConfig,
    ) -> Result<Self, DbErr> {
        let options = options.into();
        let connection =
            establish_connection(config, || Database::connect(options.clone())).await?;

        Ok(Self::from_connection(options, connection))
    }

    /// Wrap a connection that is already open
    pub fn from_connection(options: ConnectOptions, connection: DatabaseConnection) -> Self {
        Self {
            options,
            connection: Some(connection),
            transaction: None,
        }
    }

    /// The live connection, or `None` after a discard
    pub fn connection(&self) -> Option<&DatabaseConnection> {
        self.connection.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub async fn begin(&mut self) -> Result<(), DbErr> {
        if self.transaction.is_some() {
            return Err(DbErr::Custom("a transaction is already open".to_string()));
        }

        let connection = self.connection.as_ref().ok_or_else(closed)?;
        self.transaction = Some(connection.begin().await?);
        Ok(())
    }

    pub async fn commit(&mut self) -> Result<(), DbErr> {
        match self.transaction.take() {
            Some(transaction) => transaction.commit().await,
            None => Err(DbErr::Custom("no open transaction to commit".to_string())),
        }
    }

    pub async fn rollback(&mut self) -> Result<(), DbErr> {
        match self.transaction.take() {
            Some(transaction) => transaction.rollback().await,
            None => Err(DbErr::Custom("no open transaction to roll back".to_string())),
        }
    }
}

fn closed() -> DbErr {
    DbErr::Conn(RuntimeErr::Internal("connection is closed".to_string()))
}

#[async_trait]
impl Connection for OrmConnection {
    type Query = Statement;
    type Output = Vec<QueryResult>;
    type Error = DbErr;

    async fn execute(&mut self, query: &Statement) -> Result<Vec<QueryResult>, DbErr> {
        if let Some(transaction) = &self.transaction {
            return transaction.query_all(query.clone()).await;
        }

        match &self.connection {
            Some(connection) => connection.query_all(query.clone()).await,
            None => Err(closed()),
        }
    }

    async fn reconnect(&mut self) -> Result<(), DbErr> {
        let connection = Database::connect(self.options.clone()).await?;
        self.connection = Some(connection);
        Ok(())
    }

    async fn discard(&mut self) {
        // Dropping an open transaction rolls it back
        self.transaction = None;

        if let Some(connection) = self.connection.take() {
            if let Err(err) = connection.close().await {
                tracing::warn!(error = %err, "Failed to close discarded connection");
            }
        }
    }

    fn is_in_transaction(&self) -> bool {
        self.transaction.is_some()
    }
}

impl std::fmt::Debug for OrmConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrmConnection")
            .field("connected", &self.connection.is_some())
            .field("in_transaction", &self.transaction.is_some())
            .finish()
    }
}

/// SQLSTATE reported by the server, when the driver exposes one
#[cfg(feature = "postgres")]
fn sqlstate(error: &DbErr) -> Option<String> {
    match error {
        DbErr::Conn(RuntimeErr::SqlxError(err))
        | DbErr::Exec(RuntimeErr::SqlxError(err))
        | DbErr::Query(RuntimeErr::SqlxError(err)) => err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

#[cfg(not(feature = "postgres"))]
fn sqlstate(_error: &DbErr) -> Option<String> {
    None
}

/// PostgreSQL condition name for the SQLSTATE codes the classifier cares about
fn condition_name(sqlstate: &str) -> Option<&'static str> {
    match sqlstate {
        "42703" => Some("UndefinedColumn"),
        "25006" => Some("ReadOnlySqlTransaction"),
        code if code.starts_with("08") => Some("ConnectionBad"),
        _ => None,
    }
}

/// The link to the server broke underneath the driver
///
/// These never carry a SQLSTATE, so they are reported as `ConnectionBad`.
fn is_lost_connection(error: &DbErr) -> bool {
    match error {
        DbErr::ConnectionAcquire(ConnAcquireErr::ConnectionClosed) => true,
        DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime) => {
            is_transport_failure(runtime)
        }
        _ => false,
    }
}

#[cfg(any(feature = "postgres", feature = "sqlite"))]
fn is_transport_failure(error: &RuntimeErr) -> bool {
    use sea_orm::sqlx;

    matches!(
        error,
        RuntimeErr::SqlxError(
            sqlx::Error::Io(_) | sqlx::Error::Protocol(_) | sqlx::Error::PoolClosed
        )
    )
}

#[cfg(not(any(feature = "postgres", feature = "sqlite")))]
fn is_transport_failure(_error: &RuntimeErr) -> bool {
    false
}

/// PostgreSQL condition name the error stands for, if any
fn condition(error: &DbErr) -> Option<&'static str> {
    match sqlstate(error).as_deref().and_then(condition_name) {
        Some(name) => Some(name),
        None if is_lost_connection(error) => Some("ConnectionBad"),
        None => None,
    }
}

fn is_missing_database(error: &DbErr) -> bool {
    if sqlstate(error).as_deref() == Some("3D000") {
        return true;
    }

    let message = error.to_string();
    message.contains("database") && message.contains("does not exist")
}

impl DriverError for DbErr {
    fn kind(&self) -> ErrorKind {
        match self {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                if is_missing_database(self) {
                    ErrorKind::NoDatabase
                } else {
                    ErrorKind::ConnectionNotEstablished
                }
            }
            DbErr::Exec(_) | DbErr::Query(_) => ErrorKind::StatementInvalid,
            _ => ErrorKind::Other,
        }
    }

    fn message(&self) -> String {
        match condition(self) {
            Some(name) => format!("PG::{}: {}", name, self),
            None => self.to_string(),
        }
    }
}
