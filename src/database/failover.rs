//! Query execution with transparent failover
//!
//! [`FailoverConnection`] wraps any [`Connection`] and intercepts `execute`.
//! Successful calls pass straight through. A failed call is classified and
//! then either handed back untouched, handed back after the schema caches are
//! cleared, or retried on a fresh connection after the next backoff wait.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pg_failover::config::FailoverConfig;
//! use pg_failover::database::FailoverConnection;
//! use pg_failover::schema::SchemaRegistry;
//! use pg_failover::testing::{MockConnection, MockError};
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let config = Arc::new(FailoverConfig::new(true, false, vec![0.5]));
//! let inner = MockConnection::new()
//!     .fail_with(MockError::statement_invalid("PG::ConnectionBad: connection is closed"))
//!     .succeed_with("ok");
//!
//! let mut connection = FailoverConnection::new(inner, config, Arc::new(SchemaRegistry::new()));
//! let result = connection.execute(&"SELECT 1".to_string()).await;
//!
//! assert_eq!(result.unwrap(), "ok");
//! assert_eq!(connection.inner().reconnects(), 1);
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use super::connection::{Connection, DriverError};
use crate::config::{self, FailoverConfig};
use crate::metrics;
use crate::resilience::{ErrorClassification, classify};
use crate::schema::SchemaRegistry;

/// Decorator that retries failed queries on a fresh connection
///
/// The configuration is a snapshot taken at construction. Each `execute` call
/// copies its backoff schedule, so calls never share retry budget.
pub struct FailoverConnection<C> {
    inner: C,
    config: Arc<FailoverConfig>,
    schema: Arc<SchemaRegistry>,
}

impl<C: Connection> FailoverConnection<C> {
    pub fn new(inner: C, config: Arc<FailoverConfig>, schema: Arc<SchemaRegistry>) -> Self {
        Self {
            inner,
            config,
            schema,
        }
    }

    /// Wrap a connection using the current process-wide configuration
    pub fn with_global_config(inner: C, schema: Arc<SchemaRegistry>) -> Self {
        Self::new(inner, config::configuration(), schema)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    pub fn config(&self) -> &FailoverConfig {
        &self.config
    }

    /// Execute a query, retrying after connection failures
    ///
    /// The error returned is always the driver's own error from the last
    /// attempt.
    ///
    /// # Behavior
    ///
    /// - Inside an open transaction a connection failure is never retried
    /// - A missing column clears every schema cache and is never retried
    /// - Retries stop when the backoff schedule is used up
    #[tracing::instrument(skip(self, query), fields(within_transaction = tracing::field::Empty))]
    pub async fn execute(&mut self, query: &C::Query) -> Result<C::Output, C::Error> {
        // Reconnecting can reset transaction state, so this is read exactly once
        let within_transaction = self.inner.is_in_transaction();
        tracing::Span::current().record("within_transaction", within_transaction);

        let mut backoff = self.config.backoff_queue();
        let mut reconnect_pending = false;

        loop {
            let attempt = if reconnect_pending {
                match self.inner.reconnect().await {
                    Ok(()) => self.inner.execute(query).await,
                    Err(err) => Err(err),
                }
            } else {
                self.inner.execute(query).await
            };

            let error = match attempt {
                Ok(output) => return Ok(output),
                Err(error) => error,
            };

            if !error.kind().is_recognized() {
                return Err(error);
            }

            let message = error.message();
            match classify(&message, &self.config) {
                ErrorClassification::Unclassified => return Err(error),
                ErrorClassification::SchemaMismatch => {
                    self.reset_schema(&message);
                    return Err(error);
                }
                ErrorClassification::RetryableConnectionFailure => {
                    tracing::warn!(
                        error = %message,
                        kind = ?error.kind(),
                        "Clearing connection after connection failure"
                    );
                    self.inner.discard().await;
                    metrics::record_discard();

                    if within_transaction {
                        tracing::warn!("Not retrying query inside an open transaction");
                        return Err(error);
                    }

                    let Some(wait) = backoff.pop_front() else {
                        tracing::warn!("Retry schedule exhausted, giving up");
                        return Err(error);
                    };

                    tracing::warn!(
                        wait_seconds = wait.as_secs_f64(),
                        remaining = backoff.len(),
                        query = ?query,
                        "Retry query failed, retrying again after backoff"
                    );
                    tokio::time::sleep(wait).await;
                    metrics::record_retry();
                    reconnect_pending = true;
                }
            }
        }
    }

    fn reset_schema(&self, message: &str) {
        tracing::warn!(error = %message, "Clearing column information after schema mismatch");
        let report = self.schema.invalidate_all();
        metrics::record_schema_reset();
        tracing::debug!(
            caches = report.caches,
            models = report.models,
            "Schema caches cleared"
        );
    }
}

#[async_trait]
impl<C> Connection for FailoverConnection<C>
where
    C: Connection,
{
    type Query = C::Query;
    type Output = C::Output;
    type Error = C::Error;

    async fn execute(&mut self, query: &Self::Query) -> Result<Self::Output, Self::Error> {
        FailoverConnection::execute(self, query).await
    }

    async fn reconnect(&mut self) -> Result<(), Self::Error> {
        self.inner.reconnect().await
    }

    async fn discard(&mut self) {
        self.inner.discard().await
    }

    fn is_in_transaction(&self) -> bool {
        self.inner.is_in_transaction()
    }
}

impl<C> std::fmt::Debug for FailoverConnection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailoverConnection")
            .field("config", &self.config)
            .field("schema", &self.schema)
            .finish()
    }
}
