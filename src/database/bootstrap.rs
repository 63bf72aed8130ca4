//! Retrying the first connection attempt
//!
//! Establishing a connection has no transaction to protect, so the only limits
//! are the classifier and the backoff schedule.

use std::future::Future;

use super::connection::DriverError;
use crate::config::FailoverConfig;
use crate::metrics;
use crate::resilience::is_supported;

/// Establish a connection, retrying failures the classifier supports
///
/// `connect` is called once per attempt. Errors that are not connection
/// failures, or that the classifier does not support, are returned at once;
/// otherwise the last error is returned when the schedule runs out.
///
/// # Example
///
/// ```rust
/// use pg_failover::config::FailoverConfig;
/// use pg_failover::database::establish_connection;
/// use pg_failover::testing::MockError;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let config = FailoverConfig::new(true, false, vec![0.5, 1.0]);
/// let mut attempts = 0;
///
/// let connection = establish_connection(&config, || {
///     attempts += 1;
///     let result = if attempts < 2 {
///         Err(MockError::connection_not_established("FATAL: the database system is starting up"))
///     } else {
///         Ok("connected")
///     };
///     async move { result }
/// })
/// .await;
///
/// assert_eq!(connection.unwrap(), "connected");
/// # }
/// ```
#[tracing::instrument(skip(config, connect), fields(retries = config.backoff_schedule.len()))]
pub async fn establish_connection<T, E, F, Fut>(
    config: &FailoverConfig,
    mut connect: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: DriverError,
{
    let mut backoff = config.backoff_queue();

    loop {
        let error = match connect().await {
            Ok(connection) => return Ok(connection),
            Err(error) => error,
        };

        if !error.kind().is_connection_failure() {
            return Err(error);
        }

        let message = error.message();
        if !is_supported(&message, config) || !config.reconnect_with_backoff() {
            return Err(error);
        }

        let Some(wait) = backoff.pop_front() else {
            tracing::warn!(error = %message, "Could not establish a connection, giving up");
            return Err(error);
        };

        tracing::warn!(
            error = %message,
            wait_seconds = wait.as_secs_f64(),
            remaining = backoff.len(),
            "Could not establish a connection, retrying again after backoff"
        );
        tokio::time::sleep(wait).await;
        metrics::record_bootstrap_retry();
    }
}
