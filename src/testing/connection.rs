use std::collections::VecDeque;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;

use crate::database::{Connection, DriverError, ErrorKind};

/// Driver error with a chosen kind and message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MockError {
    kind: ErrorKind,
    message: String,
}

impl MockError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn statement_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StatementInvalid, message)
    }

    pub fn connection_not_established(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConnectionNotEstablished, message)
    }

    pub fn no_database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoDatabase, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Other, message)
    }
}

impl DriverError for MockError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Scripted connection that records every call made on it
///
/// Outcomes are consumed in order, one per `execute`. Once the script is empty
/// every execution succeeds with `"ok"`. Executing on a discarded connection
/// fails with a closed-connection error.
#[derive(Debug)]
pub struct MockConnection {
    outcomes: VecDeque<Result<String, MockError>>,
    reconnect_failures: VecDeque<MockError>,
    in_transaction: bool,
    leave_transaction_on_discard: bool,
    connected: bool,
    executions: usize,
    reconnects: usize,
    discards: usize,
    attempt_times: Vec<Instant>,
    queries: Vec<String>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            outcomes: VecDeque::new(),
            reconnect_failures: VecDeque::new(),
            in_transaction: false,
            leave_transaction_on_discard: false,
            connected: true,
            executions: 0,
            reconnects: 0,
            discards: 0,
            attempt_times: Vec::new(),
            queries: Vec::new(),
        }
    }

    pub fn succeed_with(mut self, output: impl Into<String>) -> Self {
        self.outcomes.push_back(Ok(output.into()));
        self
    }

    pub fn fail_with(mut self, error: MockError) -> Self {
        self.outcomes.push_back(Err(error));
        self
    }

    /// Make the next `reconnect` fail; repeat for several failures
    pub fn fail_reconnect_with(mut self, error: MockError) -> Self {
        self.reconnect_failures.push_back(error);
        self
    }

    pub fn in_transaction(mut self, in_transaction: bool) -> Self {
        self.in_transaction = in_transaction;
        self
    }

    /// Report no open transaction once the connection has been discarded
    pub fn leave_transaction_on_discard(mut self) -> Self {
        self.leave_transaction_on_discard = true;
        self
    }

    pub fn executions(&self) -> usize {
        self.executions
    }

    pub fn reconnects(&self) -> usize {
        self.reconnects
    }

    pub fn discards(&self) -> usize {
        self.discards
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// When each `execute` started
    pub fn attempt_times(&self) -> &[Instant] {
        &self.attempt_times
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connection for MockConnection {
    type Query = String;
    type Output = String;
    type Error = MockError;

    async fn execute(&mut self, query: &Self::Query) -> Result<String, MockError> {
        self.executions += 1;
        self.attempt_times.push(Instant::now());
        self.queries.push(query.clone());

        if !self.connected {
            return Err(MockError::connection_not_established(
                "PG::ConnectionBad: connection is closed",
            ));
        }

        self.outcomes
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()))
    }

    async fn reconnect(&mut self) -> Result<(), MockError> {
        self.reconnects += 1;

        if let Some(error) = self.reconnect_failures.pop_front() {
            return Err(error);
        }

        self.connected = true;
        Ok(())
    }

    async fn discard(&mut self) {
        self.discards += 1;
        self.connected = false;

        if self.leave_transaction_on_discard {
            self.in_transaction = false;
        }
    }

    fn is_in_transaction(&self) -> bool {
        self.in_transaction
    }
}
