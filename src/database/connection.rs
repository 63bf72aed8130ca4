use std::fmt::Debug;

use async_trait::async_trait;

/// Driver-level category of a failed database call
///
/// Only the first three kinds are considered by the failover decorators; an
/// error of kind [`ErrorKind::Other`] is always handed back untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The statement reached the server and was rejected or interrupted
    StatementInvalid,
    /// No usable connection could be obtained or the connection dropped
    ConnectionNotEstablished,
    /// The target database does not exist
    NoDatabase,
    /// Anything else
    Other,
}

impl ErrorKind {
    /// Kinds the query executor inspects
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ErrorKind::Other)
    }

    /// Kinds the connection bootstrap guard inspects
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ErrorKind::ConnectionNotEstablished | ErrorKind::NoDatabase)
    }
}

/// An error produced by a database driver
pub trait DriverError: std::error::Error + Send + Sync + 'static {
    fn kind(&self) -> ErrorKind;

    /// Text the classifier matches markers against
    fn message(&self) -> String {
        self.to_string()
    }
}

/// Capabilities the failover decorators need from a database connection
#[async_trait]
pub trait Connection: Send + Sync {
    type Query: Debug + Send + Sync;
    type Output: Send;
    type Error: DriverError;

    /// Run one statement
    async fn execute(&mut self, query: &Self::Query) -> Result<Self::Output, Self::Error>;

    /// Re-establish the underlying connection after a discard
    async fn reconnect(&mut self) -> Result<(), Self::Error>;

    /// Force-close the underlying connection so it is never reused
    async fn discard(&mut self);

    fn is_in_transaction(&self) -> bool;
}
