//! Database connection decorators with failover support
//!
//! This module provides the [`Connection`] capability trait, the
//! [`FailoverConnection`] decorator that retries failed queries, the
//! [`establish_connection`] guard for the first connect, and a SeaORM-backed
//! [`OrmConnection`].

mod bootstrap;
mod connection;
mod failover;
mod orm;

pub use bootstrap::establish_connection;
pub use connection::{Connection, DriverError, ErrorKind};
pub use failover::FailoverConnection;
pub use orm::OrmConnection;
