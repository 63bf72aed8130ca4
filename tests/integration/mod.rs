//! Integration tests for pg-failover
//!
//! These drive the decorators end to end through the public API, using the
//! scripted connection from `pg_failover::testing` and, with the `sqlite`
//! feature, a real SeaORM connection.

#[cfg(feature = "sqlite")]
pub mod orm_test;
pub mod schema_reset_test;
