#![deny(warnings)]

pub mod config;
pub mod database;
pub mod metrics;
pub mod resilience;
pub mod schema;

// Testing utilities (always available for integration tests)
pub mod testing;

// Re-export commonly used types for convenience
pub use config::{FailoverConfig, configuration, configure, reset_configuration};
pub use database::{
    Connection, DriverError, ErrorKind, FailoverConnection, OrmConnection, establish_connection,
};
pub use resilience::{ErrorClassification, classify};
pub use schema::{ColumnMetadata, LocalSchemaCache, SchemaCache, SchemaRegistry};
