//! Test doubles for the failover decorators
//!
//! These are compiled into the library so integration tests and downstream
//! crates can drive the decorators without a database.

mod connection;
mod schema;

pub use connection::{MockConnection, MockError};
pub use schema::{RecordingModel, RecordingSchemaCache};
