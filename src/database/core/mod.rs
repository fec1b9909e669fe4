//! Core database infrastructure
//!
//! This module provides the SQLite collaborator used by the initializer:
//! - `DatabaseConn`: Core SQLite connection wrapper with configuration
//! - `SchemaModel`: DDL of the data model created on a fresh database
//! - `SqliteSchemaTarget`: `SchemaTarget` implementation over both

mod connection;
mod schema;

pub use connection::DatabaseConn;
pub use schema::{SchemaDefinitions, SchemaModel, SqliteSchemaTarget};
