//! Database module
//!
//! - **initializer**: backend-agnostic check-then-create state machine
//! - **core**: SQLite connection, data model and `SchemaTarget` implementation
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlboot::database::{DatabaseConn, SchemaModel, SqliteSchemaTarget};
//! use sqlboot::database::{RequiredTableSet, SchemaInitializer};
//! use sqlboot::{Backend, ScriptSet};
//!
//! let db = DatabaseConn::open_path("store.sqlite3")?;
//! let model = SchemaModel::store();
//! let target = SqliteSchemaTarget::new(&db, &model);
//!
//! let required = RequiredTableSet::new(["Customer", "Order"])?;
//! let scripts = ScriptSet::for_backend(Path::new("install"), Backend::Sqlite);
//! let report = SchemaInitializer::new(required, scripts).prepare(&target)?;
//! println!("{}", report.state);
//! ```

pub mod core;
pub mod initializer;

pub use core::{DatabaseConn, SchemaDefinitions, SchemaModel, SqliteSchemaTarget};
pub use initializer::{
    apply_commands, InitializationState, PrepareReport, RequiredTableSet, SchemaInitializer,
    SchemaTarget,
};
