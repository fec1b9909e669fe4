#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! sqlboot - A database bootstrap engine
//!
//! sqlboot decides whether a database already holds the expected schema and,
//! when it does not, creates the schema and applies custom SQL commands
//! (indexes, then stored procedures) loaded from `GO`-delimited install
//! scripts. It can be used as both a command-line application and a library.
//!
//! # Architecture
//!
//! - **[`splitter`]**: splits script text into batches on `GO` lines
//! - **[`script`]**: loads install scripts, optional or mandatory
//! - **[`capability`]**: per-backend feature flags and parameter factory
//! - **[`database`]**: the initializer state machine and the SQLite collaborator
//! - **[`config`]**: configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sqlboot::{BootConfig, DatabaseConn, SchemaInitializer, SqliteSchemaTarget};
//!
//! let config = BootConfig::new(&None)?;
//! let db = DatabaseConn::open_path(&config.sqlite_path())?;
//! let model = config.schema_model()?;
//! let target = SqliteSchemaTarget::new(&db, &model);
//!
//! let initializer = SchemaInitializer::new(config.required_table_set()?, config.scripts());
//! let report = initializer.prepare(&target)?;
//! println!("{} ({} custom commands)", report.state, report.statements_applied);
//! ```
//!
//! ## Splitting a script
//!
//! ```rust
//! let statements = sqlboot::split_statements("SELECT 1\nGO\nSELECT 2\nGO\n");
//! assert_eq!(statements, vec!["SELECT 1\n", "SELECT 2\n"]);
//! ```

pub mod capability;
pub mod config;
pub mod database;
pub mod error;
pub mod script;
pub mod splitter;

pub use config::BootConfig;

pub use capability::{
    Backend, CapabilityDescriptor, DbParameter, ParameterDirection, ParameterValue,
};
pub use error::{BootError, BootResult};
pub use script::{load_batches, load_commands, read_script, ScriptFile, ScriptRole, ScriptSet};
pub use splitter::{split_statements, split_statements_nonblank, Statements};

pub use database::{
    DatabaseConn, InitializationState, PrepareReport, RequiredTableSet, SchemaDefinitions,
    SchemaInitializer, SchemaModel, SchemaTarget, SqliteSchemaTarget,
};
