//! Schema initialization
//!
//! [`SchemaInitializer`] runs a single forward pass per [`prepare`] call:
//! check the required tables, create the schema when any is missing, then
//! apply custom commands (indexes, then stored procedures) in registration
//! order. A healthy database costs one existence query per required table
//! and nothing else.
//!
//! Callers must serialize `prepare` calls against the same database; two
//! concurrent passes on an empty database would both try to create it.
//!
//! [`prepare`]: SchemaInitializer::prepare

use std::fmt;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::{BootError, BootResult};
use crate::script::{load_batches, ScriptFile};

/// Longest statement excerpt carried by execution errors
const STATEMENT_PREVIEW_LEN: usize = 120;

/// Database operations the initializer depends on
///
/// Implemented by the connection layer; the initializer never authors DDL
/// for the data model itself.
pub trait SchemaTarget {
    /// Whether a table with this name exists
    fn table_exists(&self, table_name: &str) -> BootResult<bool>;

    /// Create every schema object of the registered data model
    fn create_schema(&self) -> BootResult<()>;

    /// Execute one statement batch
    fn execute(&self, statement: &str) -> BootResult<()>;
}

/// Tables that must all exist for the schema to count as present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredTableSet(Vec<String>);

impl RequiredTableSet {
    /// Build a table set, rejecting empty sets and blank names
    pub fn new<I, S>(tables: I) -> BootResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tables: Vec<String> = tables.into_iter().map(Into::into).collect();

        if tables.is_empty() {
            return Err(BootError::InvalidConfig(
                "At least one required table must be configured".to_string(),
            ));
        }
        if tables.iter().any(|t| t.trim().is_empty()) {
            return Err(BootError::InvalidConfig(
                "Required table names cannot be blank".to_string(),
            ));
        }

        Ok(Self(tables))
    }

    pub fn tables(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// State of one `prepare` pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitializationState {
    Unknown,
    /// All required tables exist, nothing was done
    SchemaPresent,
    SchemaMissing,
    SchemaCreated,
    /// Schema created and every custom command applied
    CustomCommandsApplied,
    Failed,
}

impl InitializationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InitializationState::SchemaPresent
                | InitializationState::CustomCommandsApplied
                | InitializationState::Failed
        )
    }
}

impl fmt::Display for InitializationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitializationState::Unknown => "unknown",
            InitializationState::SchemaPresent => "schema present",
            InitializationState::SchemaMissing => "schema missing",
            InitializationState::SchemaCreated => "schema created",
            InitializationState::CustomCommandsApplied => "custom commands applied",
            InitializationState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a successful `prepare` pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrepareReport {
    /// Terminal state reached
    pub state: InitializationState,
    /// Every state visited, in order
    pub history: Vec<InitializationState>,
    /// First required table found missing, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_table: Option<String>,
    pub statements_applied: usize,
}

impl PrepareReport {
    /// True when the database was already initialized
    pub fn was_noop(&self) -> bool {
        self.state == InitializationState::SchemaPresent
    }
}

/// Forward-only state tracker for one pass
struct Progress {
    history: Vec<InitializationState>,
}

impl Progress {
    fn new() -> Self {
        Self {
            history: vec![InitializationState::Unknown],
        }
    }

    fn current(&self) -> InitializationState {
        // history always holds the initial state
        self.history
            .last()
            .copied()
            .unwrap_or(InitializationState::Unknown)
    }

    fn advance(&mut self, next: InitializationState) {
        debug_assert!(next > self.current(), "state must move forward");
        debug!("Initialization state: {} -> {}", self.current(), next);
        self.history.push(next);
    }

    /// End the pass in `Failed`, attaching the visited states to `err`
    fn fail(mut self, err: BootError) -> BootError {
        error!("Database initialization failed in state '{}': {}", self.current(), err);
        self.advance(InitializationState::Failed);
        BootError::Initialization {
            history: self.history,
            source: Box::new(err),
        }
    }
}

/// Check-then-create schema initializer
pub struct SchemaInitializer {
    required_tables: RequiredTableSet,
    scripts: Vec<ScriptFile>,
}

impl SchemaInitializer {
    /// Scripts are applied in the given order
    pub fn new(required_tables: RequiredTableSet, scripts: Vec<ScriptFile>) -> Self {
        Self {
            required_tables,
            scripts,
        }
    }

    pub fn required_tables(&self) -> &RequiredTableSet {
        &self.required_tables
    }

    pub fn scripts(&self) -> &[ScriptFile] {
        &self.scripts
    }

    /// First required table that does not exist
    pub fn find_missing_table(&self, target: &dyn SchemaTarget) -> BootResult<Option<String>> {
        for table in self.required_tables.tables() {
            if !target.table_exists(table)? {
                return Ok(Some(table.clone()));
            }
        }
        Ok(None)
    }

    /// Bring the target to an initialized state
    ///
    /// Stops at the first failing step with [`BootError::Initialization`],
    /// whose history ends in [`InitializationState::Failed`]. Statements
    /// applied before a failure stay applied.
    pub fn prepare(&self, target: &dyn SchemaTarget) -> BootResult<PrepareReport> {
        let mut progress = Progress::new();

        let missing_table = match self.find_missing_table(target) {
            Ok(missing) => missing,
            Err(e) => return Err(progress.fail(e)),
        };

        let Some(missing_table) = missing_table else {
            progress.advance(InitializationState::SchemaPresent);
            info!("Database schema is present, nothing to do");
            return Ok(PrepareReport {
                state: progress.current(),
                history: progress.history,
                missing_table: None,
                statements_applied: 0,
            });
        };

        progress.advance(InitializationState::SchemaMissing);
        info!(
            "Required table '{}' is missing, creating database schema",
            missing_table
        );

        if let Err(e) = target.create_schema() {
            return Err(progress.fail(BootError::SchemaCreation(Box::new(e))));
        }
        progress.advance(InitializationState::SchemaCreated);

        let commands = match load_batches(&self.scripts) {
            Ok(commands) => commands,
            Err(e) => return Err(progress.fail(e)),
        };

        let statements_applied = match apply_commands(target, &commands) {
            Ok(count) => count,
            Err(e) => return Err(progress.fail(e)),
        };
        progress.advance(InitializationState::CustomCommandsApplied);
        info!(
            "Database schema created, {} custom command(s) applied",
            statements_applied
        );

        Ok(PrepareReport {
            state: progress.current(),
            history: progress.history,
            missing_table: Some(missing_table),
            statements_applied,
        })
    }
}

/// Execute statements in order, halting at the first failure
///
/// Whitespace-only statements are skipped. Returns the number executed.
pub fn apply_commands(target: &dyn SchemaTarget, commands: &[String]) -> BootResult<usize> {
    let mut applied = 0;

    for (index, statement) in commands.iter().enumerate() {
        if statement.trim().is_empty() {
            debug!("Skipping blank statement #{}", index);
            continue;
        }

        target
            .execute(statement)
            .map_err(|e| BootError::Execution {
                index,
                statement: statement_preview(statement),
                source: Box::new(e),
            })?;
        applied += 1;
    }

    Ok(applied)
}

/// Single-line excerpt of a statement for error messages
fn statement_preview(statement: &str) -> String {
    let flat = statement.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= STATEMENT_PREVIEW_LEN {
        return flat;
    }
    let cut: String = flat.chars().take(STATEMENT_PREVIEW_LEN).collect();
    format!("{}...", cut)
}
