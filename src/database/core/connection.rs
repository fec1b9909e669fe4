//! Database connection management
//!
//! This module provides the SQLite connection wrapper used by the bootstrap
//! engine as its reference database collaborator.

use std::path::Path;
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::Connection;
use tracing::info;

use crate::capability::{Backend, CapabilityDescriptor, DbParameter};
use crate::error::{BootError, BootResult};

/// Pages copied per online backup step
const BACKUP_PAGES_PER_STEP: i32 = 256;

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around SQLite connections,
/// handling both file-based and in-memory databases with consistent
/// configuration and error handling.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&str>) -> BootResult<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)?,
            None => Connection::open_in_memory()?,
        };

        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Open a database at the specified path (convenience method)
    pub fn open_path(path: &str) -> BootResult<Self> {
        Self::open(Some(path))
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> BootResult<Self> {
        Self::open(None)
    }

    fn configure(&self) -> BootResult<()> {
        // WAL is silently refused for in-memory databases
        let _: String = self
            .conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        self.conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA temp_store=MEMORY;
             PRAGMA foreign_keys=ON;",
        )?;
        Ok(())
    }

    pub fn capabilities(&self) -> CapabilityDescriptor {
        Backend::Sqlite.capabilities()
    }

    /// Execute a statement batch
    ///
    /// The batch may hold several `;`-separated statements.
    pub fn execute(&self, sql: &str) -> BootResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Execute a single statement with bound parameters
    ///
    /// Parameters bind either all by name or all by position; a list mixing
    /// named and unnamed parameters is rejected.
    pub fn execute_with_params(&self, sql: &str, params: &[DbParameter]) -> BootResult<usize> {
        let named: Vec<(String, &DbParameter)> = params
            .iter()
            .filter(|p| p.name().is_some_and(|n| !n.is_empty()))
            .map(|p| (p.placeholder(), p))
            .collect();

        if !named.is_empty() && named.len() != params.len() {
            return Err(BootError::InvalidConfig(format!(
                "Cannot mix named and positional parameters ({} of {} named)",
                named.len(),
                params.len()
            )));
        }

        let changed = if named.is_empty() {
            self.conn
                .execute(sql, rusqlite::params_from_iter(params.iter()))?
        } else {
            let bound: Vec<(&str, &dyn rusqlite::ToSql)> = named
                .iter()
                .map(|(name, p)| (name.as_str(), *p as &dyn rusqlite::ToSql))
                .collect();
            self.conn.execute(sql, bound.as_slice())?
        };
        Ok(changed)
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> BootResult<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Whether a named index exists
    pub fn index_exists(&self, index_name: &str) -> BootResult<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name=?1",
            [index_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Copy the database to `dest` with SQLite's online backup
    pub fn backup_to(&self, dest: &Path) -> BootResult<()> {
        let caps = self.capabilities();
        if !caps.supports_backup() {
            return Err(BootError::Unsupported {
                backend: caps.backend(),
                feature: "backup",
            });
        }

        let mut dest_conn = Connection::open(dest)?;
        let backup = Backup::new(&self.conn, &mut dest_conn)?;
        backup.run_to_completion(BACKUP_PAGES_PER_STEP, Duration::ZERO, None)?;

        info!("Database backed up to {}", dest.display());
        Ok(())
    }
}
