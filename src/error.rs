//! Error types for the bootstrap engine
//!
//! Library code returns [`BootError`]; the binary wraps it in `anyhow`.

use std::path::PathBuf;

use crate::capability::Backend;
use crate::database::InitializationState;

/// Result alias used throughout the library
pub type BootResult<T> = Result<T, BootError>;

/// Bootstrap error
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    /// A script that must exist was not found
    #[error("Specified file doesn't exist - {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read script '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Failure reported by the underlying database connection
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema creation failed: {0}")]
    SchemaCreation(#[source] Box<BootError>),

    /// A custom command was rejected by the backend
    #[error("Statement #{index} failed ({statement}): {source}")]
    Execution {
        index: usize,
        statement: String,
        #[source]
        source: Box<BootError>,
    },

    /// A `prepare` pass ended in the failed state
    #[error("Database initialization failed: {source}")]
    Initialization {
        /// Every state visited, ending with `Failed`
        history: Vec<InitializationState>,
        #[source]
        source: Box<BootError>,
    },

    #[error("{feature} is not supported by {}", backend.display_name())]
    Unsupported {
        backend: Backend,
        feature: &'static str,
    },
}

impl BootError {
    /// Path referenced by file-level errors
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            BootError::FileNotFound(path) | BootError::Io { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn is_file_not_found(&self) -> bool {
        matches!(self, BootError::FileNotFound(_))
    }

    /// States visited by a failed initialization pass
    pub fn history(&self) -> Option<&[InitializationState]> {
        match self {
            BootError::Initialization { history, .. } => Some(history.as_slice()),
            _ => None,
        }
    }

    /// The error that stopped an initialization pass, or `self`
    pub fn cause(&self) -> &BootError {
        match self {
            BootError::Initialization { source, .. } => source.as_ref(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_message() {
        let err = BootError::FileNotFound(PathBuf::from("/tmp/missing.sql"));
        assert_eq!(
            err.to_string(),
            "Specified file doesn't exist - /tmp/missing.sql"
        );
        assert!(err.is_file_not_found());
        assert_eq!(err.path(), Some(std::path::Path::new("/tmp/missing.sql")));
    }

    #[test]
    fn test_execution_message() {
        let err = BootError::Execution {
            index: 3,
            statement: "CREATE INDEX ix".to_string(),
            source: Box::new(BootError::InvalidConfig("boom".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "Statement #3 failed (CREATE INDEX ix): Configuration error: boom"
        );
        assert!(err.path().is_none());
    }

    #[test]
    fn test_initialization_error_exposes_history() {
        let err = BootError::Initialization {
            history: vec![InitializationState::Unknown, InitializationState::Failed],
            source: Box::new(BootError::InvalidConfig("boom".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "Database initialization failed: Configuration error: boom"
        );
        assert_eq!(err.history().and_then(|h| h.last()), Some(&InitializationState::Failed));
        assert!(matches!(err.cause(), BootError::InvalidConfig(_)));

        let plain = BootError::InvalidConfig("x".to_string());
        assert!(plain.history().is_none());
        assert!(matches!(plain.cause(), BootError::InvalidConfig(_)));
    }

    #[test]
    fn test_unsupported_message() {
        let err = BootError::Unsupported {
            backend: Backend::Sqlite,
            feature: "stored procedures",
        };
        assert_eq!(err.to_string(), "stored procedures is not supported by SQLite");
    }
}
