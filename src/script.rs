//! Script file loading
//!
//! Custom commands live in plain text install scripts, one file per role.
//! Whether a missing file is an error is decided by the caller through the
//! `require_exists` flag: optional scripts are skipped silently, mandatory
//! ones fail with [`BootError::FileNotFound`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::capability::Backend;
use crate::error::{BootError, BootResult};
use crate::splitter::split_statements;

/// UTF-8 byte order mark, stripped from script content
const BOM: char = '\u{feff}';

/// Logical role of an install script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptRole {
    Indexes,
    StoredProcedures,
}

impl ScriptRole {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptRole::Indexes => "indexes",
            ScriptRole::StoredProcedures => "stored-procedures",
        }
    }

    /// File name suffix used by the install scripts of this role
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ScriptRole::Indexes => "Indexes.sql",
            ScriptRole::StoredProcedures => "StoredProcedures.sql",
        }
    }
}

impl fmt::Display for ScriptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A script identified by role and path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptFile {
    pub role: ScriptRole,
    pub path: PathBuf,
}

impl ScriptFile {
    pub fn new(role: ScriptRole, path: impl Into<PathBuf>) -> Self {
        Self {
            role,
            path: path.into(),
        }
    }

    /// Load this script's command batch
    pub fn load(&self, require_exists: bool) -> BootResult<Vec<String>> {
        let commands = load_commands(&self.path, require_exists)?;
        debug!(
            "Loaded {} statement(s) from {} script {}",
            commands.len(),
            self.role,
            self.path.display()
        );
        Ok(commands)
    }
}

/// Read a script and split it into statements
///
/// A missing file yields an empty batch unless `require_exists` is set, in
/// which case [`BootError::FileNotFound`] carries the path.
pub fn load_commands(path: &Path, require_exists: bool) -> BootResult<Vec<String>> {
    Ok(read_script(path, require_exists)?
        .map(|text| split_statements(&text))
        .unwrap_or_default())
}

/// Read a script's text without a leading byte order mark
///
/// Returns `None` for a missing optional script.
pub fn read_script(path: &Path, require_exists: bool) -> BootResult<Option<String>> {
    if !path.is_file() {
        if require_exists {
            return Err(BootError::FileNotFound(path.to_path_buf()));
        }
        debug!("Optional script {} not found, skipping", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| BootError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if content.starts_with(BOM) {
        return Ok(Some(content[BOM.len_utf8()..].to_string()));
    }
    Ok(Some(content))
}

/// Load optional scripts in order and concatenate their batches
pub fn load_batches(scripts: &[ScriptFile]) -> BootResult<Vec<String>> {
    let mut commands = Vec::new();
    for script in scripts {
        commands.extend(script.load(false)?);
    }
    Ok(commands)
}

/// Default custom-command scripts for a backend
pub struct ScriptSet;

impl ScriptSet {
    /// Install scripts under `install_dir`, indexes first
    ///
    /// Files follow the `{Backend}.{Role}.sql` naming, e.g.
    /// `SqlServer.Indexes.sql`. The stored procedure script is only listed
    /// for backends that support stored procedures.
    pub fn for_backend(install_dir: &Path, backend: Backend) -> Vec<ScriptFile> {
        let mut roles = vec![ScriptRole::Indexes];
        if backend.capabilities().supports_stored_procedures() {
            roles.push(ScriptRole::StoredProcedures);
        }

        roles
            .into_iter()
            .map(|role| {
                let file_name = format!("{}.{}", backend.script_prefix(), role.file_suffix());
                ScriptFile::new(role, install_dir.join(file_name))
            })
            .collect()
    }
}
