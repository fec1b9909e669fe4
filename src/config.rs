use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::capability::{Backend, CapabilityDescriptor};
use crate::database::{RequiredTableSet, SchemaDefinitions, SchemaModel};
use crate::error::{BootError, BootResult};
use crate::script::{ScriptFile, ScriptSet};

#[derive(Debug, Clone, Serialize)]
pub struct BootConfig {
    /// Path to the directory holding the database and install scripts
    pub data_dir: String,

    /// SQLite database file, defaults to `{data_dir}/sqlboot.sqlite3`
    pub database_path: Option<String>,

    /// Backend whose capabilities and script names are used
    pub backend: Backend,

    /// Tables that must exist for the schema to count as installed
    pub required_tables: Vec<String>,

    /// Directory of custom command scripts, defaults to `{data_dir}/install`
    pub install_dir: Option<String>,

    /// Data model DDL script; when set it must exist
    pub schema_script: Option<String>,
}

const EMPTY_CONFIG: &str = r#"### sqlboot configuration file

### directory holding the database and install scripts
# data_dir = "~/.sqlboot"

### database backend: sqlite or sqlserver
# backend = "sqlite"

### SQLite database file
# database_path = "~/.sqlboot/sqlboot.sqlite3"

### comma-separated tables that must exist for the schema to be considered installed
# required_tables = "Customer,Discount,Order,Product,ShoppingCartItem"

### directory with {Backend}.Indexes.sql and {Backend}.StoredProcedures.sql
# install_dir = "~/.sqlboot/install"

### DDL script for the data model (built-in store model when unset)
# schema_script = "~/.sqlboot/install/schema.sql"
"#;

fn default_required_tables() -> Vec<String> {
    SchemaDefinitions::REQUIRED_TABLES
        .iter()
        .map(|t| t.to_string())
        .collect()
}

impl Default for BootConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.sqlboot", home_dir),
            database_path: None,
            backend: Backend::Sqlite,
            required_tables: default_required_tables(),
            install_dir: None,
            schema_script: None,
        }
    }
}

impl BootConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<BootConfig> {
        let mut builder = Config::builder();

        // By default use $HOME/.sqlboot/sqlboot.toml as the configuration file path
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let sqlboot_dir = format!("{}/.sqlboot", home_dir.as_str());

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(sqlboot_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create sqlboot directory: {}", e))?;
                let p = format!("{}/sqlboot.toml", sqlboot_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of SQLBOOT)
        // E.g., `SQLBOOT_BACKEND=sqlserver ./sqlboot capabilities`
        builder = builder.add_source(config::Environment::with_prefix("SQLBOOT"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let values = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let config = Self::from_map(&values, &sqlboot_dir)?;
        std::fs::create_dir_all(config.data_dir.as_str())
            .map_err(|e| anyhow!("Unable to create data directory: {}", e))?;
        Ok(config)
    }

    /// Build a configuration from flat key/value settings
    pub fn from_map(values: &HashMap<String, String>, default_data_dir: &str) -> Result<Self> {
        let non_empty = |key: &str| {
            values
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(expand_home)
        };

        let data_dir = non_empty("data_dir").unwrap_or_else(|| default_data_dir.to_string());

        let backend = match values.get("backend") {
            Some(b) => b.parse::<Backend>()?,
            None => Backend::Sqlite,
        };

        let required_tables = match values.get("required_tables") {
            Some(list) => list
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            None => default_required_tables(),
        };
        // validated here so a bad list fails at startup
        RequiredTableSet::new(required_tables.clone())?;

        Ok(BootConfig {
            data_dir,
            database_path: non_empty("database_path"),
            backend,
            required_tables,
            install_dir: non_empty("install_dir"),
            schema_script: non_empty("schema_script"),
        })
    }

    /// Get the path to the SQLite database file
    pub fn sqlite_path(&self) -> String {
        match &self.database_path {
            Some(p) => p.clone(),
            None => format!("{}/sqlboot.sqlite3", self.data_dir.trim_end_matches('/')),
        }
    }

    /// Directory holding the custom command scripts
    pub fn install_dir(&self) -> PathBuf {
        match &self.install_dir {
            Some(dir) => PathBuf::from(dir),
            None => Path::new(self.data_dir.trim_end_matches('/')).join("install"),
        }
    }

    pub fn required_table_set(&self) -> Result<RequiredTableSet> {
        Ok(RequiredTableSet::new(self.required_tables.clone())?)
    }

    /// Custom command scripts in application order
    pub fn scripts(&self) -> Vec<ScriptFile> {
        ScriptSet::for_backend(&self.install_dir(), self.backend)
    }

    /// Custom command scripts for a connection with capabilities `caps`
    ///
    /// Fails with [`BootError::Unsupported`] when the configured backend is
    /// not the connection's backend.
    pub fn scripts_for(&self, caps: CapabilityDescriptor) -> BootResult<Vec<ScriptFile>> {
        if caps.backend() != self.backend {
            return Err(BootError::Unsupported {
                backend: self.backend,
                feature: "prepare",
            });
        }
        Ok(self.scripts())
    }

    /// Data model to create on a fresh database
    pub fn schema_model(&self) -> Result<SchemaModel> {
        match &self.schema_script {
            Some(path) => Ok(SchemaModel::from_script(Path::new(path))?),
            None => Ok(SchemaModel::store()),
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Data Directory:     {}", self.data_dir),
            format!("Backend:            {}", self.backend),
            format!("SQLite Path:        {}", self.sqlite_path()),
            format!("Required Tables:    {}", self.required_tables.join(", ")),
            format!("Install Directory:  {}", self.install_dir().display()),
        ];

        for script in self.scripts() {
            let status = if script.path.is_file() {
                "found"
            } else {
                "absent, skipped"
            };
            lines.push(format!(
                "  {:<18}{} ({})",
                format!("{}:", script.role),
                script.path.display(),
                status
            ));
        }

        match &self.schema_script {
            Some(p) => lines.push(format!("Schema Script:      {}", p)),
            None => lines.push("Schema Script:      built-in store model".to_string()),
        }

        lines.join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.sqlboot/sqlboot.toml", home_dir)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().to_string(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptRole;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = BootConfig::default();
        assert!(config.data_dir.ends_with("/.sqlboot"));
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.required_tables.len(), 5);
    }

    #[test]
    fn test_from_empty_map() {
        let config = BootConfig::from_map(&HashMap::new(), "/srv/boot").unwrap();
        assert_eq!(config.data_dir, "/srv/boot");
        assert_eq!(config.sqlite_path(), "/srv/boot/sqlboot.sqlite3");
        assert_eq!(config.install_dir(), PathBuf::from("/srv/boot/install"));
        assert_eq!(config.required_tables, default_required_tables());
    }

    #[test]
    fn test_from_map_overrides() {
        let config = BootConfig::from_map(
            &values(&[
                ("data_dir", "/data/"),
                ("backend", "sqlserver"),
                ("required_tables", " Customer , Order ,"),
                ("install_dir", "/opt/install"),
                ("database_path", "/tmp/x.db"),
            ]),
            "/unused",
        )
        .unwrap();

        assert_eq!(config.backend, Backend::SqlServer);
        assert_eq!(config.required_tables, vec!["Customer", "Order"]);
        assert_eq!(config.sqlite_path(), "/tmp/x.db");

        let scripts = config.scripts();
        assert_eq!(scripts.len(), 2);
        assert_eq!(scripts[0].role, ScriptRole::Indexes);
        assert_eq!(
            scripts[1].path,
            PathBuf::from("/opt/install/SqlServer.StoredProcedures.sql")
        );
    }

    #[test]
    fn test_scripts_for_rejects_backend_mismatch() {
        let config = BootConfig::from_map(&values(&[("backend", "sqlserver")]), "/d").unwrap();
        let err = config
            .scripts_for(CapabilityDescriptor::SQLITE)
            .unwrap_err();
        assert!(matches!(
            err,
            BootError::Unsupported {
                backend: Backend::SqlServer,
                feature: "prepare"
            }
        ));
        assert_eq!(
            config.scripts_for(CapabilityDescriptor::SQL_SERVER).unwrap(),
            config.scripts()
        );

        let sqlite = BootConfig::from_map(&HashMap::new(), "/d").unwrap();
        let scripts = sqlite.scripts_for(CapabilityDescriptor::SQLITE).unwrap();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].path, PathBuf::from("/d/install/Sqlite.Indexes.sql"));
    }

    #[test]
    fn test_from_map_rejects_empty_tables() {
        assert!(BootConfig::from_map(&values(&[("required_tables", " , ")]), "/d").is_err());
    }

    #[test]
    fn test_from_map_rejects_unknown_backend() {
        assert!(BootConfig::from_map(&values(&[("backend", "oracle")]), "/d").is_err());
    }

    #[test]
    fn test_new_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let config_path = dir.path().join("sqlboot.toml");
        std::fs::write(
            &config_path,
            format!(
                "data_dir = \"{}\"\nrequired_tables = \"A,B\"\n",
                data_dir.display()
            ),
        )
        .unwrap();

        let config = BootConfig::new(&Some(config_path.to_string_lossy().to_string())).unwrap();
        assert_eq!(config.data_dir, data_dir.to_string_lossy());
        assert_eq!(config.required_tables, vec!["A", "B"]);
        assert!(data_dir.is_dir());
    }

    #[test]
    fn test_schema_model_requires_script() {
        let config = BootConfig::from_map(
            &values(&[("schema_script", "/definitely/not/here.sql")]),
            "/d",
        )
        .unwrap();
        assert!(config.schema_model().is_err());

        let builtin = BootConfig::from_map(&HashMap::new(), "/d").unwrap();
        assert_eq!(builtin.schema_model().unwrap(), SchemaModel::store());
    }

    #[test]
    fn test_summary_lists_scripts() {
        let config = BootConfig::from_map(&values(&[("backend", "sqlserver")]), "/d").unwrap();
        let summary = config.summary();
        assert!(summary.contains("Microsoft SQL Server"));
        assert!(summary.contains("SqlServer.Indexes.sql"));
        assert!(summary.contains("stored-procedures:"));
        assert!(summary.contains("built-in store model"));
    }
}
