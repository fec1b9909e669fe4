//! Backend capability descriptors
//!
//! Each supported backend has one immutable [`CapabilityDescriptor`] that
//! calling code consults to adapt parameter binding, hashing and
//! backup/stored-procedure usage. Descriptors are constants: no I/O and no
//! mutable state.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::BootError;

/// Supported database backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    SqlServer,
    Sqlite,
}

impl Backend {
    pub fn all() -> Vec<Backend> {
        vec![Backend::SqlServer, Backend::Sqlite]
    }

    /// Display name for output
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::SqlServer => "Microsoft SQL Server",
            Backend::Sqlite => "SQLite",
        }
    }

    /// Prefix of the backend's install script file names
    pub fn script_prefix(&self) -> &'static str {
        match self {
            Backend::SqlServer => "SqlServer",
            Backend::Sqlite => "Sqlite",
        }
    }

    pub fn capabilities(&self) -> CapabilityDescriptor {
        match self {
            Backend::SqlServer => CapabilityDescriptor::SQL_SERVER,
            Backend::Sqlite => CapabilityDescriptor::SQLITE,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Backend {
    type Err = BootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlserver" | "sql-server" | "mssql" => Ok(Backend::SqlServer),
            "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
            other => Err(BootError::InvalidConfig(format!(
                "Unknown backend '{}'. Available backends: sqlserver, sqlite",
                other
            ))),
        }
    }
}

/// Feature flags and limits of one backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityDescriptor {
    backend: Backend,
    supports_stored_procedures: bool,
    supports_backup: bool,
    max_hashed_binary_length: u32,
}

impl CapabilityDescriptor {
    /// SQL Server 2008 and above limit HASHBYTES input to 8000 bytes
    pub const SQL_SERVER: CapabilityDescriptor = CapabilityDescriptor {
        backend: Backend::SqlServer,
        supports_stored_procedures: true,
        supports_backup: true,
        max_hashed_binary_length: 8000,
    };

    pub const SQLITE: CapabilityDescriptor = CapabilityDescriptor {
        backend: Backend::Sqlite,
        supports_stored_procedures: false,
        supports_backup: true,
        max_hashed_binary_length: 0,
    };

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn supports_stored_procedures(&self) -> bool {
        self.supports_stored_procedures
    }

    pub fn supports_backup(&self) -> bool {
        self.supports_backup
    }

    /// Maximum input length for server-side binary hashing, 0 when unsupported
    pub fn max_hashed_binary_length(&self) -> u32 {
        self.max_hashed_binary_length
    }

    pub fn supports_hashing(&self) -> bool {
        self.max_hashed_binary_length > 0
    }

    /// New backend-native parameter for stored procedure calls
    ///
    /// The parameter starts unnamed, untyped and bound to NULL. Name and
    /// value are not validated.
    pub fn new_parameter(&self) -> DbParameter {
        DbParameter::new(self.backend)
    }
}

/// Direction of a stored procedure parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterDirection {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

/// Value bound to a parameter
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Binary(Vec<u8>),
}

/// Backend-native bound parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbParameter {
    backend: Backend,
    name: Option<String>,
    value: ParameterValue,
    direction: ParameterDirection,
}

impl DbParameter {
    fn new(backend: Backend) -> Self {
        Self {
            backend,
            name: None,
            value: ParameterValue::Null,
            direction: ParameterDirection::Input,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_value(mut self, value: ParameterValue) -> Self {
        self.value = value;
        self
    }

    pub fn with_direction(mut self, direction: ParameterDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    pub fn direction(&self) -> ParameterDirection {
        self.direction
    }

    /// Placeholder text for this parameter in a statement
    ///
    /// A leading sigil already present in the name is kept.
    pub fn placeholder(&self) -> String {
        let sigil = match self.backend {
            Backend::SqlServer => '@',
            Backend::Sqlite => ':',
        };

        match self.name.as_deref() {
            None | Some("") => "?".to_string(),
            Some(name) if name.starts_with(['@', ':', '$']) => name.to_string(),
            Some(name) => format!("{}{}", sigil, name),
        }
    }
}

impl ToSql for DbParameter {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match &self.value {
            ParameterValue::Null => ToSqlOutput::Owned(Value::Null),
            ParameterValue::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            ParameterValue::Int(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            ParameterValue::Float(f) => ToSqlOutput::Owned(Value::Real(*f)),
            ParameterValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            ParameterValue::Binary(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_slice())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_server_capabilities() {
        let caps = Backend::SqlServer.capabilities();
        assert!(caps.supports_stored_procedures());
        assert!(caps.supports_backup());
        assert_eq!(caps.max_hashed_binary_length(), 8000);
        assert!(caps.supports_hashing());
        assert_eq!(caps.backend(), Backend::SqlServer);
    }

    #[test]
    fn test_sqlite_capabilities() {
        let caps = Backend::Sqlite.capabilities();
        assert!(!caps.supports_stored_procedures());
        assert!(caps.supports_backup());
        assert_eq!(caps.max_hashed_binary_length(), 0);
        assert!(!caps.supports_hashing());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("sqlserver".parse::<Backend>().unwrap(), Backend::SqlServer);
        assert_eq!("MSSQL".parse::<Backend>().unwrap(), Backend::SqlServer);
        assert_eq!(" sqlite ".parse::<Backend>().unwrap(), Backend::Sqlite);
        assert!("oracle".parse::<Backend>().is_err());
    }

    #[test]
    fn test_new_parameter_defaults() {
        let param = Backend::SqlServer.capabilities().new_parameter();
        assert_eq!(param.backend(), Backend::SqlServer);
        assert_eq!(param.name(), None);
        assert_eq!(param.value(), &ParameterValue::Null);
        assert_eq!(param.direction(), ParameterDirection::Input);
        assert_eq!(param.placeholder(), "?");
    }

    #[test]
    fn test_parameter_placeholders() {
        let sql_server = Backend::SqlServer.capabilities().new_parameter();
        assert_eq!(sql_server.clone().with_name("PageSize").placeholder(), "@PageSize");
        assert_eq!(sql_server.with_name("@PageIndex").placeholder(), "@PageIndex");

        let sqlite = Backend::Sqlite.capabilities().new_parameter();
        assert_eq!(sqlite.with_name("page_size").placeholder(), ":page_size");
    }

    #[test]
    fn test_parameter_binds_in_sqlite() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let param = Backend::Sqlite
            .capabilities()
            .new_parameter()
            .with_name("n")
            .with_value(ParameterValue::Int(41))
            .with_direction(ParameterDirection::Input);

        let sql = format!("SELECT {} + 1", param.placeholder());
        let value: i64 = conn
            .query_row(&sql, &[(param.placeholder().as_str(), &param as &dyn ToSql)], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_capabilities_serialize() {
        let json = serde_json::to_value(Backend::SqlServer.capabilities()).unwrap();
        assert_eq!(json["backend"], "sqlserver");
        assert_eq!(json["max_hashed_binary_length"], 8000);
    }
}
