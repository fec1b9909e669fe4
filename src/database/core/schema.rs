//! Data model schema for the SQLite collaborator
//!
//! The initializer only triggers schema creation; the DDL lives here. A
//! deployment either uses the built-in store model or supplies its own
//! model script, which is mandatory once configured.

use std::path::Path;

use tracing::{debug, info};

use crate::database::initializer::SchemaTarget;
use crate::error::BootResult;
use crate::script::load_commands;

use super::connection::DatabaseConn;

/// Built-in store data model
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// Tables whose presence marks an installed store database
    pub const REQUIRED_TABLES: &'static [&'static str] = &[
        "Customer",
        "Discount",
        "Order",
        "Product",
        "ShoppingCartItem",
    ];

    pub const CUSTOMER_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS "Customer" (
            Id INTEGER PRIMARY KEY AUTOINCREMENT,
            CustomerGuid TEXT NOT NULL,
            Username TEXT,
            Email TEXT,
            Active INTEGER NOT NULL DEFAULT 1,
            Deleted INTEGER NOT NULL DEFAULT 0,
            CreatedOnUtc TEXT NOT NULL,
            LastActivityDateUtc TEXT NOT NULL
        );
    "#;

    pub const DISCOUNT_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS "Discount" (
            Id INTEGER PRIMARY KEY AUTOINCREMENT,
            Name TEXT NOT NULL,
            DiscountTypeId INTEGER NOT NULL,
            UsePercentage INTEGER NOT NULL DEFAULT 0,
            DiscountPercentage REAL NOT NULL DEFAULT 0,
            DiscountAmount REAL NOT NULL DEFAULT 0,
            StartDateUtc TEXT,
            EndDateUtc TEXT
        );
    "#;

    pub const PRODUCT_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS "Product" (
            Id INTEGER PRIMARY KEY AUTOINCREMENT,
            Name TEXT NOT NULL,
            Sku TEXT,
            Price REAL NOT NULL DEFAULT 0,
            StockQuantity INTEGER NOT NULL DEFAULT 0,
            Published INTEGER NOT NULL DEFAULT 1,
            Deleted INTEGER NOT NULL DEFAULT 0,
            CreatedOnUtc TEXT NOT NULL,
            UpdatedOnUtc TEXT NOT NULL
        );
    "#;

    pub const ORDER_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS "Order" (
            Id INTEGER PRIMARY KEY AUTOINCREMENT,
            OrderGuid TEXT NOT NULL,
            CustomerId INTEGER NOT NULL REFERENCES "Customer"(Id),
            OrderStatusId INTEGER NOT NULL,
            OrderTotal REAL NOT NULL DEFAULT 0,
            Deleted INTEGER NOT NULL DEFAULT 0,
            CreatedOnUtc TEXT NOT NULL
        );
    "#;

    pub const SHOPPING_CART_ITEM_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS "ShoppingCartItem" (
            Id INTEGER PRIMARY KEY AUTOINCREMENT,
            CustomerId INTEGER NOT NULL REFERENCES "Customer"(Id),
            ProductId INTEGER NOT NULL REFERENCES "Product"(Id),
            ShoppingCartTypeId INTEGER NOT NULL,
            Quantity INTEGER NOT NULL DEFAULT 1,
            CreatedOnUtc TEXT NOT NULL,
            UpdatedOnUtc TEXT NOT NULL
        );
    "#;

    /// Table DDL in dependency order
    pub const TABLES: &'static [&'static str] = &[
        Self::CUSTOMER_TABLE,
        Self::DISCOUNT_TABLE,
        Self::PRODUCT_TABLE,
        Self::ORDER_TABLE,
        Self::SHOPPING_CART_ITEM_TABLE,
    ];
}

/// DDL statements creating a data model, in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaModel {
    statements: Vec<String>,
}

impl SchemaModel {
    /// The built-in store model
    pub fn store() -> Self {
        Self::from_statements(SchemaDefinitions::TABLES.iter().copied())
    }

    pub fn from_statements<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            statements: statements.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a model script; the file must exist
    pub fn from_script(path: &Path) -> BootResult<Self> {
        let statements = load_commands(path, true)?;
        debug!(
            "Loaded schema model with {} statement(s) from {}",
            statements.len(),
            path.display()
        );
        Ok(Self { statements })
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }
}

/// SQLite database paired with the model to create on it
pub struct SqliteSchemaTarget<'a> {
    db: &'a DatabaseConn,
    model: &'a SchemaModel,
}

impl<'a> SqliteSchemaTarget<'a> {
    pub fn new(db: &'a DatabaseConn, model: &'a SchemaModel) -> Self {
        Self { db, model }
    }
}

impl SchemaTarget for SqliteSchemaTarget<'_> {
    fn table_exists(&self, table_name: &str) -> BootResult<bool> {
        self.db.table_exists(table_name)
    }

    /// Runs the whole model in one transaction
    fn create_schema(&self) -> BootResult<()> {
        let tx = self.db.conn.unchecked_transaction()?;
        for statement in self.model.statements() {
            tx.execute_batch(statement)?;
        }
        tx.commit()?;

        info!(
            "Created database schema ({} statement(s))",
            self.model.statements().len()
        );
        Ok(())
    }

    fn execute(&self, statement: &str) -> BootResult<()> {
        self.db.execute(statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initializer::{InitializationState, RequiredTableSet, SchemaInitializer};
    use crate::error::BootError;
    use crate::script::{ScriptFile, ScriptRole};
    use std::fs;

    fn store_initializer(scripts: Vec<ScriptFile>) -> SchemaInitializer {
        let required =
            RequiredTableSet::new(SchemaDefinitions::REQUIRED_TABLES.iter().copied()).unwrap();
        SchemaInitializer::new(required, scripts)
    }

    #[test]
    fn test_store_model_creates_required_tables() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let model = SchemaModel::store();
        let target = SqliteSchemaTarget::new(&db, &model);

        target.create_schema().unwrap();

        for table in SchemaDefinitions::REQUIRED_TABLES {
            assert!(db.table_exists(table).unwrap(), "missing {}", table);
        }
    }

    #[test]
    fn test_prepare_fresh_then_noop() {
        let dir = tempfile::tempdir().unwrap();
        let indexes = dir.path().join("Sqlite.Indexes.sql");
        fs::write(
            &indexes,
            "CREATE INDEX IX_Order_CustomerId ON \"Order\"(CustomerId);\nGO\n\
             CREATE INDEX IX_Product_Sku ON \"Product\"(Sku);\nGO\n",
        )
        .unwrap();

        let db = DatabaseConn::open_in_memory().unwrap();
        let model = SchemaModel::store();
        let target = SqliteSchemaTarget::new(&db, &model);
        let initializer = store_initializer(vec![ScriptFile::new(ScriptRole::Indexes, indexes)]);

        let first = initializer.prepare(&target).unwrap();
        assert_eq!(first.state, InitializationState::CustomCommandsApplied);
        assert_eq!(first.statements_applied, 2);
        assert!(db.index_exists("IX_Order_CustomerId").unwrap());
        assert!(db.index_exists("IX_Product_Sku").unwrap());

        let second = initializer.prepare(&target).unwrap();
        assert!(second.was_noop());
    }

    #[test]
    fn test_prepare_failure_keeps_applied_statements() {
        let dir = tempfile::tempdir().unwrap();
        let indexes = dir.path().join("Sqlite.Indexes.sql");
        fs::write(
            &indexes,
            "CREATE INDEX IX_Product_Name ON \"Product\"(Name)\nGO\n\
             CREATE INDEX IX_Broken ON \"Missing\"(Nope)\nGO\n\
             CREATE INDEX IX_Never ON \"Product\"(Price)\nGO\n",
        )
        .unwrap();

        let db = DatabaseConn::open_in_memory().unwrap();
        let model = SchemaModel::store();
        let target = SqliteSchemaTarget::new(&db, &model);
        let initializer = store_initializer(vec![ScriptFile::new(ScriptRole::Indexes, indexes)]);

        let err = initializer.prepare(&target).unwrap_err();

        assert!(matches!(err.cause(), BootError::Execution { index: 1, .. }));
        assert_eq!(
            err.history().and_then(|h| h.last()),
            Some(&InitializationState::Failed)
        );
        assert!(db.index_exists("IX_Product_Name").unwrap());
        assert!(!db.index_exists("IX_Never").unwrap());
    }

    #[test]
    fn test_shipped_sqlite_indexes_apply() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let model = SchemaModel::store();
        let target = SqliteSchemaTarget::new(&db, &model);
        target.create_schema().unwrap();

        let commands =
            crate::splitter::split_statements(include_str!("../../../install/Sqlite.Indexes.sql"));
        assert_eq!(commands.len(), 6);

        let applied = crate::database::apply_commands(&target, &commands).unwrap();
        assert_eq!(applied, 6);
        assert!(db.index_exists("IX_ShoppingCartItem_CustomerId").unwrap());
    }

    #[test]
    fn test_model_from_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.sql");
        fs::write(&path, "CREATE TABLE a (id INTEGER)\nGO\nCREATE TABLE b (id INTEGER)\n")
            .unwrap();

        let model = SchemaModel::from_script(&path).unwrap();
        assert_eq!(model.statements().len(), 2);

        let err = SchemaModel::from_script(&dir.path().join("absent.sql")).unwrap_err();
        assert!(err.is_file_not_found());
    }

    #[test]
    fn test_create_schema_rolls_back_on_error() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let model = SchemaModel::from_statements(["CREATE TABLE ok (id INTEGER)", "CREATE BROKEN"]);
        let target = SqliteSchemaTarget::new(&db, &model);

        assert!(target.create_schema().is_err());
        assert!(!db.table_exists("ok").unwrap());
    }
}
