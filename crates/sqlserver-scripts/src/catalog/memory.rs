//! In-memory catalog.
//!
//! Holds table fixtures and serves them through [`CatalogReader`]. Indexes
//! and foreign keys are stored as per-column rows and grouped on fetch, the
//! same path the SQL Server reader takes. Any operation can be made to fail.

use std::collections::{BTreeMap, HashSet};
use std::io;

use async_trait::async_trait;

use super::operation;
use super::rows::{
    foreign_key_rows, group_foreign_key_rows, group_index_rows, index_rows, ForeignKeyColumnRow,
    IndexColumnRow,
};
use super::CatalogReader;
use crate::error::{Result, ScriptError};
use crate::schema::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, PrimaryKeyDescriptor, TableIdentity,
};

/// Catalog state for one table.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub columns: Vec<ColumnDescriptor>,
    pub primary_key: PrimaryKeyDescriptor,
    pub index_rows: Vec<IndexColumnRow>,
    pub foreign_key_rows: Vec<ForeignKeyColumnRow>,
}

impl MemoryTable {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    pub fn with_primary_key(mut self, name: &str, columns: &[&str]) -> Self {
        self.primary_key = PrimaryKeyDescriptor {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        };
        self
    }

    pub fn with_index(mut self, index: IndexDescriptor) -> Self {
        self.index_rows.extend(index_rows(&index));
        self
    }

    pub fn with_foreign_key(mut self, fk: ForeignKeyDescriptor) -> Self {
        self.foreign_key_rows.extend(foreign_key_rows(&fk));
        self
    }

    /// Append raw foreign key rows, in whatever order the caller chooses.
    pub fn with_foreign_key_rows(mut self, rows: Vec<ForeignKeyColumnRow>) -> Self {
        self.foreign_key_rows.extend(rows);
        self
    }

    /// Append raw index rows, in whatever order the caller chooses.
    pub fn with_index_rows(mut self, rows: Vec<IndexColumnRow>) -> Self {
        self.index_rows.extend(rows);
        self
    }
}

/// [`CatalogReader`] backed by in-memory fixtures.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: BTreeMap<TableIdentity, MemoryTable>,
    failing: HashSet<&'static str>,
    calls: Vec<&'static str>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table.
    pub fn with_table(mut self, table: TableIdentity, fixture: MemoryTable) -> Self {
        self.tables.insert(table, fixture);
        self
    }

    /// Make an operation (see [`operation`]) fail with a metadata error.
    pub fn fail_on(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Operations invoked so far, in call order.
    pub fn calls(&self) -> &[&'static str] {
        &self.calls
    }

    fn begin(&mut self, op: &'static str) -> Result<()> {
        self.calls.push(op);
        if self.failing.contains(op) {
            return Err(ScriptError::metadata(
                op,
                io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"),
            ));
        }
        Ok(())
    }

    fn fixture(&self, table: &TableIdentity) -> Option<&MemoryTable> {
        self.tables.get(table)
    }
}

#[async_trait]
impl CatalogReader for MemoryCatalog {
    async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        self.begin(operation::LIST_TABLES)?;
        Ok(self
            .tables
            .keys()
            .filter(|t| t.schema == schema)
            .map(|t| t.name.clone())
            .collect())
    }

    async fn table_exists(&mut self, table: &TableIdentity) -> Result<bool> {
        self.begin(operation::TABLE_EXISTS)?;
        Ok(self.tables.contains_key(table))
    }

    async fn fetch_columns(&mut self, table: &TableIdentity) -> Result<Vec<ColumnDescriptor>> {
        self.begin(operation::FETCH_COLUMNS)?;
        let mut columns = self
            .fixture(table)
            .map(|t| t.columns.clone())
            .unwrap_or_default();
        columns.sort_by_key(|c| c.ordinal_pos);
        Ok(columns)
    }

    async fn fetch_primary_key(&mut self, table: &TableIdentity) -> Result<PrimaryKeyDescriptor> {
        self.begin(operation::FETCH_PRIMARY_KEY)?;
        Ok(self
            .fixture(table)
            .map(|t| t.primary_key.clone())
            .unwrap_or_default())
    }

    async fn fetch_indexes(&mut self, table: &TableIdentity) -> Result<Vec<IndexDescriptor>> {
        self.begin(operation::FETCH_INDEXES)?;
        let mut rows = self
            .fixture(table)
            .map(|t| t.index_rows.clone())
            .unwrap_or_default();
        rows.sort_by(|a, b| a.index_name.cmp(&b.index_name));
        Ok(group_index_rows(rows))
    }

    async fn fetch_foreign_keys(
        &mut self,
        table: &TableIdentity,
    ) -> Result<Vec<ForeignKeyDescriptor>> {
        self.begin(operation::FETCH_FOREIGN_KEYS)?;
        let mut rows = self
            .fixture(table)
            .map(|t| t.foreign_key_rows.clone())
            .unwrap_or_default();
        rows.sort_by(|a, b| a.constraint_name.cmp(&b.constraint_name));
        Ok(group_foreign_key_rows(rows))
    }

    fn dialect(&self) -> &str {
        "memory"
    }
}
