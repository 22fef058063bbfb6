//! Catalog metadata readers.
//!
//! The [`CatalogReader`] trait is the seam between DDL generation and the
//! database. Implementations:
//!
//! - [`MssqlCatalog`]: SQL Server over a single Tiberius connection
//! - [`MemoryCatalog`]: in-memory fixtures for tests and offline use
//!
//! Every method takes `&mut self`: a reader wraps one connection and runs
//! one query at a time.

mod memory;
mod mssql;
mod rows;

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, PrimaryKeyDescriptor, TableIdentity,
};

pub use memory::{MemoryCatalog, MemoryTable};
pub use mssql::MssqlCatalog;
pub use rows::{
    foreign_key_rows, group_foreign_key_rows, group_index_rows, index_rows, ForeignKeyColumnRow,
    IndexColumnRow,
};

/// Operation names reported in [`crate::ScriptError::MetadataQuery`].
pub mod operation {
    pub const LIST_TABLES: &str = "list_tables";
    pub const TABLE_EXISTS: &str = "table_exists";
    pub const FETCH_COLUMNS: &str = "fetch_columns";
    pub const FETCH_PRIMARY_KEY: &str = "fetch_primary_key";
    pub const FETCH_INDEXES: &str = "fetch_indexes";
    pub const FETCH_FOREIGN_KEYS: &str = "fetch_foreign_keys";
}

/// Read table metadata from a database catalog.
///
/// Each fetch is all-or-nothing: on failure it returns
/// [`crate::ScriptError::MetadataQuery`] and no partial descriptors. Readers
/// never retry.
#[async_trait]
pub trait CatalogReader: Send {
    /// List base tables in a schema, ordered by name.
    async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>>;

    /// Check whether a base table exists.
    async fn table_exists(&mut self, table: &TableIdentity) -> Result<bool>;

    /// Fetch columns in ascending ordinal position.
    async fn fetch_columns(&mut self, table: &TableIdentity) -> Result<Vec<ColumnDescriptor>>;

    /// Fetch the primary key. No key yields an empty column list.
    async fn fetch_primary_key(&mut self, table: &TableIdentity) -> Result<PrimaryKeyDescriptor>;

    /// Fetch non-primary-key indexes, ordered by index name.
    async fn fetch_indexes(&mut self, table: &TableIdentity) -> Result<Vec<IndexDescriptor>>;

    /// Fetch foreign keys declared on the table, ordered by constraint name.
    async fn fetch_foreign_keys(
        &mut self,
        table: &TableIdentity,
    ) -> Result<Vec<ForeignKeyDescriptor>>;

    /// Catalog dialect identifier (e.g., "mssql", "memory").
    fn dialect(&self) -> &str;
}
