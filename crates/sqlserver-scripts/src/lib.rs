//! # sqlserver-scripts
//!
//! Generate T-SQL DDL scripts for existing SQL Server tables.
//!
//! The library reads table metadata from the system catalog and produces a
//! self-contained script per table:
//!
//! - **CREATE TABLE** with column types, identity, nullability and defaults
//! - **Primary key** as an inline clustered constraint
//! - **Indexes** (non-primary-key) as CREATE INDEX statements
//! - **Foreign keys** as ALTER TABLE ... ADD CONSTRAINT statements
//!
//! ## Example
//!
//! ```rust,no_run
//! use sqlserver_scripts::{Config, DdlEngine, MssqlCatalog, ScriptOptions, TableIdentity};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> sqlserver_scripts::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let catalog = MssqlCatalog::connect(&config.connection).await?;
//!     let mut engine = DdlEngine::new(catalog);
//!
//!     let table = TableIdentity::new("dbo", "Orders")?;
//!     let ddl = engine.generate(&table, &ScriptOptions::default()).await?;
//!     println!("{}", ddl);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod ddl;
pub mod engine;
pub mod error;
pub mod export;
pub mod schema;
pub mod typemap;

// Re-exports for convenient access
pub use catalog::{CatalogReader, MemoryCatalog, MemoryTable, MssqlCatalog};
pub use config::{Config, ConnectionConfig, ScriptOptions};
pub use ddl::GeneratedDdl;
pub use engine::DdlEngine;
pub use error::{Result, ScriptError};
pub use export::{export_table, export_tables, ExportEvent, ExportSummary, ExportedFile};
pub use schema::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, PrimaryKeyDescriptor, TableIdentity,
};
