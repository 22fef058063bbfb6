//! Writing generated scripts to disk.
//!
//! Batch exports write one `<table>.sql` file per table and keep going past
//! per-table failures. Interactive saves use a timestamped name so repeated
//! saves of the same table never overwrite each other.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::catalog::CatalogReader;
use crate::config::ScriptOptions;
use crate::ddl::GeneratedDdl;
use crate::engine::DdlEngine;
use crate::error::{Result, ScriptError};
use crate::schema::TableIdentity;

/// Directory (relative to the working directory) for interactive saves.
pub const INTERACTIVE_OUTPUT_DIR: &str = "scripts/tables";

/// Width of the `=` border around console output.
pub const CONSOLE_BORDER_WIDTH: usize = 60;

/// File name used by batch exports: `<table lowercased>.sql`.
pub fn batch_file_name(table: &str) -> String {
    format!("{}.sql", table.to_lowercase())
}

/// File name used by interactive saves: `<table lowercased>_YYYYMMDD_HHMMSS.sql`.
pub fn timestamped_file_name(table: &str, at: NaiveDateTime) -> String {
    format!("{}_{}.sql", table.to_lowercase(), at.format("%Y%m%d_%H%M%S"))
}

/// Create a directory and its parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| ScriptError::output_write(dir, e))
}

/// Write a script under `dir`, creating the directory if needed.
pub fn write_ddl(dir: &Path, file_name: &str, ddl: &str) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, ddl).map_err(|e| ScriptError::output_write(&path, e))?;
    Ok(path)
}

/// Render a script for the terminal, framed by `=` borders.
pub fn render_console(ddl: &GeneratedDdl) -> String {
    let border = "=".repeat(CONSOLE_BORDER_WIDTH);
    format!(
        "{border}\nDDL for table: {}\n{border}\n{}\n{border}\n",
        ddl.table.name.to_uppercase(),
        ddl.to_sql(),
        border = border
    )
}

/// A script written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub table: TableIdentity,
    pub path: PathBuf,
    pub bytes: usize,
}

/// A table that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    pub table: String,
    pub message: String,
}

/// Per-table progress reported during a batch export.
#[derive(Debug)]
pub enum ExportEvent<'a> {
    Exported(&'a ExportedFile),
    Failed {
        table: &'a str,
        error: &'a ScriptError,
    },
}

/// Outcome of a batch export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub output_dir: PathBuf,
    pub exported: Vec<ExportedFile>,
    pub failures: Vec<ExportFailure>,
}

impl ExportSummary {
    pub fn total(&self) -> usize {
        self.exported.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Generate and write one table's script as `<output_dir>/<table>.sql`.
pub async fn export_table<R: CatalogReader>(
    engine: &mut DdlEngine<R>,
    table: &TableIdentity,
    options: &ScriptOptions,
    output_dir: &Path,
) -> Result<ExportedFile> {
    let ddl = engine.generate(table, options).await?;
    let sql = ddl.to_sql();
    let path = write_ddl(output_dir, &batch_file_name(&table.name), &sql)?;
    Ok(ExportedFile {
        table: table.clone(),
        path,
        bytes: sql.len(),
    })
}

/// Export the tables named in `tables`, or every base table in `schema`
/// when `tables` is `None`. An empty selection exports nothing.
///
/// Failing tables are recorded and skipped. Only failures that affect the
/// whole run (listing tables, creating the output directory) are returned
/// as errors.
pub async fn export_tables<R, F>(
    engine: &mut DdlEngine<R>,
    schema: &str,
    tables: Option<&[String]>,
    options: &ScriptOptions,
    output_dir: &Path,
    mut on_event: F,
) -> Result<ExportSummary>
where
    R: CatalogReader,
    F: FnMut(ExportEvent<'_>),
{
    let tables = match tables {
        Some(tables) => tables.to_vec(),
        None => engine.list_tables(schema).await?,
    };

    ensure_dir(output_dir)?;
    info!(
        "Exporting {} tables from schema {} to {}",
        tables.len(),
        schema,
        output_dir.display()
    );

    let mut summary = ExportSummary {
        output_dir: output_dir.to_path_buf(),
        exported: Vec::with_capacity(tables.len()),
        failures: Vec::new(),
    };

    for name in &tables {
        let result = match TableIdentity::new(schema, name.as_str()) {
            Ok(table) => export_table(engine, &table, options, output_dir).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(file) => {
                on_event(ExportEvent::Exported(&file));
                summary.exported.push(file);
            }
            Err(error) => {
                warn!("Failed to export {}.{}: {}", schema, name, error);
                on_event(ExportEvent::Failed {
                    table: name,
                    error: &error,
                });
                summary.failures.push(ExportFailure {
                    table: name.clone(),
                    message: error.to_string(),
                });
            }
        }
    }

    info!(
        "Export finished: {} succeeded, {} failed",
        summary.exported.len(),
        summary.failures.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{operation, MemoryCatalog, MemoryTable};
    use crate::schema::ColumnDescriptor;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn column(name: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            data_type: "int".to_string(),
            max_length: None,
            precision: None,
            scale: None,
            is_nullable: false,
            default_value: None,
            ordinal_pos: 1,
            is_identity: false,
        }
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_table(
                TableIdentity::new("dbo", "Customers").unwrap(),
                MemoryTable::new(vec![column("id")]),
            )
            .with_table(
                TableIdentity::new("dbo", "Orders").unwrap(),
                MemoryTable::new(vec![column("id")]),
            )
    }

    #[test]
    fn test_batch_file_name() {
        assert_eq!(batch_file_name("Orders"), "orders.sql");
    }

    #[test]
    fn test_timestamped_file_name() {
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();
        assert_eq!(
            timestamped_file_name("Orders", at),
            "orders_20240501_090507.sql"
        );
    }

    #[test]
    fn test_write_ddl_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("scripts").join("tables");
        let path = write_ddl(&nested, "orders.sql", "CREATE TABLE x;").unwrap();
        assert_eq!(path, nested.join("orders.sql"));
        assert_eq!(fs::read_to_string(path).unwrap(), "CREATE TABLE x;");
    }

    #[test]
    fn test_write_ddl_reports_path_on_failure() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let err = write_ddl(&blocker, "orders.sql", "x").unwrap_err();
        match err {
            ScriptError::OutputWrite { path, .. } => assert_eq!(path, blocker),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_render_console() {
        let mut engine = DdlEngine::new(catalog());
        let table = TableIdentity::new("dbo", "Orders").unwrap();
        let ddl = engine
            .generate(&table, &ScriptOptions::default())
            .await
            .unwrap();

        let rendered = render_console(&ddl);
        let border = "=".repeat(60);
        assert!(rendered.starts_with(&format!("{}\nDDL for table: ORDERS\n{}\n", border, border)));
        assert!(rendered.ends_with(&format!("{}\n", border)));
        assert!(rendered.contains("CREATE TABLE [dbo].[Orders]"));
    }

    #[tokio::test]
    async fn test_export_all_tables_in_schema() {
        let dir = tempdir().unwrap();
        let mut engine = DdlEngine::new(catalog());
        let mut events = 0;

        let summary = export_tables(
            &mut engine,
            "dbo",
            None,
            &ScriptOptions::default(),
            dir.path(),
            |_| events += 1,
        )
        .await
        .unwrap();

        assert_eq!(summary.exported.len(), 2);
        assert!(summary.is_complete());
        assert_eq!(events, 2);
        assert!(dir.path().join("customers.sql").exists());
        let orders = fs::read_to_string(dir.path().join("orders.sql")).unwrap();
        assert!(orders.starts_with("-- DDL for table: dbo.Orders\n"));
        assert_eq!(summary.exported[1].bytes, orders.len());
    }

    #[tokio::test]
    async fn test_export_continues_past_failures() {
        let dir = tempdir().unwrap();
        let mut engine = DdlEngine::new(catalog());
        let tables = vec![
            "Missing".to_string(),
            "Orders".to_string(),
        ];
        let mut failed = Vec::new();

        let summary = export_tables(
            &mut engine,
            "dbo",
            Some(tables.as_slice()),
            &ScriptOptions::default(),
            dir.path(),
            |event| {
                if let ExportEvent::Failed { table, .. } = event {
                    failed.push(table.to_string());
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.total(), 2);
        assert_eq!(summary.exported.len(), 1);
        assert_eq!(failed, vec!["Missing"]);
        assert_eq!(
            summary.failures[0].message,
            "Table 'Missing' not found in schema 'dbo'"
        );
        assert!(dir.path().join("orders.sql").exists());
        assert!(!dir.path().join("missing.sql").exists());
    }

    #[tokio::test]
    async fn test_export_list_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let mut engine = DdlEngine::new(catalog().fail_on(operation::LIST_TABLES));

        let result = export_tables(
            &mut engine,
            "dbo",
            None,
            &ScriptOptions::default(),
            dir.path(),
            |_| {},
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_export_empty_selection_skips_listing() {
        let dir = tempdir().unwrap();
        let mut engine = DdlEngine::new(catalog());

        let summary = export_tables(
            &mut engine,
            "dbo",
            Some(&[] as &[String]),
            &ScriptOptions::default(),
            dir.path(),
            |_| panic!("no table should be exported"),
        )
        .await
        .unwrap();

        assert_eq!(summary.total(), 0);
        assert!(engine.reader().calls().is_empty());
    }
}
