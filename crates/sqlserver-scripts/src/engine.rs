//! DDL generation engine.
//!
//! Runs the fixed query sequence for one table against a [`CatalogReader`]
//! and assembles the result. Requests are independent: nothing read for one
//! table is reused for the next.

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use crate::catalog::CatalogReader;
use crate::config::ScriptOptions;
use crate::ddl::{self, GeneratedDdl};
use crate::error::{Result, ScriptError};
use crate::schema::TableIdentity;

/// Generates table DDL from catalog metadata.
pub struct DdlEngine<R: CatalogReader> {
    reader: R,
}

impl<R: CatalogReader> DdlEngine<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// List base tables in a schema.
    pub async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        self.reader.list_tables(schema).await
    }

    /// Generate DDL for one table, stamped with the current local time.
    pub async fn generate(
        &mut self,
        table: &TableIdentity,
        options: &ScriptOptions,
    ) -> Result<GeneratedDdl> {
        let generated_at = Local::now().naive_local();
        self.generate_at(table, options, generated_at).await
    }

    /// Generate DDL for one table with an explicit header timestamp.
    ///
    /// Existence is checked before anything else; a missing table yields
    /// [`ScriptError::NotFound`] without any further queries. Any metadata
    /// failure aborts the request and no partial script is returned.
    pub async fn generate_at(
        &mut self,
        table: &TableIdentity,
        options: &ScriptOptions,
        generated_at: NaiveDateTime,
    ) -> Result<GeneratedDdl> {
        debug!("Generating DDL for {} via {}", table, self.reader.dialect());

        if !self.reader.table_exists(table).await? {
            return Err(ScriptError::not_found(&table.schema, &table.name));
        }

        let mut columns = self.reader.fetch_columns(table).await?;
        columns.sort_by_key(|c| c.ordinal_pos);
        let pk = self.reader.fetch_primary_key(table).await?;
        let create_table = ddl::create_table(table, &columns, &pk, options);

        let indexes = if options.include_indexes {
            self.reader
                .fetch_indexes(table)
                .await?
                .iter()
                .map(|idx| ddl::create_index(table, idx))
                .collect()
        } else {
            Vec::new()
        };

        let foreign_keys = if options.include_foreign_keys {
            self.reader
                .fetch_foreign_keys(table)
                .await?
                .iter()
                .map(|fk| ddl::add_foreign_key(table, fk))
                .collect()
        } else {
            Vec::new()
        };

        info!(
            "Generated DDL for {}: {} columns, {} indexes, {} foreign keys",
            table,
            columns.len(),
            indexes.len(),
            foreign_keys.len()
        );

        Ok(GeneratedDdl {
            table: table.clone(),
            generated_at,
            create_table,
            indexes,
            foreign_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        operation, ForeignKeyColumnRow, IndexColumnRow, MemoryCatalog, MemoryTable,
    };
    use crate::schema::{ColumnDescriptor, IndexDescriptor};
    use chrono::NaiveDate;

    fn orders() -> TableIdentity {
        TableIdentity::new("dbo", "Orders").unwrap()
    }

    fn column(name: &str, data_type: &str, pos: i32) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            data_type: data_type.to_string(),
            max_length: None,
            precision: None,
            scale: None,
            is_nullable: false,
            default_value: None,
            ordinal_pos: pos,
            is_identity: false,
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn orders_fixture() -> MemoryTable {
        let mut id = column("id", "int", 1);
        id.is_identity = true;
        let mut total = column("total", "decimal", 3);
        total.precision = Some(10);
        total.scale = Some(2);
        let mut customer = column("customer_id", "int", 2);
        customer.is_nullable = true;

        MemoryTable::new(vec![id, total, customer])
            .with_primary_key("PK_Orders", &["id"])
            .with_index(IndexDescriptor {
                name: "IX_Orders_Customer".to_string(),
                is_unique: false,
                columns: vec!["customer_id".to_string()],
                include_cols: vec![],
            })
            .with_foreign_key_rows(vec![ForeignKeyColumnRow {
                constraint_name: "FK_Orders_Customers".to_string(),
                column_name: "customer_id".to_string(),
                ref_schema: "dbo".to_string(),
                ref_table: "Customers".to_string(),
                ref_column_name: "id".to_string(),
                ordinal: 1,
                on_delete: "NO_ACTION".to_string(),
                on_update: "NO_ACTION".to_string(),
            }])
    }

    fn engine() -> DdlEngine<MemoryCatalog> {
        DdlEngine::new(MemoryCatalog::new().with_table(orders(), orders_fixture()))
    }

    #[tokio::test]
    async fn test_generate_full_script() {
        let mut engine = engine();
        let ddl = engine
            .generate_at(&orders(), &ScriptOptions::default(), at())
            .await
            .unwrap();

        let expected = "\
-- DDL for table: dbo.Orders
-- Generated by sqlserver-scripts on 2024-05-01 09:30:00

CREATE TABLE [dbo].[Orders] (
    [id] int IDENTITY(1,1) NOT NULL,
    [customer_id] int,
    [total] decimal(10,2) NOT NULL,
    CONSTRAINT [PK_Orders] PRIMARY KEY CLUSTERED ([id])
);

-- Indexes
CREATE INDEX [IX_Orders_Customer] ON [dbo].[Orders] ([customer_id]);

-- Foreign Key Constraints
ALTER TABLE [dbo].[Orders] ADD CONSTRAINT [FK_Orders_Customers] FOREIGN KEY ([customer_id]) REFERENCES [dbo].[Customers] ([id]);
";
        assert_eq!(ddl.to_sql(), expected);
        assert_eq!(ddl.statement_count(), 3);
    }

    #[tokio::test]
    async fn test_missing_table_is_not_found() {
        let mut engine = engine();
        let missing = TableIdentity::new("dbo", "Missing").unwrap();
        let err = engine
            .generate(&missing, &ScriptOptions::default())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Table 'Missing' not found in schema 'dbo'");
        // No metadata fetched after the existence check.
        assert_eq!(engine.reader().calls(), &[operation::TABLE_EXISTS]);
    }

    #[tokio::test]
    async fn test_metadata_failure_aborts() {
        let catalog = MemoryCatalog::new()
            .with_table(orders(), orders_fixture())
            .fail_on(operation::FETCH_FOREIGN_KEYS);
        let mut engine = DdlEngine::new(catalog);

        let err = engine
            .generate(&orders(), &ScriptOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::MetadataQuery {
                operation: "fetch_foreign_keys",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_body_is_deterministic() {
        let mut engine = engine();
        let first = engine
            .generate(&orders(), &ScriptOptions::default())
            .await
            .unwrap();
        let second = engine
            .generate(&orders(), &ScriptOptions::default())
            .await
            .unwrap();
        assert_eq!(first.body(), second.body());
    }

    #[tokio::test]
    async fn test_excluded_sections_are_not_queried() {
        let mut engine = engine();
        let options = ScriptOptions::default()
            .with_indexes(false)
            .with_foreign_keys(false);
        let ddl = engine.generate_at(&orders(), &options, at()).await.unwrap();

        let sql = ddl.to_sql();
        assert!(!sql.contains("-- Indexes"));
        assert!(!sql.contains("-- Foreign Key Constraints"));
        assert!(sql.ends_with(");\n"));
        assert_eq!(
            engine.reader().calls(),
            &[
                operation::TABLE_EXISTS,
                operation::FETCH_COLUMNS,
                operation::FETCH_PRIMARY_KEY,
            ]
        );
    }

    #[tokio::test]
    async fn test_table_without_pk_or_indexes() {
        let heap = TableIdentity::new("dbo", "Heap").unwrap();
        let catalog = MemoryCatalog::new()
            .with_table(heap.clone(), MemoryTable::new(vec![column("x", "bit", 1)]));
        let mut engine = DdlEngine::new(catalog);

        let ddl = engine
            .generate_at(&heap, &ScriptOptions::default(), at())
            .await
            .unwrap();
        assert_eq!(ddl.create_table, "CREATE TABLE [dbo].[Heap] (\n    [x] bit NOT NULL\n);");
        assert!(ddl.indexes.is_empty());
        assert!(ddl.foreign_keys.is_empty());
        assert!(!ddl.to_sql().contains("CONSTRAINT"));
    }

    #[tokio::test]
    async fn test_composite_foreign_key_out_of_order_rows() {
        let child = TableIdentity::new("dbo", "Child").unwrap();
        let row = |local: &str, remote: &str, ordinal: i32| ForeignKeyColumnRow {
            constraint_name: "FK_Child_Parent".to_string(),
            column_name: local.to_string(),
            ref_schema: "dbo".to_string(),
            ref_table: "Parent".to_string(),
            ref_column_name: remote.to_string(),
            ordinal,
            on_delete: "CASCADE".to_string(),
            on_update: "NO_ACTION".to_string(),
        };
        let fixture = MemoryTable::new(vec![column("x", "int", 1), column("y", "int", 2)])
            .with_foreign_key_rows(vec![row("y", "q", 2), row("x", "p", 1)]);
        let mut engine = DdlEngine::new(MemoryCatalog::new().with_table(child.clone(), fixture));

        let ddl = engine
            .generate(&child, &ScriptOptions::default())
            .await
            .unwrap();
        assert_eq!(
            ddl.foreign_keys,
            vec![
                "ALTER TABLE [dbo].[Child] ADD CONSTRAINT [FK_Child_Parent] FOREIGN KEY ([x], [y]) REFERENCES [dbo].[Parent] ([p], [q]) ON DELETE CASCADE;"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_indexes_grouped_from_shuffled_rows() {
        let row = |index: &str, unique: bool, col: &str, ordinal: i32, included: bool| {
            IndexColumnRow {
                index_name: index.to_string(),
                is_unique: unique,
                column_name: col.to_string(),
                ordinal,
                is_included: included,
            }
        };
        let fixture = MemoryTable::new(vec![
            column("w", "int", 1),
            column("x", "int", 2),
            column("y", "int", 3),
            column("z", "int", 4),
        ])
        .with_index_rows(vec![
            row("IX_b", false, "w", 1, false),
            row("IX_a", true, "z", 4, true),
            row("IX_a", true, "y", 2, false),
            row("IX_a", true, "x", 1, false),
        ]);
        let mut engine = DdlEngine::new(MemoryCatalog::new().with_table(orders(), fixture));

        let ddl = engine
            .generate(&orders(), &ScriptOptions::default())
            .await
            .unwrap();
        assert_eq!(
            ddl.indexes,
            vec![
                "CREATE UNIQUE INDEX [IX_a] ON [dbo].[Orders] ([x], [y]) INCLUDE ([z]);".to_string(),
                "CREATE INDEX [IX_b] ON [dbo].[Orders] ([w]);".to_string(),
            ]
        );
    }
}
