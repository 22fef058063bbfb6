//! SQL Server catalog reader.
//!
//! Reads metadata from `INFORMATION_SCHEMA` and the `sys` catalog views over a
//! single Tiberius connection. Schema and table names are always bound as
//! `@P1`/`@P2` parameters.

use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, Query, Row, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use super::operation;
use super::rows::{group_foreign_key_rows, group_index_rows, ForeignKeyColumnRow, IndexColumnRow};
use super::CatalogReader;
use crate::config::ConnectionConfig;
use crate::error::{Result, ScriptError};
use crate::schema::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, PrimaryKeyDescriptor, TableIdentity,
};

const LIST_TABLES_SQL: &str = r#"
    SELECT TABLE_NAME
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = @P1 AND TABLE_TYPE = 'BASE TABLE'
    ORDER BY TABLE_NAME
"#;

const TABLE_EXISTS_SQL: &str = r#"
    SELECT COUNT(*)
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2 AND TABLE_TYPE = 'BASE TABLE'
"#;

const COLUMNS_SQL: &str = r#"
    SELECT
        c.COLUMN_NAME,
        c.DATA_TYPE,
        CAST(c.CHARACTER_MAXIMUM_LENGTH AS INT),
        CAST(c.NUMERIC_PRECISION AS INT),
        CAST(c.NUMERIC_SCALE AS INT),
        CAST(CASE WHEN c.IS_NULLABLE = 'YES' THEN 1 ELSE 0 END AS INT),
        c.COLUMN_DEFAULT,
        CAST(c.ORDINAL_POSITION AS INT),
        CAST(ISNULL(COLUMNPROPERTY(
            OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME)),
            c.COLUMN_NAME, 'IsIdentity'), 0) AS INT)
    FROM INFORMATION_SCHEMA.COLUMNS c
    WHERE c.TABLE_SCHEMA = @P1 AND c.TABLE_NAME = @P2
    ORDER BY c.ORDINAL_POSITION
"#;

const PRIMARY_KEY_SQL: &str = r#"
    SELECT tc.CONSTRAINT_NAME, kcu.COLUMN_NAME
    FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
    JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
        ON kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
        AND kcu.TABLE_SCHEMA = tc.TABLE_SCHEMA
        AND kcu.TABLE_NAME = tc.TABLE_NAME
    WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
      AND tc.TABLE_SCHEMA = @P1
      AND tc.TABLE_NAME = @P2
    ORDER BY kcu.ORDINAL_POSITION
"#;

// Partition-only columns (key_ordinal 0, not included) are filtered out.
const INDEXES_SQL: &str = r#"
    SELECT
        i.name,
        i.is_unique,
        c.name,
        CAST(CASE WHEN ic.is_included_column = 1 THEN ic.index_column_id
                  ELSE ic.key_ordinal END AS INT),
        ic.is_included_column
    FROM sys.indexes i
    JOIN sys.index_columns ic ON i.object_id = ic.object_id AND i.index_id = ic.index_id
    JOIN sys.columns c ON ic.object_id = c.object_id AND ic.column_id = c.column_id
    JOIN sys.tables t ON i.object_id = t.object_id
    JOIN sys.schemas s ON t.schema_id = s.schema_id
    WHERE s.name = @P1 AND t.name = @P2
      AND i.is_primary_key = 0
      AND i.type > 0
      AND i.is_disabled = 0
      AND i.is_hypothetical = 0
      AND (ic.key_ordinal > 0 OR ic.is_included_column = 1)
    ORDER BY i.name, ic.is_included_column, ic.key_ordinal, ic.index_column_id
"#;

const FOREIGN_KEYS_SQL: &str = r#"
    SELECT
        fk.name,
        pc.name,
        rs.name,
        rt.name,
        rc.name,
        CAST(fkc.constraint_column_id AS INT),
        fk.delete_referential_action_desc,
        fk.update_referential_action_desc
    FROM sys.foreign_keys fk
    JOIN sys.foreign_key_columns fkc ON fk.object_id = fkc.constraint_object_id
    JOIN sys.columns pc ON fkc.parent_object_id = pc.object_id AND fkc.parent_column_id = pc.column_id
    JOIN sys.columns rc ON fkc.referenced_object_id = rc.object_id AND fkc.referenced_column_id = rc.column_id
    JOIN sys.tables pt ON fk.parent_object_id = pt.object_id
    JOIN sys.schemas ps ON pt.schema_id = ps.schema_id
    JOIN sys.tables rt ON fk.referenced_object_id = rt.object_id
    JOIN sys.schemas rs ON rt.schema_id = rs.schema_id
    WHERE ps.name = @P1 AND pt.name = @P2
    ORDER BY fk.name, fkc.constraint_column_id
"#;

/// SQL Server catalog reader over one connection.
pub struct MssqlCatalog {
    client: Client<Compat<TcpStream>>,
}

impl MssqlCatalog {
    /// Connect and log in.
    ///
    /// When an instance name is configured the port is resolved through the
    /// SQL Browser service.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let server = config.server_display();
        let tiberius_config = build_config(config);

        let tcp = match config.instance() {
            Some(instance) => {
                debug!("Resolving instance {} through SQL Browser", instance);
                TcpStream::connect_named(&tiberius_config)
                    .await
                    .map_err(|e| {
                        ScriptError::connection(
                            format!("Failed to resolve instance on {}", server),
                            e,
                        )
                    })?
            }
            None => TcpStream::connect(tiberius_config.get_addr())
                .await
                .map_err(|e| {
                    ScriptError::connection(format!("Failed to reach {}", server), e)
                })?,
        };

        tcp.set_nodelay(true).ok();

        let client = Client::connect(tiberius_config, tcp.compat_write())
            .await
            .map_err(|e| ScriptError::connection(format!("Failed to log in to {}", server), e))?;

        info!("Connected to {} ({})", server, config.database);
        Ok(Self { client })
    }

    /// Close the connection gracefully.
    pub async fn close(self) -> Result<()> {
        self.client
            .close()
            .await
            .map_err(|e| ScriptError::connection("Failed to close connection", e))
    }

    async fn query_table(
        &mut self,
        operation: &'static str,
        sql: &str,
        table: &TableIdentity,
    ) -> Result<Vec<Row>> {
        let mut query = Query::new(sql);
        query.bind(&table.schema);
        query.bind(&table.name);

        let stream = query
            .query(&mut self.client)
            .await
            .map_err(|e| ScriptError::metadata(operation, e))?;
        stream
            .into_first_result()
            .await
            .map_err(|e| ScriptError::metadata(operation, e))
    }
}

fn build_config(conn: &ConnectionConfig) -> Config {
    let mut config = Config::new();
    config.host(&conn.host);
    // With a named instance the port is left unset so the browser lookup
    // goes to UDP 1434.
    match conn.instance() {
        Some(instance) => config.instance_name(instance),
        None => config.port(conn.port),
    }
    config.database(&conn.database);
    config.application_name(crate::ddl::GENERATOR_NAME);
    config.authentication(AuthMethod::sql_server(&conn.user, &conn.password));

    if conn.encrypt {
        config.encryption(EncryptionLevel::Required);
    } else {
        config.encryption(EncryptionLevel::NotSupported);
    }
    if conn.trust_server_cert {
        config.trust_cert();
    }

    config
}

fn required_str(row: &Row, idx: usize, operation: &'static str) -> Result<String> {
    optional_str(row, idx, operation)?.ok_or_else(|| {
        ScriptError::metadata(operation, format!("unexpected NULL in column {}", idx))
    })
}

fn optional_str(row: &Row, idx: usize, operation: &'static str) -> Result<Option<String>> {
    row.try_get::<&str, _>(idx)
        .map(|v| v.map(str::to_string))
        .map_err(|e| ScriptError::metadata(operation, e))
}

fn optional_i32(row: &Row, idx: usize, operation: &'static str) -> Result<Option<i32>> {
    row.try_get::<i32, _>(idx)
        .map_err(|e| ScriptError::metadata(operation, e))
}

fn required_i32(row: &Row, idx: usize, operation: &'static str) -> Result<i32> {
    optional_i32(row, idx, operation)?.ok_or_else(|| {
        ScriptError::metadata(operation, format!("unexpected NULL in column {}", idx))
    })
}

fn required_bool(row: &Row, idx: usize, operation: &'static str) -> Result<bool> {
    row.try_get::<bool, _>(idx)
        .map_err(|e| ScriptError::metadata(operation, e))?
        .ok_or_else(|| {
            ScriptError::metadata(operation, format!("unexpected NULL in column {}", idx))
        })
}

#[async_trait]
impl CatalogReader for MssqlCatalog {
    async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        let op = operation::LIST_TABLES;
        let mut query = Query::new(LIST_TABLES_SQL);
        query.bind(schema);

        let stream = query
            .query(&mut self.client)
            .await
            .map_err(|e| ScriptError::metadata(op, e))?;
        let rows = stream
            .into_first_result()
            .await
            .map_err(|e| ScriptError::metadata(op, e))?;

        let tables = rows
            .iter()
            .map(|row| required_str(row, 0, op))
            .collect::<Result<Vec<_>>>()?;

        debug!("Found {} tables in schema {}", tables.len(), schema);
        Ok(tables)
    }

    async fn table_exists(&mut self, table: &TableIdentity) -> Result<bool> {
        let op = operation::TABLE_EXISTS;
        let rows = self.query_table(op, TABLE_EXISTS_SQL, table).await?;
        let count = match rows.first() {
            Some(row) => required_i32(row, 0, op)?,
            None => 0,
        };
        Ok(count > 0)
    }

    async fn fetch_columns(&mut self, table: &TableIdentity) -> Result<Vec<ColumnDescriptor>> {
        let op = operation::FETCH_COLUMNS;
        let rows = self.query_table(op, COLUMNS_SQL, table).await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            columns.push(ColumnDescriptor {
                name: required_str(row, 0, op)?,
                data_type: required_str(row, 1, op)?,
                max_length: optional_i32(row, 2, op)?,
                precision: optional_i32(row, 3, op)?,
                scale: optional_i32(row, 4, op)?,
                is_nullable: required_i32(row, 5, op)? == 1,
                default_value: optional_str(row, 6, op)?,
                ordinal_pos: required_i32(row, 7, op)?,
                is_identity: required_i32(row, 8, op)? == 1,
            });
        }

        debug!("Loaded {} columns for {}", columns.len(), table);
        Ok(columns)
    }

    async fn fetch_primary_key(&mut self, table: &TableIdentity) -> Result<PrimaryKeyDescriptor> {
        let op = operation::FETCH_PRIMARY_KEY;
        let rows = self.query_table(op, PRIMARY_KEY_SQL, table).await?;

        let mut pk = PrimaryKeyDescriptor::default();
        for row in &rows {
            if pk.name.is_empty() {
                pk.name = required_str(row, 0, op)?;
            }
            pk.columns.push(required_str(row, 1, op)?);
        }

        debug!("Primary key for {}: {:?}", table, pk.columns);
        Ok(pk)
    }

    async fn fetch_indexes(&mut self, table: &TableIdentity) -> Result<Vec<IndexDescriptor>> {
        let op = operation::FETCH_INDEXES;
        let rows = self.query_table(op, INDEXES_SQL, table).await?;

        let mut index_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            index_rows.push(IndexColumnRow {
                index_name: required_str(row, 0, op)?,
                is_unique: required_bool(row, 1, op)?,
                column_name: required_str(row, 2, op)?,
                ordinal: required_i32(row, 3, op)?,
                is_included: required_bool(row, 4, op)?,
            });
        }

        let indexes = group_index_rows(index_rows);
        debug!("Loaded {} indexes for {}", indexes.len(), table);
        Ok(indexes)
    }

    async fn fetch_foreign_keys(
        &mut self,
        table: &TableIdentity,
    ) -> Result<Vec<ForeignKeyDescriptor>> {
        let op = operation::FETCH_FOREIGN_KEYS;
        let rows = self.query_table(op, FOREIGN_KEYS_SQL, table).await?;

        let mut fk_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            fk_rows.push(ForeignKeyColumnRow {
                constraint_name: required_str(row, 0, op)?,
                column_name: required_str(row, 1, op)?,
                ref_schema: required_str(row, 2, op)?,
                ref_table: required_str(row, 3, op)?,
                ref_column_name: required_str(row, 4, op)?,
                ordinal: required_i32(row, 5, op)?,
                on_delete: required_str(row, 6, op)?,
                on_update: required_str(row, 7, op)?,
            });
        }

        let fks = group_foreign_key_rows(fk_rows);
        debug!("Loaded {} foreign keys for {}", fks.len(), table);
        Ok(fks)
    }

    fn dialect(&self) -> &str {
        "mssql"
    }
}
