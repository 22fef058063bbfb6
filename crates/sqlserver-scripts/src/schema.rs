//! Table, column, and constraint descriptors read from the catalog.
//!
//! Descriptors are point-in-time snapshots. They are built fresh for each
//! generation request and never cached or mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScriptError};

/// Schema-qualified table name used as the key for every catalog query.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableIdentity {
    /// Schema name.
    pub schema: String,

    /// Table name.
    pub name: String,
}

impl TableIdentity {
    /// Create an identity, rejecting empty schema or table names.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        let name = name.into();
        if schema.trim().is_empty() {
            return Err(ScriptError::Config("schema name cannot be empty".into()));
        }
        if name.trim().is_empty() {
            return Err(ScriptError::Config("table name cannot be empty".into()));
        }
        Ok(Self { schema, name })
    }

    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

impl fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,

    /// Data type as reported by the catalog (e.g., "int", "nvarchar").
    pub data_type: String,

    /// Maximum length for string/binary types (-1 for MAX, `None` when not length-bound).
    pub max_length: Option<i32>,

    /// Numeric precision.
    pub precision: Option<i32>,

    /// Numeric scale.
    pub scale: Option<i32>,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Default expression exactly as stored by the catalog, e.g. `((0))`.
    pub default_value: Option<String>,

    /// Ordinal position (1-based).
    pub ordinal_pos: i32,

    /// Whether the column is an identity column.
    pub is_identity: bool,
}

/// Primary key metadata. An empty column list means the table has no primary key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyDescriptor {
    /// Constraint name.
    pub name: String,

    /// Key columns in key ordinal order.
    pub columns: Vec<String>,
}

impl PrimaryKeyDescriptor {
    /// Check if the table has a primary key.
    pub fn exists(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// Index metadata (never primary-key-backed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name.
    pub name: String,

    /// Whether the index is unique.
    pub is_unique: bool,

    /// Key columns in key ordinal order.
    pub columns: Vec<String>,

    /// Included (non-key) columns.
    pub include_cols: Vec<String>,
}

/// Foreign key metadata.
///
/// `columns[i]` references `ref_columns[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    /// Constraint name.
    pub name: String,

    /// Local column names.
    pub columns: Vec<String>,

    /// Referenced schema name.
    pub ref_schema: String,

    /// Referenced table name.
    pub ref_table: String,

    /// Referenced column names.
    pub ref_columns: Vec<String>,

    /// ON DELETE action as reported by the catalog (e.g. "NO_ACTION", "CASCADE").
    pub on_delete: String,

    /// ON UPDATE action.
    pub on_update: String,
}
