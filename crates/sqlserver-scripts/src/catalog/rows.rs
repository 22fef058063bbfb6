//! Per-column catalog rows and their grouping into descriptors.
//!
//! Index and foreign key queries return one row per member column. Grouping
//! happens here rather than with server-side string aggregation so that
//! column names containing commas survive intact and member order is decided
//! by the ordinal, not by the order the join happened to produce.

use serde::{Deserialize, Serialize};

use crate::schema::{ForeignKeyDescriptor, IndexDescriptor};

/// One member column of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumnRow {
    pub index_name: String,
    pub is_unique: bool,
    pub column_name: String,
    /// Key ordinal for key columns; column position for included columns.
    pub ordinal: i32,
    pub is_included: bool,
}

/// One column pair of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyColumnRow {
    pub constraint_name: String,
    pub column_name: String,
    pub ref_schema: String,
    pub ref_table: String,
    pub ref_column_name: String,
    /// `constraint_column_id`; pairs local and referenced columns.
    pub ordinal: i32,
    pub on_delete: String,
    pub on_update: String,
}

/// Group index rows into descriptors.
///
/// Groups keep the order in which each index name first appears (the query
/// orders by name under the catalog collation). Members are sorted by ordinal.
pub fn group_index_rows(rows: Vec<IndexColumnRow>) -> Vec<IndexDescriptor> {
    let mut groups: Vec<(String, bool, Vec<IndexColumnRow>)> = Vec::new();

    for row in rows {
        match groups.iter_mut().find(|(name, _, _)| *name == row.index_name) {
            Some((_, _, members)) => members.push(row),
            None => groups.push((row.index_name.clone(), row.is_unique, vec![row])),
        }
    }

    groups
        .into_iter()
        .map(|(name, is_unique, mut members)| {
            members.sort_by_key(|m| m.ordinal);
            let (included, key): (Vec<_>, Vec<_>) =
                members.into_iter().partition(|m| m.is_included);
            IndexDescriptor {
                name,
                is_unique,
                columns: key.into_iter().map(|m| m.column_name).collect(),
                include_cols: included.into_iter().map(|m| m.column_name).collect(),
            }
        })
        .collect()
}

/// Group foreign key rows into descriptors.
///
/// Local and referenced columns are both taken from the same row after
/// sorting by ordinal, so position i of one always pairs with position i of
/// the other.
pub fn group_foreign_key_rows(rows: Vec<ForeignKeyColumnRow>) -> Vec<ForeignKeyDescriptor> {
    let mut groups: Vec<(String, Vec<ForeignKeyColumnRow>)> = Vec::new();

    for row in rows {
        match groups.iter_mut().find(|(name, _)| *name == row.constraint_name) {
            Some((_, members)) => members.push(row),
            None => groups.push((row.constraint_name.clone(), vec![row])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(name, mut members)| {
            members.sort_by_key(|m| m.ordinal);
            let first = members.first()?.clone();
            Some(ForeignKeyDescriptor {
                name,
                columns: members.iter().map(|m| m.column_name.clone()).collect(),
                ref_schema: first.ref_schema,
                ref_table: first.ref_table,
                ref_columns: members.into_iter().map(|m| m.ref_column_name).collect(),
                on_delete: first.on_delete,
                on_update: first.on_update,
            })
        })
        .collect()
}

/// Expand an index descriptor back into rows (used by in-memory catalogs).
pub fn index_rows(idx: &IndexDescriptor) -> Vec<IndexColumnRow> {
    let key = idx.columns.iter().enumerate().map(|(i, c)| IndexColumnRow {
        index_name: idx.name.clone(),
        is_unique: idx.is_unique,
        column_name: c.clone(),
        ordinal: i as i32 + 1,
        is_included: false,
    });
    let included = idx.include_cols.iter().enumerate().map(|(i, c)| IndexColumnRow {
        index_name: idx.name.clone(),
        is_unique: idx.is_unique,
        column_name: c.clone(),
        ordinal: (idx.columns.len() + i) as i32 + 1,
        is_included: true,
    });
    key.chain(included).collect()
}

/// Expand a foreign key descriptor back into rows (used by in-memory catalogs).
pub fn foreign_key_rows(fk: &ForeignKeyDescriptor) -> Vec<ForeignKeyColumnRow> {
    fk.columns
        .iter()
        .zip(&fk.ref_columns)
        .enumerate()
        .map(|(i, (local, remote))| ForeignKeyColumnRow {
            constraint_name: fk.name.clone(),
            column_name: local.clone(),
            ref_schema: fk.ref_schema.clone(),
            ref_table: fk.ref_table.clone(),
            ref_column_name: remote.clone(),
            ordinal: i as i32 + 1,
            on_delete: fk.on_delete.clone(),
            on_update: fk.on_update.clone(),
        })
        .collect()
}
