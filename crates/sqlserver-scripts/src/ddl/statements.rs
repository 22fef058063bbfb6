//! Individual DDL statement builders.

use super::identifier::{qualify, quote_ident, quote_list};
use crate::config::ScriptOptions;
use crate::schema::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, PrimaryKeyDescriptor, TableIdentity,
};
use crate::typemap::format_type;

/// Indentation applied to column lines and the primary key clause.
const INDENT: &str = "    ";

/// Build one column definition line (without indentation or separator).
///
/// Clause order is fixed: type, IDENTITY, NOT NULL, DEFAULT. Identity columns
/// never get a DEFAULT clause, even when the catalog reports one.
pub fn column_definition(col: &ColumnDescriptor, options: &ScriptOptions) -> String {
    let mut line = format!(
        "{} {}",
        quote_ident(&col.name),
        format_type(&col.data_type, col.max_length, col.precision, col.scale)
    );

    if col.is_identity && options.include_identity {
        line.push_str(" IDENTITY(1,1)");
    }

    if !col.is_nullable {
        line.push_str(" NOT NULL");
    }

    if options.include_defaults && !col.is_identity {
        if let Some(default) = col.default_value.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(" DEFAULT ");
            line.push_str(default);
        }
    }

    line
}

/// Build the `CONSTRAINT ... PRIMARY KEY CLUSTERED (...)` clause, if a key exists.
pub fn primary_key_clause(pk: &PrimaryKeyDescriptor) -> Option<String> {
    if !pk.exists() {
        return None;
    }
    Some(format!(
        "CONSTRAINT {} PRIMARY KEY CLUSTERED ({})",
        quote_ident(&pk.name),
        quote_list(&pk.columns)
    ))
}

/// Build the CREATE TABLE statement.
///
/// `columns` must already be in ordinal order.
pub fn create_table(
    table: &TableIdentity,
    columns: &[ColumnDescriptor],
    pk: &PrimaryKeyDescriptor,
    options: &ScriptOptions,
) -> String {
    let mut elements: Vec<String> = columns
        .iter()
        .map(|c| format!("{}{}", INDENT, column_definition(c, options)))
        .collect();

    if let Some(clause) = primary_key_clause(pk) {
        elements.push(format!("{}{}", INDENT, clause));
    }

    format!(
        "CREATE TABLE {} (\n{}\n);",
        qualify(&table.schema, &table.name),
        elements.join(",\n")
    )
}

/// Build a CREATE INDEX statement.
pub fn create_index(table: &TableIdentity, idx: &IndexDescriptor) -> String {
    let unique = if idx.is_unique { "UNIQUE " } else { "" };
    let mut sql = format!(
        "CREATE {}INDEX {} ON {} ({})",
        unique,
        quote_ident(&idx.name),
        qualify(&table.schema, &table.name),
        quote_list(&idx.columns)
    );

    if !idx.include_cols.is_empty() {
        sql.push_str(&format!(" INCLUDE ({})", quote_list(&idx.include_cols)));
    }

    sql.push(';');
    sql
}

/// Build an ALTER TABLE ... FOREIGN KEY statement.
///
/// Referential actions are only scripted when they differ from `NO ACTION`.
pub fn add_foreign_key(table: &TableIdentity, fk: &ForeignKeyDescriptor) -> String {
    let mut sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        qualify(&table.schema, &table.name),
        quote_ident(&fk.name),
        quote_list(&fk.columns),
        qualify(&fk.ref_schema, &fk.ref_table),
        quote_list(&fk.ref_columns)
    );

    if let Some(action) = referential_action(&fk.on_delete) {
        sql.push_str(" ON DELETE ");
        sql.push_str(&action);
    }
    if let Some(action) = referential_action(&fk.on_update) {
        sql.push_str(" ON UPDATE ");
        sql.push_str(&action);
    }

    sql.push(';');
    sql
}

/// Map a catalog action description (`SET_NULL`) to DDL text (`SET NULL`).
fn referential_action(desc: &str) -> Option<String> {
    let desc = desc.trim();
    if desc.is_empty() || desc.eq_ignore_ascii_case("NO_ACTION") {
        return None;
    }
    Some(desc.replace('_', " ").to_uppercase())
}
