//! Bracket quoting for identifiers returned by the catalog.
//!
//! Catalog names are only ever quoted for output text. Query parameters
//! (schema and table lookups) are always bound, never spliced.

/// Quote a SQL Server identifier using brackets.
///
/// Escapes closing brackets by doubling them and wraps in brackets.
///
/// # Examples
///
/// ```
/// use sqlserver_scripts::ddl::quote_ident;
///
/// assert_eq!(quote_ident("users"), "[users]");
/// assert_eq!(quote_ident("table]name"), "[table]]name]");
/// ```
pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Qualify a table name with its schema: `[schema].[table]`.
pub fn qualify(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Quote each name and join with `", "`.
pub fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| quote_ident(n))
        .collect::<Vec<_>>()
        .join(", ")
}
