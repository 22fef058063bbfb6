//! SQL Server column type formatting.

/// `CHARACTER_MAXIMUM_LENGTH` value the catalog reports for `(MAX)` columns.
pub const MAX_LENGTH_SENTINEL: i32 = -1;

/// Format a catalog type tuple as a column type declaration.
///
/// Matching on `data_type` is case-insensitive. Types without length or
/// precision rules are returned exactly as the catalog spelled them.
pub fn format_type(
    data_type: &str,
    max_length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
) -> String {
    let lower = data_type.to_lowercase();
    match lower.as_str() {
        // Variable length character/binary types
        "varchar" | "nvarchar" | "varbinary" => match max_length {
            Some(MAX_LENGTH_SENTINEL) => format!("{}(MAX)", lower),
            Some(len) => format!("{}({})", lower, len),
            None => lower,
        },

        // Fixed length character/binary types
        "char" | "nchar" | "binary" => match max_length {
            Some(len) => format!("{}({})", lower, len),
            None => lower,
        },

        // numeric is scripted as its decimal synonym
        "decimal" | "numeric" => match (precision, scale) {
            (Some(p), Some(s)) => format!("decimal({},{})", p, s),
            (Some(p), None) => format!("decimal({})", p),
            _ => "decimal".to_string(),
        },

        "float" => match precision {
            Some(p) => format!("float({})", p),
            None => "float".to_string(),
        },

        _ => data_type.to_string(),
    }
}
