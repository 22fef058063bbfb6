//! DDL text assembly.
//!
//! Turns descriptors into the final script:
//!
//! ```text
//! -- DDL for table: dbo.Orders
//! -- Generated by sqlserver-scripts on 2024-05-01 09:30:00
//!
//! CREATE TABLE [dbo].[Orders] (
//!     [id] int IDENTITY(1,1) NOT NULL,
//!     CONSTRAINT [PK_Orders] PRIMARY KEY CLUSTERED ([id])
//! );
//!
//! -- Indexes
//! CREATE INDEX [IX_Orders_Date] ON [dbo].[Orders] ([order_date]);
//!
//! -- Foreign Key Constraints
//! ALTER TABLE [dbo].[Orders] ADD CONSTRAINT [FK_...] FOREIGN KEY (...) REFERENCES ...;
//! ```
//!
//! Sections with no statements are left out entirely.

mod identifier;
mod statements;

use std::fmt;

use chrono::NaiveDateTime;

use crate::schema::TableIdentity;

pub use identifier::{qualify, quote_ident, quote_list};
pub use statements::{
    add_foreign_key, column_definition, create_index, create_table, primary_key_clause,
};

/// Tool name written into the header comment.
pub const GENERATOR_NAME: &str = "sqlserver-scripts";

/// Timestamp layout used in the header comment.
pub const HEADER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Generated DDL for a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDdl {
    /// Table the script was generated for.
    pub table: TableIdentity,

    /// Local time the catalog was read.
    pub generated_at: NaiveDateTime,

    /// The CREATE TABLE statement.
    pub create_table: String,

    /// CREATE INDEX statements, in index name order.
    pub indexes: Vec<String>,

    /// ALTER TABLE ... FOREIGN KEY statements, in constraint name order.
    pub foreign_keys: Vec<String>,
}

impl GeneratedDdl {
    /// Header comment block, including the trailing blank line.
    pub fn header(&self) -> String {
        format!(
            "-- DDL for table: {}\n-- Generated by {} on {}\n\n",
            self.table.full_name(),
            GENERATOR_NAME,
            self.generated_at.format(HEADER_TIMESTAMP_FORMAT)
        )
    }

    /// Everything after the header. Deterministic for a given catalog state.
    pub fn body(&self) -> String {
        let mut out = String::with_capacity(self.create_table.len() + 256);
        out.push_str(&self.create_table);
        out.push('\n');

        push_section(&mut out, "-- Indexes", &self.indexes);
        push_section(&mut out, "-- Foreign Key Constraints", &self.foreign_keys);

        out
    }

    /// The complete script.
    pub fn to_sql(&self) -> String {
        let mut out = self.header();
        out.push_str(&self.body());
        out
    }

    /// Total number of statements in the script.
    pub fn statement_count(&self) -> usize {
        1 + self.indexes.len() + self.foreign_keys.len()
    }
}

impl fmt::Display for GeneratedDdl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn push_section(out: &mut String, title: &str, statements: &[String]) {
    if statements.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    for stmt in statements {
        out.push_str(stmt);
        out.push('\n');
    }
}
