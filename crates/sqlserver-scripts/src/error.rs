//! Error types for DDL generation.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed underlying cause of a catalog failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for scripting operations.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The requested table does not exist in the target schema.
    #[error("Table '{table}' not found in schema '{schema}'")]
    NotFound { schema: String, table: String },

    /// A catalog query failed (connectivity, permissions, malformed catalog state).
    #[error("Metadata query '{operation}' failed: {source}")]
    MetadataQuery {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// Could not establish the catalog connection.
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Writing generated DDL to disk failed.
    #[error("Failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error outside of DDL output (config file reads, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Interactive prompt failed or was aborted.
    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl ScriptError {
    /// Create a NotFound error for a schema-qualified table.
    pub fn not_found(schema: impl Into<String>, table: impl Into<String>) -> Self {
        ScriptError::NotFound {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Wrap a driver failure raised while running catalog query `operation`.
    pub fn metadata<E>(operation: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        ScriptError::MetadataQuery {
            operation,
            source: source.into(),
        }
    }

    /// Create a Connection error with an underlying cause.
    pub fn connection<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        ScriptError::Connection {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create an OutputWrite error for `path`.
    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScriptError::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// True when the table was simply absent from the catalog.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScriptError::NotFound { .. })
    }

    /// Process exit code for this error.
    ///
    /// Every failure that reaches the top level maps to 1.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for scripting operations.
pub type Result<T> = std::result::Result<T, ScriptError>;
