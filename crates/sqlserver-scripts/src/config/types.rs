//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SQL Server connection settings.
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// SQL Server connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server hostname or IP (default: "localhost").
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 1433).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Named instance, resolved through the SQL Browser service.
    #[serde(default)]
    pub instance_name: Option<String>,

    /// Database name.
    #[serde(default)]
    pub database: String,

    /// Username.
    #[serde(default)]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Schema to script (default: "dbo").
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Encrypt connection (default: false).
    #[serde(default)]
    pub encrypt: bool,

    /// Trust server certificate (default: true).
    #[serde(default = "default_true")]
    pub trust_server_cert: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            instance_name: None,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            schema: default_schema(),
            encrypt: false,
            trust_server_cert: true,
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("instance_name", &self.instance_name)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .field("encrypt", &self.encrypt)
            .field("trust_server_cert", &self.trust_server_cert)
            .finish()
    }
}

/// Per-call generation options.
///
/// Passed by value into every generation request; there is no shared mutable
/// option state between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptOptions {
    /// Emit `CREATE INDEX` statements for non-primary-key indexes.
    pub include_indexes: bool,

    /// Emit `ALTER TABLE ... FOREIGN KEY` statements.
    pub include_foreign_keys: bool,

    /// Emit `DEFAULT` clauses on non-identity columns.
    pub include_defaults: bool,

    /// Emit `IDENTITY(1,1)` on identity columns.
    pub include_identity: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            include_indexes: true,
            include_foreign_keys: true,
            include_defaults: true,
            include_identity: true,
        }
    }
}

impl ScriptOptions {
    /// Return a copy with index generation switched on or off.
    pub fn with_indexes(self, include: bool) -> Self {
        Self {
            include_indexes: include,
            ..self
        }
    }

    /// Return a copy with foreign key generation switched on or off.
    pub fn with_foreign_keys(self, include: bool) -> Self {
        Self {
            include_foreign_keys: include,
            ..self
        }
    }

    /// Return a copy with DEFAULT clauses switched on or off.
    pub fn with_defaults(self, include: bool) -> Self {
        Self {
            include_defaults: include,
            ..self
        }
    }

    /// Return a copy with IDENTITY clauses switched on or off.
    pub fn with_identity(self, include: bool) -> Self {
        Self {
            include_identity: include,
            ..self
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    1433
}

fn default_schema() -> String {
    "dbo".to_string()
}

fn default_true() -> bool {
    true
}
