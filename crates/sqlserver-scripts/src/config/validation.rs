//! Configuration validation.

use super::ConnectionConfig;
use crate::error::{Result, ScriptError};

/// Validate connection settings before dialing the server.
pub fn validate(config: &ConnectionConfig) -> Result<()> {
    if config.host.trim().is_empty() {
        return Err(ScriptError::Config("server is required".into()));
    }
    if config.port == 0 {
        return Err(ScriptError::Config("port must be between 1 and 65535".into()));
    }
    if config.database.is_empty() {
        return Err(ScriptError::Config("database is required".into()));
    }
    if config.user.is_empty() {
        return Err(ScriptError::Config("user is required".into()));
    }
    if config.password.is_empty() {
        return Err(ScriptError::Config("password is required".into()));
    }
    if config.schema.trim().is_empty() {
        return Err(ScriptError::Config("schema cannot be empty".into()));
    }
    if let Some(instance) = config.instance() {
        if instance.contains('\\') || instance.contains(';') {
            return Err(ScriptError::Config(format!(
                "instance name contains an invalid character: '{}'",
                instance
            )));
        }
    }

    Ok(())
}
