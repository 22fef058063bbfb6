//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// The file may be partial; missing connection fields fall back to their
    /// defaults and are checked later by [`ConnectionConfig::validate`] once
    /// command-line overrides have been applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

impl ConnectionConfig {
    /// Validate the connection settings.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Named instance, if one is set. A blank name counts as no instance.
    pub fn instance(&self) -> Option<&str> {
        self.instance_name
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
    }

    /// Human-readable server address, including the instance name when set.
    pub fn server_display(&self) -> String {
        match self.instance() {
            Some(instance) => format!("{}:{}\\{}", self.host, self.port, instance),
            None => format!("{}:{}", self.host, self.port),
        }
    }
}

/// Split a comma-separated table list, trimming whitespace and dropping empties.
pub fn parse_table_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
