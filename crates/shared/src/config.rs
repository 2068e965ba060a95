//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::role::Role;

/// Moderation configuration (moderation.yaml / moderation.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationConfig {
    /// Named timeout durations offered to moderators, in minutes
    #[serde(default = "default_timeout_presets")]
    pub timeout_presets: BTreeMap<String, i64>,

    /// Maximum number of audit entries kept in memory
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,

    /// Default profile file for the CLI
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Lowest role that still holds moderation power
    #[serde(default = "default_power_floor")]
    pub power_floor: Role,
}

fn default_timeout_presets() -> BTreeMap<String, i64> {
    BTreeMap::from([
        ("short".to_string(), 5),
        ("hour".to_string(), 60),
        ("day".to_string(), 1440),
    ])
}

fn default_audit_capacity() -> usize {
    10_000
}

fn default_power_floor() -> Role {
    Role::Admin
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            timeout_presets: default_timeout_presets(),
            audit_capacity: default_audit_capacity(),
            store_path: None,
            power_floor: default_power_floor(),
        }
    }
}

impl ModerationConfig {
    /// Load configuration from a YAML or JSON file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audit_capacity == 0 {
            return Err(ConfigError::Invalid("auditCapacity must be positive".to_string()));
        }
        if let Some((name, minutes)) = self.timeout_presets.iter().find(|(_, m)| **m <= 0) {
            return Err(ConfigError::Invalid(format!(
                "timeout preset '{}' must be positive, got {}",
                name, minutes
            )));
        }
        Ok(())
    }

    /// Minutes for a named preset
    pub fn preset_minutes(&self, name: &str) -> Option<i64> {
        self.timeout_presets.get(name).copied()
    }
}
