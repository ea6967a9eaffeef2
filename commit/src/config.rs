//! Commit configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;

/// Default bound on operations per batch.
pub const DEFAULT_MAX_OPERATIONS: usize = 10_000;

pub const ENV_MAX_OPERATIONS: &str = "CASCADE_MAX_OPERATIONS";
pub const ENV_AUDIT: &str = "CASCADE_AUDIT";
pub const ENV_PUSH_METADATA_CHANGES: &str = "CASCADE_PUSH_METADATA_CHANGES";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    /// A longer batch is rejected as invalid.
    pub max_operations: usize,
    /// Send audit entries to the audit sink.
    pub audit: bool,
    /// Ask the store to push notifications for counter write-backs.
    pub push_metadata_changes: bool,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            max_operations: DEFAULT_MAX_OPERATIONS,
            audit: true,
            push_metadata_changes: false,
        }
    }
}

impl CommitConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `CASCADE_*` environment variables on top of this configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(ENV_MAX_OPERATIONS) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                match trimmed.parse::<usize>() {
                    Ok(value) => self.max_operations = value,
                    Err(err) => {
                        tracing::warn!("invalid {ENV_MAX_OPERATIONS}, ignoring: {err}");
                    }
                }
            }
        }

        if let Some(raw) = lookup(ENV_AUDIT) {
            match parse_flag(&raw) {
                Some(value) => self.audit = value,
                None => tracing::warn!("invalid {ENV_AUDIT}, ignoring: {raw}"),
            }
        }

        if let Some(raw) = lookup(ENV_PUSH_METADATA_CHANGES) {
            match parse_flag(&raw) {
                Some(value) => self.push_metadata_changes = value,
                None => tracing::warn!("invalid {ENV_PUSH_METADATA_CHANGES}, ignoring: {raw}"),
            }
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
