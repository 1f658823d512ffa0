//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.fraudboard.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".fraudboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Reports API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Dashboard settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Triage settings.
    #[serde(default)]
    pub triage: TriageConfig,
}

/// Reports API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the oFraud backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Bearer token. Prefer the FRAUDBOARD_TOKEN env var over storing it here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Offset from UTC, in hours, used to decide calendar months.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,

    /// Output format when --format is not given.
    #[serde(default)]
    pub default_format: OutputFormat,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset(),
            default_format: OutputFormat::default(),
        }
    }
}

fn default_utc_offset() -> i32 {
    -6 // America/Mexico_City, no DST since 2022
}

impl DashboardConfig {
    /// The configured zone, or `None` when the offset is out of range.
    pub fn timezone(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours.checked_mul(3600)?)
    }
}

/// Triage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Administrators that accepted reports are assigned to.
    #[serde(default = "default_admin_pool")]
    pub admin_pool: Vec<i64>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            admin_pool: default_admin_pool(),
        }
    }
}

fn default_admin_pool() -> Vec<i64> {
    vec![1, 2, 3]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Try to load `.fraudboard.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Reject settings that would only fail later.
    pub fn validate(&self) -> Result<()> {
        if self.dashboard.timezone().is_none() {
            anyhow::bail!(
                "dashboard.utc_offset_hours out of range: {}",
                self.dashboard.utc_offset_hours
            );
        }
        if self.api.timeout_seconds == 0 {
            anyhow::bail!("api.timeout_seconds must be at least 1");
        }
        if self.triage.admin_pool.is_empty() {
            anyhow::bail!("triage.admin_pool must list at least one admin id");
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(ref token) = args.token {
            self.api.token = Some(token.clone());
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }
        if let Some(offset) = args.utc_offset {
            self.dashboard.utc_offset_hours = offset;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
