//! CLI configuration management.
//!
//! Values come from built-in defaults, then the config file, then
//! environment variables (a `.env` file is honored), then command-line flags.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use pdacfg_core::{Acceptance, SimulationLimits};
use pdacfg_viz::{ExportFormat, DEFAULT_GRAPHVIZ};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Overrides the config file location.
pub const CONFIG_FILE_ENV: &str = "PDACFG_CONFIG";

/// Application-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Graphviz binary used for image export.
    pub graphviz: String,

    /// Acceptance mode used by `convert`, `run --check-grammar` and `sample`.
    pub acceptance: Acceptance,

    /// Bounds for `run`.
    pub limits: SimulationLimits,

    /// Format used by `render` when none is given.
    pub export_format: ExportFormat,

    /// Longest word listed by `sample` when no bound is given.
    pub sample_max_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            graphviz: DEFAULT_GRAPHVIZ.to_string(),
            acceptance: Acceptance::default(),
            limits: SimulationLimits::default(),
            export_format: ExportFormat::default(),
            sample_max_len: 6,
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = Self::load_file()?;
        config.apply_env()?;
        Ok(config)
    }

    /// Load defaults overlaid with the config file only.
    ///
    /// Commands that write the file back start from this, so environment
    /// overrides never end up persisted.
    pub fn load_file() -> Result<Self> {
        let Some(config_path) = Self::config_file_path() else {
            return Ok(Self::default());
        };
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        debug!(path = %config_path.display(), "config_file_loaded");
        Ok(config)
    }

    /// Environment variables take precedence over the file.
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(binary) = std::env::var("PDACFG_GRAPHVIZ") {
            self.graphviz = binary;
        }
        if let Ok(value) = std::env::var("PDACFG_ACCEPTANCE") {
            self.acceptance = parse_env("PDACFG_ACCEPTANCE", &value)?;
        }
        if let Ok(value) = std::env::var("PDACFG_MAX_STACK_DEPTH") {
            self.limits.max_stack_depth = parse_env("PDACFG_MAX_STACK_DEPTH", &value)?;
        }
        if let Ok(value) = std::env::var("PDACFG_MAX_CONFIGURATIONS") {
            self.limits.max_configurations = parse_env("PDACFG_MAX_CONFIGURATIONS", &value)?;
        }
        if let Ok(value) = std::env::var("PDACFG_EXPORT_FORMAT") {
            self.export_format = parse_env("PDACFG_EXPORT_FORMAT", &value)?;
        }
        Ok(())
    }

    /// Save current configuration to the config file.
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_file_path() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
            let contents = serde_json::to_string_pretty(self)?;
            std::fs::write(&config_path, contents)
                .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
        }
        Ok(())
    }

    /// Get the path to the config file.
    pub fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("dev", "pdacfg", "pdacfg")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

fn parse_env<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| anyhow::anyhow!("Invalid value for {}: {}", name, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "graphviz": "/opt/dot" }"#).unwrap();
        assert_eq!(config.graphviz, "/opt/dot");
        assert_eq!(config.acceptance, Acceptance::FinalState);
        assert_eq!(config.limits, SimulationLimits::default());
        assert_eq!(config.sample_max_len, 6);
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = Config {
            acceptance: Acceptance::Direct,
            export_format: ExportFormat::Png,
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"direct\""));
        assert!(json.contains("\"png\""));
        assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), config);
    }

    #[test]
    fn test_parse_env_reports_name() {
        let err = parse_env::<usize>("PDACFG_MAX_STACK_DEPTH", "deep").unwrap_err();
        assert!(err.to_string().contains("PDACFG_MAX_STACK_DEPTH"));
    }
}
