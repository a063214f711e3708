//! Config command implementation.
//!
//! Manages CLI configuration.

use anyhow::{Context, Result};

use crate::config::Config;

const KEYS: &str =
    "graphviz, acceptance, max-stack-depth, max-configurations, export-format, sample-max-len";

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("pdacfg Configuration");
    println!("{:-<40}", "");

    println!("Graphviz Binary:     {}", config.graphviz);
    println!("Acceptance:          {}", config.acceptance);
    println!("Max Stack Depth:     {}", config.limits.max_stack_depth);
    println!("Max Configurations:  {}", config.limits.max_configurations);
    println!("Export Format:       {}", config.export_format);
    println!("Sample Max Length:   {}", config.sample_max_len);

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Set a configuration value and save `config`.
///
/// `config` should hold the file contents without environment overrides.
pub fn set(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "graphviz" | "dot" => config.graphviz = value.to_string(),
        "acceptance" => {
            config.acceptance = value.parse().map_err(anyhow::Error::msg)?;
        }
        "max-stack-depth" => {
            config.limits.max_stack_depth = value
                .parse()
                .with_context(|| format!("Invalid max-stack-depth: {}", value))?;
        }
        "max-configurations" => {
            config.limits.max_configurations = value
                .parse()
                .with_context(|| format!("Invalid max-configurations: {}", value))?;
        }
        "export-format" | "format" => {
            config.export_format = value.parse()?;
        }
        "sample-max-len" => {
            config.sample_max_len = value
                .parse()
                .with_context(|| format!("Invalid sample-max-len: {}", value))?;
        }
        _ => {
            anyhow::bail!("Unknown config key: {}. Valid keys: {}", key, KEYS);
        }
    }

    config.save()?;
    println!("Set {} to: {}", key, value);
    Ok(())
}

/// Get a configuration value.
pub fn get(config: &Config, key: &str) -> Result<()> {
    let value = match key {
        "graphviz" | "dot" => config.graphviz.clone(),
        "acceptance" => config.acceptance.to_string(),
        "max-stack-depth" => config.limits.max_stack_depth.to_string(),
        "max-configurations" => config.limits.max_configurations.to_string(),
        "export-format" | "format" => config.export_format.to_string(),
        "sample-max-len" => config.sample_max_len.to_string(),
        _ => {
            anyhow::bail!("Unknown config key: {}. Valid keys: {}", key, KEYS);
        }
    };

    println!("{}", value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn reset() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults");
    Ok(())
}
