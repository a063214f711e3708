//! CLI command implementations.

pub mod automaton;
pub mod config;
pub mod convert;
pub mod example;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use pdacfg_core::{load_definition, PushdownAutomaton};

/// Load and validate an automaton definition file.
pub fn load_automaton(path: &Path) -> Result<PushdownAutomaton> {
    load_definition(path)
        .with_context(|| format!("Failed to load automaton from {}", path.display()))
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))
}
