//! `render` command: draw the automaton with Graphviz.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pdacfg_core::normalize;
use pdacfg_viz::{export, AutomatonDiagram, ExportFormat};

use super::load_automaton;
use crate::config::Config;

/// Render the automaton (or its normalized form) to a file.
pub fn execute(
    config: &Config,
    path: &Path,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    normalized: bool,
) -> Result<()> {
    let pda = load_automaton(path)?;
    let format = format.unwrap_or(config.export_format);
    let output = output.unwrap_or_else(|| path.with_extension(format.extension()));

    let diagram = if normalized {
        AutomatonDiagram::from_normalized(&normalize(&pda))
    } else {
        AutomatonDiagram::from_automaton(&pda)
    };

    export(&diagram.to_dot(), format, &output, &config.graphviz)
        .with_context(|| format!("Failed to export diagram to {}", output.display()))?;

    println!(
        "✅ Rendered {} states and {} moves to {}",
        diagram.node_count(),
        diagram.edge_count(),
        output.display()
    );
    Ok(())
}
