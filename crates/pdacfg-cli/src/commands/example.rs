//! `example` command: emit a ready-made definition file.

use std::path::PathBuf;

use anyhow::Result;
use pdacfg_core::{samples, AutomatonDefinition, DefinitionFormat};

use super::write_output;

/// Print or write the sample definition called `name`.
///
/// Output paths ending in `.xml` get the XML layout; stdout is always JSON.
pub fn execute(name: &str, output: Option<PathBuf>) -> Result<()> {
    let pda = samples::by_name(name).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown sample: {}. Available samples: {}",
            name,
            samples::SAMPLE_NAMES.join(", ")
        )
    })?;

    let definition = AutomatonDefinition::from_automaton(&pda, Some(name.to_string()));
    match output {
        Some(path) => {
            let format = DefinitionFormat::from_path(&path);
            let mut text = definition.render(format)?;
            if !text.ends_with('\n') {
                text.push('\n');
            }
            write_output(&path, &text)?;
            println!("✅ Wrote {} sample to {}", name, path.display());
        }
        None => println!("{}", definition.to_json()?),
    }
    Ok(())
}
