//! Grammar commands: `convert` and `sample`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pdacfg_core::{convert as convert_pda, display_word, Acceptance, Grammar, SynthesisConfig};
use tracing::info;

use super::{load_automaton, write_output};
use crate::config::Config;

fn grammar_for(config: &Config, path: &Path, acceptance: Option<Acceptance>) -> Result<Grammar> {
    let pda = load_automaton(path)?;
    let synthesis = SynthesisConfig::with_acceptance(acceptance.unwrap_or(config.acceptance));
    let conversion = convert_pda(&pda, &synthesis)
        .with_context(|| format!("Failed to convert {}", path.display()))?;
    Ok(conversion.grammar)
}

/// Convert an automaton and print or write its grammar.
pub fn convert(
    config: &Config,
    path: &Path,
    acceptance: Option<Acceptance>,
    grouped: bool,
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let grammar = grammar_for(config, path, acceptance)?;

    let rendered = if json {
        let mut text = serde_json::to_string_pretty(&grammar)?;
        text.push('\n');
        text
    } else {
        let lines = if grouped {
            grammar.render_grouped()
        } else {
            grammar.render_lines()
        };
        let mut text = lines.join("\n");
        text.push('\n');
        text
    };

    match output {
        Some(output_path) => {
            write_output(&output_path, &rendered)?;
            let stats = grammar.stats();
            info!(path = %output_path.display(), productions = stats.total(), "grammar_written");
            println!(
                "✅ Wrote {} productions over {} variables to {}",
                stats.total(),
                grammar.variables().len(),
                output_path.display()
            );
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// List the words of bounded length the grammar derives.
pub fn sample(
    config: &Config,
    path: &Path,
    acceptance: Option<Acceptance>,
    max_len: Option<usize>,
) -> Result<()> {
    let grammar = grammar_for(config, path, acceptance)?;
    let max_len = max_len.unwrap_or(config.sample_max_len);

    let mut words: Vec<_> = grammar.words_up_to(max_len).into_iter().collect();
    words.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    if words.is_empty() {
        println!("No words of length ≤ {}", max_len);
        return Ok(());
    }
    for word in &words {
        println!("{}", display_word(word));
    }
    Ok(())
}
