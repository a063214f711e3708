//! Automaton inspection commands: `check`, `normalize` and `run`.

use std::path::Path;

use anyhow::{Context, Result};
use pdacfg_core::{convert, display_word, normalize as normalize_pda, SynthesisConfig, Verdict};
use serde::Serialize;
use tracing::warn;

use super::load_automaton;
use crate::config::Config;

/// Validate a definition and print its summary.
pub fn check(path: &Path) -> Result<()> {
    let pda = load_automaton(path)?;

    print!("{}", pda);
    println!();
    println!(
        "✅ Valid automaton: {} states, {} transitions ({} need normalization)",
        pda.states().len(),
        pda.transitions().len(),
        pda.non_canonical_count()
    );
    Ok(())
}

/// Print the single-effect steps each transition expands into.
pub fn normalize(path: &Path) -> Result<()> {
    let pda = load_automaton(path)?;
    let normalized = normalize_pda(&pda);

    for (index, transition) in pda.transitions().iter().enumerate() {
        println!("[{}] {}", index, transition);
        for step in normalized.steps_for(index) {
            println!("      {}", step);
        }
    }

    println!();
    if normalized.fresh_states().is_empty() {
        println!("No fresh states needed");
    } else {
        let fresh: Vec<&str> = normalized.fresh_states().iter().map(|s| s.name()).collect();
        println!("Fresh states: {}", fresh.join(", "));
    }
    println!(
        "{} transitions → {} steps",
        pda.transitions().len(),
        normalized.transitions().len()
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct RunReport {
    word: String,
    verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    grammar_derives: Option<bool>,
}

/// Simulate the automaton on each word.
pub fn run(
    config: &Config,
    path: &Path,
    words: &[String],
    check_grammar: bool,
    json: bool,
) -> Result<()> {
    let pda = load_automaton(path)?;
    let grammar = if check_grammar {
        let synthesis = SynthesisConfig::with_acceptance(config.acceptance);
        Some(
            convert(&pda, &synthesis)
                .context("Failed to convert automaton")?
                .grammar,
        )
    } else {
        None
    };

    let mut reports = Vec::with_capacity(words.len());
    for text in words {
        let word = pda
            .parse_word(text)
            .with_context(|| format!("Invalid input word {:?}", text))?;
        let verdict = pda.run(&word, &config.limits);
        let grammar_derives = grammar.as_ref().map(|g| g.derives(&word));

        if let Some(derives) = grammar_derives {
            let disagrees = match verdict {
                Verdict::Accepted => !derives,
                Verdict::Rejected => derives,
                Verdict::Undecided => false,
            };
            if disagrees {
                warn!(word = %display_word(&word), %verdict, derives, "grammar_disagrees");
            }
        }

        reports.push(RunReport {
            word: display_word(&word),
            verdict,
            grammar_derives,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        let mark = match report.verdict {
            Verdict::Accepted => "✅",
            Verdict::Rejected => "❌",
            Verdict::Undecided => "❔",
        };
        match report.grammar_derives {
            Some(derives) => println!(
                "{} {}: {} (grammar: {})",
                mark,
                report.word,
                report.verdict,
                if derives { "derives" } else { "does not derive" }
            ),
            None => println!("{} {}: {}", mark, report.word, report.verdict),
        }
    }
    Ok(())
}
