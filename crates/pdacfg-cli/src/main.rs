//! pdacfg CLI - Convert pushdown automata into context-free grammars.
//!
//! Reads JSON or XML automaton definitions, validates and normalizes them, builds the
//! equivalent grammar, simulates runs and renders state diagrams.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pdacfg_core::Acceptance;
use pdacfg_viz::ExportFormat;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::config as config_cmd;
use config::Config;

/// pdacfg - Pushdown automaton to context-free grammar converter.
#[derive(Parser, Debug)]
#[command(
    name = "pdacfg",
    author,
    version,
    about = "pdacfg: Convert pushdown automata into context-free grammars",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a definition file and print a summary.
    Check {
        /// Automaton definition (JSON, or XML for `.xml` files).
        file: PathBuf,
    },

    /// Show how each transition splits into single-effect steps.
    Normalize {
        /// Automaton definition (JSON, or XML for `.xml` files).
        file: PathBuf,
    },

    /// Convert the automaton into a context-free grammar.
    Convert {
        /// Automaton definition (JSON, or XML for `.xml` files).
        file: PathBuf,

        /// Acceptance mode: final-state or direct.
        #[arg(short, long)]
        acceptance: Option<Acceptance>,

        /// List each head once with alternatives separated by `|`.
        #[arg(short, long)]
        grouped: bool,

        /// Emit the grammar as JSON.
        #[arg(long)]
        json: bool,

        /// Write the grammar to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Simulate the automaton on input words.
    Run {
        /// Automaton definition (JSON, or XML for `.xml` files).
        file: PathBuf,

        /// Words to run; `λ` or "" is the empty word.
        #[arg(required = true)]
        words: Vec<String>,

        /// Also check membership in the synthesized grammar.
        #[arg(long)]
        check_grammar: bool,

        /// Emit results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List words of bounded length derived by the grammar.
    Sample {
        /// Automaton definition (JSON, or XML for `.xml` files).
        file: PathBuf,

        /// Longest word to list.
        #[arg(short = 'n', long)]
        max_len: Option<usize>,

        /// Acceptance mode: final-state or direct.
        #[arg(short, long)]
        acceptance: Option<Acceptance>,
    },

    /// Render the state diagram with Graphviz.
    Render {
        /// Automaton definition (JSON, or XML for `.xml` files).
        file: PathBuf,

        /// Output format: gv, svg, png or pdf.
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Output file (defaults to the definition path with the format's extension).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Draw the normalized automaton instead.
        #[arg(long)]
        normalized: bool,
    },

    /// Print or write a sample definition.
    Example {
        /// Sample name: anbn, dyck or two-finals.
        #[arg(default_value = "anbn")]
        name: String,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Get a configuration value.
    Get {
        /// Configuration key.
        key: String,
    },

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity; RUST_LOG wins when set
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Check { file } => commands::automaton::check(&file)?,

        Commands::Normalize { file } => commands::automaton::normalize(&file)?,

        Commands::Convert {
            file,
            acceptance,
            grouped,
            json,
            output,
        } => commands::convert::convert(&config, &file, acceptance, grouped, json, output)?,

        Commands::Run {
            file,
            words,
            check_grammar,
            json,
        } => commands::automaton::run(&config, &file, &words, check_grammar, json)?,

        Commands::Sample {
            file,
            max_len,
            acceptance,
        } => commands::convert::sample(&config, &file, acceptance, max_len)?,

        Commands::Render {
            file,
            format,
            output,
            normalized,
        } => commands::render::execute(&config, &file, format, output, normalized)?,

        Commands::Example { name, output } => commands::example::execute(&name, output)?,

        Commands::Config(config_cmd_inner) => {
            match config_cmd_inner {
                ConfigCommands::Show => {
                    config_cmd::show(&config)?;
                }
                ConfigCommands::Set { key, value } => {
                    let mut stored = Config::load_file()?;
                    config_cmd::set(&mut stored, &key, &value)?;
                }
                ConfigCommands::Get { key } => {
                    config_cmd::get(&config, &key)?;
                }
                ConfigCommands::Reset => {
                    config_cmd::reset()?;
                }
                ConfigCommands::Path => {
                    if let Some(path) = Config::config_file_path() {
                        println!("{}", path.display());
                    } else {
                        println!("(no config file path available)");
                    }
                }
            }
        }
    }

    Ok(())
}
