//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for session results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every persona's answer followed by the synthesis
    Full,
    /// Only the final synthesis
    Synthesis,
    /// The whole session record as JSON
    Json,
}

/// CLI arguments for persona-council
#[derive(Parser, Debug)]
#[command(name = "persona-council")]
#[command(author, version, about = "Persona Council - Several personas answer one query, then one synthesis")]
#[command(long_about = r#"
Persona Council asks a set of personas the same question and merges their
answers into one synthesis.

The process has two steps:
1. Batch: every persona answers your query in parallel
2. Synthesis: a synthesizer combines all answers (skip with --no-synthesis)

A persona that fails is reported with its error; the rest still answer.

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables (e.g. COUNCIL_ENGINE__MAX_CONCURRENCY=4)
2. --config <path>                               Explicit config file
3. ./persona-council.toml                        Project-level config
4. ~/.config/persona-council/config.toml         Global config

Example:
  persona-council -p 12 -p 31 "Would you pay for a meal-kit subscription?"
  persona-council -p 12 -p 31 -o full --stream "How do you plan your week?"
"#)]
pub struct Cli {
    /// The query every persona answers
    #[arg(required_unless_present = "show_config")]
    pub query: Option<String>,

    /// Persona ids to consult (can be specified multiple times)
    #[arg(short, long = "persona", value_name = "ID")]
    pub personas: Vec<String>,

    /// Skip the synthesis step
    #[arg(long)]
    pub no_synthesis: bool,

    /// Session id (defaults to a generated one)
    #[arg(long, value_name = "ID")]
    pub session_id: Option<String>,

    /// Output format (defaults to the config file, then "synthesis")
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Print coordination events as they happen
    #[arg(long)]
    pub stream: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write diagnostic logs to daily files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}
