//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scrivener - Write the files a language model describes.
#[derive(Debug, Parser)]
#[command(name = "scrivener")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SCRIVENER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory records are written under
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print the raw model output to stderr
    #[arg(long, global = true)]
    pub echo: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// JSON report (default)
    Json,
    /// Table format
    Table,
    /// Quiet format (written paths only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prompt the model and write every file it emits
    Run(RunArgs),

    /// Extract files from a saved transcript (or stdin)
    Replay(ReplayArgs),

    /// Print the effective configuration
    Config,
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// User prompt
    #[arg(required_unless_present = "prompt_file")]
    pub prompt: Option<String>,

    /// Read the user prompt from a file
    #[arg(long, conflicts_with = "prompt")]
    pub prompt_file: Option<PathBuf>,

    /// System instructions
    #[arg(short, long)]
    pub system: Option<String>,

    /// Read the system instructions from a file
    #[arg(long, conflicts_with = "system")]
    pub system_file: Option<PathBuf>,

    /// Model to use (overrides the configured model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama endpoint (overrides the configured endpoint)
    #[arg(long)]
    pub endpoint: Option<String>,
}

/// Arguments for the replay command.
#[derive(Debug, Parser)]
pub struct ReplayArgs {
    /// Transcript file; reads stdin when omitted
    pub file: Option<PathBuf>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
