//! Scrivener CLI - Write the files a language model describes.

use anyhow::Context;
use clap::Parser;
use scrivener_cli::commands::{self, EXIT_FATAL};
use scrivener_cli::{Cli, Command, Config, Formatter};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Log to stderr; `--verbose` forces debug, otherwise `RUST_LOG` or info.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    // Load config, then apply command-line overrides
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(root) = cli.root {
        config.set_root(root);
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Run(args) => {
            let output = commands::execute_run(args, &config, &formatter, cli.echo)
                .await
                .context("Run failed")?;
            Ok(commands::exit_code(&output))
        }
        Command::Replay(args) => {
            let output = commands::execute_replay(args, &config, &formatter, cli.echo)
                .await
                .context("Replay failed")?;
            Ok(commands::exit_code(&output))
        }
        Command::Config => {
            commands::execute_config(&config)?;
            Ok(commands::EXIT_OK)
        }
    }
}
