//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use scrivener_domain::Prompt;
use scrivener_llm::OllamaSource;
use scrivener_session::{Session, SessionOutput};
use scrivener_writer::SandboxWriter;
use std::fs;
use std::path::Path;
use tracing::info;

/// Execute the run command.
pub async fn execute_run(
    args: RunArgs,
    config: &Config,
    formatter: &Formatter,
    echo: bool,
) -> Result<SessionOutput> {
    let prompt = build_prompt(&args)?;

    let endpoint = args.endpoint.as_deref().unwrap_or(&config.llm.endpoint);
    let model = args.model.as_deref().unwrap_or(&config.llm.model);
    info!("Prompting {} on {}", model, endpoint);

    let source = OllamaSource::new(endpoint, model)?.with_max_retries(config.llm.max_retries);
    let writer = SandboxWriter::new(config.session.writer.clone())?;
    let session = Session::with_credentials(
        source,
        writer,
        &config.credentials(),
        config.session.clone(),
    )?;

    super::drive(session, &prompt, formatter, echo).await
}

/// Assemble the prompt from inline text or files.
pub fn build_prompt(args: &RunArgs) -> Result<Prompt> {
    let user = match (&args.prompt, &args.prompt_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => read_text(path)?,
        (None, None) => String::new(),
    };
    if user.trim().is_empty() {
        return Err(CliError::InvalidInput("Prompt must not be empty".to_string()));
    }

    let system = match (&args.system, &args.system_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => read_text(path)?,
        (None, None) => String::new(),
    };

    Ok(Prompt::new(system, user))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| CliError::InvalidInput(format!("Failed to read {}: {}", path.display(), e)))
}
