//! Replay command implementation.

use crate::cli::ReplayArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use scrivener_domain::{ApiToken, Prompt};
use scrivener_llm::ReaderSource;
use scrivener_session::{Session, SessionOutput};
use scrivener_writer::SandboxWriter;
use tracing::info;

/// Execute the replay command.
///
/// Feeds a saved transcript through the same extraction and writing path a
/// live run uses. No model is contacted and no token is needed.
pub async fn execute_replay(
    args: ReplayArgs,
    config: &Config,
    formatter: &Formatter,
    echo: bool,
) -> Result<SessionOutput> {
    let writer = SandboxWriter::new(config.session.writer.clone())?;
    let prompt = Prompt::default();

    match args.file {
        Some(path) => {
            info!("Replaying {}", path.display());
            let file = tokio::fs::File::open(&path).await.map_err(|e| {
                CliError::InvalidInput(format!("Failed to open {}: {}", path.display(), e))
            })?;
            let session = Session::new(
                ReaderSource::new(file),
                writer,
                ApiToken::anonymous(),
                config.session.clone(),
            )?;
            super::drive(session, &prompt, formatter, echo).await
        }
        None => {
            info!("Replaying stdin");
            let session = Session::new(
                ReaderSource::stdin(),
                writer,
                ApiToken::anonymous(),
                config.session.clone(),
            )?;
            super::drive(session, &prompt, formatter, echo).await
        }
    }
}
