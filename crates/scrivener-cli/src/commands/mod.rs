//! Command implementations.

pub mod config;
pub mod replay;
pub mod run;

pub use self::config::execute_config;
pub use self::replay::execute_replay;
pub use self::run::execute_run;

use crate::error::Result;
use crate::output::Formatter;
use scrivener_domain::traits::{FragmentSource, RecordWriter};
use scrivener_domain::Prompt;
use scrivener_session::{Session, SessionOutput, Termination};
use std::fmt::Display;

/// Exit status: everything written
pub const EXIT_OK: u8 = 0;

/// Exit status: the session could not run at all
pub const EXIT_FATAL: u8 = 1;

/// Exit status: some records failed or the stream did not complete
pub const EXIT_INCOMPLETE: u8 = 2;

/// Map a finished session to the process exit status.
pub fn exit_code(output: &SessionOutput) -> u8 {
    match output.termination {
        Termination::Completed if !output.report.has_errors() => EXIT_OK,
        _ => EXIT_INCOMPLETE,
    }
}

/// Run a session until it ends or Ctrl+C, then print its report.
///
/// The report goes to stdout; the summary and the optional raw transcript
/// go to stderr so stdout stays machine-readable.
pub(crate) async fn drive<S, W>(
    session: Session<S, W>,
    prompt: &Prompt,
    formatter: &Formatter,
    echo: bool,
) -> Result<SessionOutput>
where
    S: FragmentSource,
    S::Error: Display,
    W: RecordWriter,
{
    let output = session.run_until(prompt, tokio::signal::ctrl_c()).await?;

    if echo {
        eprintln!("{}", output.raw_text);
    }
    println!("{}", formatter.format_report(&output.report)?);
    eprintln!("{}", formatter.summary(&output));

    Ok(output)
}
