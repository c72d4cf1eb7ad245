//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use scrivener_domain::Report;
use scrivener_session::{SessionOutput, Termination};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a session report for stdout.
    pub fn format_report(&self, report: &Report) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(report.written.join("\n")),
        }
    }

    fn format_report_table(&self, report: &Report) -> String {
        if report.is_empty() && report.unterminated.is_empty() {
            return self.colorize("No files found in the response.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Status", "Detail"]);

        for path in &report.written {
            builder.push_record(["written", path.as_str()]);
        }
        for message in &report.errors {
            builder.push_record(["failed", message.as_str()]);
        }
        for path in &report.unterminated {
            builder.push_record(["unterminated", path.as_str()]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// One-line verdict for stderr.
    pub fn summary(&self, output: &SessionOutput) -> String {
        let report = &output.report;
        let counts = format!(
            "{} of {} file(s) written",
            report.written.len(),
            report.total_files
        );

        let mut line = match &output.termination {
            Termination::Completed if !report.has_errors() => self.success(&counts),
            Termination::Completed => {
                self.warning(&format!("{}, {} failed", counts, report.errors.len()))
            }
            Termination::Cancelled => self.warning(&format!("Cancelled: {}", counts)),
            Termination::StreamFailed { reason } => {
                self.error(&format!("Stream failed ({}): {}", reason, counts))
            }
        };

        if !report.unterminated.is_empty() {
            line.push('\n');
            line.push_str(&self.warning(&format!(
                "{} record(s) never closed: {}",
                report.unterminated.len(),
                report.unterminated.join(", ")
            )));
        }
        line
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
