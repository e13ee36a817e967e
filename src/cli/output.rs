//! CLI output rendering.
//!
//! Human output is tables and plain lines; `--format json` wraps a command's
//! data in an `{ "ok": ..., "data": ... }` report so scripts can consume it.
//! Failures go to stderr and decide the process exit code.

use crate::core::error::{ExitCode, WardenError};
use crate::core::intent::Intent;
use crate::core::trace::TraceEntry;
use comfy_table::Table;
use serde::Serialize;

/// Rendering target for command output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tables and plain lines for humans.
    #[default]
    Table,
    /// A machine-readable report for scripts.
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a, T: Serialize> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a Failure>,
}

/// Prints a successful machine-readable report to stdout.
pub fn render_json<T: Serialize>(data: &T) {
    let report = JsonReport {
        ok: true,
        data: Some(data),
        failure: None,
    };
    if let Ok(json) = serde_json::to_string_pretty(&report) {
        println!("{json}");
    }
}

/// A terminal CLI failure: what went wrong, how to recover, and the exit
/// code the process should report.
///
/// The exit code is derived from the error code: a missing intent is
/// `NotFound`, a registry uniqueness violation is `Conflict`, everything
/// else is a plain `Error`.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub category: String,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip)]
    pub exit: ExitCode,
}

impl From<&WardenError> for Failure {
    fn from(err: &WardenError) -> Self {
        let exit = match err.code.as_str() {
            "not_found" => ExitCode::NotFound,
            "duplicate_intent_id" => ExitCode::Conflict,
            _ => ExitCode::Error,
        };
        Self {
            category: err.category.to_string(),
            code: err.code.clone(),
            message: err.message.clone(),
            hint: err.recovery_hint.clone(),
            exit,
        }
    }
}

/// Prints a failure in the requested format and returns its exit code.
pub fn fail(err: &WardenError, format: OutputFormat) -> ExitCode {
    let failure = Failure::from(err);
    match format {
        OutputFormat::Json => {
            let report = JsonReport::<()> {
                ok: false,
                data: None,
                failure: Some(&failure),
            };
            if let Ok(json) = serde_json::to_string_pretty(&report) {
                eprintln!("{json}");
            }
        }
        OutputFormat::Table => {
            eprintln!("Error: {err}");
            if let Some(hint) = &failure.hint {
                eprintln!("Hint: {hint}");
            }
        }
    }
    failure.exit
}

/// Builds the registry overview table: one row per intent.
#[must_use]
pub fn intent_table(intents: &[Intent]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "NAME", "STATUS", "OWNED SCOPE"]);
    for intent in intents {
        table.add_row(vec![
            intent.id.to_string(),
            intent.name.clone(),
            intent.status.to_string(),
            intent.owned_scope.join(", "),
        ]);
    }
    table
}

/// Builds the provenance table: one row per hashed range, tagged with the
/// intents the range is related to.
#[must_use]
pub fn trace_table(entries: &[TraceEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["PATH", "LINES", "MUTATION", "HASH", "RELATED"]);
    for entry in entries {
        for file in &entry.files {
            for conversation in &file.conversations {
                let related = conversation
                    .related
                    .iter()
                    .map(|r| r.value.clone())
                    .collect::<Vec<_>>()
                    .join(", ");
                for range in &conversation.ranges {
                    table.add_row(vec![
                        file.relative_path.clone(),
                        format!("{}-{}", range.start_line, range.end_line),
                        range.mutation_class.to_string(),
                        range.content_hash.clone(),
                        related.clone(),
                    ]);
                }
            }
        }
    }
    table
}
