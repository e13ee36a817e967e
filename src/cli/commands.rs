//! CLI command definitions.
//!
//! The CLI is an inspection surface over governance state; enforcement
//! itself runs inside the hook pipeline embedded in the editor host.

use super::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Warden CLI - inspect intent governance state for a workspace.
#[derive(Parser)]
#[command(name = "warden")]
#[command(version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Workspace root containing the .orchestration directory
    #[arg(long, short = 'w', global = true, default_value = ".")]
    pub workspace: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Intent registry commands
    #[command(subcommand)]
    Intent(IntentCommands),

    /// Provenance trace commands
    #[command(subcommand)]
    Trace(TraceCommands),

    /// Authorization bypass list commands
    #[command(subcommand)]
    Bypass(BypassCommands),

    /// Validate the registry and ledger files
    Check,
}

/// Intent registry subcommands.
#[derive(Subcommand)]
pub enum IntentCommands {
    /// List all intents in the registry
    List,
    /// Show one intent, including its governance context block
    Show(IntentShowArgs),
}

#[derive(Args)]
pub struct IntentShowArgs {
    /// Intent ID (e.g. INT-001)
    pub id: String,

    /// Maximum prior trace entries to include in the context block
    #[arg(long, default_value_t = 5)]
    pub history: usize,
}

/// Trace ledger subcommands.
#[derive(Subcommand)]
pub enum TraceCommands {
    /// List trace entries, newest last
    List(TraceListArgs),
}

#[derive(Args)]
pub struct TraceListArgs {
    /// Only entries touching this workspace-relative path
    #[arg(long)]
    pub path: Option<String>,

    /// Only entries related to this intent id
    #[arg(long)]
    pub intent: Option<String>,

    /// Maximum entries to print (from the end of the ledger)
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Bypass list subcommands.
#[derive(Subcommand)]
pub enum BypassCommands {
    /// Show intents authorized to skip the approval dialog
    List,
}
