//! Warden CLI entrypoint.

use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::process;
use warden::cli::commands::{
    BypassCommands, Cli, Commands, IntentCommands, IntentShowArgs, TraceCommands, TraceListArgs,
};
use warden::cli::output::{fail, intent_table, render_json, trace_table, OutputFormat};
use warden::core::context::intent_context_block;
use warden::core::error::{ExitCode, WardenError};
use warden::core::intent::{Intent, IntentId};
use warden::core::trace::TraceEntry;
use warden::hooks::authorization::parse_bypass_list;
use warden::storage::bypass_path;
use warden::storage::intent_store::IntentStore;
use warden::storage::trace_ledger::TraceLedger;

fn main() {
    let cli = Cli::parse();
    let exit_code = run(cli);
    process::exit(i32::from(exit_code));
}

fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Commands::Intent(cmd) => handle_intent(cmd, &cli.workspace, cli.format),
        Commands::Trace(cmd) => handle_trace(cmd, &cli.workspace, cli.format),
        Commands::Bypass(cmd) => handle_bypass(cmd, &cli.workspace, cli.format),
        Commands::Check => handle_check(&cli.workspace, cli.format),
    }
}

fn registry_error(err: &warden::storage::intent_store::IntentStoreError) -> WardenError {
    WardenError::registry("registry_unreadable", err.to_string(), "cli:intent")
        .with_hint("Check .orchestration/active_intents.yaml in the workspace")
}

fn handle_intent(cmd: IntentCommands, workspace: &Path, format: OutputFormat) -> ExitCode {
    let store = IntentStore::open(workspace);
    match cmd {
        IntentCommands::List => match store.list() {
            Ok(intents) => {
                match format {
                    OutputFormat::Json => render_json(&intents),
                    OutputFormat::Table => println!("{}", intent_table(&intents)),
                }
                ExitCode::Success
            }
            Err(err) => fail(&registry_error(&err), format),
        },
        IntentCommands::Show(args) => handle_intent_show(&store, workspace, &args, format),
    }
}

#[derive(Serialize)]
struct IntentShowOutput {
    #[serde(flatten)]
    intent: Intent,
    context_block: String,
}

fn handle_intent_show(
    store: &IntentStore,
    workspace: &Path,
    args: &IntentShowArgs,
    format: OutputFormat,
) -> ExitCode {
    let id = IntentId::from(args.id.as_str());
    let intent = match store.find(&id) {
        Ok(Some(intent)) => intent,
        Ok(None) => {
            let err = WardenError::user("not_found", format!("No intent '{id}'"), "cli:intent")
                .with_hint("Run 'warden intent list' to see known intents");
            return fail(&err, format);
        }
        Err(err) => return fail(&registry_error(&err), format),
    };

    let history = TraceLedger::open(workspace)
        .read_all()
        .unwrap_or_default();
    let context_block = intent_context_block(&intent, &history, args.history);

    match format {
        OutputFormat::Json => render_json(&IntentShowOutput {
            intent,
            context_block,
        }),
        OutputFormat::Table => println!("{context_block}"),
    }
    ExitCode::Success
}

fn handle_trace(cmd: TraceCommands, workspace: &Path, format: OutputFormat) -> ExitCode {
    let ledger = TraceLedger::open(workspace);
    match cmd {
        TraceCommands::List(args) => match ledger.read_all() {
            Ok(entries) => {
                let filtered = filter_entries(entries, &args);
                match format {
                    OutputFormat::Json => render_json(&filtered),
                    OutputFormat::Table => println!("{}", trace_table(&filtered)),
                }
                ExitCode::Success
            }
            Err(err) => {
                let err = WardenError::ledger("ledger_unreadable", err.to_string(), "cli:trace");
                fail(&err, format)
            }
        },
    }
}

fn filter_entries(entries: Vec<TraceEntry>, args: &TraceListArgs) -> Vec<TraceEntry> {
    let mut filtered: Vec<TraceEntry> = entries
        .into_iter()
        .filter(|e| args.path.as_deref().map_or(true, |p| e.touches_path(p)))
        .filter(|e| {
            args.intent
                .as_deref()
                .map_or(true, |i| e.references_intent(&IntentId::from(i)))
        })
        .collect();
    if let Some(limit) = args.limit {
        let skip = filtered.len().saturating_sub(limit);
        filtered.drain(..skip);
    }
    filtered
}

fn handle_bypass(cmd: BypassCommands, workspace: &Path, format: OutputFormat) -> ExitCode {
    match cmd {
        BypassCommands::List => {
            let ids = match std::fs::read_to_string(bypass_path(workspace)) {
                Ok(text) => {
                    let mut ids: Vec<String> = parse_bypass_list(&text).into_iter().collect();
                    ids.sort();
                    ids
                }
                Err(_) => Vec::new(),
            };
            match format {
                OutputFormat::Json => render_json(&ids),
                OutputFormat::Table => {
                    for id in &ids {
                        println!("{id}");
                    }
                }
            }
            ExitCode::Success
        }
    }
}

#[derive(Serialize)]
struct CheckReport {
    intents: usize,
    duplicate_ids: Vec<String>,
    trace_entries: usize,
    malformed_trace_lines: usize,
}

fn handle_check(workspace: &Path, format: OutputFormat) -> ExitCode {
    let intents = match IntentStore::open(workspace).list() {
        Ok(intents) => intents,
        Err(err) => return fail(&registry_error(&err), format),
    };

    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();
    for intent in &intents {
        if !seen.insert(intent.id.as_str().to_string()) {
            duplicates.push(intent.id.to_string());
        }
    }

    let scan = match TraceLedger::open(workspace).scan() {
        Ok(scan) => scan,
        Err(err) => {
            let err = WardenError::ledger("ledger_unreadable", err.to_string(), "cli:check");
            return fail(&err, format);
        }
    };

    let report = CheckReport {
        intents: intents.len(),
        duplicate_ids: duplicates.clone(),
        trace_entries: scan.entries.len(),
        malformed_trace_lines: scan.malformed_lines,
    };
    match format {
        OutputFormat::Json => render_json(&report),
        OutputFormat::Table => {
            println!("intents: {}", report.intents);
            println!("trace entries: {}", report.trace_entries);
            if report.malformed_trace_lines > 0 {
                println!("malformed trace lines: {}", report.malformed_trace_lines);
            }
        }
    }

    if duplicates.is_empty() {
        ExitCode::Success
    } else {
        let err = WardenError::registry(
            "duplicate_intent_id",
            format!(
                "Registry contains duplicate intent ids: {}",
                duplicates.join(", ")
            ),
            "cli:check",
        );
        fail(&err, format)
    }
}
