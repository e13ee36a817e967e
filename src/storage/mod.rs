//! Persistence layer: the intent registry and the provenance ledger.
//!
//! Both files live under `<workspace>/.orchestration/`. The intent store
//! exclusively owns the registry; the trace ledger exclusively owns the
//! trace file. Hooks share read access via the stores' queries.

pub mod intent_store;
pub mod trace_ledger;

use std::path::{Path, PathBuf};

/// Directory under the workspace root holding all governance state.
pub const ORCHESTRATION_DIR: &str = ".orchestration";
/// Intent registry file name.
pub const INTENT_REGISTRY_FILE: &str = "active_intents.yaml";
/// Provenance ledger file name.
pub const TRACE_LEDGER_FILE: &str = "agent_trace.jsonl";
/// Authorization bypass list file name.
pub const BYPASS_FILE: &str = ".intentignore";

/// Path of the intent registry for a workspace.
#[must_use]
pub fn registry_path(workspace: &Path) -> PathBuf {
    workspace.join(ORCHESTRATION_DIR).join(INTENT_REGISTRY_FILE)
}

/// Path of the trace ledger for a workspace.
#[must_use]
pub fn ledger_path(workspace: &Path) -> PathBuf {
    workspace.join(ORCHESTRATION_DIR).join(TRACE_LEDGER_FILE)
}

/// Path of the bypass list for a workspace.
#[must_use]
pub fn bypass_path(workspace: &Path) -> PathBuf {
    workspace.join(ORCHESTRATION_DIR).join(BYPASS_FILE)
}
