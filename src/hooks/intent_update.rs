//! Intent update hook: advances intent status on lifecycle events.
//!
//! Post-phase only. Selection moves the intent to IN_PROGRESS, completion to
//! COMPLETED; re-issuing the same transition does not rewrite the registry.

use crate::core::intent::{IntentId, IntentStatus};
use crate::core::session::{TaskSession, ToolInvocation};
use crate::host::HostEnv;
use crate::hooks::{ToolHook, ToolResult};
use crate::storage::intent_store::{IntentStore, IntentStoreError};
use std::sync::Arc;

/// Transitions intent status on `select_active_intent` / `attempt_completion`.
pub struct IntentUpdateHook {
    store: IntentStore,
}

impl IntentUpdateHook {
    #[must_use]
    pub fn new(host: Arc<dyn HostEnv>) -> Self {
        Self {
            store: IntentStore::open(host.workspace_root()),
        }
    }
}

impl ToolHook for IntentUpdateHook {
    fn id(&self) -> &'static str {
        "intent-update"
    }

    fn post_execute(
        &self,
        session: &TaskSession,
        invocation: &ToolInvocation,
        _result: &ToolResult,
    ) -> Result<(), String> {
        let target = match invocation.tool.as_str() {
            "select_active_intent" => IntentStatus::InProgress,
            "attempt_completion" => IntentStatus::Completed,
            _ => return Ok(()),
        };

        // On selection the invocation names the intent; the session may not
        // reflect it yet.
        let intent_id = invocation
            .intent_id()
            .map(IntentId::from)
            .or_else(|| session.active_intent_id.clone());
        let Some(intent_id) = intent_id else {
            return Ok(());
        };

        match self.store.set_status(&intent_id, target) {
            Ok(_) | Err(IntentStoreError::NotFound(_)) => Ok(()),
            Err(err) => Err(format!("status update for {intent_id} failed: {err}")),
        }
    }
}
