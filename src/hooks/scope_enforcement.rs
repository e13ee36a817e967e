//! Scope enforcement hook: writes stay inside the active intent's territory.
//!
//! Enforcement is pre-execution path gating. Anything the hook cannot decide
//! (no path, unknown intent, unscoped intent) passes through; other hooks
//! and the human own those cases.

use crate::core::scope::matches_any;
use crate::core::session::{TaskSession, ToolInvocation};
use crate::core::tools::{is_write_tool, RejectionCode, RejectionError};
use crate::host::{workspace_relative, HostEnv};
use crate::hooks::{HookDecision, ToolHook};
use crate::storage::intent_store::IntentStore;
use std::sync::Arc;

/// Rejects writes outside the active intent's `owned_scope`.
pub struct ScopeEnforcementHook {
    host: Arc<dyn HostEnv>,
    store: IntentStore,
}

impl ScopeEnforcementHook {
    #[must_use]
    pub fn new(host: Arc<dyn HostEnv>) -> Self {
        let store = IntentStore::open(host.workspace_root());
        Self { host, store }
    }
}

impl ToolHook for ScopeEnforcementHook {
    fn id(&self) -> &'static str {
        "scope-enforcement"
    }

    fn pre_execute(&self, session: &TaskSession, invocation: &ToolInvocation) -> HookDecision {
        if !is_write_tool(&invocation.tool) {
            return HookDecision::Pass;
        }
        let Some(intent_id) = session.active_intent_id.as_ref() else {
            return HookDecision::Pass;
        };
        let Some(raw_path) = invocation.path() else {
            return HookDecision::Pass;
        };

        let relative = workspace_relative(self.host.workspace_root(), raw_path);

        let intent = match self.store.find(intent_id) {
            Ok(Some(intent)) => intent,
            // Cannot enforce what isn't known.
            Ok(None) => return HookDecision::Pass,
            Err(err) => {
                self.host
                    .diag(&format!("scope enforcement: registry lookup failed: {err}"));
                return HookDecision::Pass;
            }
        };

        if intent.owned_scope.is_empty() {
            return HookDecision::Pass;
        }
        if matches_any(&relative, &intent.owned_scope) {
            return HookDecision::Pass;
        }

        let allowed = intent.owned_scope.join(", ");
        let payload = RejectionError::new(
            RejectionCode::ScopeViolation,
            invocation.tool.clone(),
            format!(
                "Write to '{relative}' is outside the owned scope of intent {intent_id}"
            ),
        )
        .with_intent(Some(intent_id.clone()))
        .with_hint(format!(
            "Intent {intent_id} may only modify paths matching: {allowed}. Either work within \
             those patterns or select an intent that owns '{relative}'."
        ))
        .to_payload();
        HookDecision::Block(payload)
    }
}
