//! Trace writer hook: provenance for every successful mutation.
//!
//! Post-phase for write tools with an active intent. Provenance is
//! best-effort: a failed append is reported on the diagnostic channel and
//! never changes the outcome of the edit.
//!
//! Whether the target is a new file is sampled in the pre phase, before the
//! tool runs; by post time the write has already landed.

use crate::core::hash;
use crate::core::mutation::classify_mutation;
use crate::core::session::{TaskSession, ToolInvocation};
use crate::core::tools::is_write_tool;
use crate::core::trace::{Contributor, Conversation, Related, RelatedKind, TraceEntry, TraceRange};
use crate::host::{resolve_workspace_path, workspace_relative, HostEnv};
use crate::hooks::{HookDecision, ToolHook, ToolResult};
use crate::storage::trace_ledger::TraceLedger;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Builds and appends a provenance entry for every successful write.
pub struct TraceWriterHook {
    host: Arc<dyn HostEnv>,
    ledger: TraceLedger,
    preexisting: Mutex<HashMap<Uuid, bool>>,
}

impl TraceWriterHook {
    #[must_use]
    pub fn new(host: Arc<dyn HostEnv>) -> Self {
        let ledger = TraceLedger::open(host.workspace_root());
        Self {
            host,
            ledger,
            preexisting: Mutex::new(HashMap::new()),
        }
    }

    fn build_related(session: &TaskSession, invocation: &ToolInvocation) -> Vec<Related> {
        let mut related = Vec::new();
        if let Some(active) = session.active_intent_id.as_ref() {
            related.push(Related {
                kind: RelatedKind::Specification,
                value: active.0.clone(),
            });
            if let Some(explicit) = invocation.intent_id() {
                if explicit != active.as_str() {
                    related.push(Related {
                        kind: RelatedKind::Requirement,
                        value: explicit.to_string(),
                    });
                }
            }
        }
        related
    }
}

impl ToolHook for TraceWriterHook {
    fn id(&self) -> &'static str {
        "trace-writer"
    }

    fn pre_execute(&self, _session: &TaskSession, invocation: &ToolInvocation) -> HookDecision {
        if is_write_tool(&invocation.tool) {
            if let Some(raw_path) = invocation.path() {
                let target = resolve_workspace_path(self.host.workspace_root(), raw_path);
                self.preexisting
                    .lock()
                    .expect("lock poisoned")
                    .insert(invocation.id, self.host.file_exists(&target));
            }
        }
        HookDecision::Pass
    }

    fn post_execute(
        &self,
        session: &TaskSession,
        invocation: &ToolInvocation,
        result: &ToolResult,
    ) -> Result<(), String> {
        if !is_write_tool(&invocation.tool) {
            return Ok(());
        }
        let existed_before = self
            .preexisting
            .lock()
            .expect("lock poisoned")
            .remove(&invocation.id);

        if !result.success {
            return Ok(());
        }
        let Some(active_intent) = session.active_intent_id.as_ref() else {
            return Ok(());
        };
        let Some(raw_path) = invocation.path() else {
            return Ok(());
        };

        let relative = workspace_relative(self.host.workspace_root(), raw_path);
        let target = resolve_workspace_path(self.host.workspace_root(), raw_path);

        let content = match invocation.content_payload() {
            Some(payload) => payload.to_string(),
            None => match self.host.read_text(&target) {
                Ok(text) => text,
                // Nothing to hash; provenance is best-effort.
                Err(_) => return Ok(()),
            },
        };

        let is_new_file = !existed_before.unwrap_or_else(|| self.host.file_exists(&target));
        let mutation_class =
            classify_mutation(invocation.mutation_class(), &content, is_new_file);
        let content_hash = hash::hash(&content);
        let end_line = content.matches('\n').count() as u64 + 1;

        let entry = TraceEntry::single_file(
            relative,
            Conversation {
                url: Some(format!("agent://task/{}", session.task_id)),
                contributor: Contributor {
                    entity_type: session.model.entity_type.clone(),
                    model_identifier: session.model.identifier.clone(),
                },
                ranges: vec![TraceRange {
                    start_line: 1,
                    end_line,
                    content_hash,
                    mutation_class,
                }],
                related: Self::build_related(session, invocation),
            },
        );
        debug_assert!(entry.references_intent(active_intent));

        self.ledger
            .append(&entry)
            .map_err(|err| format!("trace append failed: {err}"))
    }
}
