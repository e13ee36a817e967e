//! Optimistic lock hook: compare-and-set on content hashes.
//!
//! A writer that read a file supplies the hash it saw as `expected_hash`.
//! If another writer landed in between, the hashes differ and the stale
//! writer is told to re-read. Participation is opt-in: an absent or empty
//! hash downgrades to last-write-wins, which is the documented behavior for
//! first writes and deliberate resets.

use crate::core::hash;
use crate::core::session::{TaskSession, ToolInvocation};
use crate::core::tools::{is_write_tool, RejectionCode, RejectionError};
use crate::host::{resolve_workspace_path, HostEnv};
use crate::hooks::{HookDecision, ToolHook};
use std::sync::Arc;

/// Validates `expected_hash` against the current file digest on write tools.
pub struct OptimisticLockHook {
    host: Arc<dyn HostEnv>,
}

impl OptimisticLockHook {
    #[must_use]
    pub fn new(host: Arc<dyn HostEnv>) -> Self {
        Self { host }
    }
}

impl ToolHook for OptimisticLockHook {
    fn id(&self) -> &'static str {
        "optimistic-lock"
    }

    fn pre_execute(&self, session: &TaskSession, invocation: &ToolInvocation) -> HookDecision {
        if !is_write_tool(&invocation.tool) {
            return HookDecision::Pass;
        }

        let Some(expected) = invocation.expected_hash() else {
            return HookDecision::Pass;
        };
        if expected.is_empty() {
            return HookDecision::Pass;
        }

        let Some(raw_path) = invocation.path() else {
            return HookDecision::Pass;
        };
        let target = resolve_workspace_path(self.host.workspace_root(), raw_path);

        if !self.host.file_exists(&target) {
            // The caller expected an existing file that is now gone.
            let payload = RejectionError::new(
                RejectionCode::StaleFile,
                invocation.tool.clone(),
                format!("File '{raw_path}' no longer exists but an expected_hash was supplied"),
            )
            .with_intent(session.active_intent_id.clone())
            .with_hint(
                "The file was deleted since it was read. Re-plan the edit: omit expected_hash \
                 to create it fresh, or re-read the surrounding context first.",
            )
            .to_payload();
            return HookDecision::Block(payload);
        }

        let current_text = match self.host.read_text(&target) {
            Ok(text) => text,
            // The lock guards against stale content, not against a degraded
            // filesystem. An unreadable file must not become an availability
            // hazard.
            Err(_) => return HookDecision::Pass,
        };

        let current = hash::hash(&current_text);
        if current == expected {
            return HookDecision::Pass;
        }

        let payload = RejectionError::new(
            RejectionCode::StaleFile,
            invocation.tool.clone(),
            format!("File '{raw_path}' changed since it was read; the supplied expected_hash is stale"),
        )
        .with_intent(session.active_intent_id.clone())
        .with_hint(format!(
            "Current content hash is {current}. Re-read the file (or diff against this hash) and \
             retry the edit from the fresh content."
        ))
        .to_payload();
        HookDecision::Block(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::ModelDescriptor;
    use crate::host::NativeHost;

    fn session() -> TaskSession {
        TaskSession::new("task-1", ModelDescriptor::ai_agent("claude-sonnet-4"))
    }

    fn write_invocation(path: &str, expected_hash: Option<&str>) -> ToolInvocation {
        let mut inv = ToolInvocation::new("write_to_file").with_param("path", path);
        if let Some(h) = expected_hash {
            inv = inv.with_param("expected_hash", h);
        }
        inv
    }

    fn hook_in(dir: &std::path::Path) -> OptimisticLockHook {
        OptimisticLockHook::new(Arc::new(NativeHost::new(dir)))
    }

    #[test]
    fn matching_hash_passes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "content").unwrap();
        let hook = hook_in(dir.path());

        let inv = write_invocation("a.ts", Some(&hash::hash("content")));
        assert_eq!(hook.pre_execute(&session(), &inv), HookDecision::Pass);
    }

    #[test]
    fn stale_hash_blocks_with_current_hash_in_hint() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "fresh content").unwrap();
        let hook = hook_in(dir.path());

        let stale = hash::hash("what the agent saw earlier");
        let inv = write_invocation("a.ts", Some(&stale));
        let HookDecision::Block(payload) = hook.pre_execute(&session(), &inv) else {
            panic!("expected block");
        };

        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["code"], "STALE_FILE");
        let hint = value["recovery_hint"].as_str().unwrap();
        assert!(hint.contains(&hash::hash("fresh content")), "{hint}");
    }

    #[test]
    fn missing_file_with_hash_blocks_stale() {
        let dir = tempfile::tempdir().unwrap();
        let hook = hook_in(dir.path());

        let inv = write_invocation("gone.ts", Some(&hash::hash("anything")));
        let HookDecision::Block(payload) = hook.pre_execute(&session(), &inv) else {
            panic!("expected block");
        };
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["code"], "STALE_FILE");
    }

    #[test]
    fn absent_hash_passes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "content").unwrap();
        let hook = hook_in(dir.path());

        let inv = write_invocation("a.ts", None);
        assert_eq!(hook.pre_execute(&session(), &inv), HookDecision::Pass);
    }

    #[test]
    fn empty_hash_passes_for_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let hook = hook_in(dir.path());

        let inv = write_invocation("new.ts", Some(""));
        assert_eq!(hook.pre_execute(&session(), &inv), HookDecision::Pass);
    }

    #[test]
    fn non_write_tool_passes_even_with_hash() {
        let dir = tempfile::tempdir().unwrap();
        let hook = hook_in(dir.path());

        let inv = ToolInvocation::new("execute_command")
            .with_param("path", "a.ts")
            .with_param("expected_hash", hash::hash("x"));
        assert_eq!(hook.pre_execute(&session(), &inv), HookDecision::Pass);
    }

    #[test]
    fn native_args_hash_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "content").unwrap();
        let hook = hook_in(dir.path());

        let inv = ToolInvocation::new("apply_diff")
            .with_param("expected_hash", hash::hash("stale"))
            .with_native_args(crate::core::session::NativeArgs {
                path: Some("a.ts".to_string()),
                expected_hash: Some(hash::hash("content")),
                ..Default::default()
            });
        assert_eq!(hook.pre_execute(&session(), &inv), HookDecision::Pass);
    }
}
