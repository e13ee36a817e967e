//! Gatekeeper hook: no side-effects without a declared intent.
//!
//! Presence check only. Never consults the registry, so it is O(1) and
//! cannot fail on I/O.

use crate::core::session::{TaskSession, ToolInvocation};
use crate::hooks::{HookDecision, ToolHook};

/// Tools that produce side-effects and therefore require an active intent.
const SIDE_EFFECTING_TOOLS: &[&str] = &[
    "write_to_file",
    "apply_diff",
    "execute_command",
    "insert_content",
    "search_and_replace",
    "browser_action",
    "use_mcp_tool",
    "switch_mode",
    "new_task",
];

/// Fixed governance message returned when work starts without an intent.
pub const GOVERNANCE_MESSAGE: &str = "\
No active intent is selected for this task. Every side-effecting tool call \
must be attributable to a declared business intent. Call \
select_active_intent with one of the intent ids from the governance context \
before writing files or running commands.";

/// Blocks side-effecting tools until the task has an active intent.
pub struct GatekeeperHook;

impl GatekeeperHook {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for GatekeeperHook {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolHook for GatekeeperHook {
    fn id(&self) -> &'static str {
        "gatekeeper"
    }

    fn pre_execute(&self, session: &TaskSession, invocation: &ToolInvocation) -> HookDecision {
        if SIDE_EFFECTING_TOOLS.contains(&invocation.tool.as_str())
            && session.active_intent_id.is_none()
        {
            return HookDecision::Block(GOVERNANCE_MESSAGE.to_string());
        }
        HookDecision::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::ModelDescriptor;

    fn session() -> TaskSession {
        TaskSession::new("task-1", ModelDescriptor::ai_agent("claude-sonnet-4"))
    }

    #[test]
    fn blocks_side_effecting_tool_without_intent() {
        let hook = GatekeeperHook::new();
        for tool in SIDE_EFFECTING_TOOLS {
            let decision = hook.pre_execute(&session(), &ToolInvocation::new(*tool));
            assert_eq!(
                decision,
                HookDecision::Block(GOVERNANCE_MESSAGE.to_string()),
                "{tool}"
            );
        }
    }

    #[test]
    fn passes_side_effecting_tool_with_intent() {
        let hook = GatekeeperHook::new();
        let mut session = session();
        session.select_intent("INT-001");
        assert_eq!(
            hook.pre_execute(&session, &ToolInvocation::new("write_to_file")),
            HookDecision::Pass
        );
    }

    #[test]
    fn passes_read_only_tools_without_intent() {
        let hook = GatekeeperHook::new();
        for tool in ["read_file", "codebase_search", "select_active_intent"] {
            assert_eq!(
                hook.pre_execute(&session(), &ToolInvocation::new(tool)),
                HookDecision::Pass,
                "{tool}"
            );
        }
    }
}
