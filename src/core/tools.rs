//! Tool-name classification and structured rejection payloads.
//!
//! Every tool the agent can invoke is either read-only (SAFE), side-effecting
//! (DESTRUCTIVE), or unrecognized (UNKNOWN). Rejections flow back to the LLM
//! as self-describing JSON so the agent can recover without human help.

use crate::core::intent::IntentId;
use serde::{Deserialize, Serialize};

/// Read-only and session-control tools. Never gated by the authorization hook.
pub const SAFE_TOOLS: &[&str] = &[
    "read_file",
    "list_files",
    "search_files",
    "codebase_search",
    "ask_followup_question",
    "attempt_completion",
    "read_command_output",
    "select_active_intent",
    "update_todo_list",
];

/// Tools that write files, run commands, or otherwise produce side-effects.
pub const DESTRUCTIVE_TOOLS: &[&str] = &[
    "write_to_file",
    "apply_diff",
    "edit",
    "search_and_replace",
    "search_replace",
    "edit_file",
    "apply_patch",
    "execute_command",
    "use_mcp_tool",
    "access_mcp_resource",
    "switch_mode",
    "new_task",
    "generate_image",
    "run_slash_command",
    "skill",
];

/// Subset of destructive tools that mutate file content. The optimistic lock,
/// scope enforcement, and trace writer hooks apply only to these.
pub const WRITE_TOOLS: &[&str] = &[
    "write_to_file",
    "apply_diff",
    "edit",
    "search_and_replace",
    "search_replace",
    "edit_file",
    "apply_patch",
    "insert_content",
];

/// Classification of a tool name.
///
/// UNKNOWN tools currently bypass the authorization hook (it triggers only on
/// DESTRUCTIVE). A stricter deployment adds the name to [`DESTRUCTIVE_TOOLS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolClass {
    Safe,
    Destructive,
    Unknown,
}

/// Classifies a tool name into [`ToolClass`].
#[must_use]
pub fn classify(tool: &str) -> ToolClass {
    if SAFE_TOOLS.contains(&tool) {
        ToolClass::Safe
    } else if DESTRUCTIVE_TOOLS.contains(&tool) {
        ToolClass::Destructive
    } else {
        ToolClass::Unknown
    }
}

/// Returns true for tools that mutate file content.
#[must_use]
pub fn is_write_tool(tool: &str) -> bool {
    WRITE_TOOLS.contains(&tool)
}

/// Machine-readable rejection codes. Future hooks may add codes; readers must
/// tolerate values outside this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    UserRejectedIntentEvolution,
    ScopeViolation,
    StaleFile,
}

impl RejectionCode {
    /// Default recovery hint when the caller does not supply one.
    #[must_use]
    pub fn default_hint(self) -> &'static str {
        match self {
            Self::UserRejectedIntentEvolution => {
                "The user declined this action. Revise the approach or ask a followup question \
                 before retrying."
            }
            Self::ScopeViolation => {
                "Edit only files inside the active intent's owned scope, or select an intent \
                 that owns this path."
            }
            Self::StaleFile => {
                "Re-read the file to obtain its current content and hash, then retry the edit."
            }
        }
    }
}

impl std::fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserRejectedIntentEvolution => write!(f, "USER_REJECTED_INTENT_EVOLUTION"),
            Self::ScopeViolation => write!(f, "SCOPE_VIOLATION"),
            Self::StaleFile => write!(f, "STALE_FILE"),
        }
    }
}

/// Structured rejection returned to the LLM when a pre-hook blocks a tool call.
///
/// Serialized as indented JSON; field order is part of the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionError {
    pub error: String,
    pub code: RejectionCode,
    pub tool: String,
    pub intent_id: Option<IntentId>,
    pub message: String,
    pub recovery_hint: String,
}

impl RejectionError {
    /// Creates a rejection with the code's default recovery hint.
    #[must_use]
    pub fn new(code: RejectionCode, tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: "TOOL_REJECTED".to_string(),
            code,
            tool: tool.into(),
            intent_id: None,
            message: message.into(),
            recovery_hint: code.default_hint().to_string(),
        }
    }

    /// Attributes the rejection to an intent.
    #[must_use]
    pub fn with_intent(mut self, intent_id: Option<IntentId>) -> Self {
        self.intent_id = intent_id;
        self
    }

    /// Overrides the recovery hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.recovery_hint = hint.into();
        self
    }

    /// Serializes to the pretty-printed JSON payload sent back to the LLM.
    #[must_use]
    pub fn to_payload(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            format!("{{\"error\": \"TOOL_REJECTED\", \"code\": \"{}\"}}", self.code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tools_classify() {
        for tool in SAFE_TOOLS {
            assert_eq!(classify(tool), ToolClass::Safe, "{tool}");
        }
        for tool in DESTRUCTIVE_TOOLS {
            assert_eq!(classify(tool), ToolClass::Destructive, "{tool}");
        }
    }

    #[test]
    fn unrecognized_tools_are_unknown() {
        assert_eq!(classify("telepathy"), ToolClass::Unknown);
        assert_eq!(classify(""), ToolClass::Unknown);
        assert_eq!(classify("READ_FILE"), ToolClass::Unknown);
    }

    #[test]
    fn safe_and_destructive_are_disjoint() {
        for tool in SAFE_TOOLS {
            assert!(!DESTRUCTIVE_TOOLS.contains(tool), "{tool} in both sets");
        }
    }

    #[test]
    fn write_tools_are_destructive_or_insert() {
        for tool in WRITE_TOOLS {
            assert!(
                DESTRUCTIVE_TOOLS.contains(tool) || *tool == "insert_content",
                "{tool}"
            );
        }
    }

    #[test]
    fn rejection_payload_shape() {
        let payload = RejectionError::new(
            RejectionCode::ScopeViolation,
            "write_to_file",
            "Write to 'src/payments/pay.ts' is outside the active intent's scope",
        )
        .with_intent(Some(IntentId::from("INT-001")))
        .to_payload();

        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["error"], "TOOL_REJECTED");
        assert_eq!(value["code"], "SCOPE_VIOLATION");
        assert_eq!(value["tool"], "write_to_file");
        assert_eq!(value["intent_id"], "INT-001");
        assert!(value["message"].is_string());
        assert!(value["recovery_hint"].is_string());
        // Pretty-printed with 2-space indent.
        assert!(payload.contains("\n  \"code\""));
    }

    #[test]
    fn intent_id_serializes_as_null_when_absent() {
        let payload =
            RejectionError::new(RejectionCode::StaleFile, "apply_diff", "stale").to_payload();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert!(value["intent_id"].is_null());
    }

    #[test]
    fn custom_hint_preserved_verbatim() {
        let hint = "Current hash is sha256:abc. Re-plan from it.";
        let err = RejectionError::new(RejectionCode::StaleFile, "edit", "stale").with_hint(hint);
        let value: serde_json::Value = serde_json::from_str(&err.to_payload()).unwrap();
        assert_eq!(value["recovery_hint"], hint);
    }

    #[test]
    fn default_hints_differ_per_code() {
        assert_ne!(
            RejectionCode::StaleFile.default_hint(),
            RejectionCode::ScopeViolation.default_hint()
        );
    }
}
