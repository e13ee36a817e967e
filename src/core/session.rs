//! Per-conversation session state and parsed tool invocations.
//!
//! A `TaskSession` is the scope carried through every hook call. A
//! `ToolInvocation` is immutable once handed to the engine; transformation
//! between hooks substitutes a replacement value rather than mutating.

use crate::core::intent::IntentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Descriptor of the LLM driving the session. Metadata only; recorded on
/// trace entries as the contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Contributor kind, e.g. `ai_agent`.
    pub entity_type: String,
    /// Model identifier, e.g. `claude-sonnet-4`.
    pub identifier: String,
}

impl ModelDescriptor {
    #[must_use]
    pub fn ai_agent(identifier: impl Into<String>) -> Self {
        Self {
            entity_type: "ai_agent".to_string(),
            identifier: identifier.into(),
        }
    }
}

/// The per-conversation scope carried through every hook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSession {
    pub task_id: String,
    /// Set by explicit re-selection only; never cleared by the kernel.
    pub active_intent_id: Option<IntentId>,
    pub model: ModelDescriptor,
    /// Count of successful mutations, maintained by the hosting driver.
    #[serde(default)]
    pub mutation_count: u64,
}

impl TaskSession {
    #[must_use]
    pub fn new(task_id: impl Into<String>, model: ModelDescriptor) -> Self {
        Self {
            task_id: task_id.into(),
            active_intent_id: None,
            model,
            mutation_count: 0,
        }
    }

    /// Explicit intent re-selection.
    pub fn select_intent(&mut self, id: impl Into<IntentId>) {
        self.active_intent_id = Some(id.into());
    }
}

/// Typed view over the invocation arguments. Preferred over the raw parameter
/// map when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<String>,
}

impl NativeArgs {
    fn field(&self, key: &str) -> Option<&str> {
        match key {
            "path" => self.path.as_deref(),
            "content" => self.content.as_deref(),
            "diff" => self.diff.as_deref(),
            "new_string" => self.new_string.as_deref(),
            "patch" => self.patch.as_deref(),
            "expected_hash" => self.expected_hash.as_deref(),
            "mutation_class" => self.mutation_class.as_deref(),
            "intent_id" => self.intent_id.as_deref(),
            _ => None,
        }
    }
}

/// A tool call parsed by the driver, as seen by the hook pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub id: Uuid,
    pub tool: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_args: Option<NativeArgs>,
}

impl ToolInvocation {
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool: tool.into(),
            params: BTreeMap::new(),
            native_args: None,
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_native_args(mut self, args: NativeArgs) -> Self {
        self.native_args = Some(args);
        self
    }

    /// Looks up a string argument, preferring the typed `native_args` view.
    #[must_use]
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.native_args.as_ref().and_then(|n| n.field(key)) {
            return Some(value);
        }
        self.params.get(key).and_then(Value::as_str)
    }

    /// Target path of the invocation: `path`, falling back to `file_path`.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.str_arg("path").or_else(|| self.str_arg("file_path"))
    }

    /// Caller-supplied expected content hash for the optimistic lock.
    #[must_use]
    pub fn expected_hash(&self) -> Option<&str> {
        self.str_arg("expected_hash")
    }

    /// Caller-supplied explicit mutation class.
    #[must_use]
    pub fn mutation_class(&self) -> Option<&str> {
        self.str_arg("mutation_class")
    }

    /// Explicit intent id attached to the call, if any.
    #[must_use]
    pub fn intent_id(&self) -> Option<&str> {
        self.str_arg("intent_id")
    }

    /// The payload a trace entry should hash: full content for a file write,
    /// otherwise the diff, replacement string, or patch.
    #[must_use]
    pub fn content_payload(&self) -> Option<&str> {
        self.str_arg("content")
            .or_else(|| self.str_arg("diff"))
            .or_else(|| self.str_arg("new_string"))
            .or_else(|| self.str_arg("patch"))
    }
}
