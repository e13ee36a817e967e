//! Intent model - the unit of authorization for agent work.
//!
//! Intents are created externally by a human and never deleted by the kernel;
//! only their status advances.

use serde::{Deserialize, Serialize};

/// Opaque intent identifier (e.g. `INT-001`). Unique within the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(pub String);

impl IntentId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IntentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for IntentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for IntentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Intent lifecycle status. Transitions are driven by tool events: selection
/// moves any status to `IN_PROGRESS`, completion to `COMPLETED`. There is no
/// automatic regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    Todo,
    InProgress,
    Completed,
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Todo => write!(f, "TODO"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl std::str::FromStr for IntentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(Self::Todo),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(format!("unknown intent status '{other}'")),
        }
    }
}

/// A declared business intent scoping a block of agent work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub id: IntentId,
    pub name: String,
    pub status: IntentStatus,
    /// Free-text constraints on how the work may be done.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    /// Path patterns this intent is authorized to modify. Empty means unscoped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owned_scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,
}

impl Intent {
    /// Creates a TODO intent with no scope or constraints.
    #[must_use]
    pub fn new(id: impl Into<IntentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: IntentStatus::Todo,
            constraints: Vec::new(),
            owned_scope: Vec::new(),
            acceptance_criteria: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_scope(mut self, patterns: Vec<String>) -> Self {
        self.owned_scope = patterns;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: IntentStatus) -> Self {
        self.status = status;
        self
    }
}
