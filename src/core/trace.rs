//! Provenance trace records.
//!
//! One `TraceEntry` is appended to the ledger for every successful mutation,
//! linking a code region (path + content hash) to the intents responsible
//! for it. Entries are append-only and never rewritten.

use crate::core::intent::IntentId;
use crate::core::mutation::MutationClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version-control metadata, when known at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,
}

/// How a `Related` entry tags the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedKind {
    Specification,
    Requirement,
    Intent,
}

/// Link from a trace entry to an intent, requirement, or specification id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Related {
    #[serde(rename = "type")]
    pub kind: RelatedKind,
    pub value: String,
}

/// A hashed region of the written payload.
///
/// Line numbers are coarse anchors over the payload, not re-parsed positions
/// in the target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRange {
    pub start_line: u64,
    pub end_line: u64,
    pub content_hash: String,
    pub mutation_class: MutationClass,
}

/// Who produced the mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub entity_type: String,
    pub model_identifier: String,
}

/// One conversation's contribution to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Task-id proxy for the driving conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub contributor: Contributor,
    pub ranges: Vec<TraceRange>,
    pub related: Vec<Related>,
}

/// A touched file within a trace entry. Paths use POSIX separators and are
/// workspace-relative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFile {
    pub relative_path: String,
    pub conversations: Vec<Conversation>,
}

/// Append-only provenance record. Every entry references at least one intent
/// via `related`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs: Option<VcsInfo>,
    pub files: Vec<TraceFile>,
}

impl TraceEntry {
    /// Builds a single-file entry, the shape produced by the trace writer hook.
    #[must_use]
    pub fn single_file(
        relative_path: impl Into<String>,
        conversation: Conversation,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            vcs: None,
            files: vec![TraceFile {
                relative_path: relative_path.into(),
                conversations: vec![conversation],
            }],
        }
    }

    /// True when any `related` entry carries the given intent id.
    #[must_use]
    pub fn references_intent(&self, intent_id: &IntentId) -> bool {
        self.files.iter().any(|f| {
            f.conversations
                .iter()
                .any(|c| c.related.iter().any(|r| r.value == intent_id.0))
        })
    }

    /// True when any file in the entry has the given relative path.
    #[must_use]
    pub fn touches_path(&self, relative_path: &str) -> bool {
        self.files.iter().any(|f| f.relative_path == relative_path)
    }
}
