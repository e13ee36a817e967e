//! Intent registry storage.
//!
//! The registry is a YAML mapping with key `active_intents` holding an
//! ordered sequence of intents. Status updates rewrite the parsed document
//! in place so keys this kernel does not know about survive the round-trip.

use crate::core::intent::{Intent, IntentId, IntentStatus};
use crate::storage::registry_path;
use fs2::FileExt;
use serde_yaml::Value;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

/// Errors that can occur in the intent store.
#[derive(Debug, thiserror::Error)]
pub enum IntentStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("intent not found: {0}")]
    NotFound(IntentId),
    #[error("malformed registry: {0}")]
    Malformed(String),
}

/// Result type for intent store operations.
pub type Result<T> = std::result::Result<T, IntentStoreError>;

/// Reads and writes the intent registry file.
#[derive(Debug, Clone)]
pub struct IntentStore {
    path: PathBuf,
}

impl IntentStore {
    /// Creates a store for the given workspace root.
    #[must_use]
    pub fn open(workspace: &Path) -> Self {
        Self {
            path: registry_path(workspace),
        }
    }

    /// Returns the registry file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_document(&self) -> Result<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_yaml::from_str(&text)?))
    }

    /// Lists all intents in registry order. A missing registry is empty.
    pub fn list(&self) -> Result<Vec<Intent>> {
        let Some(doc) = self.load_document()? else {
            return Ok(Vec::new());
        };
        let entries = doc
            .get("active_intents")
            .and_then(Value::as_sequence)
            .ok_or_else(|| {
                IntentStoreError::Malformed("missing 'active_intents' sequence".to_string())
            })?;

        entries
            .iter()
            .map(|entry| serde_yaml::from_value(entry.clone()).map_err(IntentStoreError::from))
            .collect()
    }

    /// Looks up an intent by id.
    pub fn find(&self, id: &IntentId) -> Result<Option<Intent>> {
        Ok(self.list()?.into_iter().find(|i| &i.id == id))
    }

    /// Sets the status of an intent, rewriting the file only when the stored
    /// status differs. Returns whether a write happened.
    pub fn set_status(&self, id: &IntentId, status: IntentStatus) -> Result<bool> {
        let mut doc = self.load_document()?.ok_or_else(|| {
            IntentStoreError::Malformed("registry file is missing or empty".to_string())
        })?;

        let entries = doc
            .get_mut("active_intents")
            .and_then(Value::as_sequence_mut)
            .ok_or_else(|| {
                IntentStoreError::Malformed("missing 'active_intents' sequence".to_string())
            })?;

        let entry = entries
            .iter_mut()
            .find(|e| e.get("id").and_then(Value::as_str) == Some(id.as_str()))
            .ok_or_else(|| IntentStoreError::NotFound(id.clone()))?;

        let current = entry.get("status").and_then(Value::as_str).unwrap_or("");
        let target = status.to_string();
        if current == target {
            return Ok(false);
        }

        let mapping = entry.as_mapping_mut().ok_or_else(|| {
            IntentStoreError::Malformed(format!("intent '{id}' is not a mapping"))
        })?;
        mapping.insert(Value::String("status".to_string()), Value::String(target));

        self.rewrite(&doc)?;
        Ok(true)
    }

    fn rewrite(&self, doc: &Value) -> Result<()> {
        let serialized = serde_yaml::to_string(doc)?;

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let result = (|| {
            file.rewind()?;
            file.set_len(0)?;
            file.write_all(serialized.as_bytes())?;
            file.flush()
        })();

        let _ = file.unlock();
        result.map_err(IntentStoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ORCHESTRATION_DIR;

    const REGISTRY: &str = "\
active_intents:
  - id: INT-001
    name: Harden login flow
    status: TODO
    owned_scope:
      - src/auth/**
    priority: high
  - id: INT-002
    name: Payments cleanup
    status: IN_PROGRESS
";

    fn workspace_with_registry(content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let orch = dir.path().join(ORCHESTRATION_DIR);
        std::fs::create_dir_all(&orch).expect("mkdir");
        std::fs::write(orch.join("active_intents.yaml"), content).expect("write registry");
        dir
    }

    #[test]
    fn list_parses_all_intents() {
        let ws = workspace_with_registry(REGISTRY);
        let store = IntentStore::open(ws.path());
        let intents = store.list().unwrap();

        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].id, IntentId::from("INT-001"));
        assert_eq!(intents[0].status, IntentStatus::Todo);
        assert_eq!(intents[0].owned_scope, vec!["src/auth/**"]);
        assert_eq!(intents[1].status, IntentStatus::InProgress);
    }

    #[test]
    fn find_by_id() {
        let ws = workspace_with_registry(REGISTRY);
        let store = IntentStore::open(ws.path());

        assert!(store.find(&IntentId::from("INT-002")).unwrap().is_some());
        assert!(store.find(&IntentId::from("INT-404")).unwrap().is_none());
    }

    #[test]
    fn missing_registry_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = IntentStore::open(dir.path());
        assert!(store.list().unwrap().is_empty());
        assert!(store.find(&IntentId::from("INT-001")).unwrap().is_none());
    }

    #[test]
    fn set_status_rewrites_once() {
        let ws = workspace_with_registry(REGISTRY);
        let store = IntentStore::open(ws.path());
        let id = IntentId::from("INT-001");

        assert!(store.set_status(&id, IntentStatus::InProgress).unwrap());
        assert_eq!(
            store.find(&id).unwrap().unwrap().status,
            IntentStatus::InProgress
        );

        // Same transition again: no write.
        let before = std::fs::read_to_string(store.path()).unwrap();
        assert!(!store.set_status(&id, IntentStatus::InProgress).unwrap());
        let after = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn set_status_preserves_unknown_keys() {
        let ws = workspace_with_registry(REGISTRY);
        let store = IntentStore::open(ws.path());

        store
            .set_status(&IntentId::from("INT-001"), IntentStatus::Completed)
            .unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("priority: high"), "{text}");
        assert!(text.contains("COMPLETED"), "{text}");
        // The untouched sibling intent survives as well.
        assert!(text.contains("INT-002"), "{text}");
    }

    #[test]
    fn set_status_unknown_intent_errors() {
        let ws = workspace_with_registry(REGISTRY);
        let store = IntentStore::open(ws.path());
        let err = store
            .set_status(&IntentId::from("INT-404"), IntentStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, IntentStoreError::NotFound(_)));
    }

    #[test]
    fn malformed_registry_is_reported() {
        let ws = workspace_with_registry("just_a_key: true\n");
        let store = IntentStore::open(ws.path());
        assert!(matches!(
            store.list().unwrap_err(),
            IntentStoreError::Malformed(_)
        ));
    }
}
