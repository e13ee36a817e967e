//! Authorization hook: human approval for destructive tools.
//!
//! Intents listed in `<workspace>/.orchestration/.intentignore` are
//! pre-authorized and skip the dialog. The bypass set is a single-slot
//! memoized value keyed by workspace path; a failed read degrades to
//! "no bypass" rather than blocking.

use crate::core::session::{TaskSession, ToolInvocation};
use crate::core::tools::{classify, RejectionCode, RejectionError, ToolClass};
use crate::host::{Approval, HostEnv};
use crate::hooks::{HookDecision, ToolHook};
use crate::storage::bypass_path;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Parses the bypass list: one intent id per line, blank lines ignored,
/// `#`-prefixed lines (after trim) are comments.
#[must_use]
pub fn parse_bypass_list(text: &str) -> HashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

struct BypassCache {
    workspace: PathBuf,
    ids: HashSet<String>,
}

/// Gates destructive tools on a modal approve/reject, unless bypassed.
pub struct AuthorizationHook {
    host: Arc<dyn HostEnv>,
    cache: Mutex<Option<BypassCache>>,
}

impl AuthorizationHook {
    #[must_use]
    pub fn new(host: Arc<dyn HostEnv>) -> Self {
        Self {
            host,
            cache: Mutex::new(None),
        }
    }

    /// Drops the memoized bypass set so the next call re-reads the file.
    pub fn invalidate(&self) {
        *self.cache.lock().expect("lock poisoned") = None;
    }

    fn is_bypassed(&self, intent_id: &str) -> bool {
        let workspace = self.host.workspace_root().to_path_buf();
        let mut slot = self.cache.lock().expect("lock poisoned");

        let stale = match slot.as_ref() {
            Some(cache) => cache.workspace != workspace,
            None => true,
        };
        if stale {
            let ids = match self.host.read_text(&bypass_path(&workspace)) {
                Ok(text) => parse_bypass_list(&text),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
                Err(err) => {
                    self.host
                        .diag(&format!("authorization: bypass list unreadable: {err}"));
                    HashSet::new()
                }
            };
            *slot = Some(BypassCache { workspace, ids });
        }

        slot.as_ref().is_some_and(|c| c.ids.contains(intent_id))
    }

    fn approval_label(invocation: &ToolInvocation) -> String {
        let action = invocation.tool.replace('_', " ");
        match invocation.path() {
            Some(path) => format!("{action} ({path})"),
            None => action,
        }
    }
}

impl ToolHook for AuthorizationHook {
    fn id(&self) -> &'static str {
        "authorization"
    }

    fn pre_execute(&self, session: &TaskSession, invocation: &ToolInvocation) -> HookDecision {
        if classify(&invocation.tool) != ToolClass::Destructive {
            return HookDecision::Pass;
        }

        if let Some(intent_id) = session.active_intent_id.as_ref() {
            if self.is_bypassed(intent_id.as_str()) {
                return HookDecision::Pass;
            }
        }

        let label = Self::approval_label(invocation);
        let message = match session.active_intent_id.as_ref() {
            Some(id) => format!("Intent {id} requests a destructive action: {label}. Allow it?"),
            None => format!("The agent requests a destructive action: {label}. Allow it?"),
        };

        if self.host.request_approval(&message) == Approval::Approve {
            return HookDecision::Pass;
        }

        let payload = RejectionError::new(
            RejectionCode::UserRejectedIntentEvolution,
            invocation.tool.clone(),
            format!("The user did not approve '{label}'"),
        )
        .with_intent(session.active_intent_id.clone())
        .to_payload();
        HookDecision::Block(payload)
    }
}
