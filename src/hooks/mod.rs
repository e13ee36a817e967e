//! Hook pipeline: ordered pre/post interception around every tool call.
//!
//! Pre-hooks run in registration order and may block (short-circuiting the
//! rest of the pipeline and the tool) or substitute a transformed invocation
//! for everything downstream. Post-hooks are independent observers: each
//! failure is reported to the host diagnostic channel and never aborts the
//! others or changes the tool outcome.

pub mod authorization;
pub mod gatekeeper;
pub mod intent_update;
pub mod optimistic_lock;
pub mod scope_enforcement;
pub mod trace_writer;

use crate::core::session::{TaskSession, ToolInvocation};
use crate::host::HostEnv;
use std::sync::Arc;

/// Outcome of a single pre-hook.
#[derive(Debug, Clone, PartialEq)]
pub enum HookDecision {
    /// Continue to the next hook.
    Pass,
    /// Halt the pipeline; the payload flows back to the LLM.
    Block(String),
    /// Substitute a replacement invocation for subsequent hooks and the tool.
    Transform(ToolInvocation),
}

/// Result of the tool execution, as seen by post-hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub success: bool,
    pub output: Option<String>,
}

impl ToolResult {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            output: None,
        }
    }

    #[must_use]
    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: Some(output.into()),
        }
    }
}

/// Outcome of the pre-phase as a whole.
#[derive(Debug, Clone, PartialEq)]
pub enum PreOutcome {
    /// All pre-hooks passed; run the tool with this (possibly transformed)
    /// invocation.
    Proceed(ToolInvocation),
    /// A hook blocked; the tool must not run.
    Blocked {
        hook_id: &'static str,
        payload: String,
    },
}

impl PreOutcome {
    /// True when the tool may run.
    #[must_use]
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed(_))
    }
}

/// A policy hook. Both phases default to no-ops so hooks implement only the
/// phase they participate in.
pub trait ToolHook: Send + Sync {
    /// Unique hook id; re-registering the same id replaces the prior hook.
    fn id(&self) -> &'static str;

    fn pre_execute(&self, _session: &TaskSession, _invocation: &ToolInvocation) -> HookDecision {
        HookDecision::Pass
    }

    fn post_execute(
        &self,
        _session: &TaskSession,
        _invocation: &ToolInvocation,
        _result: &ToolResult,
    ) -> Result<(), String> {
        Ok(())
    }
}

/// Ordered composition of hooks around tool execution.
pub struct HookEngine {
    host: Arc<dyn HostEnv>,
    hooks: Vec<Box<dyn ToolHook>>,
}

impl HookEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new(host: Arc<dyn HostEnv>) -> Self {
        Self {
            host,
            hooks: Vec::new(),
        }
    }

    /// Creates the canonical pipeline: Gatekeeper, OptimisticLock,
    /// ScopeEnforcement, Authorization (pre); IntentUpdate, TraceWriter
    /// (post). Cheap in-memory checks first, filesystem checks next, the
    /// blocking approval dialog last; provenance is recorded only after
    /// state transitions settle.
    #[must_use]
    pub fn standard(host: Arc<dyn HostEnv>) -> Self {
        let mut engine = Self::new(Arc::clone(&host));
        engine.register(Box::new(gatekeeper::GatekeeperHook::new()));
        engine.register(Box::new(optimistic_lock::OptimisticLockHook::new(
            Arc::clone(&host),
        )));
        engine.register(Box::new(scope_enforcement::ScopeEnforcementHook::new(
            Arc::clone(&host),
        )));
        engine.register(Box::new(authorization::AuthorizationHook::new(Arc::clone(
            &host,
        ))));
        engine.register(Box::new(intent_update::IntentUpdateHook::new(Arc::clone(
            &host,
        ))));
        engine.register(Box::new(trace_writer::TraceWriterHook::new(host)));
        engine
    }

    /// Registers a hook, replacing any prior hook with the same id in place.
    pub fn register(&mut self, hook: Box<dyn ToolHook>) {
        if let Some(slot) = self.hooks.iter_mut().find(|h| h.id() == hook.id()) {
            *slot = hook;
        } else {
            self.hooks.push(hook);
        }
    }

    /// Registered hook ids, in pipeline order.
    #[must_use]
    pub fn hook_ids(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.id()).collect()
    }

    /// Runs the pre-phase. Iteration halts at the first block; a transform
    /// substitutes the invocation seen by subsequent hooks and the tool.
    #[must_use]
    pub fn run_pre(&self, session: &TaskSession, invocation: ToolInvocation) -> PreOutcome {
        let mut current = invocation;
        for hook in &self.hooks {
            match hook.pre_execute(session, &current) {
                HookDecision::Pass => {}
                HookDecision::Block(payload) => {
                    return PreOutcome::Blocked {
                        hook_id: hook.id(),
                        payload,
                    };
                }
                HookDecision::Transform(replacement) => current = replacement,
            }
        }
        PreOutcome::Proceed(current)
    }

    /// Runs the post-phase. Every hook's post handler runs; failures go to
    /// the host diagnostic channel and never propagate.
    pub fn run_post(
        &self,
        session: &TaskSession,
        invocation: &ToolInvocation,
        result: &ToolResult,
    ) {
        for hook in &self.hooks {
            if let Err(message) = hook.post_execute(session, invocation, result) {
                self.host
                    .diag(&format!("post hook '{}' failed: {message}", hook.id()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::ModelDescriptor;
    use crate::host::NativeHost;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn session() -> TaskSession {
        TaskSession::new("task-1", ModelDescriptor::ai_agent("claude-sonnet-4"))
    }

    fn host() -> Arc<dyn HostEnv> {
        Arc::new(NativeHost::new("/tmp/warden-engine-tests"))
    }

    struct RecordingHook {
        hook_id: &'static str,
        decision: HookDecision,
        calls: Arc<AtomicUsize>,
    }

    impl ToolHook for RecordingHook {
        fn id(&self) -> &'static str {
            self.hook_id
        }

        fn pre_execute(&self, _: &TaskSession, _: &ToolInvocation) -> HookDecision {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.decision.clone()
        }
    }

    #[test]
    fn pre_hooks_run_in_registration_order_until_block() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));

        let mut engine = HookEngine::new(host());
        engine.register(Box::new(RecordingHook {
            hook_id: "first",
            decision: HookDecision::Pass,
            calls: Arc::clone(&first),
        }));
        engine.register(Box::new(RecordingHook {
            hook_id: "second",
            decision: HookDecision::Block("denied".to_string()),
            calls: Arc::clone(&second),
        }));
        engine.register(Box::new(RecordingHook {
            hook_id: "third",
            decision: HookDecision::Pass,
            calls: Arc::clone(&third),
        }));

        let outcome = engine.run_pre(&session(), ToolInvocation::new("write_to_file"));

        assert_eq!(
            outcome,
            PreOutcome::Blocked {
                hook_id: "second",
                payload: "denied".to_string()
            }
        );
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 0, "blocked hooks must not run");
    }

    struct TransformHook;

    impl ToolHook for TransformHook {
        fn id(&self) -> &'static str {
            "transform"
        }

        fn pre_execute(&self, _: &TaskSession, invocation: &ToolInvocation) -> HookDecision {
            let replacement = invocation.clone().with_param("sanitized", true);
            HookDecision::Transform(replacement)
        }
    }

    struct AssertsTransformed {
        saw_sanitized: Arc<AtomicUsize>,
    }

    impl ToolHook for AssertsTransformed {
        fn id(&self) -> &'static str {
            "asserts-transformed"
        }

        fn pre_execute(&self, _: &TaskSession, invocation: &ToolInvocation) -> HookDecision {
            if invocation.params.contains_key("sanitized") {
                self.saw_sanitized.fetch_add(1, Ordering::SeqCst);
            }
            HookDecision::Pass
        }
    }

    #[test]
    fn transform_substitutes_invocation_for_downstream_hooks_and_tool() {
        let saw = Arc::new(AtomicUsize::new(0));
        let mut engine = HookEngine::new(host());
        engine.register(Box::new(TransformHook));
        engine.register(Box::new(AssertsTransformed {
            saw_sanitized: Arc::clone(&saw),
        }));

        let outcome = engine.run_pre(&session(), ToolInvocation::new("write_to_file"));

        assert_eq!(saw.load(Ordering::SeqCst), 1);
        match outcome {
            PreOutcome::Proceed(inv) => assert!(inv.params.contains_key("sanitized")),
            PreOutcome::Blocked { .. } => panic!("expected proceed"),
        }
    }

    #[test]
    fn register_replaces_hook_with_same_id_in_place() {
        let old_calls = Arc::new(AtomicUsize::new(0));
        let new_calls = Arc::new(AtomicUsize::new(0));

        let mut engine = HookEngine::new(host());
        engine.register(Box::new(RecordingHook {
            hook_id: "lock",
            decision: HookDecision::Block("old".to_string()),
            calls: Arc::clone(&old_calls),
        }));
        engine.register(Box::new(RecordingHook {
            hook_id: "tail",
            decision: HookDecision::Pass,
            calls: Arc::new(AtomicUsize::new(0)),
        }));
        engine.register(Box::new(RecordingHook {
            hook_id: "lock",
            decision: HookDecision::Pass,
            calls: Arc::clone(&new_calls),
        }));

        assert_eq!(engine.hook_ids(), vec!["lock", "tail"]);
        let outcome = engine.run_pre(&session(), ToolInvocation::new("edit"));
        assert!(outcome.is_proceed());
        assert_eq!(old_calls.load(Ordering::SeqCst), 0);
        assert_eq!(new_calls.load(Ordering::SeqCst), 1);
    }

    struct FailingPostHook {
        hook_id: &'static str,
        ran: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ToolHook for FailingPostHook {
        fn id(&self) -> &'static str {
            self.hook_id
        }

        fn post_execute(
            &self,
            _: &TaskSession,
            _: &ToolInvocation,
            _: &ToolResult,
        ) -> Result<(), String> {
            self.ran.lock().unwrap().push(self.hook_id);
            Err(format!("{} exploded", self.hook_id))
        }
    }

    #[test]
    fn post_hook_failures_do_not_abort_the_others() {
        let ran = Arc::new(Mutex::new(Vec::new()));
        let mut engine = HookEngine::new(host());
        engine.register(Box::new(FailingPostHook {
            hook_id: "post-a",
            ran: Arc::clone(&ran),
        }));
        engine.register(Box::new(FailingPostHook {
            hook_id: "post-b",
            ran: Arc::clone(&ran),
        }));

        engine.run_post(
            &session(),
            &ToolInvocation::new("write_to_file"),
            &ToolResult::ok(),
        );

        assert_eq!(*ran.lock().unwrap(), vec!["post-a", "post-b"]);
    }

    #[test]
    fn standard_pipeline_order() {
        let engine = HookEngine::standard(host());
        assert_eq!(
            engine.hook_ids(),
            vec![
                "gatekeeper",
                "optimistic-lock",
                "scope-enforcement",
                "authorization",
                "intent-update",
                "trace-writer",
            ]
        );
    }
}
