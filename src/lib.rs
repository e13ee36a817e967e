//! Warden - a policy-enforcement and provenance kernel for agentic coding
//! tools.
//!
//! Warden interposes between an LLM-driven agent and the side-effects its
//! tool calls produce: every destructive action must be attributable to a
//! declared intent, confined to that intent's owned scope, protected from
//! lost-update races by optimistic content-hash CAS, approved by a human
//! when required, and recorded in an append-only provenance ledger.

pub mod cli;
pub mod core;
pub mod hooks;
pub mod host;
pub mod storage;
