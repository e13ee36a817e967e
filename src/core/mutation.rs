//! Mutation classification - behavior-preserving refactor vs. new behavior.
//!
//! The classifier is a heuristic over the written payload. It errs toward
//! `INTENT_EVOLUTION`: over-reporting a behavior change is safer than hiding
//! one from the provenance ledger.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Provenance label distinguishing refactors from behavior changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationClass {
    #[serde(rename = "AST_REFACTOR")]
    AstRefactor,
    #[serde(rename = "INTENT_EVOLUTION")]
    IntentEvolution,
}

impl MutationClass {
    /// Parses an explicit caller-supplied class. Anything else is ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "AST_REFACTOR" => Some(Self::AstRefactor),
            "INTENT_EVOLUTION" => Some(Self::IntentEvolution),
            _ => None,
        }
    }
}

impl std::fmt::Display for MutationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AstRefactor => write!(f, "AST_REFACTOR"),
            Self::IntentEvolution => write!(f, "INTENT_EVOLUTION"),
        }
    }
}

fn function_def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^[+>\s]*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s+[A-Za-z_$][\w$]*|^[+\s]*(?:pub(?:\([^)]*\))?\s+)?fn\s+[a-z_]\w*|^[+\s]*def\s+[a-z_]\w*\s*\(",
        )
        .expect("function def regex")
    })
}

fn class_def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^[+\s]*(?:export\s+)?(?:abstract\s+)?class\s+[A-Za-z_$][\w$]*|^[+\s]*(?:export\s+)?interface\s+[A-Za-z_$][\w$]*",
        )
        .expect("class def regex")
    })
}

fn export_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[+\s]*export\s+(?:const|let|var|default)\b").expect("export regex")
    })
}

fn route_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:app|router)\.(?:get|post|put|delete|patch|use)\s*\(")
            .expect("route regex")
    })
}

fn added_conditional_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\+\s*if\s*\(.*\)\s*\{").expect("conditional regex"))
}

fn renamed_decl_re() -> (&'static Regex, &'static Regex) {
    static REMOVED: OnceLock<Regex> = OnceLock::new();
    static ADDED: OnceLock<Regex> = OnceLock::new();
    (
        REMOVED.get_or_init(|| {
            Regex::new(r"(?m)^-\s*(?:function|class|const|let|var|fn|def)\b")
                .expect("removed decl regex")
        }),
        ADDED.get_or_init(|| {
            Regex::new(r"(?m)^\+\s*(?:function|class|const|let|var|fn|def)\b")
                .expect("added decl regex")
        }),
    )
}

fn whitespace_only_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[+-]\s*$").expect("whitespace regex"))
}

fn import_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^[+-]\s*(?:import\s|use\s|from\s+['"]|require\s*\()"#)
            .expect("import regex")
    })
}

fn comment_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[+-]\s*(?://|#\s|/\*|\*)").expect("comment regex"))
}

fn has_evolution_signal(content: &str) -> bool {
    function_def_re().is_match(content)
        || class_def_re().is_match(content)
        || export_re().is_match(content)
        || route_re().is_match(content)
        || added_conditional_re().is_match(content)
}

fn refactor_signal_count(content: &str) -> usize {
    let mut count = 0;
    let (removed, added) = renamed_decl_re();
    if removed.is_match(content) && added.is_match(content) {
        count += 1;
    }
    if whitespace_only_re().is_match(content) {
        count += 1;
    }
    if import_line_re().is_match(content) {
        count += 1;
    }
    if comment_line_re().is_match(content) {
        count += 1;
    }
    count
}

/// Classifies a write.
///
/// Priority: explicit caller class, then the new-file rule, then evolution
/// signals, then two or more distinct refactor signals, then the conservative
/// default of `INTENT_EVOLUTION`.
#[must_use]
pub fn classify_mutation(
    explicit: Option<&str>,
    content: &str,
    is_new_file: bool,
) -> MutationClass {
    if let Some(class) = explicit.and_then(MutationClass::parse) {
        return class;
    }
    if is_new_file {
        return MutationClass::IntentEvolution;
    }
    if has_evolution_signal(content) {
        return MutationClass::IntentEvolution;
    }
    if refactor_signal_count(content) >= 2 {
        return MutationClass::AstRefactor;
    }
    MutationClass::IntentEvolution
}
