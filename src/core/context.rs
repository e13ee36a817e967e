//! Governance context returned to the LLM on intent selection.
//!
//! `select_active_intent` answers with an XML block describing the chosen
//! intent and its prior trace history, so the agent starts from the recorded
//! state of the work instead of rediscovering it.

use crate::core::intent::Intent;
use crate::core::trace::TraceEntry;

/// Constitution text injected by the (external) system-prompt composer before
/// the first turn. Not interpreted by the kernel.
pub const GOVERNANCE_CONSTITUTION: &str = "\
Before using any other tool you must declare which business intent your work \
serves by calling select_active_intent with one of the intent ids listed \
below. Every destructive tool call is attributed to the active intent, \
checked against its owned scope, and recorded in the provenance ledger. \
Calls made without an active intent will be rejected.";

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders the context block for a selected intent, including up to `limit`
/// related prior trace entries (newest first).
#[must_use]
pub fn intent_context_block(intent: &Intent, history: &[TraceEntry], limit: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<active_intent id=\"{}\" status=\"{}\">\n",
        xml_escape(intent.id.as_str()),
        intent.status
    ));
    out.push_str(&format!("  <name>{}</name>\n", xml_escape(&intent.name)));

    if !intent.constraints.is_empty() {
        out.push_str("  <constraints>\n");
        for constraint in &intent.constraints {
            out.push_str(&format!(
                "    <constraint>{}</constraint>\n",
                xml_escape(constraint)
            ));
        }
        out.push_str("  </constraints>\n");
    }

    if !intent.owned_scope.is_empty() {
        out.push_str("  <owned_scope>\n");
        for pattern in &intent.owned_scope {
            out.push_str(&format!("    <pattern>{}</pattern>\n", xml_escape(pattern)));
        }
        out.push_str("  </owned_scope>\n");
    }

    if !intent.acceptance_criteria.is_empty() {
        out.push_str("  <acceptance_criteria>\n");
        for criterion in &intent.acceptance_criteria {
            out.push_str(&format!(
                "    <criterion>{}</criterion>\n",
                xml_escape(criterion)
            ));
        }
        out.push_str("  </acceptance_criteria>\n");
    }

    let related: Vec<&TraceEntry> = history
        .iter()
        .rev()
        .filter(|e| e.references_intent(&intent.id))
        .take(limit)
        .collect();
    if !related.is_empty() {
        out.push_str("  <prior_work>\n");
        for entry in related {
            for file in &entry.files {
                for conversation in &file.conversations {
                    for range in &conversation.ranges {
                        out.push_str(&format!(
                            "    <entry path=\"{}\" lines=\"{}-{}\" hash=\"{}\" mutation=\"{}\"/>\n",
                            xml_escape(&file.relative_path),
                            range.start_line,
                            range.end_line,
                            xml_escape(&range.content_hash),
                            range.mutation_class
                        ));
                    }
                }
            }
        }
        out.push_str("  </prior_work>\n");
    }

    out.push_str("</active_intent>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash;
    use crate::core::intent::IntentStatus;
    use crate::core::mutation::MutationClass;
    use crate::core::trace::{Contributor, Conversation, Related, RelatedKind, TraceRange};

    fn entry_for(intent_id: &str, path: &str) -> TraceEntry {
        TraceEntry::single_file(
            path,
            Conversation {
                url: None,
                contributor: Contributor {
                    entity_type: "ai_agent".to_string(),
                    model_identifier: "claude-sonnet-4".to_string(),
                },
                ranges: vec![TraceRange {
                    start_line: 1,
                    end_line: 3,
                    content_hash: hash::hash(path),
                    mutation_class: MutationClass::IntentEvolution,
                }],
                related: vec![Related {
                    kind: RelatedKind::Specification,
                    value: intent_id.to_string(),
                }],
            },
        )
    }

    #[test]
    fn renders_intent_fields() {
        let intent = Intent::new("INT-001", "Harden <login> flow")
            .with_status(IntentStatus::InProgress)
            .with_scope(vec!["src/auth/**".to_string()]);
        let block = intent_context_block(&intent, &[], 5);

        assert!(block.starts_with("<active_intent id=\"INT-001\" status=\"IN_PROGRESS\">"));
        assert!(block.contains("<name>Harden &lt;login&gt; flow</name>"));
        assert!(block.contains("<pattern>src/auth/**</pattern>"));
        assert!(block.ends_with("</active_intent>"));
    }

    #[test]
    fn omits_empty_sections() {
        let intent = Intent::new("INT-002", "Docs pass");
        let block = intent_context_block(&intent, &[], 5);
        assert!(!block.contains("<constraints>"));
        assert!(!block.contains("<owned_scope>"));
        assert!(!block.contains("<prior_work>"));
    }

    #[test]
    fn history_is_filtered_and_limited() {
        let intent = Intent::new("INT-001", "Auth");
        let history = vec![
            entry_for("INT-001", "src/auth/a.ts"),
            entry_for("INT-002", "src/pay/b.ts"),
            entry_for("INT-001", "src/auth/c.ts"),
            entry_for("INT-001", "src/auth/d.ts"),
        ];
        let block = intent_context_block(&intent, &history, 2);

        // Newest first, capped at two, other intents excluded.
        assert!(block.contains("src/auth/d.ts"));
        assert!(block.contains("src/auth/c.ts"));
        assert!(!block.contains("src/auth/a.ts"));
        assert!(!block.contains("src/pay/b.ts"));
    }
}
