//! Context formatting for answer synthesis.
//!
//! The assembler is pure: it turns the fused ranking and any supplementary
//! graph facts into the text blocks the synthesizer embeds in its prompt.

use std::fmt::Write as _;

use contrail_core::{FusedResult, SupplementaryContext};

/// Label preceding the knowledge-graph block in an assembled context.
pub const KNOWLEDGE_GRAPH_LABEL: &str = "CONTEXT FROM KNOWLEDGE GRAPH:";

const MAX_ENTITIES: usize = 5;
const MAX_RELATIONSHIPS: usize = 5;
const MAX_PATHS: usize = 3;
const MAX_ENTITY_DETAILS: usize = 2;
const MAX_LINKS_PER_DIRECTION: usize = 3;

/// Passage and graph blocks for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledContext {
    /// `Document: ...\nContent: ...` entries separated by blank lines.
    pub passages: String,
    /// Rendered graph facts; empty when there were none.
    pub knowledge_graph: String,
}

impl AssembledContext {
    /// Whether the graph block carries anything.
    pub fn has_knowledge_graph(&self) -> bool {
        !self.knowledge_graph.is_empty()
    }

    /// Both blocks as one string, the graph block under its label.
    pub fn combined(&self) -> String {
        if self.knowledge_graph.is_empty() {
            return self.passages.clone();
        }
        if self.passages.is_empty() {
            return format!("{KNOWLEDGE_GRAPH_LABEL}\n{}", self.knowledge_graph);
        }
        format!(
            "{}\n\n{KNOWLEDGE_GRAPH_LABEL}\n{}",
            self.passages, self.knowledge_graph
        )
    }
}

/// Formats fused passages and graph facts into prompt context.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    max_passages: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self { max_passages: 3 }
    }
}

impl ContextAssembler {
    /// Creates an assembler that formats at most `max_passages` passages.
    #[must_use]
    pub fn new(max_passages: usize) -> Self {
        Self { max_passages }
    }

    /// Format the leading passages and the supplementary context.
    pub fn assemble(
        &self,
        fused: &FusedResult,
        supplementary: Option<&SupplementaryContext>,
    ) -> AssembledContext {
        AssembledContext {
            passages: self.format_passages(fused),
            knowledge_graph: supplementary
                .map(format_knowledge_graph)
                .unwrap_or_default(),
        }
    }

    /// Render the passage block only.
    pub fn format_passages(&self, fused: &FusedResult) -> String {
        fused
            .top(self.max_passages)
            .iter()
            .map(|f| {
                format!(
                    "Document: {}\nContent: {}",
                    f.passage.source(),
                    f.passage.content()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Render graph facts as labelled sections, omitting empty ones.
pub fn format_knowledge_graph(context: &SupplementaryContext) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !context.entities.is_empty() {
        let mut s = String::from("ENTITIES FOUND:");
        for entity in context.entities.iter().take(MAX_ENTITIES) {
            let _ = write!(
                s,
                "\n- {} ({}) - confidence: {}",
                entity.name,
                entity.entity_type,
                confidence(entity.confidence)
            );
        }
        sections.push(s);
    }

    if !context.relationships.is_empty() {
        let mut s = String::from("RELATIONSHIPS:");
        for rel in context.relationships.iter().take(MAX_RELATIONSHIPS) {
            let _ = write!(
                s,
                "\n- {} ({}) - {} - confidence: {}",
                rel.name,
                rel.entity_type,
                rel.relation,
                confidence(rel.confidence)
            );
        }
        sections.push(s);
    }

    if !context.paths.is_empty() {
        let mut s = String::from("CONNECTION PATHS:");
        for path in context.paths.iter().take(MAX_PATHS) {
            let _ = write!(
                s,
                "\n- Path: {}\n  Relations: {}\n  Confidence: {:.3}",
                path.entity_names.join(" → "),
                path.relations.join(" → "),
                path.path_confidence
            );
        }
        sections.push(s);
    }

    if !context.entity_details.is_empty() {
        let mut s = String::from("ENTITY DETAILS:");
        for detail in context.entity_details.iter().take(MAX_ENTITY_DETAILS) {
            let _ = write!(s, "\n- {} ({})", detail.name, detail.entity_type);
            if !detail.outgoing.is_empty() {
                s.push_str("\n  Outgoing relationships:");
                for link in detail.outgoing.iter().take(MAX_LINKS_PER_DIRECTION) {
                    let _ = write!(s, "\n    → {} ({})", link.entity, link.relation);
                }
            }
            if !detail.incoming.is_empty() {
                s.push_str("\n  Incoming relationships:");
                for link in detail.incoming.iter().take(MAX_LINKS_PER_DIRECTION) {
                    let _ = write!(s, "\n    ← {} ({})", link.entity, link.relation);
                }
            }
        }
        sections.push(s);
    }

    sections.join("\n\n")
}

fn confidence(value: Option<f32>) -> String {
    value.map_or_else(|| "N/A".to_string(), |c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contrail_core::{
        EntityDetail, EntityLink, FusedPassage, GraphEntity, GraphPath, Passage,
    };
    use pretty_assertions::assert_eq;

    fn fused(contents: &[(&str, &str)]) -> FusedResult {
        FusedResult {
            passages: contents
                .iter()
                .map(|(file, text)| FusedPassage {
                    passage: Passage::new(*text).with_metadata("filename", *file),
                    score: 0.1,
                })
                .collect(),
            lists_fused: 1,
            candidates_seen: contents.len(),
        }
    }

    #[test]
    fn test_passage_block_uses_first_three() {
        let result = fused(&[
            ("a.pdf", "one"),
            ("b.pdf", "two"),
            ("c.pdf", "three"),
            ("d.pdf", "four"),
        ]);

        let context = ContextAssembler::default().assemble(&result, None);

        assert_eq!(
            context.passages,
            "Document: a.pdf\nContent: one\n\nDocument: b.pdf\nContent: two\n\nDocument: c.pdf\nContent: three"
        );
        assert!(!context.has_knowledge_graph());
        assert_eq!(context.combined(), context.passages);
    }

    #[test]
    fn test_missing_filename_is_unknown() {
        let result = FusedResult {
            passages: vec![FusedPassage {
                passage: Passage::new("text"),
                score: 0.1,
            }],
            lists_fused: 1,
            candidates_seen: 1,
        };
        let block = ContextAssembler::default().format_passages(&result);
        assert_eq!(block, "Document: unknown\nContent: text");
    }

    #[test]
    fn test_empty_input_is_empty_string() {
        let context = ContextAssembler::default()
            .assemble(&FusedResult::default(), Some(&SupplementaryContext::default()));
        assert_eq!(context.combined(), "");
    }

    #[test]
    fn test_knowledge_graph_sections() {
        let supplementary = SupplementaryContext {
            entities: vec![GraphEntity {
                name: "Excess Baggage Fee".to_string(),
                entity_type: "Fee".to_string(),
                confidence: Some(0.9),
            }],
            relationships: Vec::new(),
            paths: vec![GraphPath {
                entity_names: vec!["Checked Bag".to_string(), "Excess Baggage Fee".to_string()],
                relations: vec!["INCURS".to_string()],
                path_confidence: 0.81,
            }],
            entity_details: vec![EntityDetail {
                name: "Checked Bag".to_string(),
                entity_type: "Item".to_string(),
                outgoing: vec![EntityLink {
                    entity: "Excess Baggage Fee".to_string(),
                    relation: "INCURS".to_string(),
                }],
                incoming: Vec::new(),
            }],
        };

        let block = format_knowledge_graph(&supplementary);

        assert_eq!(
            block,
            "ENTITIES FOUND:\n- Excess Baggage Fee (Fee) - confidence: 0.9\n\n\
             CONNECTION PATHS:\n- Path: Checked Bag → Excess Baggage Fee\n  Relations: INCURS\n  Confidence: 0.810\n\n\
             ENTITY DETAILS:\n- Checked Bag (Item)\n  Outgoing relationships:\n    → Excess Baggage Fee (INCURS)"
        );
    }

    #[test]
    fn test_entities_capped_and_unknown_confidence() {
        let supplementary = SupplementaryContext {
            entities: (0..7)
                .map(|i| GraphEntity {
                    name: format!("E{i}"),
                    entity_type: "Policy".to_string(),
                    confidence: None,
                })
                .collect(),
            ..SupplementaryContext::default()
        };

        let block = format_knowledge_graph(&supplementary);

        assert_eq!(block.lines().count(), 1 + MAX_ENTITIES);
        assert!(block.contains("- E0 (Policy) - confidence: N/A"));
        assert!(!block.contains("E5"));
    }

    #[test]
    fn test_combined_labels_graph_block() {
        let context = AssembledContext {
            passages: "Document: a\nContent: b".to_string(),
            knowledge_graph: "ENTITIES FOUND:".to_string(),
        };
        assert_eq!(
            context.combined(),
            "Document: a\nContent: b\n\nCONTEXT FROM KNOWLEDGE GRAPH:\nENTITIES FOUND:"
        );
    }
}
