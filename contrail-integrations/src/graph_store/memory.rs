//! In-memory knowledge graph used as a supplementary context provider.
//!
//! A lookup finds entities whose names contain one of the query's key terms
//! and then gathers, for the first matches:
//!
//! - the matched entities, most confident first
//! - entities one edge away in either direction
//! - paths of one or two hops starting at a match
//! - the full neighbourhood of the best match per term

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use contrail_core::{
    ContextProvider, ContrailError, EntityDetail, EntityLink, GraphEntity, GraphPath,
    GraphRelationship, Result, SupplementaryContext,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const MIN_TERM_CHARS: usize = 3;
const ENTITY_TERMS: usize = 3;
const NEIGHBOURHOOD_TERMS: usize = 2;
const ENTITIES_PER_TERM: usize = 5;
const RELATIONSHIPS_PER_DIRECTION: usize = 5;
const PATHS_PER_TERM: usize = 6;
const MAX_HOPS: usize = 2;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "can", "how", "what", "when", "where", "which", "who", "why",
    "with", "does", "from", "about", "have", "that", "this", "there", "your", "you", "into",
    "will", "any", "may", "get", "much", "many",
];

/// A stored entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntity {
    /// Unique entity name.
    pub name: String,
    /// Entity type, e.g. `Fee` or `Airline`.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Extraction confidence, when known.
    pub confidence: Option<f32>,
}

/// A directed, labelled edge between two stored entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRelation {
    /// Name of the source entity.
    pub source: String,
    /// Name of the target entity.
    pub target: String,
    /// Relationship label.
    pub relation: String,
    /// Relationship confidence.
    pub confidence: f32,
}

#[derive(Debug, Default)]
struct Graph {
    entities: Vec<KnowledgeEntity>,
    relations: Vec<KnowledgeRelation>,
}

impl Graph {
    fn entity(&self, name: &str) -> Option<&KnowledgeEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    fn entity_type(&self, name: &str) -> String {
        self.entity(name)
            .map(|e| e.entity_type.clone())
            .unwrap_or_default()
    }

    /// Entities whose lowercased name contains `term`, most confident first.
    fn matching(&self, term: &str) -> Vec<&KnowledgeEntity> {
        let mut matches: Vec<&KnowledgeEntity> = self
            .entities
            .iter()
            .filter(|e| e.name.to_lowercase().contains(term))
            .collect();
        matches.sort_by(|a, b| {
            b.confidence
                .unwrap_or_default()
                .total_cmp(&a.confidence.unwrap_or_default())
        });
        matches
    }

    fn outgoing<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a KnowledgeRelation> {
        self.relations.iter().filter(move |r| r.source == name)
    }

    fn incoming<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a KnowledgeRelation> {
        self.relations.iter().filter(move |r| r.target == name)
    }

    /// Walk outgoing edges from `start` up to `MAX_HOPS`, skipping cycles.
    fn paths_from(&self, start: &str) -> Vec<GraphPath> {
        let mut paths = Vec::new();
        let mut stack: Vec<(Vec<String>, Vec<String>, f32)> =
            vec![(vec![start.to_string()], Vec::new(), 1.0)];

        while let Some((names, relations, confidence)) = stack.pop() {
            if relations.len() == MAX_HOPS {
                continue;
            }
            let Some(last) = names.last() else { continue };

            for edge in self.outgoing(last) {
                if names.contains(&edge.target) {
                    continue;
                }
                let mut next_names = names.clone();
                next_names.push(edge.target.clone());
                let mut next_relations = relations.clone();
                next_relations.push(edge.relation.clone());
                let next_confidence = confidence * edge.confidence;

                paths.push(GraphPath {
                    entity_names: next_names.clone(),
                    relations: next_relations.clone(),
                    path_confidence: next_confidence,
                });
                stack.push((next_names, next_relations, next_confidence));
            }
        }

        paths.sort_by(|a, b| b.path_confidence.total_cmp(&a.path_confidence));
        paths
    }

    fn detail(&self, entity: &KnowledgeEntity) -> EntityDetail {
        EntityDetail {
            name: entity.name.clone(),
            entity_type: entity.entity_type.clone(),
            outgoing: sorted_by_confidence(self.outgoing(&entity.name))
                .into_iter()
                .map(|r| EntityLink {
                    entity: r.target.clone(),
                    relation: r.relation.clone(),
                })
                .collect(),
            incoming: sorted_by_confidence(self.incoming(&entity.name))
                .into_iter()
                .map(|r| EntityLink {
                    entity: r.source.clone(),
                    relation: r.relation.clone(),
                })
                .collect(),
        }
    }
}

fn sorted_by_confidence<'a>(
    edges: impl Iterator<Item = &'a KnowledgeRelation>,
) -> Vec<&'a KnowledgeRelation> {
    let mut edges: Vec<_> = edges.collect();
    edges.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    edges
}

/// Key terms of a query: lowercased words of at least three characters that
/// are not stop words, in order of first appearance.
pub fn key_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= MIN_TERM_CHARS && !STOP_WORDS.contains(&w.as_str()))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Knowledge graph held in memory.
///
/// # Examples
///
/// ```rust
/// use contrail_core::ContextProvider;
/// use contrail_integrations::graph_store::{InMemoryKnowledgeGraph, KnowledgeEntity, KnowledgeRelation};
///
/// # #[tokio::main]
/// # async fn main() -> contrail_core::Result<()> {
/// let graph = InMemoryKnowledgeGraph::new();
/// graph.add_entity(KnowledgeEntity {
///     name: "Checked Bag".to_string(),
///     entity_type: "Item".to_string(),
///     confidence: Some(0.9),
/// })?;
/// graph.add_entity(KnowledgeEntity {
///     name: "Excess Baggage Fee".to_string(),
///     entity_type: "Fee".to_string(),
///     confidence: Some(0.8),
/// })?;
/// graph.add_relation(KnowledgeRelation {
///     source: "Checked Bag".to_string(),
///     target: "Excess Baggage Fee".to_string(),
///     relation: "INCURS".to_string(),
///     confidence: 0.9,
/// })?;
///
/// let context = graph.lookup("How much is a checked bag?").await?;
/// assert_eq!(context.entities[0].name, "Checked Bag");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryKnowledgeGraph {
    graph: Arc<RwLock<Graph>>,
}

impl InMemoryKnowledgeGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, replacing any entity with the same name.
    pub fn add_entity(&self, entity: KnowledgeEntity) -> Result<()> {
        let mut graph = self.write()?;
        match graph.entities.iter_mut().find(|e| e.name == entity.name) {
            Some(existing) => *existing = entity,
            None => graph.entities.push(entity),
        }
        Ok(())
    }

    /// Add a relation between two existing entities.
    ///
    /// # Errors
    ///
    /// Returns a validation error when either endpoint is unknown.
    pub fn add_relation(&self, relation: KnowledgeRelation) -> Result<()> {
        let mut graph = self.write()?;
        for endpoint in [&relation.source, &relation.target] {
            if graph.entity(endpoint).is_none() {
                return Err(ContrailError::validation(format!(
                    "Unknown entity in relation: {endpoint}"
                )));
            }
        }
        graph.relations.push(relation);
        Ok(())
    }

    /// Number of stored entities and relations.
    pub fn size(&self) -> Result<(usize, usize)> {
        let graph = self.read()?;
        Ok((graph.entities.len(), graph.relations.len()))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Graph>> {
        self.graph.read().map_err(|_| {
            ContrailError::context_provider("Failed to acquire read lock on graph")
        })
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Graph>> {
        self.graph.write().map_err(|_| {
            ContrailError::context_provider("Failed to acquire write lock on graph")
        })
    }

    fn collect(&self, query: &str) -> Result<SupplementaryContext> {
        let graph = self.read()?;

        // Only terms that name at least one entity take part.
        let terms: Vec<String> = key_terms(query)
            .into_iter()
            .filter(|t| !graph.matching(t).is_empty())
            .collect();
        debug!("Graph terms for query: {:?}", terms);

        let mut context = SupplementaryContext::default();
        let mut seen_entities = HashSet::new();

        for term in terms.iter().take(ENTITY_TERMS) {
            for entity in graph.matching(term).into_iter().take(ENTITIES_PER_TERM) {
                if seen_entities.insert(entity.name.clone()) {
                    context.entities.push(GraphEntity {
                        name: entity.name.clone(),
                        entity_type: entity.entity_type.clone(),
                        confidence: entity.confidence,
                    });
                }
            }
        }

        // Two terms can match the same center; keep each fact once.
        let mut seen_relationships = HashSet::new();
        let mut seen_paths = HashSet::new();
        let mut seen_details = HashSet::new();

        for term in terms.iter().take(NEIGHBOURHOOD_TERMS) {
            let centers = graph.matching(term);

            let outgoing = sorted_by_confidence(centers.iter().flat_map(|c| graph.outgoing(&c.name)));
            for r in outgoing.into_iter().take(RELATIONSHIPS_PER_DIRECTION) {
                if seen_relationships.insert((true, r.target.clone(), r.relation.clone())) {
                    context.relationships.push(GraphRelationship {
                        name: r.target.clone(),
                        entity_type: graph.entity_type(&r.target),
                        relation: r.relation.clone(),
                        confidence: Some(r.confidence),
                    });
                }
            }

            let incoming = sorted_by_confidence(centers.iter().flat_map(|c| graph.incoming(&c.name)));
            for r in incoming.into_iter().take(RELATIONSHIPS_PER_DIRECTION) {
                if seen_relationships.insert((false, r.source.clone(), r.relation.clone())) {
                    context.relationships.push(GraphRelationship {
                        name: r.source.clone(),
                        entity_type: graph.entity_type(&r.source),
                        relation: r.relation.clone(),
                        confidence: Some(r.confidence),
                    });
                }
            }

            let mut paths: Vec<GraphPath> =
                centers.iter().flat_map(|c| graph.paths_from(&c.name)).collect();
            paths.sort_by(|a, b| b.path_confidence.total_cmp(&a.path_confidence));
            for path in paths.into_iter().take(PATHS_PER_TERM) {
                if seen_paths.insert((path.entity_names.clone(), path.relations.clone())) {
                    context.paths.push(path);
                }
            }

            if let Some(best) = centers.first() {
                if seen_details.insert(best.name.clone()) {
                    context.entity_details.push(graph.detail(best));
                }
            }
        }

        Ok(context)
    }
}

#[async_trait]
impl ContextProvider for InMemoryKnowledgeGraph {
    #[instrument(skip(self), fields(provider = "InMemoryKnowledgeGraph"))]
    async fn lookup(&self, query: &str) -> Result<SupplementaryContext> {
        let context = self.collect(query)?;
        debug!(
            "Found {} entities, {} relationships, {} paths",
            context.entities.len(),
            context.relationships.len(),
            context.paths.len()
        );
        Ok(context)
    }
}
