//! Structured facts from the knowledge-graph lookup.
//!
//! These mirror what the graph-search subsystem returns for a query: matched
//! entities, entities related to them, multi-hop connection paths, and the
//! neighbourhood of the best matches.

use serde::{Deserialize, Serialize};

/// An entity matched by the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEntity {
    /// Entity name.
    pub name: String,
    /// Entity type, e.g. `Fee`, `Policy`, `Airport`.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Extraction confidence, when known.
    pub confidence: Option<f32>,
}

/// An entity reached from a matched entity through one relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRelationship {
    /// Name of the related entity.
    pub name: String,
    /// Type of the related entity.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Relationship label.
    pub relation: String,
    /// Relationship confidence, when known.
    pub confidence: Option<f32>,
}

/// A multi-hop path through the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPath {
    /// Entity names along the path, start first.
    pub entity_names: Vec<String>,
    /// Relationship labels between consecutive entities.
    pub relations: Vec<String>,
    /// Product of edge confidences along the path.
    pub path_confidence: f32,
}

/// One edge in an entity's neighbourhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityLink {
    /// The entity on the other end of the edge.
    pub entity: String,
    /// Relationship label.
    pub relation: String,
}

/// An entity with its incoming and outgoing edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetail {
    /// Entity name.
    pub name: String,
    /// Entity type.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Edges leaving this entity.
    pub outgoing: Vec<EntityLink>,
    /// Edges arriving at this entity.
    pub incoming: Vec<EntityLink>,
}

/// Supplementary structured context for a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplementaryContext {
    /// Entities matching the query text.
    pub entities: Vec<GraphEntity>,
    /// Entities related to the matches.
    pub relationships: Vec<GraphRelationship>,
    /// Multi-hop connection paths.
    pub paths: Vec<GraphPath>,
    /// Neighbourhoods of the strongest matches.
    pub entity_details: Vec<EntityDetail>,
}

impl SupplementaryContext {
    /// Whether every section is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.relationships.is_empty()
            && self.paths.is_empty()
            && self.entity_details.is_empty()
    }
}
