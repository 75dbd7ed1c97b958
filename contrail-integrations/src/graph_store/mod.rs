//! Knowledge-graph context providers.

pub mod memory;

pub use memory::{InMemoryKnowledgeGraph, KnowledgeEntity, KnowledgeRelation, key_terms};
