//! Integration tests for the in-memory index and knowledge graph.

use std::sync::Arc;

use contrail_core::{ContextProvider, SimilarityIndex};
use contrail_integrations::graph_store::{KnowledgeEntity, KnowledgeRelation};
use contrail_integrations::{InMemoryKnowledgeGraph, InMemorySimilarityIndex, IndexedPassage};
use pretty_assertions::assert_eq;
use serde_json::json;

fn passages_from_json() -> Vec<IndexedPassage> {
    serde_json::from_value(json!([
        {
            "embedding": [0.9, 0.1, 0.0],
            "content": "Each passenger may check two bags up to 23 kg.",
            "metadata": {"filename": "baggage.pdf", "file_type": "pdf", "file_path": "/policies/baggage.pdf"}
        },
        {
            "embedding": [0.1, 0.9, 0.0],
            "content": "Refunds are issued within seven business days.",
            "metadata": {"filename": "refunds.pdf", "file_type": "pdf", "file_path": "/policies/refunds.pdf"}
        },
        {
            "embedding": [0.0, 0.2, 0.9],
            "content": "Small pets may travel in the cabin.",
            "metadata": {"filename": "pets.md", "file_type": "md", "file_path": "/policies/pets.md"}
        }
    ]))
    .unwrap()
}

#[tokio::test]
async fn test_index_loaded_from_json_answers_nearest_first() {
    let index = InMemorySimilarityIndex::new(3);
    assert_eq!(index.insert(passages_from_json()).unwrap(), 3);

    let shared: Arc<dyn SimilarityIndex> = Arc::new(index);
    let matches = shared.query(&[0.0, 1.0, 0.1], 2).await.unwrap();

    let files: Vec<_> = matches
        .iter()
        .map(|m| m.metadata["filename"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(files, vec!["refunds.pdf", "pets.md"]);
    assert!(matches[0].score > matches[1].score);
}

#[tokio::test]
async fn test_concurrent_queries_share_one_index() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let index = Arc::new(InMemorySimilarityIndex::new(3));
    index.insert(passages_from_json()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let index = Arc::clone(&index);
            tokio::spawn(async move { index.query(&[1.0, 0.0, 0.0], 1).await })
        })
        .collect();

    for handle in handles {
        let matches = handle.await.unwrap().unwrap();
        assert_eq!(matches[0].metadata["filename"], "baggage.pdf");
    }
}

#[tokio::test]
async fn test_graph_loaded_from_json() {
    let entities: Vec<KnowledgeEntity> = serde_json::from_value(json!([
        {"name": "Pet Carrier", "type": "Item", "confidence": 0.9},
        {"name": "Cabin", "type": "Location", "confidence": null},
        {"name": "Pet Fee", "type": "Fee", "confidence": 0.8}
    ]))
    .unwrap();
    let relations: Vec<KnowledgeRelation> = serde_json::from_value(json!([
        {"source": "Pet Carrier", "target": "Cabin", "relation": "ALLOWED_IN", "confidence": 0.9},
        {"source": "Cabin", "target": "Pet Fee", "relation": "REQUIRES", "confidence": 0.5}
    ]))
    .unwrap();

    let graph = InMemoryKnowledgeGraph::new();
    for entity in entities {
        graph.add_entity(entity).unwrap();
    }
    for relation in relations {
        graph.add_relation(relation).unwrap();
    }

    let context = graph.lookup("Can my pet carrier go in the cabin?").await.unwrap();

    let names: Vec<_> = context.entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Pet Carrier", "Pet Fee", "Cabin"]);
    assert!(context.entities[2].confidence.is_none());
    assert!(
        context
            .paths
            .iter()
            .any(|p| p.entity_names == ["Pet Carrier", "Cabin", "Pet Fee"])
    );
}
