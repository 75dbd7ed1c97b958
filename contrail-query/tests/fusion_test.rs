//! Behavioural tests for Reciprocal Rank Fusion.

use approx::assert_relative_eq;
use contrail_core::{Passage, RankedList};
use contrail_query::fusion::ReciprocalRankFusion;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn p(name: &str) -> Passage {
    Passage::new(format!("{name} content")).with_metadata("filename", name)
}

fn list(query: &str, names: &[&str]) -> RankedList {
    RankedList::new(query, names.iter().map(|n| p(n)).collect())
}

fn sources(result: &contrail_core::FusedResult) -> Vec<String> {
    result
        .iter()
        .map(|f| f.passage.source().to_string())
        .collect()
}

#[test]
fn test_literal_two_list_scenario() {
    let a = list("A", &["P1", "P2", "P3"]);
    let b = list("B", &["P2", "P1", "P4"]);

    let fused = ReciprocalRankFusion::new(60.0, 10).fuse(&[a, b]);

    assert_eq!(sources(&fused), vec!["P1", "P2", "P3", "P4"]);
    assert_relative_eq!(fused.passages[0].score, 1.0 / 60.0 + 1.0 / 61.0);
    assert_relative_eq!(fused.passages[1].score, 1.0 / 61.0 + 1.0 / 60.0);
    assert_relative_eq!(fused.passages[2].score, 1.0 / 62.0);
    assert_relative_eq!(fused.passages[3].score, 1.0 / 62.0);
    assert_eq!(fused.lists_fused, 2);
    assert_eq!(fused.candidates_seen, 4);
}

#[test]
fn test_fusion_is_deterministic() {
    let lists = vec![
        list("q1", &["a", "b", "c"]),
        list("q2", &["c", "d", "a"]),
        list("q3", &["e", "b", "d"]),
        list("q4", &["f", "g", "h"]),
    ];
    let rrf = ReciprocalRankFusion::default();

    let first = rrf.fuse(&lists);
    for _ in 0..20 {
        assert_eq!(rrf.fuse(&lists), first);
    }
}

#[test]
fn test_score_is_exact_sum_over_occurrences() {
    let lists = vec![
        list("q1", &["x", "shared"]),
        list("q2", &["y", "z", "shared"]),
        list("q3", &["shared"]),
    ];

    let fused = ReciprocalRankFusion::new(60.0, 10).fuse(&lists);

    let shared = fused
        .iter()
        .find(|f| f.passage.source() == "shared")
        .unwrap();
    assert_relative_eq!(shared.score, 1.0 / 61.0 + 1.0 / 62.0 + 1.0 / 60.0);
    assert_eq!(fused.passages[0].passage.source(), "shared");
}

#[test]
fn test_same_chunk_with_different_scores_merges() {
    let first = p("refunds").with_score(0.91);
    let second = p("refunds").with_score(0.74);

    let fused = ReciprocalRankFusion::default().fuse(&[
        RankedList::new("q1", vec![first]),
        RankedList::new("q2", vec![second]),
    ]);

    assert_eq!(fused.len(), 1);
    assert_eq!(fused.passages[0].passage.score(), Some(0.91));
}

#[test]
fn test_metadata_key_order_does_not_split_entries() {
    let a = Passage::new("Pets travel in the cabin under 8kg.")
        .with_metadata("filename", "pets")
        .with_metadata("file_type", "md")
        .with_metadata("file_path", "/docs/pets.md");
    let b = Passage::new("Pets travel in the cabin under 8kg.")
        .with_metadata("file_path", json!("/docs/pets.md"))
        .with_metadata("file_type", json!("md"))
        .with_metadata("filename", json!("pets"));

    let fused = ReciprocalRankFusion::default().fuse(&[
        RankedList::new("q1", vec![a]),
        RankedList::new("q2", vec![p("other"), b]),
    ]);

    assert_eq!(sources(&fused), vec!["pets", "other"]);
}

#[test_case(1 ; "limit one")]
#[test_case(3 ; "limit three")]
#[test_case(10 ; "default limit")]
fn test_output_is_bounded(limit: usize) {
    let names: Vec<String> = (0..8).map(|i| format!("doc{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let lists = vec![list("q1", &refs[..4]), list("q2", &refs[4..])];

    let fused = ReciprocalRankFusion::new(60.0, limit).fuse(&lists);

    assert!(fused.len() <= limit);
    assert_eq!(fused.len(), limit.min(8));
    assert_eq!(fused.candidates_seen, 8);
}

#[test]
fn test_empty_lists_fuse_to_nothing() {
    let rrf = ReciprocalRankFusion::default();
    assert!(rrf.fuse(&[]).is_empty());
    assert!(rrf.fuse(&[RankedList::empty("a"), RankedList::empty("b")]).is_empty());
}

#[test]
fn test_higher_k_flattens_rank_influence() {
    // "b" is deep in one list but present in two; a small k favours the
    // single top hit, a large k favours breadth.
    let lists = vec![
        list("q1", &["a", "x1", "x2", "x3", "b"]),
        list("q2", &["y1", "y2", "y3", "y4", "b"]),
    ];

    let steep = ReciprocalRankFusion::new(1.0, 10).fuse(&lists);
    let flat = ReciprocalRankFusion::new(1000.0, 10).fuse(&lists);

    assert_eq!(steep.passages[0].passage.source(), "a");
    assert_eq!(flat.passages[0].passage.source(), "b");
}
