use super::{goat, small};
use crate::*;

#[test]
fn merge_without_correspondences_doubles_the_graph() {
    let g = goat();
    let merged = merge(&g, &g, &[]).unwrap();
    assert_eq!(merged.node_count(), 40);
    assert_eq!(merged.edge_count(), 38);
    assert!(merged.contains("A.c1"));
    assert!(merged.contains("B.c1"));
    merged.validate().unwrap();
}

#[test]
fn merge_does_not_mutate_the_input_trees() {
    let g = goat();
    let before = g.clone();
    merge(&g, &g, &[Correspondence::new("c12").identical("c12")]).unwrap();
    assert_eq!(g, before);
}

#[test]
fn merge_identical_unifies_both_subtrees_into_the_source() {
    let g = goat();
    let merged = merge(&g, &g, &[Correspondence::new("c12").identical("c12")]).unwrap();

    assert_eq!(merged.node_count(), 33);
    assert_eq!(merged.edge_count(), 32);
    assert_eq!(merged.summary().elements, 65);
    for gone in ["A.c13", "A.c14", "A.c15", "B.c12", "B.c13", "B.c14", "B.c15"] {
        assert!(!merged.contains(gone), "{gone} should be removed");
    }

    let moved = merged.edge("B.c10", "A.c12").unwrap();
    assert_eq!(moved.id, "B.c10-A.c12");
    assert_eq!(moved.class, Some(EdgeClass::Hierarchy));
    assert!(merged.edge("A.c10", "A.c12").is_some());

    let source = merged.node("A.c12").unwrap();
    assert_eq!(source.marker, Some(MatchMarker::Identical));
    assert_eq!(source.classes(), "top-center match math-identical");
    merged.validate().unwrap();
}

#[test]
fn merge_identical_keeps_the_redirected_child_in_place() {
    let g = goat();
    let merged = merge(&g, &g, &[Correspondence::new("c2").identical("c2")]).unwrap();

    assert_eq!(merged.children("B.c1"), vec!["A.c2", "B.c3", "B.c4"]);
    assert_eq!(merged.first_child("B.c1"), Some("A.c2"));
    assert_eq!(merged.first_child("A.c1"), Some("A.c2"));
    assert_eq!(merged.incoming("A.c2").len(), 2);
    merged.validate().unwrap();
}

#[test]
fn merge_similar_groups_the_pair_and_hides_descendants() {
    let g = goat();
    let merged = merge(&g, &g, &[Correspondence::new("c12").similar("c12")]).unwrap();

    assert_eq!(merged.node_count(), 40);
    assert_eq!(merged.edge_count(), 34);
    assert_eq!(merged.summary().elements, 74);
    assert!(!merged.contains("B.c12"));

    let container = merged.node("match-similar-A.c12-B.c12").unwrap();
    assert_eq!(container.label, "Similar");
    assert_eq!(container.classes(), "matchContainer");
    assert_eq!(container.members(), ["A.c12".to_string(), "B.c12".to_string()]);
    assert_eq!(merged.group_of("A.c12"), Some("match-similar-A.c12-B.c12"));

    let source = merged.node("A.c12").unwrap();
    assert_eq!(source.marker, Some(MatchMarker::Similar));
    assert_eq!(source.expansion, Expansion::Collapsed);
    assert_eq!(
        source.collapse.as_ref().map(|m| m.hidden.clone()),
        Some(vec!["A.c13".into(), "A.c14".into(), "A.c15".into()])
    );
    for hidden in ["A.c13", "A.c14", "A.c15", "B.c13", "B.c14", "B.c15"] {
        assert!(merged.contains(hidden));
        assert!(!merged.is_visible(hidden), "{hidden} should be hidden");
    }

    // The target's operands move into the container so they can still be shown.
    let container = merged.node("match-similar-A.c12-B.c12").unwrap();
    assert_eq!(container.expansion, Expansion::Collapsed);
    assert_eq!(
        container.collapse.as_ref().map(|m| m.hidden.clone()),
        Some(vec!["B.c13".into(), "B.c14".into(), "B.c15".into()])
    );
    assert_eq!(merged.group_of("B.c14"), Some("match-similar-A.c12-B.c12"));

    let summary = merged.summary();
    assert_eq!(summary.containers, 1);
    assert_eq!(summary.visible_nodes, 34);
    assert_eq!(summary.visible_edges, 31);
    merged.validate().unwrap();
}

#[test]
fn merge_reuses_the_container_for_a_second_similar_match() {
    let s = small();
    let merged = merge(&s, &s, &[Correspondence::new("t").similar("t").similar("a")]).unwrap();

    let containers: Vec<&GraphNode> = merged.nodes().filter(|n| n.is_container()).collect();
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].id, "match-similar-A.t-B.t");
    assert_eq!(
        containers[0].members(),
        ["A.t".to_string(), "B.t".to_string(), "B.a".to_string()]
    );
    assert!(!merged.contains("B.a"));
}

#[test]
fn merge_applies_matches_in_order_against_current_ids() {
    let s = small();
    // The first match removes `A.b`, so the second one no longer resolves.
    let err = merge(
        &s,
        &s,
        &[
            Correspondence::new("t").identical("t"),
            Correspondence::new("b").identical("b"),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnresolvedNode { ref id } if id == "A.b"));
}

#[test]
fn merge_rejects_a_target_consumed_by_an_earlier_match() {
    let s = small();
    let err = merge(
        &s,
        &s,
        &[
            Correspondence::new("a").similar("a"),
            Correspondence::new("op").identical("a"),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, Error::TargetAlreadyMatched { ref id } if id == "B.a"));
}

#[test]
fn merge_into_leaves_the_graph_unaltered_on_failure() {
    let s = small();
    let mut graph = merge(&s, &s, &[]).unwrap();
    let before = graph.to_elements();

    let err = merge_into(
        &mut graph,
        &[
            Correspondence::new("t").identical("t"),
            Correspondence::new("nope").similar("a"),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnresolvedNode { .. }));
    assert_eq!(graph.to_elements(), before);

    merge_into(&mut graph, &[Correspondence::new("t").identical("t")]).unwrap();
    assert_eq!(graph.node_count(), 14 - 3 - 3 - 1);
}

#[test]
fn merge_rejects_unsupported_types_before_touching_the_graph() {
    let s = small();
    let mut graph = merge(&s, &s, &[]).unwrap();
    let before = graph.summary();

    let err = parse_correspondences(r#"[{"id":"t","matches":[{"id":"t","type":"related"}]}]"#)
        .and_then(|cs| merge_into(&mut graph, &cs))
        .unwrap_err();
    assert_eq!(err.to_string(), "Similarity type related is not supported.");
    assert_eq!(graph.summary(), before);
}
