#![cfg(feature = "render")]

use mathgraph::RenderConfig;
use mathgraph::render::{HeadlessError, compare_mathml, render_mathml};

const EXPR: &str = r#"<math><apply id="r"><plus id="op"/><ci id="x">x</ci><cn id="one">1</cn></apply></math>"#;

#[test]
fn render_mathml_produces_positioned_elements() {
    let session = render_mathml(EXPR, &RenderConfig::default()).unwrap();
    let out = session.output();
    assert_eq!(out.summary.nodes, 4);
    assert_eq!(out.summary.edges, 3);
    assert!(
        out.elements
            .iter()
            .filter(|e| e.element.data.source.is_none())
            .all(|e| e.position.is_some())
    );
}

#[test]
fn compare_mathml_merges_identical_roots() {
    let session = compare_mathml(
        EXPR,
        EXPR,
        r#"[{"id":"r","matches":[{"id":"r","type":"identical"}]}]"#,
        &RenderConfig::headless(),
    )
    .unwrap();
    let summary = session.graph().summary();
    assert_eq!(summary.nodes, 1);
    assert_eq!(summary.edges, 0);
    let json = serde_json::to_value(session.output()).unwrap();
    assert_eq!(json["elements"][0]["classes"], "top-center match math-identical");
}

#[test]
fn compare_mathml_reports_unsupported_types() {
    let err = compare_mathml(
        EXPR,
        EXPR,
        r#"[{"id":"r","matches":[{"id":"r","type":"equivalent"}]}]"#,
        &RenderConfig::headless(),
    )
    .unwrap_err();
    assert!(matches!(err, HeadlessError::Parse(_)));
    assert_eq!(err.to_string(), "Similarity type equivalent is not supported.");
}
