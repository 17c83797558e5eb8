use futures::executor::block_on;
use mathgraph_core::{Correspondence, Expansion, ExprNode, RenderConfig, parse_mathml};
use mathgraph_render::{
    Capabilities, ClickOutcome, Hover, ImageRequest, LOADING_FAILED, LayeredLayout, NoLayout,
    RenderSession, SymbolLookup, WikidataTooltips, compare, render_single_tree,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
}

fn goat() -> ExprNode {
    let xml = std::fs::read_to_string(fixtures_root().join("mathml").join("goat.mml.xml")).unwrap();
    parse_mathml(&xml).unwrap()
}

fn visible(session: &RenderSession) -> BTreeSet<String> {
    session.graph().visible_node_ids().into_iter().collect()
}

fn no_layout() -> Capabilities {
    Capabilities::default().with_layout(NoLayout)
}

#[test]
fn goat_renders_every_element() {
    let s = render_single_tree(&goat(), &RenderConfig::headless(), &Capabilities::default()).unwrap();
    let summary = s.graph().summary();
    assert_eq!(summary.elements, 39);
    assert_eq!(summary.edges, 19);
    assert_eq!(summary.nodes, 20);
    assert_eq!(summary.visible_elements, 39);
}

#[test]
fn goat_apply_form_hides_first_children() {
    let config = RenderConfig {
        apply_form: true,
        ..RenderConfig::headless()
    };
    let s = render_single_tree(&goat(), &config, &Capabilities::default()).unwrap();
    let summary = s.graph().summary();
    assert_eq!(summary.visible_elements, 25);
    assert_eq!(summary.visible_edges, 12);
    assert_eq!(summary.visible_nodes, 13);
    assert_eq!(
        s.graph().node("c1").unwrap().expansion,
        Expansion::ExpandedFirstChild
    );
    assert!(!s.graph().is_visible("c2"));
}

#[test]
fn collapse_then_expand_restores_the_visible_set() {
    let mut s = render_single_tree(&goat(), &RenderConfig::headless(), &no_layout()).unwrap();
    let before = visible(&s);

    assert_eq!(s.click("c4"), ClickOutcome::Collapsed);
    assert_eq!(s.graph().node("c4").unwrap().expansion, Expansion::Collapsed);
    for id in s.graph().descendants("c4") {
        assert!(!s.graph().is_visible(&id), "{id} should be hidden");
    }
    assert_eq!(visible(&s).len(), 4);

    assert_eq!(s.click("c4"), ClickOutcome::Expanded);
    assert_eq!(visible(&s), before);
    assert_eq!(s.graph().node("c4").unwrap().expansion, Expansion::Normal);
}

#[test]
fn nested_collapses_keep_their_own_hidden_sets() {
    let mut s = render_single_tree(&goat(), &RenderConfig::headless(), &no_layout()).unwrap();
    let before = visible(&s);

    s.click("c10");
    let inner_collapsed = visible(&s);
    s.click("c4");
    s.click("c4");
    assert_eq!(visible(&s), inner_collapsed);
    assert!(!s.graph().is_visible("c12"));

    s.click("c10");
    assert_eq!(visible(&s), before);
}

#[test]
fn first_child_click_switches_to_the_apply_form() {
    let mut s = render_single_tree(&goat(), &RenderConfig::headless(), &no_layout()).unwrap();

    assert_eq!(s.click("c13"), ClickOutcome::ApplyForm);
    assert!(!s.graph().is_visible("c13"));
    assert_eq!(
        s.graph().node("c12").unwrap().expansion,
        Expansion::ExpandedFirstChild
    );

    // The hidden first child is not part of the collapse memo, so it stays folded.
    s.click("c12");
    s.click("c12");
    assert!(!s.graph().is_visible("c13"));
    assert!(s.graph().is_visible("c14"));
    assert_eq!(
        s.graph().node("c12").unwrap().expansion,
        Expansion::ExpandedFirstChild
    );
}

#[test]
fn clicks_on_hidden_unknown_or_leaf_nodes_are_ignored() {
    let mut s = render_single_tree(&goat(), &RenderConfig::headless(), &no_layout()).unwrap();
    s.click("c12");
    assert_eq!(s.click("c14"), ClickOutcome::Ignored);
    assert_eq!(s.click("nope"), ClickOutcome::Ignored);
    assert_eq!(s.click("c3"), ClickOutcome::Ignored);
}

#[test]
fn layout_positions_only_visible_nodes() {
    let mut s = render_single_tree(&goat(), &RenderConfig::default(), &Capabilities::default()).unwrap();
    assert_eq!(s.layout_passes(), 1);
    assert!(s.graph().nodes().all(|n| s.position(&n.id).is_some()));
    let root = *s.position("c1").unwrap();
    let child = *s.position("c4").unwrap();
    assert!(root.y < child.y);
    assert_eq!((root.width, root.height), (30.0, 30.0));

    s.click("c4");
    assert_eq!(s.layout_passes(), 2);
    assert!(s.position("c12").is_none());
    assert!(s.position("c4").is_some());

    let out = s.output();
    assert!(out.width > 0.0 && out.height > 0.0);
    assert_eq!(out.elements.len(), 39);
}

#[test]
fn layout_is_skipped_without_a_drawing_surface() {
    let mut s = render_single_tree(&goat(), &RenderConfig::headless(), &Capabilities::default()).unwrap();
    s.click("c4");
    assert_eq!(s.layout_passes(), 0);
    assert!(s.position("c1").is_none());
}

#[test]
fn batches_defer_layout_until_the_outermost_end() {
    let mut s = render_single_tree(&goat(), &RenderConfig::default(), &Capabilities::default()).unwrap();
    let passes = s.layout_passes();

    s.start_batch();
    s.start_batch();
    s.click("c4");
    s.click("c10");
    s.end_batch();
    assert_eq!(s.layout_passes(), passes);
    s.end_batch();
    assert_eq!(s.layout_passes(), passes + 1);
}

#[test]
fn layout_is_idempotent() {
    let mut s = render_single_tree(&goat(), &RenderConfig::default(), &Capabilities::default()).unwrap();
    let first = s.output();
    s.run_layout();
    assert_eq!(s.output(), first);
}

fn with_images() -> RenderConfig {
    RenderConfig {
        image_template: Some("/img/{id}.svg".into()),
        ..RenderConfig::default()
    }
}

#[test]
fn images_resize_nodes() {
    let mut s = render_single_tree(&goat(), &with_images(), &no_layout()).unwrap();
    let requests = s.take_image_requests();
    assert_eq!(requests.len(), 20);
    assert!(s.take_image_requests().is_empty());

    let c1 = requests.iter().find(|r| r.node_id == "c1").unwrap();
    assert_eq!(c1.url, "/img/p1.svg");
    assert_eq!(
        s.style("c1").unwrap().background_image.as_deref(),
        Some("/img/p1.svg")
    );

    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4.5ex" height="1.2ex"></svg>"#;
    assert!(s.apply_image(c1, Ok::<_, String>(svg.to_string())));
    let style = s.style("c1").unwrap();
    assert_eq!((style.width, style.height), (54.0, 30.0));

    let c3 = requests.iter().find(|r| r.node_id == "c3").unwrap();
    assert!(!s.apply_image(c3, Err("connection refused")));
    assert!(!s.apply_image(c3, Ok::<_, String>("not svg".into())));
    let style = s.style("c3").unwrap();
    assert_eq!((style.width, style.height), (30.0, 30.0));
}

#[test]
fn headless_sessions_do_not_request_images() {
    let config = RenderConfig {
        headless: true,
        ..with_images()
    };
    let mut s = render_single_tree(&goat(), &config, &no_layout()).unwrap();
    assert!(s.take_image_requests().is_empty());
    assert_eq!(
        s.style("c3").unwrap().background_image.as_deref(),
        Some("/img/p3.svg")
    );
}

#[test]
fn stale_responses_are_ignored() {
    let mut old = render_single_tree(&goat(), &with_images(), &no_layout()).unwrap();
    let mut new = render_single_tree(&goat(), &with_images(), &no_layout()).unwrap();
    assert_ne!(old.token(), new.token());

    let svg = r#"<svg width="10ex" height="10ex"/>"#.to_string();
    let old_req = old.take_image_requests().remove(0);
    assert!(!new.apply_image(&old_req, Ok::<_, String>(svg.clone())));

    old.destroy();
    assert!(!old.apply_image(&old_req, Ok::<_, String>(svg.clone())));
    assert_eq!(old.click("c4"), ClickOutcome::Ignored);

    let missing = ImageRequest {
        node_id: "gone".into(),
        ..new.take_image_requests().remove(0)
    };
    assert!(!new.apply_image(&missing, Ok::<_, String>(svg)));
}

fn with_tooltips() -> Capabilities {
    no_layout().with_tooltips(WikidataTooltips)
}

#[test]
fn csymbol_tooltips_start_pending_and_follow_hover() {
    let mut s = render_single_tree(&goat(), &RenderConfig::default(), &with_tooltips()).unwrap();
    let tip = s.tooltip("c7").unwrap();
    assert_eq!(
        tip.content,
        "Fetching information for symbol Q33456 from content directory wikidata."
    );
    assert!(!tip.visible);

    assert!(s.hover("c7", Hover::Enter).unwrap().visible);
    assert!(!s.hover("c7", Hover::Leave).unwrap().visible);
    assert!(s.hover("c3", Hover::Enter).is_none());

    let lookups = s.take_symbol_lookups();
    assert_eq!(lookups.len(), 1);
    assert_eq!(
        lookups[0].url,
        "http://www.wikidata.org/wiki/Special:EntityData/Q33456.json"
    );
}

#[test]
fn headless_sessions_have_no_tooltips() {
    let mut s = render_single_tree(&goat(), &RenderConfig::headless(), &with_tooltips()).unwrap();
    assert!(s.tooltip("c7").is_none());
    assert!(s.take_symbol_lookups().is_empty());
}

#[test]
fn resolve_pending_applies_every_response() {
    let mut s = render_single_tree(&goat(), &with_images(), &with_tooltips()).unwrap();

    block_on(s.resolve_pending(
        |req: &ImageRequest| {
            let wide = req.node_id == "c1";
            async move {
                if wide {
                    Ok(r#"<svg width="8ex" height="3ex"/>"#.to_string())
                } else {
                    Err("offline".to_string())
                }
            }
        },
        |lookup: &SymbolLookup| {
            let body = format!(
                r#"{{"entities":{{"{0}":{{"labels":{{"en":{{"value":"exponentiation"}}}}}}}}}}"#,
                lookup.symbol
            );
            async move { Ok(body) }
        },
    ));

    let style = s.style("c1").unwrap();
    assert_eq!((style.width, style.height), (96.0, 36.0));
    assert_eq!(s.style("c2").unwrap().width, 30.0);
    let tip = &s.tooltip("c7").unwrap().content;
    assert!(tip.contains("<p>exponentiation</p>"));
    assert!(tip.contains("<p>no description</p>"));
}

#[test]
fn failed_symbol_lookups_show_loading_failed() {
    let mut s = render_single_tree(&goat(), &RenderConfig::default(), &with_tooltips()).unwrap();
    let lookup = s.take_symbol_lookups().remove(0);
    assert!(s.apply_symbol(&lookup, Err("timeout")));
    assert_eq!(s.tooltip("c7").unwrap().content, LOADING_FAILED);
}

#[test]
fn compare_goat_with_itself() {
    let g = goat();
    let cfg = RenderConfig::headless();

    let identical = compare(
        &g,
        &g,
        &[Correspondence::new("c12").identical("c12")],
        &cfg,
        &Capabilities::default(),
    )
    .unwrap();
    let summary = identical.graph().summary();
    assert_eq!((summary.nodes, summary.edges), (33, 32));

    let similar = compare(
        &g,
        &g,
        &[Correspondence::new("c12").similar("c12")],
        &cfg,
        &Capabilities::default(),
    )
    .unwrap();
    let summary = similar.graph().summary();
    assert_eq!((summary.nodes, summary.edges), (40, 34));
    assert_eq!(summary.elements, 74);
}

#[test]
fn similar_containers_enclose_their_members() {
    let g = goat();
    let mut s = compare(
        &g,
        &g,
        &[Correspondence::new("c12").similar("c12")],
        &RenderConfig::default(),
        &Capabilities::default().with_layout(LayeredLayout::default()),
    )
    .unwrap();
    let container = *s.position("match-similar-A.c12-B.c12").unwrap();
    let member = *s.position("A.c12").unwrap();
    assert!(container.width > member.width);
    assert!((container.x - member.x).abs() < 1e-9);

    // The similar match left A.c12 collapsed; expanding reveals its operands.
    assert_eq!(s.click("A.c12"), ClickOutcome::Expanded);
    assert!(s.graph().is_visible("A.c14"));

    // The removed target's operands live on in the container.
    assert!(s.position("B.c14").is_none());
    assert_eq!(
        s.click("match-similar-A.c12-B.c12"),
        ClickOutcome::Expanded
    );
    let container = *s.position("match-similar-A.c12-B.c12").unwrap();
    let operand = *s.position("B.c14").unwrap();
    assert!((operand.x - container.x).abs() < container.width / 2.0);
}

#[test]
fn similar_container_toggles_the_matched_target_operands() {
    let g = goat();
    let mut s = compare(
        &g,
        &g,
        &[Correspondence::new("c12").similar("c12")],
        &RenderConfig::headless(),
        &Capabilities::default(),
    )
    .unwrap();
    let container = "match-similar-A.c12-B.c12";
    assert_eq!(
        s.graph().grouped(container),
        vec!["A.c12", "B.c13", "B.c14", "B.c15"]
    );
    let before = visible(&s);

    assert_eq!(s.click(container), ClickOutcome::Expanded);
    for id in ["B.c13", "B.c14", "B.c15"] {
        assert!(s.graph().is_visible(id), "{id} should be shown");
    }
    assert!(!s.graph().is_visible("A.c14"));

    assert_eq!(s.click(container), ClickOutcome::Collapsed);
    assert_eq!(visible(&s), before);
    assert_eq!(s.click(container), ClickOutcome::Expanded);
}

#[test]
fn identical_match_on_an_operator_keeps_it_first() {
    let g = goat();
    let config = RenderConfig {
        apply_form: true,
        ..RenderConfig::headless()
    };
    let s = compare(
        &g,
        &g,
        &[Correspondence::new("c2").identical("c2")],
        &config,
        &Capabilities::default(),
    )
    .unwrap();
    let graph = s.graph();
    assert_eq!(graph.children("B.c1"), vec!["A.c2", "B.c3", "B.c4"]);
    assert_eq!(graph.first_child("B.c1"), Some("A.c2"));

    // Only the shared operator is folded away; every real operand stays visible.
    assert!(!graph.is_visible("A.c2"));
    assert!(graph.is_visible("A.c3"));
    assert!(graph.is_visible("B.c3"));
    for apply in ["A.c1", "B.c1"] {
        assert_eq!(
            graph.node(apply).unwrap().expansion,
            Expansion::ExpandedFirstChild
        );
    }
}

#[test]
fn clicking_a_unified_operator_folds_both_parents() {
    let g = goat();
    let mut s = compare(
        &g,
        &g,
        &[Correspondence::new("c2").identical("c2")],
        &RenderConfig::headless(),
        &Capabilities::default(),
    )
    .unwrap();
    let summary = s.graph().summary();
    assert_eq!((summary.nodes, summary.edges), (39, 38));

    assert_eq!(s.click("A.c2"), ClickOutcome::ApplyForm);
    for apply in ["A.c1", "B.c1"] {
        assert_eq!(
            s.graph().node(apply).unwrap().expansion,
            Expansion::ExpandedFirstChild
        );
    }
    let summary = s.graph().summary();
    assert_eq!((summary.visible_nodes, summary.visible_edges), (38, 36));
    assert_eq!(s.click("B.c3"), ClickOutcome::Ignored);
    assert_eq!(s.click("A.c2"), ClickOutcome::Ignored);
}

#[test]
fn cs_tooltips_need_no_provider() {
    let xml = r#"<math><apply id="r"><plus id="p"/><cs id="s">hello</cs><csymbol id="q" cd="wikidata">Q1</csymbol></apply></math>"#;
    let tree = parse_mathml(xml).unwrap();
    let mut s = render_single_tree(&tree, &RenderConfig::default(), &no_layout()).unwrap();

    assert_eq!(s.tooltip("s").unwrap().content, "hello");
    assert!(s.tooltip("q").is_none());
    assert!(s.take_symbol_lookups().is_empty());
    assert!(s.hover("s", Hover::Enter).unwrap().visible);
}

#[test]
fn invalid_config_is_rejected() {
    let config = RenderConfig {
        ex_scaling_factor: -1.0,
        ..RenderConfig::default()
    };
    let err = render_single_tree(&goat(), &config, &Capabilities::default()).unwrap_err();
    assert!(matches!(
        err,
        mathgraph_render::Error::Core(mathgraph_core::Error::InvalidConfig { .. })
    ));
}
