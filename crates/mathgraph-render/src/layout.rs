//! Layout capabilities.
//!
//! The session only ever lays out what is visible: hidden nodes, edges touching them, and
//! containers whose members are all hidden are left out.

use crate::model::{NodeStyle, Position};
use indexmap::IndexMap;
use mathgraph_core::ElementGraph;
use mathgraph_layout::{EdgeLabel, GraphLabel, NodeLabel};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    pub positions: IndexMap<String, Position>,
    pub width: f64,
    pub height: f64,
}

pub trait LayoutProvider {
    /// Positions the visible part of `graph`. Must be idempotent.
    fn run(&self, graph: &ElementGraph, styles: &IndexMap<String, NodeStyle>) -> LayoutResult;
}

/// Layered top-down layout from `mathgraph-layout`.
#[derive(Debug, Clone, Default)]
pub struct LayeredLayout {
    pub options: GraphLabel,
}

impl LayeredLayout {
    pub fn new(options: GraphLabel) -> Self {
        Self { options }
    }
}

impl LayoutProvider for LayeredLayout {
    fn run(&self, graph: &ElementGraph, styles: &IndexMap<String, NodeStyle>) -> LayoutResult {
        let mut g = mathgraph_layout::new_graph(self.options.clone());
        for n in graph.nodes().filter(|n| n.visible) {
            if n.is_container() && !graph.grouped(&n.id).iter().any(|m| graph.is_visible(m)) {
                continue;
            }
            let label = match styles.get(&n.id) {
                Some(s) if !n.is_container() => NodeLabel::sized(s.width, s.height),
                _ => NodeLabel::default(),
            };
            g.set_node(n.id.clone(), label);
        }
        for n in graph.nodes() {
            if let Some(group) = graph.group_of(&n.id) {
                if g.has_node(&n.id) && g.has_node(group) {
                    g.set_parent(&n.id, group);
                }
            }
        }
        for e in graph.edges() {
            g.set_edge(&e.source, &e.target, EdgeLabel::default());
        }

        mathgraph_layout::layout(&mut g);

        let mut positions = IndexMap::new();
        g.for_each_node(|id, n| {
            if let (Some(x), Some(y)) = (n.x, n.y) {
                positions.insert(
                    id.to_string(),
                    Position {
                        x,
                        y,
                        width: n.width,
                        height: n.height,
                    },
                );
            }
        });
        LayoutResult {
            positions,
            width: g.graph().width.unwrap_or(0.0),
            height: g.graph().height.unwrap_or(0.0),
        }
    }
}

/// Leaves every node unpositioned.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLayout;

impl LayoutProvider for NoLayout {
    fn run(&self, _graph: &ElementGraph, _styles: &IndexMap<String, NodeStyle>) -> LayoutResult {
        LayoutResult::default()
    }
}
