#![forbid(unsafe_code)]

//! Layered graph layout in the manner of dagre.
//!
//! Pipeline: break cycles, rank (longest path from the sources), order each rank (DFS seed plus
//! barycenter sweeps), assign coordinates, size compound nodes, route straight edge segments,
//! then map back to the requested rank direction and translate into the margins.
//!
//! The layout is deterministic: the same graph (including insertion order) always yields the
//! same coordinates, so calling [`layout`] again on an unchanged graph is a no-op in effect.

pub use mathgraph_graphlib as graphlib;

pub mod acyclic;
pub mod compound;
pub mod coordinate_system;
pub mod model;
pub mod order;
pub mod position;
pub mod rank;

pub use model::{EdgeLabel, GraphLabel, NodeLabel, Point, RankDir};

pub type LayoutGraph = graphlib::Graph<NodeLabel, EdgeLabel, GraphLabel>;

/// Creates an empty compound layout graph carrying `label`.
pub fn new_graph(label: GraphLabel) -> LayoutGraph {
    let mut g = LayoutGraph::new(graphlib::GraphOptions::compound());
    g.set_graph(label);
    g
}

pub fn layout(g: &mut LayoutGraph) {
    if acyclic::layered_nodes(g).is_empty() {
        g.graph_mut().width = Some(0.0);
        g.graph_mut().height = Some(0.0);
        return;
    }

    coordinate_system::adjust(g);
    acyclic::run(g);
    rank::assign(g);
    let layering = order::run(g);
    position::run(g, &layering);
    compound::run(g);
    assign_edge_points(g);
    coordinate_system::undo(g);
    translate_graph(g);
}

fn assign_edge_points(g: &mut LayoutGraph) {
    let mut boxes: rustc_hash::FxHashMap<String, (f64, f64, f64)> = Default::default();
    g.for_each_node(|id, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            boxes.insert(id.to_string(), (x, y, n.height));
        }
    });
    g.for_each_edge_mut(|key, e| {
        e.points.clear();
        let (Some(&(vx, vy, vh)), Some(&(wx, wy, wh))) =
            (boxes.get(key.v.as_str()), boxes.get(key.w.as_str()))
        else {
            return;
        };
        let (start, end) = if vy <= wy {
            (vy + vh / 2.0, wy - wh / 2.0)
        } else {
            (vy - vh / 2.0, wy + wh / 2.0)
        };
        e.points.push(Point { x: vx, y: start });
        e.points.push(Point { x: wx, y: end });
    });
}

fn translate_graph(g: &mut LayoutGraph) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    g.for_each_node(|_, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            min_x = min_x.min(x - n.width / 2.0);
            min_y = min_y.min(y - n.height / 2.0);
            max_x = max_x.max(x + n.width / 2.0);
            max_y = max_y.max(y + n.height / 2.0);
        }
    });
    if !min_x.is_finite() || !min_y.is_finite() {
        return;
    }

    let marginx = g.graph().marginx;
    let marginy = g.graph().marginy;
    let dx = marginx - min_x;
    let dy = marginy - min_y;
    g.for_each_node_mut(|_, n| {
        if let Some(x) = n.x.as_mut() {
            *x += dx;
        }
        if let Some(y) = n.y.as_mut() {
            *y += dy;
        }
    });
    g.for_each_edge_mut(|_, e| {
        for p in &mut e.points {
            p.x += dx;
            p.y += dy;
        }
    });

    let label = g.graph_mut();
    label.width = Some(max_x - min_x + 2.0 * marginx);
    label.height = Some(max_y - min_y + 2.0 * marginy);
}
