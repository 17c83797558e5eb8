//! Compound node bounds.
//!
//! Members are laid out like any other node; afterwards each compound node is sized to the
//! bounding box of its members plus `cluster_padding`. Nested compounds are resolved bottom-up.

use crate::LayoutGraph;

pub fn run(g: &mut LayoutGraph) {
    let padding = g.graph().cluster_padding;
    let roots: Vec<String> = g
        .children_root()
        .into_iter()
        .filter(|v| g.is_parent(v))
        .map(str::to_string)
        .collect();
    for root in roots {
        size_cluster(g, &root, padding);
    }
}

fn size_cluster(g: &mut LayoutGraph, v: &str, padding: f64) -> Option<(f64, f64, f64, f64)> {
    let children: Vec<String> = g.children(v).into_iter().map(str::to_string).collect();
    if children.is_empty() {
        let n = g.node(v)?;
        let (x, y) = (n.x?, n.y?);
        return Some((
            x - n.width / 2.0,
            y - n.height / 2.0,
            x + n.width / 2.0,
            y + n.height / 2.0,
        ));
    }

    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for child in &children {
        let Some((x0, y0, x1, y1)) = size_cluster(g, child, padding) else {
            continue;
        };
        bounds = Some(match bounds {
            None => (x0, y0, x1, y1),
            Some((a0, b0, a1, b1)) => (a0.min(x0), b0.min(y0), a1.max(x1), b1.max(y1)),
        });
    }

    // A compound without positioned members keeps no position.
    let (x0, y0, x1, y1) = bounds?;
    let (x0, y0, x1, y1) = (x0 - padding, y0 - padding, x1 + padding, y1 + padding);
    let n = g.node_mut(v)?;
    n.width = x1 - x0;
    n.height = y1 - y0;
    n.x = Some((x0 + x1) / 2.0);
    n.y = Some((y0 + y1) / 2.0);
    Some((x0, y0, x1, y1))
}
