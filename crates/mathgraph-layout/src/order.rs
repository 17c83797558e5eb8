//! Node ordering within ranks.
//!
//! Starts from a DFS order (children stay next to their parents, left to right in edge insertion
//! order) and improves it with alternating barycenter sweeps, keeping the layering with the
//! fewest crossings.

use crate::LayoutGraph;
use crate::acyclic::{layered_nodes, ranked_edges};
use rustc_hash::{FxHashMap, FxHashSet};

const SWEEPS: usize = 4;

pub fn run(g: &mut LayoutGraph) -> Vec<Vec<String>> {
    let edges = ranked_edges(g);
    let mut down: FxHashMap<String, Vec<String>> = FxHashMap::default();
    let mut up: FxHashMap<String, Vec<String>> = FxHashMap::default();
    for (v, w, _) in &edges {
        down.entry(v.clone()).or_default().push(w.clone());
        up.entry(w.clone()).or_default().push(v.clone());
    }

    let mut layering = init_order(g, &down);
    let mut best = layering.clone();
    let mut best_cc = cross_count(&layering, &down);

    for i in 0..SWEEPS {
        if best_cc == 0 {
            break;
        }
        if i % 2 == 0 {
            for r in 1..layering.len() {
                sweep_layer(&mut layering, r, &up);
            }
        } else {
            for r in (0..layering.len().saturating_sub(1)).rev() {
                sweep_layer(&mut layering, r, &down);
            }
        }
        let cc = cross_count(&layering, &down);
        if cc < best_cc {
            best_cc = cc;
            best = layering.clone();
        }
    }

    for layer in &best {
        for (ix, v) in layer.iter().enumerate() {
            if let Some(label) = g.node_mut(v) {
                label.order = Some(ix);
            }
        }
    }
    best
}

pub fn init_order(
    g: &LayoutGraph,
    down: &FxHashMap<String, Vec<String>>,
) -> Vec<Vec<String>> {
    let nodes = layered_nodes(g);
    let rank_of = |v: &str| g.node(v).and_then(|n| n.rank).unwrap_or(0).max(0) as usize;
    let Some(max_rank) = nodes.iter().map(|v| rank_of(v)).max() else {
        return Vec::new();
    };
    let mut layers: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    let mut visited: FxHashSet<String> = FxHashSet::default();

    // Rust's sort is stable, so nodes of equal rank keep insertion order.
    let mut starts = nodes.clone();
    starts.sort_by_key(|v| rank_of(v));

    for start in starts {
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            if !visited.insert(v.clone()) {
                continue;
            }
            layers[rank_of(&v)].push(v.clone());
            if let Some(ws) = down.get(&v) {
                for w in ws.iter().rev() {
                    if !visited.contains(w) {
                        stack.push(w.clone());
                    }
                }
            }
        }
    }
    layers
}

fn sweep_layer(
    layering: &mut [Vec<String>],
    r: usize,
    neighbors: &FxHashMap<String, Vec<String>>,
) {
    let mut position: FxHashMap<&str, usize> = FxHashMap::default();
    for layer in layering.iter() {
        for (ix, v) in layer.iter().enumerate() {
            position.insert(v.as_str(), ix);
        }
    }

    let mut keyed: Vec<(f64, String)> = layering[r]
        .iter()
        .enumerate()
        .map(|(ix, v)| {
            let adj: Vec<usize> = neighbors
                .get(v)
                .map(|ns| {
                    ns.iter()
                        .filter_map(|n| position.get(n.as_str()).copied())
                        .collect()
                })
                .unwrap_or_default();
            let bary = if adj.is_empty() {
                ix as f64
            } else {
                adj.iter().sum::<usize>() as f64 / adj.len() as f64
            };
            (bary, v.clone())
        })
        .collect();

    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    layering[r] = keyed.into_iter().map(|(_, v)| v).collect();
}

/// Weighted crossings between adjacent layers (accumulator tree, as in dagre's `crossCount`).
pub fn cross_count(layering: &[Vec<String>], down: &FxHashMap<String, Vec<String>>) -> usize {
    let mut cc = 0;
    for i in 1..layering.len() {
        cc += two_layer_cross_count(&layering[i - 1], &layering[i], down);
    }
    cc
}

fn two_layer_cross_count(
    north: &[String],
    south: &[String],
    down: &FxHashMap<String, Vec<String>>,
) -> usize {
    if south.is_empty() {
        return 0;
    }
    let south_pos: FxHashMap<&str, usize> = south
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    let mut south_entries: Vec<usize> = Vec::new();
    for v in north {
        let mut entries: Vec<usize> = down
            .get(v)
            .map(|ws| {
                ws.iter()
                    .filter_map(|w| south_pos.get(w.as_str()).copied())
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_unstable();
        south_entries.extend(entries);
    }

    let mut first_index: usize = 1;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree: Vec<usize> = vec![0; tree_size];

    let mut cc = 0;
    for pos in south_entries {
        let mut index = pos + first_index;
        tree[index] += 1;
        let mut weight_sum = 0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += 1;
        }
        cc += weight_sum;
    }
    cc
}
