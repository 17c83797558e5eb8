//! Cycle breaking.
//!
//! Ranking needs a DAG. Back edges found by a DFS in node insertion order are flagged as
//! `reversed`; later passes read edges through [`ranked_edges`], which flips them.

use crate::LayoutGraph;
use crate::graphlib::EdgeKey;
use rustc_hash::{FxHashMap, FxHashSet};

pub fn run(g: &mut LayoutGraph) {
    let nodes: Vec<String> = layered_nodes(g);
    let mut state: FxHashMap<String, bool> = FxHashMap::default();
    let mut back_edges: Vec<EdgeKey> = Vec::new();

    for start in &nodes {
        if state.contains_key(start) {
            continue;
        }
        // (node, next successor index)
        let mut stack: Vec<(String, usize)> = vec![(start.clone(), 0)];
        state.insert(start.clone(), true);
        while let Some((v, ix)) = stack.last().cloned() {
            let succ: Vec<String> = g
                .successors(&v)
                .into_iter()
                .filter(|w| !g.is_parent(w))
                .map(str::to_string)
                .collect();
            if let Some(w) = succ.get(ix) {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                match state.get(w) {
                    Some(true) => back_edges.push(EdgeKey::new(v.clone(), w.clone())),
                    Some(false) => {}
                    None => {
                        state.insert(w.clone(), true);
                        stack.push((w.clone(), 0));
                    }
                }
            } else {
                state.insert(v.clone(), false);
                stack.pop();
            }
        }
    }

    for e in back_edges {
        if let Some(label) = g.edge_mut(&e.v, &e.w) {
            label.reversed = true;
        }
    }
}

/// Nodes that take part in ranking: everything except compound parents.
pub fn layered_nodes(g: &LayoutGraph) -> Vec<String> {
    g.nodes()
        .filter(|v| !g.is_parent(v))
        .map(str::to_string)
        .collect()
}

/// Edges between layered nodes, oriented for ranking, without self-loops.
pub fn ranked_edges(g: &LayoutGraph) -> Vec<(String, String, usize)> {
    let layered: FxHashSet<String> = layered_nodes(g).into_iter().collect();
    let mut out = Vec::new();
    g.for_each_edge(|key, label| {
        if key.v == key.w || !layered.contains(&key.v) || !layered.contains(&key.w) {
            return;
        }
        let minlen = label.minlen.max(1);
        if label.reversed {
            out.push((key.w.clone(), key.v.clone(), minlen));
        } else {
            out.push((key.v.clone(), key.w.clone(), minlen));
        }
    });
    out
}
