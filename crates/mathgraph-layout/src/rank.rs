//! Rank assignment.
//!
//! Top-down longest path: sources sit on rank 0 and every node sits `minlen` below its lowest
//! predecessor. Expression trees come out with one rank per depth level.

use crate::LayoutGraph;
use crate::acyclic::{layered_nodes, ranked_edges};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

pub fn assign(g: &mut LayoutGraph) {
    let nodes = layered_nodes(g);
    let edges = ranked_edges(g);

    let mut indegree: FxHashMap<&str, usize> = nodes.iter().map(|v| (v.as_str(), 0)).collect();
    let mut out: FxHashMap<&str, Vec<(&str, usize)>> = FxHashMap::default();
    for (v, w, minlen) in &edges {
        if let Some(d) = indegree.get_mut(w.as_str()) {
            *d += 1;
        }
        out.entry(v.as_str()).or_default().push((w.as_str(), *minlen));
    }

    // Deterministic Kahn order: initial nodes in insertion order.
    let mut queue: VecDeque<&str> = nodes
        .iter()
        .map(String::as_str)
        .filter(|v| indegree.get(v).copied().unwrap_or(0) == 0)
        .collect();
    let mut rank: FxHashMap<&str, i32> = nodes.iter().map(|v| (v.as_str(), 0)).collect();

    while let Some(v) = queue.pop_front() {
        let r = rank.get(v).copied().unwrap_or(0);
        let Some(targets) = out.get(v) else {
            continue;
        };
        for &(w, minlen) in targets {
            let next = r.saturating_add(minlen as i32);
            let entry = rank.entry(w).or_insert(0);
            if next > *entry {
                *entry = next;
            }
            if let Some(d) = indegree.get_mut(w) {
                *d = d.saturating_sub(1);
                if *d == 0 {
                    queue.push_back(w);
                }
            }
        }
    }

    let ranks: Vec<(String, i32)> = rank.into_iter().map(|(k, r)| (k.to_string(), r)).collect();
    for (v, r) in ranks {
        if let Some(label) = g.node_mut(&v) {
            label.rank = Some(r);
        }
    }
    normalize(g);
}

/// Shifts ranks so the smallest one is 0.
pub fn normalize(g: &mut LayoutGraph) {
    let mut min_rank = i32::MAX;
    g.for_each_node(|_, n| {
        if let Some(r) = n.rank {
            min_rank = min_rank.min(r);
        }
    });
    if min_rank == i32::MAX || min_rank == 0 {
        return;
    }
    g.for_each_node_mut(|_, n| {
        if let Some(r) = n.rank.as_mut() {
            *r -= min_rank;
        }
    });
}
