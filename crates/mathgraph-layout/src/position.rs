//! Coordinate assignment for ordered layers (top-to-bottom coordinate system).
//!
//! `y` follows the rank: each layer is as tall as its tallest node, layers are `ranksep` apart.
//! `x` starts packed left to right with `nodesep` gaps, then alternating passes move every node
//! towards the mean of its neighbors in the previous/next layer. Each pass resolves overlaps by
//! averaging a left-anchored and a right-anchored placement, both of which keep the gaps.

use crate::LayoutGraph;
use crate::acyclic::ranked_edges;
use rustc_hash::FxHashMap;

const PASSES: usize = 8;

pub fn run(g: &mut LayoutGraph, layering: &[Vec<String>]) {
    let label = g.graph().clone();
    let width_of = |g: &LayoutGraph, v: &str| g.node(v).map(|n| n.width).unwrap_or(0.0);
    let height_of = |g: &LayoutGraph, v: &str| g.node(v).map(|n| n.height).unwrap_or(0.0);

    let mut y = 0.0;
    let mut ys: Vec<f64> = Vec::with_capacity(layering.len());
    for layer in layering {
        let h = layer
            .iter()
            .map(|v| height_of(g, v))
            .fold(0.0_f64, f64::max);
        ys.push(y + h / 2.0);
        y += h + label.ranksep;
    }

    let mut xs: FxHashMap<String, f64> = FxHashMap::default();
    for layer in layering {
        let mut right = 0.0;
        for (ix, v) in layer.iter().enumerate() {
            let w = width_of(g, v);
            if ix > 0 {
                right += label.nodesep;
            }
            xs.insert(v.clone(), right + w / 2.0);
            right += w;
        }
    }

    let mut preds: FxHashMap<String, Vec<String>> = FxHashMap::default();
    let mut succs: FxHashMap<String, Vec<String>> = FxHashMap::default();
    for (v, w, _) in ranked_edges(g) {
        succs.entry(v.clone()).or_default().push(w.clone());
        preds.entry(w).or_default().push(v);
    }

    for pass in 0..PASSES {
        let (layers, neighbors): (Vec<&Vec<String>>, _) = if pass % 2 == 0 {
            (layering.iter().skip(1).collect(), &preds)
        } else {
            (layering.iter().rev().skip(1).collect(), &succs)
        };
        for layer in layers {
            let desired: Vec<f64> = layer
                .iter()
                .map(|v| {
                    let current = xs.get(v).copied().unwrap_or(0.0);
                    let Some(ns) = neighbors.get(v) else {
                        return current;
                    };
                    let placed: Vec<f64> = ns.iter().filter_map(|n| xs.get(n).copied()).collect();
                    if placed.is_empty() {
                        current
                    } else {
                        placed.iter().sum::<f64>() / placed.len() as f64
                    }
                })
                .collect();
            let widths: Vec<f64> = layer.iter().map(|v| width_of(g, v)).collect();
            let placed = place_layer(&desired, &widths, label.nodesep);
            for (v, x) in layer.iter().zip(placed) {
                xs.insert(v.clone(), x);
            }
        }
    }

    for (r, layer) in layering.iter().enumerate() {
        for v in layer {
            let x = xs.get(v).copied();
            if let Some(n) = g.node_mut(v) {
                n.x = x;
                n.y = Some(ys[r]);
            }
        }
    }
}

/// Places nodes as close to `desired` as the minimum gaps allow, preserving order.
fn place_layer(desired: &[f64], widths: &[f64], nodesep: f64) -> Vec<f64> {
    let n = desired.len();
    if n == 0 {
        return Vec::new();
    }
    let gap = |i: usize| widths[i] / 2.0 + nodesep + widths[i + 1] / 2.0;

    let mut left = desired.to_vec();
    for i in 1..n {
        left[i] = left[i].max(left[i - 1] + gap(i - 1));
    }
    let mut right = desired.to_vec();
    for i in (0..n - 1).rev() {
        right[i] = right[i].min(right[i + 1] - gap(i));
    }
    left.iter().zip(&right).map(|(l, r)| (l + r) / 2.0).collect()
}

#[cfg(test)]
mod tests {
    use super::place_layer;

    #[test]
    fn place_layer_keeps_minimum_gaps() {
        let placed = place_layer(&[0.0, 0.0, 0.0], &[10.0, 10.0, 10.0], 5.0);
        assert_eq!(placed, vec![-15.0, 0.0, 15.0]);
    }

    #[test]
    fn place_layer_leaves_spread_nodes_alone() {
        let placed = place_layer(&[0.0, 100.0], &[10.0, 10.0], 5.0);
        assert_eq!(placed, vec![0.0, 100.0]);
    }
}
