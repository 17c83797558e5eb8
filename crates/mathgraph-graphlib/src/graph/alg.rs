//! Traversal helpers over [`Graph`](super::Graph) successors.

use super::Graph;
use rustc_hash::FxHashSet;

/// Every node reachable from `v` through outgoing edges, excluding `v` itself, in preorder.
///
/// Iterative so that deep expression trees cannot overflow the stack.
pub fn successors_closure<N, E, G>(g: &Graph<N, E, G>, v: &str) -> Vec<String> {
    let mut visited = FxHashSet::default();
    visited.insert(v.to_string());
    let mut out: Vec<String> = Vec::new();
    let mut stack: Vec<String> = g
        .successors(v)
        .into_iter()
        .rev()
        .map(str::to_string)
        .collect();
    while let Some(w) = stack.pop() {
        if !visited.insert(w.clone()) {
            continue;
        }
        for x in g.successors(&w).into_iter().rev() {
            if !visited.contains(x) {
                stack.push(x.to_string());
            }
        }
        out.push(w);
    }
    out
}
