//! Adjacency cache used by [`Graph`](super::Graph).
//!
//! Descendant walks and layout ranking query successors and in-edges repeatedly; scanning every
//! edge per query is O(E). The cache is rebuilt lazily whenever the generation moves.

#[derive(Debug, Clone)]
pub(in crate::graph) struct AdjCache {
    pub(in crate::graph) generation: u64,
    pub(in crate::graph) out_offsets: Vec<usize>,
    pub(in crate::graph) out_edges: Vec<usize>,
    pub(in crate::graph) in_offsets: Vec<usize>,
    pub(in crate::graph) in_edges: Vec<usize>,
}

impl AdjCache {
    /// Builds CSR-style adjacency from `(v_ix, w_ix)` endpoint pairs in edge order.
    pub(in crate::graph) fn build(
        generation: u64,
        node_count: usize,
        endpoints: impl Iterator<Item = (usize, usize)> + Clone,
    ) -> Self {
        let mut out_counts = vec![0usize; node_count + 1];
        let mut in_counts = vec![0usize; node_count + 1];
        for (v, w) in endpoints.clone() {
            out_counts[v + 1] += 1;
            in_counts[w + 1] += 1;
        }
        for i in 1..=node_count {
            out_counts[i] += out_counts[i - 1];
            in_counts[i] += in_counts[i - 1];
        }

        let total = out_counts[node_count];
        let mut out_edges = vec![0usize; total];
        let mut in_edges = vec![0usize; total];
        let mut out_fill = out_counts.clone();
        let mut in_fill = in_counts.clone();
        for (edge_ix, (v, w)) in endpoints.enumerate() {
            out_edges[out_fill[v]] = edge_ix;
            out_fill[v] += 1;
            in_edges[in_fill[w]] = edge_ix;
            in_fill[w] += 1;
        }

        Self {
            generation,
            out_offsets: out_counts,
            out_edges,
            in_offsets: in_counts,
            in_edges,
        }
    }

    pub(in crate::graph) fn out_edges(&self, v_ix: usize) -> &[usize] {
        let start = self.out_offsets[v_ix];
        let end = self.out_offsets[v_ix + 1];
        &self.out_edges[start..end]
    }

    pub(in crate::graph) fn in_edges(&self, v_ix: usize) -> &[usize] {
        let start = self.in_offsets[v_ix];
        let end = self.in_offsets[v_ix + 1];
        &self.in_edges[start..end]
    }
}
