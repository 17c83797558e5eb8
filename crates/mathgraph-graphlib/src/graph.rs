//! The core [`Graph`] container plus a few traversal helpers under [`alg`].

mod adj_cache;
pub mod alg;
mod edge_key;
mod entries;
mod options;

use adj_cache::AdjCache;
use entries::{EdgeEntry, NodeEntry};
use rustc_hash::FxBuildHasher;
use std::cell::{RefCell, RefMut};

pub use edge_key::EdgeKey;
pub use options::GraphOptions;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Directed graph with string ids, node labels `N`, edge labels `E` and a graph label `G`.
///
/// Insertion order of nodes and edges is preserved and observable through every iterator, which
/// keeps downstream algorithms deterministic.
#[derive(Debug, Clone)]
pub struct Graph<N, E, G = ()> {
    options: GraphOptions,
    graph_label: G,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,

    parent: HashMap<String, String>,
    children: HashMap<String, Vec<String>>,

    // Queries stay on `&self`; the cache is rebuilt on first use after any structural change.
    adj_gen: u64,
    adj_cache: RefCell<Option<AdjCache>>,
}

impl<N, E, G: Default> Graph<N, E, G> {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            graph_label: G::default(),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            parent: HashMap::default(),
            children: HashMap::default(),
            adj_gen: 0,
            adj_cache: RefCell::new(None),
        }
    }
}

impl<N, E, G> Graph<N, E, G> {
    fn invalidate_adj(&mut self) {
        self.adj_gen = self.adj_gen.wrapping_add(1);
        *self.adj_cache.get_mut() = None;
    }

    fn ensure_adj(&self) -> RefMut<'_, AdjCache> {
        let generation = self.adj_gen;
        let mut cache = self.adj_cache.borrow_mut();
        let stale = cache
            .as_ref()
            .map(|c| c.generation != generation)
            .unwrap_or(true);
        if stale {
            let endpoints = self.edges.iter().filter_map(|e| {
                let v = *self.node_index.get(e.key.v.as_str())?;
                let w = *self.node_index.get(e.key.w.as_str())?;
                Some((v, w))
            });
            *cache = Some(AdjCache::build(generation, self.nodes.len(), endpoints));
        }
        RefMut::map(cache, |c| {
            c.get_or_insert_with(|| AdjCache::build(generation, 0, std::iter::empty()))
        })
    }

    fn reindex_nodes_from(&mut self, start: usize) {
        for i in start..self.nodes.len() {
            if let Some(slot) = self.node_index.get_mut(self.nodes[i].id.as_str()) {
                *slot = i;
            }
        }
    }

    fn reindex_edges_from(&mut self, start: usize) {
        for i in start..self.edges.len() {
            if let Some(slot) = self.edge_index.get_mut(&self.edges[i].key.view()) {
                *slot = i;
            }
        }
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.graph_label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph_label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph_label
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts `id`, or replaces its label when it already exists (position is kept).
    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        self.invalidate_adj();
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
        });
        self.node_index.insert(id, idx);
        self
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].label)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn for_each_node<F>(&self, mut f: F)
    where
        F: FnMut(&str, &N),
    {
        for n in &self.nodes {
            f(&n.id, &n.label);
        }
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut N),
    {
        for n in &mut self.nodes {
            f(&n.id, &mut n.label);
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|e| &e.key)
    }

    pub fn for_each_edge<F>(&self, mut f: F)
    where
        F: FnMut(&EdgeKey, &E),
    {
        for e in &self.edges {
            f(&e.key, &e.label);
        }
    }

    pub fn for_each_edge_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&EdgeKey, &mut E),
    {
        for e in &mut self.edges {
            f(&e.key, &mut e.label);
        }
    }

    /// Inserts `v -> w` with `label`, replacing the label of an existing edge.
    ///
    /// Both endpoints must already exist; returns `false` (and does nothing) otherwise so that a
    /// dangling edge can never be stored.
    pub fn set_edge(&mut self, v: &str, w: &str, label: E) -> bool {
        if !self.has_node(v) || !self.has_node(w) {
            return false;
        }
        let view = edge_key::EdgeKeyView { v, w };
        if let Some(&idx) = self.edge_index.get(&view) {
            self.edges[idx].label = label;
            return true;
        }
        self.invalidate_adj();
        let key = EdgeKey::new(v, w);
        let idx = self.edges.len();
        self.edges.push(EdgeEntry {
            key: key.clone(),
            label,
        });
        self.edge_index.insert(key, idx);
        true
    }

    pub fn has_edge(&self, v: &str, w: &str) -> bool {
        self.edge_index
            .contains_key(&edge_key::EdgeKeyView { v, w })
    }

    pub fn edge(&self, v: &str, w: &str) -> Option<&E> {
        let idx = *self.edge_index.get(&edge_key::EdgeKeyView { v, w })?;
        Some(&self.edges[idx].label)
    }

    pub fn edge_mut(&mut self, v: &str, w: &str) -> Option<&mut E> {
        let idx = *self.edge_index.get(&edge_key::EdgeKeyView { v, w })?;
        Some(&mut self.edges[idx].label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        self.edge(&key.v, &key.w)
    }

    /// Moves `v -> w` onto `v -> new_w` in place, so it keeps its position among `v`'s out-edges.
    ///
    /// Returns `false` when `v -> w` or `new_w` is missing. When `v -> new_w` already exists it
    /// takes `label` and `v -> w` is dropped.
    pub fn retarget_edge(&mut self, v: &str, w: &str, new_w: &str, label: E) -> bool {
        if !self.has_node(new_w) {
            return false;
        }
        let Some(&idx) = self.edge_index.get(&edge_key::EdgeKeyView { v, w }) else {
            return false;
        };
        if self.has_edge(v, new_w) {
            self.remove_edge(v, w);
            if let Some(slot) = self.edge_mut(v, new_w) {
                *slot = label;
            }
            return true;
        }
        self.invalidate_adj();
        self.edge_index.remove(&edge_key::EdgeKeyView { v, w });
        let key = EdgeKey::new(v, new_w);
        self.edges[idx] = EdgeEntry {
            key: key.clone(),
            label,
        };
        self.edge_index.insert(key, idx);
        true
    }

    /// Removes `v -> w` and returns its label.
    pub fn remove_edge(&mut self, v: &str, w: &str) -> Option<E> {
        let idx = self
            .edge_index
            .remove(&edge_key::EdgeKeyView { v, w })?;
        self.invalidate_adj();
        let entry = self.edges.remove(idx);
        self.reindex_edges_from(idx);
        Some(entry.label)
    }

    /// Removes `id`, every incident edge and its parent/children links.
    ///
    /// Children of a removed compound node become top-level nodes; they are not removed.
    pub fn remove_node(&mut self, id: &str) -> Option<N> {
        let idx = self.node_index.remove(id)?;
        self.invalidate_adj();
        let entry = self.nodes.remove(idx);
        self.reindex_nodes_from(idx);

        let before = self.edges.len();
        self.edges.retain(|e| e.key.v != id && e.key.w != id);
        if self.edges.len() != before {
            self.edge_index.clear();
            for (i, e) in self.edges.iter().enumerate() {
                self.edge_index.insert(e.key.clone(), i);
            }
        }

        if let Some(parent) = self.parent.remove(id) {
            if let Some(ch) = self.children.get_mut(&parent) {
                ch.retain(|c| c != id);
            }
        }
        if let Some(ch) = self.children.remove(id) {
            for child in ch {
                self.parent.remove(&child);
            }
        }

        Some(entry.label)
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        let Some(&v_idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        let cache = self.ensure_adj();
        cache
            .out_edges(v_idx)
            .iter()
            .map(|&edge_idx| self.edges[edge_idx].key.w.as_str())
            .collect()
    }

    pub fn in_edges(&self, v: &str) -> Vec<EdgeKey> {
        let Some(&v_idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        let cache = self.ensure_adj();
        cache
            .in_edges(v_idx)
            .iter()
            .map(|&edge_idx| self.edges[edge_idx].key.clone())
            .collect()
    }

    /// Groups `child` under `parent`. Both nodes must exist and the graph must be compound.
    pub fn set_parent(&mut self, child: &str, parent: &str) -> bool {
        if !self.options.compound || !self.has_node(child) || !self.has_node(parent) {
            return false;
        }
        if let Some(prev) = self.parent.insert(child.to_string(), parent.to_string()) {
            if let Some(ch) = self.children.get_mut(&prev) {
                ch.retain(|c| c != child);
            }
        }
        let entry = self.children.entry(parent.to_string()).or_default();
        if !entry.iter().any(|c| c == child) {
            entry.push(child.to_string());
        }
        true
    }

    pub fn parent(&self, child: &str) -> Option<&str> {
        self.parent.get(child).map(|s| s.as_str())
    }

    pub fn children(&self, parent: &str) -> Vec<&str> {
        self.children
            .get(parent)
            .map(|v| v.iter().map(|s| s.as_str()).collect::<Vec<_>>())
            .unwrap_or_default()
    }

    pub fn is_parent(&self, id: &str) -> bool {
        self.children.get(id).is_some_and(|c| !c.is_empty())
    }

    /// Nodes without a compound parent, in insertion order.
    pub fn children_root(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !self.parent.contains_key(&n.id))
            .map(|n| n.id.as_str())
            .collect()
    }
}
