//! Tree-to-graph projection.

use crate::element::{GraphEdge, GraphNode, NodeData};
use crate::{Error, ExprNode, Result};
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectOptions {
    /// Image reference template; `{id}` is replaced by the node's cross-reference, or by its own
    /// id when it has none.
    pub image_template: Option<String>,
}

impl ProjectOptions {
    pub fn with_image_template(template: impl Into<String>) -> Self {
        Self {
            image_template: Some(template.into()),
        }
    }
}

/// Flat node/edge lists for one tree, nodes in preorder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Projection {
    pub fn element_count(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    /// Returns a copy with every id, edge endpoint and cross-reference prefixed.
    pub fn prefixed(&self, prefix: &str) -> Projection {
        let nodes = self
            .nodes
            .iter()
            .map(|n| {
                let mut n = n.clone();
                n.id = prefix_id(prefix, &n.id);
                match &mut n.data {
                    NodeData::Tree { xref, .. } => {
                        if let Some(x) = xref.as_mut() {
                            *x = prefix_id(prefix, x);
                        }
                    }
                    NodeData::Container { members } => {
                        for m in members.iter_mut() {
                            *m = prefix_id(prefix, m);
                        }
                    }
                }
                if let Some(memo) = n.collapse.as_mut() {
                    for h in memo.hidden.iter_mut() {
                        *h = prefix_id(prefix, h);
                    }
                }
                n
            })
            .collect();
        let edges = self
            .edges
            .iter()
            .map(|e| {
                GraphEdge::new(
                    prefix_id(prefix, &e.source),
                    prefix_id(prefix, &e.target),
                    e.class,
                )
            })
            .collect();
        Projection { nodes, edges }
    }
}

fn prefix_id(prefix: &str, id: &str) -> String {
    format!("{prefix}{id}")
}

/// One node per tree node and one `hierarchy` edge per parent/child pair, child order preserved.
pub fn project(root: &ExprNode, options: &ProjectOptions) -> Result<Projection> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut out = Projection::default();
    let mut stack: Vec<(&ExprNode, Option<&str>)> = vec![(root, None)];
    while let Some((n, parent)) = stack.pop() {
        if !seen.insert(n.id.as_str()) {
            return Err(Error::DuplicateNodeId { id: n.id.clone() });
        }
        let mut node = GraphNode::tree(n.id.clone(), n.name.clone(), n.text.clone());
        if let NodeData::Tree { image, xref, .. } = &mut node.data {
            *xref = n.xref.clone();
            *image = options.image_template.as_ref().map(|t| {
                t.replace("{id}", n.xref.as_deref().unwrap_or(&n.id))
            });
        }
        out.nodes.push(node);
        if let Some(parent) = parent {
            out.edges.push(GraphEdge::hierarchy(parent, n.id.clone()));
        }
        stack.extend(n.children.iter().rev().map(|c| (c, Some(n.id.as_str()))));
    }
    Ok(out)
}
