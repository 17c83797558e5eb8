//! The mutable element graph shared by the projector, the merge engine and the renderer.
//!
//! Nodes and edges live in a compound [`Graph`], so grouping (match containers) is expressed as
//! parent links and edges can never dangle: the container refuses edges whose endpoints are
//! missing and drops incident edges together with a node.

use crate::{Error, Result};
use mathgraph_graphlib::{EdgeKey, Graph, GraphOptions, alg};
use serde::{Deserialize, Serialize};

pub const CLASS_TREE_NODE: &str = "top-center";
pub const CLASS_HIERARCHY: &str = "hierarchy";
pub const CLASS_MATCH_IDENTICAL: &str = "match math-identical";
pub const CLASS_MATCH_SIMILAR: &str = "match match-similar";
pub const CLASS_MATCH_CONTAINER: &str = "matchContainer";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Expansion {
    #[default]
    Normal,
    /// The first child is hidden and the parent shows it in its own image.
    ExpandedFirstChild,
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMarker {
    Identical,
    Similar,
}

impl MatchMarker {
    pub fn class(self) -> &'static str {
        match self {
            MatchMarker::Identical => CLASS_MATCH_IDENTICAL,
            MatchMarker::Similar => CLASS_MATCH_SIMILAR,
        }
    }
}

/// What a collapse hid, and what to go back to once the node is expanded again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseMemo {
    pub restore: Expansion,
    pub hidden: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Tree {
        tag: String,
        text: Option<String>,
        image: Option<String>,
        xref: Option<String>,
    },
    /// Synthetic grouping node; `members` are the matched roots it was created for.
    Container { members: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub data: NodeData,
    pub visible: bool,
    pub expansion: Expansion,
    pub marker: Option<MatchMarker>,
    pub collapse: Option<CollapseMemo>,
}

impl GraphNode {
    pub fn tree(id: impl Into<String>, tag: impl Into<String>, text: Option<String>) -> Self {
        let tag = tag.into();
        let label = text.clone().unwrap_or_else(|| tag.clone());
        Self {
            id: id.into(),
            label,
            data: NodeData::Tree {
                tag,
                text,
                image: None,
                xref: None,
            },
            visible: true,
            expansion: Expansion::Normal,
            marker: None,
            collapse: None,
        }
    }

    pub fn container(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data: NodeData::Container {
                members: Vec::new(),
            },
            visible: true,
            expansion: Expansion::Normal,
            marker: None,
            collapse: None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.data, NodeData::Container { .. })
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.data {
            NodeData::Tree { tag, .. } => Some(tag),
            NodeData::Container { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Tree { text, .. } => text.as_deref(),
            NodeData::Container { .. } => None,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match &self.data {
            NodeData::Tree { image, .. } => image.as_deref(),
            NodeData::Container { .. } => None,
        }
    }

    pub fn xref(&self) -> Option<&str> {
        match &self.data {
            NodeData::Tree { xref, .. } => xref.as_deref(),
            NodeData::Container { .. } => None,
        }
    }

    pub fn members(&self) -> &[String] {
        match &self.data {
            NodeData::Container { members } => members,
            NodeData::Tree { .. } => &[],
        }
    }

    pub fn is_apply(&self) -> bool {
        self.tag() == Some("apply")
    }

    /// Space-separated style classes, cytoscape style.
    pub fn classes(&self) -> String {
        let base = if self.is_container() {
            CLASS_MATCH_CONTAINER
        } else {
            CLASS_TREE_NODE
        };
        match self.marker {
            Some(m) => format!("{base} {}", m.class()),
            None => base.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeClass {
    Hierarchy,
}

impl EdgeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeClass::Hierarchy => CLASS_HIERARCHY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub class: Option<EdgeClass>,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, class: Option<EdgeClass>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target),
            source,
            target,
            class,
        }
    }

    pub fn hierarchy(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, Some(EdgeClass::Hierarchy))
    }
}

pub fn edge_id(source: &str, target: &str) -> String {
    format!("{source}-{target}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub elements: usize,
    pub nodes: usize,
    pub edges: usize,
    pub containers: usize,
    pub visible_elements: usize,
    pub visible_nodes: usize,
    pub visible_edges: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementGroup {
    Nodes,
    Edges,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementData {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<Expansion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// One entry of the exported element list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub group: ElementGroup,
    pub data: ElementData,
    pub classes: String,
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct ElementGraph {
    graph: Graph<GraphNode, GraphEdge>,
}

impl Default for ElementGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementGraph {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(GraphOptions::compound()),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.graph.has_node(id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.graph.node(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.graph.node_mut(id)
    }

    /// Like [`ElementGraph::node`], but a missing node is an error.
    pub fn require(&self, id: &str) -> Result<&GraphNode> {
        self.graph.node(id).ok_or_else(|| Error::UnresolvedNode { id: id.to_string() })
    }

    pub(crate) fn require_mut(&mut self, id: &str) -> Result<&mut GraphNode> {
        self.graph
            .node_mut(id)
            .ok_or_else(|| Error::UnresolvedNode { id: id.to_string() })
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.nodes().filter_map(|id| self.graph.node(id))
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.graph.edges().filter_map(|k| self.graph.edge_by_key(k))
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&GraphEdge> {
        self.graph.edge(source, target)
    }

    pub fn add_node(&mut self, node: GraphNode) -> Result<()> {
        if self.graph.has_node(&node.id) {
            return Err(Error::DuplicateNodeId { id: node.id });
        }
        let id = node.id.clone();
        self.graph.set_node(id, node);
        Ok(())
    }

    /// Inserts `edge`, replacing an existing edge between the same endpoints.
    pub fn add_edge(&mut self, edge: GraphEdge) -> Result<()> {
        let (from, to) = (edge.source.clone(), edge.target.clone());
        if !self.graph.set_edge(&from, &to, edge) {
            return Err(Error::DanglingEdge { from, to });
        }
        Ok(())
    }

    /// Removes a node together with its incident edges; grouped children become top-level.
    pub fn remove_node(&mut self, id: &str) -> Option<GraphNode> {
        self.graph.remove_node(id)
    }

    pub fn remove_edge(&mut self, source: &str, target: &str) -> Option<GraphEdge> {
        self.graph.remove_edge(source, target)
    }

    /// Moves `source -> old_target` onto `source -> new_target`, keeping the edge class and the
    /// edge's place among `source`'s children.
    pub fn redirect_edge(&mut self, source: &str, old_target: &str, new_target: &str) -> Result<()> {
        let class = self
            .graph
            .edge(source, old_target)
            .ok_or_else(|| Error::DanglingEdge {
                from: source.to_string(),
                to: old_target.to_string(),
            })?
            .class;
        let edge = GraphEdge::new(source, new_target, class);
        if !self.graph.retarget_edge(source, old_target, new_target, edge) {
            return Err(Error::DanglingEdge {
                from: source.to_string(),
                to: new_target.to_string(),
            });
        }
        Ok(())
    }

    /// Merges a projection into the graph, nodes first.
    pub fn extend(&mut self, projection: crate::Projection) -> Result<()> {
        for node in projection.nodes {
            self.add_node(node)?;
        }
        for edge in projection.edges {
            self.add_edge(edge)?;
        }
        Ok(())
    }

    /// Tree children in edge insertion order.
    pub fn children(&self, id: &str) -> Vec<&str> {
        self.graph.successors(id)
    }

    pub fn first_child(&self, id: &str) -> Option<&str> {
        self.graph.successors(id).into_iter().next()
    }

    /// Every node reachable from `id` along edges, preorder, excluding `id`.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        alg::successors_closure(&self.graph, id)
    }

    pub fn incoming(&self, id: &str) -> Vec<EdgeKey> {
        self.graph.in_edges(id)
    }

    /// Groups `child` under the container `group`.
    pub fn set_group(&mut self, child: &str, group: &str) -> Result<()> {
        self.require(child)?;
        if !self.require(group)?.is_container() {
            return Err(Error::UnresolvedNode {
                id: group.to_string(),
            });
        }
        self.graph.set_parent(child, group);
        Ok(())
    }

    pub fn group_of(&self, id: &str) -> Option<&str> {
        self.graph.parent(id)
    }

    /// Nodes currently grouped under `group`.
    pub fn grouped(&self, group: &str) -> Vec<&str> {
        self.graph.children(group)
    }

    pub fn add_member(&mut self, group: &str, member: &str) -> Result<()> {
        if let NodeData::Container { members } = &mut self.require_mut(group)?.data {
            if !members.iter().any(|m| m == member) {
                members.push(member.to_string());
            }
        }
        Ok(())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.graph.node(id).is_some_and(|n| n.visible)
    }

    /// Sets a node's visibility; returns whether the flag changed.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.graph.node_mut(id) {
            Some(n) if n.visible != visible => {
                n.visible = visible;
                true
            }
            _ => false,
        }
    }

    /// An edge is visible iff both of its endpoints are.
    pub fn is_edge_visible(&self, edge: &GraphEdge) -> bool {
        self.is_visible(&edge.source) && self.is_visible(&edge.target)
    }

    pub fn visible_node_ids(&self) -> Vec<String> {
        self.nodes().filter(|n| n.visible).map(|n| n.id.clone()).collect()
    }

    pub fn summary(&self) -> GraphSummary {
        let nodes = self.node_count();
        let edges = self.edge_count();
        let containers = self.nodes().filter(|n| n.is_container()).count();
        let visible_nodes = self.nodes().filter(|n| n.visible).count();
        let visible_edges = self.edges().filter(|e| self.is_edge_visible(e)).count();
        GraphSummary {
            elements: nodes + edges,
            nodes,
            edges,
            containers,
            visible_elements: visible_nodes + visible_edges,
            visible_nodes,
            visible_edges,
        }
    }

    /// Exports nodes (insertion order) followed by edges (insertion order).
    pub fn to_elements(&self) -> Vec<Element> {
        let mut out = Vec::with_capacity(self.node_count() + self.edge_count());
        for n in self.nodes() {
            let mut data = ElementData {
                id: n.id.clone(),
                label: Some(n.label.clone()),
                parent: self.group_of(&n.id).map(str::to_string),
                ..Default::default()
            };
            match &n.data {
                NodeData::Tree {
                    tag,
                    text,
                    image,
                    xref,
                } => {
                    data.tag = Some(tag.clone());
                    data.text = text.clone();
                    data.image = image.clone();
                    data.xref = xref.clone();
                    data.expansion = Some(n.expansion);
                }
                NodeData::Container { members } => data.members = members.clone(),
            }
            out.push(Element {
                group: ElementGroup::Nodes,
                data,
                classes: n.classes(),
                visible: n.visible,
            });
        }
        for e in self.edges() {
            out.push(Element {
                group: ElementGroup::Edges,
                data: ElementData {
                    id: e.id.clone(),
                    source: Some(e.source.clone()),
                    target: Some(e.target.clone()),
                    ..Default::default()
                },
                classes: e.class.map(EdgeClass::as_str).unwrap_or_default().to_string(),
                visible: self.is_edge_visible(e),
            });
        }
        out
    }

    /// Checks structural invariants: edge ids match their endpoints and every group is a
    /// container.
    pub fn validate(&self) -> Result<()> {
        for e in self.edges() {
            if e.id != edge_id(&e.source, &e.target)
                || !self.contains(&e.source)
                || !self.contains(&e.target)
            {
                return Err(Error::DanglingEdge {
                    from: e.source.clone(),
                    to: e.target.clone(),
                });
            }
        }
        for n in self.nodes() {
            if let Some(group) = self.group_of(&n.id) {
                if !self.node(group).is_some_and(GraphNode::is_container) {
                    return Err(Error::UnresolvedNode {
                        id: group.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
