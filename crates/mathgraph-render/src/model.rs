use mathgraph_core::{Element, GraphSummary};
use serde::{Deserialize, Serialize};

/// Per-node visual attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

impl NodeStyle {
    pub fn square(size: f64) -> Self {
        Self {
            width: size,
            height: size,
            background_image: None,
        }
    }
}

/// Laid-out box, center coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedElement {
    #[serde(flatten)]
    pub element: Element,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Snapshot of a session: every element with its style and position, plus counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    pub elements: Vec<RenderedElement>,
    pub summary: GraphSummary,
    pub width: f64,
    pub height: f64,
}
