#![forbid(unsafe_code)]

//! Expression trees, graph projection and the tree-merge engine (headless).
//!
//! - [`ExprNode`]: owned expression tree with stable ids, loaded from content MathML by
//!   [`parse_mathml`]
//! - [`project`]: tree to flat node/edge lists
//! - [`ElementGraph`]: the mutable graph every later stage works on
//! - [`merge`]: two trees plus [`Correspondence`]s to one comparison graph

pub mod config;
pub mod correspondence;
pub mod element;
pub mod error;
pub mod mathml;
pub mod merge;
pub mod project;
pub mod tree;

pub use config::RenderConfig;
pub use correspondence::{
    Correspondence, Match, MatchKind, correspondences_from_value, parse_correspondences,
};
pub use element::{
    CollapseMemo, EdgeClass, Element, ElementGraph, Expansion, GraphEdge, GraphNode, GraphSummary,
    MatchMarker, NodeData,
};
pub use error::{Error, Result};
pub use mathml::parse_mathml;
pub use merge::{PREFIX_A, PREFIX_B, merge, merge_into, merge_with};
pub use project::{ProjectOptions, Projection, project};
pub use tree::ExprNode;

#[cfg(test)]
mod tests;
