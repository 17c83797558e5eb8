#![forbid(unsafe_code)]

//! Compound directed graph container used by `mathgraph`.
//!
//! Nodes and edges are addressed by string ids and carry caller-defined labels. Compound graphs
//! additionally track a parent/children relation that is independent of the edge set, which is
//! how layout groups (containers) are expressed.

pub mod graph;

pub use graph::{EdgeKey, Graph, GraphOptions, alg};
