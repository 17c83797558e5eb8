#![forbid(unsafe_code)]

//! `mathgraph` turns MathML expression trees into node-link graphs and merges two trees into one
//! comparison graph.
//!
//! # Features
//!
//! - `render`: render sessions with sizing, apply forms, collapse/expand and layout
//!   (`mathgraph::render`)

pub use mathgraph_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use mathgraph_render::*;

    use mathgraph_core::{RenderConfig, parse_correspondences, parse_mathml};

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Parse(#[from] mathgraph_core::Error),
        #[error(transparent)]
        Render(#[from] mathgraph_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Loads `xml` and renders it with the default capabilities.
    pub fn render_mathml(xml: &str, config: &RenderConfig) -> Result<RenderSession> {
        let tree = parse_mathml(xml)?;
        Ok(render_single_tree(&tree, config, &Capabilities::default())?)
    }

    /// Loads both documents and the correspondence list, then renders the comparison.
    pub fn compare_mathml(
        a: &str,
        b: &str,
        correspondences_json: &str,
        config: &RenderConfig,
    ) -> Result<RenderSession> {
        let a = parse_mathml(a)?;
        let b = parse_mathml(b)?;
        let correspondences = parse_correspondences(correspondences_json)?;
        Ok(compare(
            &a,
            &b,
            &correspondences,
            config,
            &Capabilities::default(),
        )?)
    }
}
