#![forbid(unsafe_code)]

//! Render sessions for expression graphs.
//!
//! A [`RenderSession`] owns one [`ElementGraph`] plus everything needed to show it: node styles,
//! apply-form affordances, collapse/expand state, tooltips and the last layout. It performs no
//! I/O; image sizes and symbol metadata arrive as responses to requests it queues (see
//! [`enrich`]).

pub mod enrich;
pub mod layout;
pub mod model;
pub mod session;
pub mod svg;
pub mod tooltip;

pub use enrich::{ImageRequest, SessionToken, SymbolLookup, resolve_images, resolve_symbols};
pub use layout::{LayeredLayout, LayoutProvider, LayoutResult, NoLayout};
pub use mathgraph_layout::{GraphLabel as LayoutOptions, RankDir};
pub use model::{NodeStyle, Position, RenderOutput, RenderedElement};
pub use session::{ClickOutcome, Hover, RenderSession};
pub use tooltip::{LOADING_FAILED, Tooltip, TooltipProvider, WikidataTooltips};

use mathgraph_core::{Correspondence, ElementGraph, ExprNode, RenderConfig};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] mathgraph_core::Error),
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),
    #[error("invalid SVG image: {message}")]
    InvalidSvg { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Collaborators a session delegates to.
#[derive(Clone)]
pub struct Capabilities {
    pub layout: Arc<dyn LayoutProvider + Send + Sync>,
    /// Tooltips are only set up when a provider is present and the session is not headless.
    pub tooltips: Option<Arc<dyn TooltipProvider + Send + Sync>>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            layout: Arc::new(LayeredLayout::default()),
            tooltips: None,
        }
    }
}

impl Capabilities {
    pub fn with_layout(mut self, layout: impl LayoutProvider + Send + Sync + 'static) -> Self {
        self.layout = Arc::new(layout);
        self
    }

    pub fn with_tooltips(mut self, tooltips: impl TooltipProvider + Send + Sync + 'static) -> Self {
        self.tooltips = Some(Arc::new(tooltips));
        self
    }
}

/// Renders one tree.
pub fn render_single_tree(
    tree: &ExprNode,
    config: &RenderConfig,
    capabilities: &Capabilities,
) -> Result<RenderSession> {
    config.validate()?;
    let mut graph = ElementGraph::new();
    graph.extend(mathgraph_core::project(tree, &config.project_options())?)?;
    Ok(RenderSession::new(graph, config.clone(), capabilities))
}

/// Renders the comparison of `a` and `b` under `correspondences`.
pub fn compare(
    a: &ExprNode,
    b: &ExprNode,
    correspondences: &[Correspondence],
    config: &RenderConfig,
    capabilities: &Capabilities,
) -> Result<RenderSession> {
    config.validate()?;
    let graph = mathgraph_core::merge_with(a, b, correspondences, &config.project_options())?;
    Ok(RenderSession::new(graph, config.clone(), capabilities))
}
