//! Render session: one graph, its visual state and the interaction controller.
//!
//! Node visibility flags in the [`ElementGraph`] are the only source of truth for what is shown.
//! Collapsing an apply node hides its currently visible descendants and records exactly that set
//! in the node's [`CollapseMemo`]; expanding reveals the recorded nodes that still exist and
//! restores the expansion state the node had before.

use crate::enrich::{ImageRequest, SessionToken, SymbolLookup};
use crate::layout::{LayoutProvider, LayoutResult};
use crate::model::{NodeStyle, Position, RenderOutput, RenderedElement};
use crate::svg::parse_svg_size;
use crate::Capabilities;
use crate::tooltip::{LOADING_FAILED, Tooltip, TooltipProvider};
use indexmap::IndexMap;
use mathgraph_core::element::ElementGroup;
use mathgraph_core::{CollapseMemo, ElementGraph, Expansion, RenderConfig};
use std::fmt::Display;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The clicked first child was folded into its apply node.
    ApplyForm,
    Collapsed,
    Expanded,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hover {
    Enter,
    Leave,
}

pub struct RenderSession {
    token: SessionToken,
    config: RenderConfig,
    graph: ElementGraph,
    styles: IndexMap<String, NodeStyle>,
    layout: Arc<dyn LayoutProvider + Send + Sync>,
    tooltip_provider: Option<Arc<dyn TooltipProvider + Send + Sync>>,
    last_layout: LayoutResult,
    layout_passes: usize,
    // first child id -> apply nodes it opens; a unified leaf can head several applies
    affordances: IndexMap<String, Vec<String>>,
    tooltips: IndexMap<String, Tooltip>,
    image_requests: Vec<ImageRequest>,
    symbol_lookups: Vec<SymbolLookup>,
    batch_depth: usize,
    layout_pending: bool,
    destroyed: bool,
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("token", &self.token)
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("layout_passes", &self.layout_passes)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl RenderSession {
    /// Sets up styles, apply-form affordances and tooltips for `graph`, then lays it out.
    pub fn new(graph: ElementGraph, config: RenderConfig, capabilities: &Capabilities) -> Self {
        let mut session = Self {
            token: SessionToken::next(),
            config,
            graph,
            styles: IndexMap::new(),
            layout: capabilities.layout.clone(),
            tooltip_provider: capabilities.tooltips.clone(),
            last_layout: LayoutResult::default(),
            layout_passes: 0,
            affordances: IndexMap::new(),
            tooltips: IndexMap::new(),
            image_requests: Vec::new(),
            symbol_lookups: Vec::new(),
            batch_depth: 0,
            layout_pending: false,
            destroyed: false,
        };

        session.start_batch();
        let ids: Vec<String> = session.graph.nodes().map(|n| n.id.clone()).collect();
        for id in &ids {
            session
                .styles
                .insert(id.clone(), NodeStyle::square(session.config.min_node_size));
            session.refresh_background(id);
        }
        session.register_affordances();
        if session.config.apply_form {
            let applies: Vec<String> = session.affordances.values().flatten().cloned().collect();
            for apply in applies {
                session.set_apply_form(&apply);
            }
        }
        if !session.config.headless {
            session.register_tooltips();
        }
        session.request_layout();
        session.end_batch();
        tracing::debug!(
            token = session.token.get(),
            nodes = session.graph.node_count(),
            affordances = session.affordances.len(),
            "render session ready"
        );
        session
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn graph(&self) -> &ElementGraph {
        &self.graph
    }

    pub fn style(&self, id: &str) -> Option<&NodeStyle> {
        self.styles.get(id)
    }

    pub fn position(&self, id: &str) -> Option<&Position> {
        self.last_layout.positions.get(id)
    }

    pub fn tooltip(&self, id: &str) -> Option<&Tooltip> {
        self.tooltips.get(id)
    }

    /// Number of layout passes run so far.
    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn register_affordances(&mut self) {
        let mut found = Vec::new();
        for n in self.graph.nodes().filter(|n| n.is_apply()) {
            let Some(first) = self.graph.first_child(&n.id) else {
                continue;
            };
            if self.graph.children(first).is_empty() {
                found.push((first.to_string(), n.id.clone()));
            }
        }
        for (first, apply) in found {
            self.affordances.entry(first).or_default().push(apply);
        }
    }

    /// `cs` nodes show their text; `csymbol` nodes need a tooltip provider to look them up.
    fn register_tooltips(&mut self) {
        let provider = self.tooltip_provider.clone();
        let mut lookups = Vec::new();
        for n in self.graph.nodes() {
            let Some(text) = n.text() else {
                continue;
            };
            match (n.tag(), provider.as_deref()) {
                (Some("cs"), _) => {
                    self.tooltips.insert(n.id.clone(), Tooltip::new(text));
                }
                (Some("csymbol"), Some(provider)) => {
                    self.tooltips
                        .insert(n.id.clone(), Tooltip::new(provider.pending_content(text)));
                    lookups.push(SymbolLookup {
                        token: self.token,
                        node_id: n.id.clone(),
                        symbol: text.to_string(),
                        url: provider.lookup_url(text),
                    });
                }
                _ => {}
            }
        }
        self.symbol_lookups.extend(lookups);
    }

    /// Shows the node's image as its background and, with a drawing surface, asks for its size.
    fn refresh_background(&mut self, id: &str) {
        let Some(image) = self.graph.node(id).and_then(|n| n.image()).map(str::to_string) else {
            return;
        };
        if let Some(style) = self.styles.get_mut(id) {
            style.background_image = Some(image.clone());
        }
        if !self.config.headless && !self.image_requests.iter().any(|r| r.node_id == id) {
            self.image_requests.push(ImageRequest {
                token: self.token,
                node_id: id.to_string(),
                url: image,
            });
        }
    }

    /// Folds the first child into `apply`: the child is hidden and `apply` shows its image.
    fn set_apply_form(&mut self, apply: &str) -> bool {
        let Some(n) = self.graph.node_mut(apply) else {
            return false;
        };
        if n.expansion == Expansion::Collapsed {
            return false;
        }
        n.expansion = Expansion::ExpandedFirstChild;
        let first = self.graph.first_child(apply).map(str::to_string);
        if let Some(first) = first {
            self.graph.set_visible(&first, false);
        }
        self.refresh_background(apply);
        true
    }

    pub fn click(&mut self, id: &str) -> ClickOutcome {
        if self.destroyed || !self.graph.is_visible(id) {
            return ClickOutcome::Ignored;
        }
        self.start_batch();
        let outcome = if let Some(applies) = self.affordances.get(id).cloned() {
            let mut folded = false;
            for apply in &applies {
                folded |= self.set_apply_form(apply);
            }
            if folded {
                self.request_layout();
                ClickOutcome::ApplyForm
            } else {
                ClickOutcome::Ignored
            }
        } else if self.graph.node(id).is_some_and(|n| n.is_apply()) {
            self.toggle(id)
        } else if self
            .graph
            .node(id)
            .is_some_and(|n| n.is_container() && n.collapse.is_some())
        {
            self.toggle_container(id)
        } else {
            ClickOutcome::Ignored
        };
        self.end_batch();
        tracing::debug!(%id, ?outcome, "click");
        outcome
    }

    fn toggle(&mut self, id: &str) -> ClickOutcome {
        let collapsed = self
            .graph
            .node(id)
            .is_some_and(|n| n.expansion == Expansion::Collapsed);
        let outcome = if collapsed {
            self.expand(id);
            ClickOutcome::Expanded
        } else {
            self.collapse(id);
            ClickOutcome::Collapsed
        };
        self.refresh_background(id);
        self.request_layout();
        outcome
    }

    fn collapse(&mut self, id: &str) {
        let hidden: Vec<String> = self
            .graph
            .descendants(id)
            .into_iter()
            .filter(|d| self.graph.is_visible(d))
            .collect();
        for d in &hidden {
            self.graph.set_visible(d, false);
        }
        if let Some(n) = self.graph.node_mut(id) {
            n.collapse = Some(CollapseMemo {
                restore: n.expansion,
                hidden,
            });
            n.expansion = Expansion::Collapsed;
        }
    }

    /// A container keeps its memo across toggles; its hidden nodes have no edge to reach them by.
    fn toggle_container(&mut self, id: &str) -> ClickOutcome {
        let Some(n) = self.graph.node_mut(id) else {
            return ClickOutcome::Ignored;
        };
        let Some(memo) = n.collapse.clone() else {
            return ClickOutcome::Ignored;
        };
        let reveal = n.expansion == Expansion::Collapsed;
        n.expansion = if reveal {
            memo.restore
        } else {
            Expansion::Collapsed
        };
        for d in &memo.hidden {
            self.graph.set_visible(d, reveal);
        }
        self.request_layout();
        if reveal {
            ClickOutcome::Expanded
        } else {
            ClickOutcome::Collapsed
        }
    }

    fn expand(&mut self, id: &str) {
        let Some(n) = self.graph.node_mut(id) else {
            return;
        };
        let memo = n.collapse.take();
        n.expansion = memo.as_ref().map_or(Expansion::Normal, |m| m.restore);
        for d in memo.map(|m| m.hidden).unwrap_or_default() {
            self.graph.set_visible(&d, true);
        }
    }

    /// Shows or hides the node's tooltip. Returns the tooltip, if the node has one.
    pub fn hover(&mut self, id: &str, hover: Hover) -> Option<&Tooltip> {
        if self.destroyed {
            return None;
        }
        let tip = self.tooltips.get_mut(id)?;
        tip.visible = hover == Hover::Enter;
        Some(tip)
    }

    pub fn start_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Ends a batch; the outermost one runs any layout requested inside it.
    pub fn end_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 && self.layout_pending {
            self.layout_pending = false;
            self.run_layout();
        }
    }

    fn request_layout(&mut self) {
        if self.batch_depth > 0 {
            self.layout_pending = true;
        } else {
            self.run_layout();
        }
    }

    /// Lays out the visible elements. A no-op without a drawing surface or with nothing visible.
    pub fn run_layout(&mut self) {
        if self.destroyed || self.config.headless {
            return;
        }
        if !self.graph.nodes().any(|n| n.visible) {
            return;
        }
        self.last_layout = self.layout.run(&self.graph, &self.styles);
        self.layout_passes += 1;
    }

    /// Drains the image requests queued so far.
    pub fn take_image_requests(&mut self) -> Vec<ImageRequest> {
        std::mem::take(&mut self.image_requests)
    }

    /// Drains the symbol lookups queued so far.
    pub fn take_symbol_lookups(&mut self) -> Vec<SymbolLookup> {
        std::mem::take(&mut self.symbol_lookups)
    }

    fn accepts(&self, token: SessionToken, node_id: &str) -> bool {
        let live = !self.destroyed && token == self.token && self.graph.contains(node_id);
        if !live {
            tracing::debug!(node = %node_id, "dropping stale response");
        }
        live
    }

    /// Applies a fetched SVG to the requesting node's size. Stale or failed responses leave the
    /// node at its current size; returns whether the size changed.
    pub fn apply_image<E: Display>(
        &mut self,
        request: &ImageRequest,
        response: Result<String, E>,
    ) -> bool {
        if !self.accepts(request.token, &request.node_id) {
            return false;
        }
        let svg = match response {
            Ok(svg) => svg,
            Err(err) => {
                tracing::warn!(node = %request.node_id, url = %request.url, %err, "image fetch failed");
                return false;
            }
        };
        let size = match parse_svg_size(&svg) {
            Ok(size) => size,
            Err(err) => {
                tracing::warn!(node = %request.node_id, url = %request.url, %err, "unusable image");
                return false;
            }
        };
        let width = size.width.to_node_px(&self.config);
        let height = size.height.to_node_px(&self.config);
        let Some(style) = self.styles.get_mut(&request.node_id) else {
            return false;
        };
        if style.width == width && style.height == height {
            return false;
        }
        style.width = width;
        style.height = height;
        self.request_layout();
        true
    }

    /// Replaces a pending symbol tooltip with the lookup result.
    pub fn apply_symbol<E: Display>(
        &mut self,
        lookup: &SymbolLookup,
        response: Result<String, E>,
    ) -> bool {
        if !self.accepts(lookup.token, &lookup.node_id) {
            return false;
        }
        let Some(provider) = self.tooltip_provider.clone() else {
            return false;
        };
        let content = match response
            .map_err(|e| e.to_string())
            .and_then(|body| serde_json::from_str::<serde_json::Value>(&body).map_err(|e| e.to_string()))
        {
            Ok(meta) => provider.render(&lookup.symbol, &meta),
            Err(err) => {
                tracing::warn!(node = %lookup.node_id, url = %lookup.url, %err, "symbol lookup failed");
                LOADING_FAILED.to_string()
            }
        };
        match self.tooltips.get_mut(&lookup.node_id) {
            Some(tip) => {
                tip.content = content;
                true
            }
            None => false,
        }
    }

    /// Fetches every queued request concurrently and applies the responses in one batch.
    pub async fn resolve_pending<FI, FutI, FS, FutS, E>(&mut self, fetch_image: FI, fetch_symbol: FS)
    where
        FI: Fn(&ImageRequest) -> FutI,
        FutI: std::future::Future<Output = Result<String, E>>,
        FS: Fn(&SymbolLookup) -> FutS,
        FutS: std::future::Future<Output = Result<String, E>>,
        E: Display,
    {
        let images = self.take_image_requests();
        let lookups = self.take_symbol_lookups();
        let (images, lookups) = futures::join!(
            crate::enrich::resolve_images(images, fetch_image),
            crate::enrich::resolve_symbols(lookups, fetch_symbol),
        );
        self.start_batch();
        for (req, res) in images {
            self.apply_image(&req, res);
        }
        for (lookup, res) in lookups {
            self.apply_symbol(&lookup, res);
        }
        self.end_batch();
    }

    /// Tears the session down; later responses and events are ignored.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.image_requests.clear();
        self.symbol_lookups.clear();
        self.tooltips.clear();
        self.batch_depth = 0;
        self.layout_pending = false;
    }

    pub fn output(&self) -> RenderOutput {
        let elements = self
            .graph
            .to_elements()
            .into_iter()
            .map(|element| {
                let (style, position) = match element.group {
                    ElementGroup::Nodes => (
                        self.styles.get(&element.data.id).cloned(),
                        self.last_layout.positions.get(&element.data.id).copied(),
                    ),
                    ElementGroup::Edges => (None, None),
                };
                RenderedElement {
                    element,
                    style,
                    position,
                }
            })
            .collect();
        RenderOutput {
            elements,
            summary: self.graph.summary(),
            width: self.last_layout.width,
            height: self.last_layout.height,
        }
    }
}
