//! Tree comparison: merge two projected trees into one graph according to correspondences.
//!
//! Trees are projected under [`PREFIX_A`] and [`PREFIX_B`], then every correspondence is applied
//! in list order, resolving ids against the graph as it is at that moment:
//!
//! - `identical`: both subtrees collapse into the source node. Descendants of both roots are
//!   removed, edges into the target are moved onto the source, and the target is removed.
//! - `similar`: descendants of both roots are hidden (recorded so they can be expanded later),
//!   both roots are grouped under a container, then the target is removed. The target's hidden
//!   descendants join the container and move into its collapse memo, so expanding the container
//!   still reveals them.
//!
//! A call either applies every match or leaves the graph untouched.

use crate::element::{CollapseMemo, ElementGraph, Expansion, GraphNode, MatchMarker};
use crate::project::{ProjectOptions, project};
use crate::{Correspondence, Error, ExprNode, MatchKind, Result};
use rustc_hash::FxHashSet;

pub const PREFIX_A: &str = "A.";
pub const PREFIX_B: &str = "B.";

pub const SIMILAR_CONTAINER_LABEL: &str = "Similar";

pub fn similar_container_id(source: &str, target: &str) -> String {
    format!("match-similar-{source}-{target}")
}

pub fn merge(a: &ExprNode, b: &ExprNode, correspondences: &[Correspondence]) -> Result<ElementGraph> {
    merge_with(a, b, correspondences, &ProjectOptions::default())
}

pub fn merge_with(
    a: &ExprNode,
    b: &ExprNode,
    correspondences: &[Correspondence],
    options: &ProjectOptions,
) -> Result<ElementGraph> {
    let mut graph = ElementGraph::new();
    graph.extend(project(a, options)?.prefixed(PREFIX_A))?;
    graph.extend(project(b, options)?.prefixed(PREFIX_B))?;
    apply_correspondences(&mut graph, correspondences)?;
    Ok(graph)
}

/// Applies `correspondences` to an already combined graph. On error `graph` is unchanged.
pub fn merge_into(graph: &mut ElementGraph, correspondences: &[Correspondence]) -> Result<()> {
    let mut scratch = graph.clone();
    apply_correspondences(&mut scratch, correspondences)?;
    *graph = scratch;
    Ok(())
}

fn apply_correspondences(graph: &mut ElementGraph, correspondences: &[Correspondence]) -> Result<()> {
    let mut consumed: FxHashSet<String> = FxHashSet::default();
    for c in correspondences {
        let source = format!("{PREFIX_A}{}", c.id);
        for m in &c.matches {
            let target = format!("{PREFIX_B}{}", m.id);
            if consumed.contains(&target) {
                return Err(Error::TargetAlreadyMatched { id: target });
            }
            graph.require(&source)?;
            graph.require(&target)?;
            tracing::debug!(%source, %target, kind = %m.kind, "applying match");
            match m.kind {
                MatchKind::Identical => merge_identical(graph, &source, &target)?,
                MatchKind::Similar => merge_similar(graph, &source, &target)?,
            }
            consumed.insert(target);
        }
    }
    Ok(())
}

/// Unifies `target` into `source`. Both ids must exist.
pub fn merge_identical(graph: &mut ElementGraph, source: &str, target: &str) -> Result<()> {
    graph.require(source)?;
    graph.require(target)?;

    for id in graph.descendants(source) {
        graph.remove_node(&id);
    }
    for id in graph.descendants(target) {
        if id != source {
            graph.remove_node(&id);
        }
    }
    for key in graph.incoming(target) {
        if key.v == source {
            continue;
        }
        graph.redirect_edge(&key.v, target, source)?;
    }
    graph.remove_node(target);

    if let Some(n) = graph.node_mut(source) {
        n.marker = Some(MatchMarker::Identical);
    }
    Ok(())
}

/// Groups `source` and `target` under one container and drops `target`. Both ids must exist.
pub fn merge_similar(graph: &mut ElementGraph, source: &str, target: &str) -> Result<()> {
    graph.require(source)?;
    graph.require(target)?;

    hide_descendants(graph, source, target);
    hide_descendants(graph, target, source);

    let container = match graph.group_of(source) {
        Some(existing) => existing.to_string(),
        None => {
            let id = similar_container_id(source, target);
            graph.add_node(GraphNode::container(id.clone(), SIMILAR_CONTAINER_LABEL))?;
            id
        }
    };
    for id in [source, target] {
        graph.set_group(id, &container)?;
        graph.add_member(&container, id)?;
        if let Some(n) = graph.node_mut(id) {
            n.marker = Some(MatchMarker::Similar);
        }
    }
    let orphaned = graph
        .node_mut(target)
        .and_then(|n| n.collapse.take())
        .map(|memo| memo.hidden)
        .unwrap_or_default();
    park_in_container(graph, &container, orphaned)?;
    graph.remove_node(target);
    Ok(())
}

/// Groups `hidden` under `container` and records them in the container's collapse memo.
fn park_in_container(graph: &mut ElementGraph, container: &str, hidden: Vec<String>) -> Result<()> {
    if hidden.is_empty() {
        return Ok(());
    }
    for id in &hidden {
        graph.set_group(id, container)?;
    }
    let n = graph.require_mut(container)?;
    match n.collapse.as_mut() {
        Some(memo) => memo.hidden.extend(hidden),
        None => {
            n.collapse = Some(CollapseMemo {
                restore: Expansion::Normal,
                hidden,
            });
            n.expansion = Expansion::Collapsed;
        }
    }
    Ok(())
}

/// Hides the currently visible descendants of `id`, except `keep`, and records them in its
/// collapse memo.
fn hide_descendants(graph: &mut ElementGraph, id: &str, keep: &str) {
    let hidden: Vec<String> = graph
        .descendants(id)
        .into_iter()
        .filter(|d| d != keep && graph.is_visible(d))
        .collect();
    for d in &hidden {
        graph.set_visible(d, false);
    }
    let Some(n) = graph.node_mut(id) else {
        return;
    };
    match n.collapse.as_mut() {
        Some(memo) => memo.hidden.extend(hidden),
        None => {
            n.collapse = Some(CollapseMemo {
                restore: n.expansion,
                hidden,
            });
            n.expansion = Expansion::Collapsed;
        }
    }
}
