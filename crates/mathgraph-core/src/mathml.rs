//! Content MathML to [`ExprNode`].
//!
//! This is a loader, not a MathML implementation: it keeps element names, ids, leaf text and
//! `xref` attributes and nothing else. Accepted shapes:
//!
//! - a bare content element (`<apply>…</apply>`)
//! - `<math>` with one element child
//! - `<math><semantics>…<annotation-xml encoding="MathML-Content">…</annotation-xml></semantics></math>`
//!
//! Elements without an `id` (or `xml:id`) get a path id: `n` for the root, `n.0` for its first
//! child, `n.0.2` for that node's third child, and so on.

use crate::{Error, ExprNode, Result};
use roxmltree::{Document, Node, ParsingOptions};

const CONTENT_ENCODING: &str = "MathML-Content";

pub fn parse_mathml(xml: &str) -> Result<ExprNode> {
    let opts = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, opts)?;
    let root = content_root(doc.root_element()).ok_or(Error::EmptyDocument)?;
    let tree = build(root, "n");
    tree.check_unique_ids()?;
    tracing::debug!(root = %tree.id, nodes = tree.node_count(), "loaded MathML tree");
    Ok(tree)
}

fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn content_root<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    match node.tag_name().name() {
        "math" => content_root(element_children(node).next()?),
        "semantics" => {
            let annotated = element_children(node).find(|c| {
                c.tag_name().name() == "annotation-xml"
                    && c.attribute("encoding") == Some(CONTENT_ENCODING)
            });
            match annotated {
                Some(a) => content_root(element_children(a).next()?),
                None => content_root(element_children(node).next()?),
            }
        }
        _ => Some(node),
    }
}

fn build(node: Node<'_, '_>, path: &str) -> ExprNode {
    let id = node
        .attribute("id")
        .or_else(|| node.attribute((roxmltree::NS_XML_URI, "id")))
        .map(str::to_string)
        .unwrap_or_else(|| path.to_string());

    let mut out = ExprNode::new(id, node.tag_name().name());
    out.xref = node.attribute("xref").map(str::to_string);
    for (i, child) in element_children(node).enumerate() {
        out.children.push(build(child, &format!("{path}.{i}")));
    }
    if out.children.is_empty() {
        let text: String = node
            .descendants()
            .filter(Node::is_text)
            .filter_map(|t| t.text())
            .collect();
        let text = text.trim();
        if !text.is_empty() {
            out.text = Some(text.to_string());
        }
    }
    out
}
