//! Owned expression tree.
//!
//! Every node carries a stable id, its element name, optional text content (leaves only) and an
//! optional cross-reference into a sibling representation (e.g. presentation markup).

use crate::{Error, Result};
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprNode {
    pub id: String,
    pub name: String,
    pub text: Option<String>,
    pub xref: Option<String>,
    pub children: Vec<ExprNode>,
}

impl ExprNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            text: None,
            xref: None,
            children: Vec::new(),
        }
    }

    pub fn leaf(id: impl Into<String>, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(id, name)
        }
    }

    pub fn with_child(mut self, child: ExprNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_xref(mut self, xref: impl Into<String>) -> Self {
        self.xref = Some(xref.into());
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Function/operator application (`<apply>` in content markup).
    pub fn is_apply(&self) -> bool {
        self.name == "apply"
    }

    pub fn first_child(&self) -> Option<&ExprNode> {
        self.children.first()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Preorder traversal, children in document order.
    pub fn iter(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    pub fn find(&self, id: &str) -> Option<&ExprNode> {
        self.iter().find(|n| n.id == id)
    }

    /// Returns a deep copy with every id and cross-reference prefixed.
    pub fn prefixed(&self, prefix: &str) -> ExprNode {
        let mut out = self.clone();
        out.prefix_ids(prefix);
        out
    }

    pub fn prefix_ids(&mut self, prefix: &str) {
        let mut stack: Vec<&mut ExprNode> = vec![self];
        while let Some(n) = stack.pop() {
            n.id = format!("{prefix}{}", n.id);
            if let Some(xref) = n.xref.as_mut() {
                *xref = format!("{prefix}{xref}");
            }
            stack.extend(n.children.iter_mut());
        }
    }

    pub fn check_unique_ids(&self) -> Result<()> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for n in self.iter() {
            if !seen.insert(n.id.as_str()) {
                return Err(Error::DuplicateNodeId { id: n.id.clone() });
            }
        }
        Ok(())
    }
}

pub struct Preorder<'a> {
    stack: Vec<&'a ExprNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a ExprNode;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.stack.pop()?;
        self.stack.extend(n.children.iter().rev());
        Some(n)
    }
}
