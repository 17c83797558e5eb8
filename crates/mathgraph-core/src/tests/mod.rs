mod mathml;
mod merge;

use crate::*;

pub(crate) const GOAT: &str = include_str!("../../../../fixtures/mathml/goat.mml.xml");

pub(crate) fn goat() -> ExprNode {
    parse_mathml(GOAT).unwrap()
}

/// `(plus a (times b c))` with ids `r`, `op`, `a`, `t`, `top`, `b`, `c`.
pub(crate) fn small() -> ExprNode {
    ExprNode::new("r", "apply")
        .with_child(ExprNode::new("op", "plus"))
        .with_child(ExprNode::leaf("a", "ci", "a"))
        .with_child(
            ExprNode::new("t", "apply")
                .with_child(ExprNode::new("top", "times"))
                .with_child(ExprNode::leaf("b", "ci", "b"))
                .with_child(ExprNode::leaf("c", "ci", "c")),
        )
}
