pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),

    #[error("MathML document has no content element")]
    EmptyDocument,

    #[error("Duplicate node id: {id}")]
    DuplicateNodeId { id: String },

    #[error("Edge {from} -> {to} references a node that does not exist")]
    DanglingEdge { from: String, to: String },

    #[error("Similarity type {kind} is not supported.")]
    UnsupportedMatchType { kind: String },

    #[error("Node {id} does not exist in the graph")]
    UnresolvedNode { id: String },

    #[error("Node {id} was already consumed by an earlier match")]
    TargetAlreadyMatched { id: String },

    #[error("Invalid render config: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
