//! Graph configuration options.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Enables the parent/children relation (`set_parent`, `children`, ...).
    pub compound: bool,
}

impl GraphOptions {
    pub fn compound() -> Self {
        Self { compound: true }
    }
}
