use serde::{Deserialize, Serialize};

/// Owned, nested form of a note. This is the persisted shape: the forest is
/// stored as a JSON array of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Note {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub children: Vec<Note>,
    #[serde(default)]
    pub collapsed: bool,
}

impl Note {
    /// Create a leaf note, expanded
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            children: Vec::new(),
            collapsed: false,
        }
    }

    /// Builder-style helper for assembling nested fixtures
    pub fn with_children(mut self, children: Vec<Note>) -> Self {
        self.children = children;
        self
    }
}
