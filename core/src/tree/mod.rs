pub mod codec;
mod forest;
mod note_tree;

pub use forest::{Forest, NodeId, NoteFields, NoteRef};
pub use note_tree::NoteTree;
