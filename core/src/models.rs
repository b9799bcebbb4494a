mod note;
mod path;

pub use note::Note;
pub use path::NotePath;

/// Deepest nesting level a note may live at (roots are depth 1).
pub const MAX_DEPTH: usize = 4;
