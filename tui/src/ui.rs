mod layout;
mod widgets;

pub use layout::render;
pub use widgets::{
    render_editor,
    render_header,
    render_help_screen,
    render_note_prompt,
    render_search_overlay,
    render_status_bar,
    render_tab_bar,
    render_tree,
    truncate_to_width,
};
