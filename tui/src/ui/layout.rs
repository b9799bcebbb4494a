use crate::app::{App, Mode};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use super::{
    render_editor, render_header, render_help_screen, render_note_prompt, render_search_overlay,
    render_status_bar, render_tab_bar, render_tree,
};

const TREE_PANEL_WIDTH: u16 = 32;

/// Render the complete UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let size = frame.size();

    // Header, tab bar, body, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    render_header(frame, app, chunks[0]);
    render_tab_bar(frame, app, chunks[1]);
    render_body(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Overlays (drawn last)
    match app.mode {
        Mode::Search => render_search_overlay(frame, app, size),
        Mode::NewNote { .. } | Mode::EditTitle => render_note_prompt(frame, app, size),
        Mode::Help => render_help_screen(frame, app, size),
        Mode::Normal | Mode::EditContent => {}
    }
}

fn render_body(frame: &mut Frame, app: &mut App, area: Rect) {
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(TREE_PANEL_WIDTH), Constraint::Min(0)])
        .split(area);

    render_tree(frame, app, body[0]);
    render_editor(frame, app, body[1]);
}
