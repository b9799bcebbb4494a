use crate::app::{App, Mode};
use anyhow::Result;
use crossterm::event::{
    self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Position;
use std::time::Duration;

/// Terminal events
#[derive(Debug, Clone, Copy)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Terminal tick event
    Tick,
    /// Mouse event
    Mouse(MouseEvent),
}

/// Event handler for the terminal
pub struct EventHandler {
    /// Tick rate in milliseconds
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CEvent::Key(key) => return Ok(Event::Key(key)),
                CEvent::Mouse(m) => return Ok(Event::Mouse(m)),
                _ => {}
            }
        }
        Ok(Event::Tick)
    }
}

/// Handle key events for the application
pub fn handle_key_event(key: KeyEvent, app: &mut App) {
    // On Windows, crossterm reports both key press and release events.
    if key.kind != KeyEventKind::Press {
        return;
    }

    match app.mode {
        Mode::Search => handle_search_input(key, app),
        Mode::Help => {
            if key.code == KeyCode::Esc || app.bindings.help.matches(&key) {
                app.close_help();
            }
        }
        Mode::EditTitle | Mode::NewNote { .. } => handle_line_input(key, app),
        Mode::EditContent => handle_content_input(key, app),
        Mode::Normal => handle_normal_input(key, app),
    }
}

fn handle_normal_input(key: KeyEvent, app: &mut App) {
    let b = &app.bindings;
    if b.quit.matches(&key) {
        app.quit();
    } else if b.help.matches(&key) {
        app.open_help();
    } else if b.search.matches(&key) {
        app.open_search();
    } else if b.new_root.matches(&key) {
        app.start_new_root();
    } else if b.new_child.matches(&key) {
        app.start_new_child();
    } else if b.edit_title.matches(&key) {
        app.start_edit_title();
    } else if b.edit_content.matches(&key) {
        app.start_edit_content();
    } else if b.toggle_collapse.matches(&key) {
        app.toggle_selected_collapsed();
    } else if b.open_selected.matches(&key) {
        app.open_selected();
    } else if b.close_tab.matches(&key) {
        app.close_active_tab();
    } else if b.next_tab.matches(&key) {
        app.next_tab();
    } else if b.prev_tab.matches(&key) {
        app.prev_tab();
    } else if b.cursor_up.matches(&key) {
        app.move_cursor_up();
    } else if b.cursor_down.matches(&key) {
        app.move_cursor_down();
    } else if key.code == KeyCode::Esc {
        app.status_message = None;
    }
}

/// Single-line prompts: title edit and the new-note title
fn handle_line_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter => app.commit_edit(),
        KeyCode::Esc => app.cancel_edit(),
        _ => handle_text_editing(key, app),
    }
}

fn handle_content_input(key: KeyEvent, app: &mut App) {
    if app.bindings.save_edit.matches(&key) {
        app.commit_edit();
        return;
    }
    match key.code {
        KeyCode::Enter => app.insert_char('\n'),
        KeyCode::Esc => app.cancel_edit(),
        _ => handle_text_editing(key, app),
    }
}

fn handle_text_editing(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Backspace => app.backspace(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) if is_text_input(&key) => app.insert_char(c),
        _ => {}
    }
}

fn handle_search_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.close_search(),
        KeyCode::Enter => app.commit_search(),
        KeyCode::Up => app.workspace.search_previous(),
        KeyCode::Down => app.workspace.search_next(),
        KeyCode::Backspace => app.workspace.search_pop(),
        KeyCode::Char(c) if is_text_input(&key) => app.workspace.search_push(c),
        _ => {}
    }
}

// AltGr arrives as CONTROL+ALT on some platforms.
fn is_text_input(key: &KeyEvent) -> bool {
    !key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT)
}

/// Handle mouse events against the hitboxes recorded by the last render
pub fn handle_mouse_event(mouse: MouseEvent, app: &mut App) {
    if app.mode != Mode::Normal {
        return;
    }
    let position = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let tab = app
                .tab_hitboxes
                .iter()
                .find(|(rect, _)| rect.contains(position))
                .map(|(_, index)| *index);
            if let Some(index) = tab {
                app.click_tab(index);
                return;
            }

            // Tree rows start inside the panel border.
            let area = app.tree_area;
            let inner_top = area.y + 1;
            let inner_bottom = (area.y + area.height).saturating_sub(1);
            if area.contains(position) && mouse.row >= inner_top && mouse.row < inner_bottom {
                app.click_tree_row((mouse.row - inner_top) as usize);
            }
        }
        MouseEventKind::ScrollUp => app.move_cursor_up(),
        MouseEventKind::ScrollDown => app.move_cursor_down(),
        _ => {}
    }
}
