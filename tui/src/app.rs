use crate::config::{load_config, Bindings, Config};
use anyhow::Result;
use grove_core::{Error as CoreError, NotePath, NoteRef, Workspace};
use log::warn;
use ratatui::layout::Rect;
use std::path::Path;

/// Ticks a status message stays up (about four seconds at 250ms)
const STATUS_TICKS: u16 = 16;

/// One visible line of the tree panel
#[derive(Debug, Clone)]
pub struct TreeRow<'a> {
    pub path: NotePath,
    pub note: NoteRef<'a>,
}

impl TreeRow<'_> {
    pub fn depth(&self) -> usize {
        self.path.depth()
    }
}

/// What keystrokes currently go to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    EditTitle,
    EditContent,
    /// Title prompt for a new note; `None` parent creates a root
    NewNote { parent: Option<NotePath> },
    Search,
    Help,
}

/// Application state
pub struct App {
    pub should_quit: bool,
    pub workspace: Workspace,
    pub config: Config,
    pub bindings: Bindings,
    pub mode: Mode,
    pub tree_cursor: usize,
    pub scroll_offset: usize,
    pub edit_buffer: String,
    pub edit_cursor_position: usize,
    pub status_message: Option<String>,
    status_ticks: u16,
    // Hit-testing regions, refreshed on every render
    pub tab_hitboxes: Vec<(Rect, usize)>,
    pub tree_area: Rect,
}

impl App {
    pub fn new(workspace: Workspace, config: Config) -> Result<Self> {
        let bindings = config.keymap.compile()?;
        Ok(Self {
            should_quit: false,
            workspace,
            config,
            bindings,
            mode: Mode::Normal,
            tree_cursor: 0,
            scroll_offset: 0,
            edit_buffer: String::new(),
            edit_cursor_position: 0,
            status_message: None,
            status_ticks: 0,
            tab_hitboxes: Vec::new(),
            tree_area: Rect::default(),
        })
    }

    /// Open the database at `db_path`, with `config.toml` alongside it
    pub fn open(db_path: &Path) -> Result<Self> {
        let config_path = db_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.join("config.toml"))
            .unwrap_or_else(|| Path::new("config.toml").to_path_buf());
        let config = load_config(&config_path)?;
        let workspace = Workspace::open(db_path)?;
        Self::new(workspace, config)
    }

    /// Seed the welcome notes on first run and open the first root
    pub fn initialize(&mut self) -> Result<()> {
        self.workspace.seed_welcome()?;
        if self.workspace.tree().note_count() > 0 {
            self.workspace.open_note(&NotePath::root(0))?;
        }
        Ok(())
    }

    /// Expire the status message once it has been shown long enough
    pub fn tick(&mut self) {
        if self.status_message.is_none() {
            return;
        }
        self.status_ticks = self.status_ticks.saturating_sub(1);
        if self.status_ticks == 0 {
            self.status_message = None;
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_ticks = STATUS_TICKS;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Show a core error in the status bar
    pub fn report(&mut self, err: CoreError) {
        warn!("event=ui_error module=tui error={}", err);
        let message = match err {
            CoreError::DepthExceeded { max, .. } => {
                format!("Notes can only nest {} levels deep", max)
            }
            other => other.to_string(),
        };
        self.set_status(message);
    }

    // =========================
    // Tree panel
    // =========================

    /// Rows shown in the tree panel, pre-order, skipping children of
    /// collapsed notes
    pub fn visible_rows(&self) -> Vec<TreeRow<'_>> {
        let mut rows = Vec::new();
        let mut stack: Vec<TreeRow<'_>> = self
            .workspace
            .tree()
            .roots()
            .enumerate()
            .rev()
            .map(|(i, note)| TreeRow {
                path: NotePath::root(i),
                note,
            })
            .collect();

        while let Some(row) = stack.pop() {
            if !row.note.is_collapsed() {
                for (i, child) in row.note.children().enumerate().rev() {
                    stack.push(TreeRow {
                        path: row.path.child(i),
                        note: child,
                    });
                }
            }
            rows.push(row);
        }
        rows
    }

    pub fn selected_path(&self) -> Option<NotePath> {
        self.visible_rows()
            .into_iter()
            .nth(self.tree_cursor)
            .map(|row| row.path)
    }

    pub fn move_cursor_up(&mut self) {
        if self.tree_cursor > 0 {
            self.tree_cursor -= 1;
            if self.tree_cursor < self.scroll_offset {
                self.scroll_offset = self.tree_cursor;
            }
        }
    }

    pub fn move_cursor_down(&mut self) {
        let last = self.visible_rows().len().saturating_sub(1);
        if self.tree_cursor < last {
            self.tree_cursor += 1;
        }
    }

    /// Keep the cursor inside the list and on screen for `height` rows
    pub fn clamp_cursor(&mut self, height: usize) {
        let len = self.visible_rows().len();
        if len == 0 {
            self.tree_cursor = 0;
            self.scroll_offset = 0;
            return;
        }
        self.tree_cursor = self.tree_cursor.min(len - 1);
        if self.tree_cursor < self.scroll_offset {
            self.scroll_offset = self.tree_cursor;
        }
        if height > 0 && self.tree_cursor >= self.scroll_offset + height {
            self.scroll_offset = self.tree_cursor + 1 - height;
        }
    }

    /// Put the cursor on `path` if it is visible
    pub fn select_path(&mut self, path: &NotePath) {
        if let Some(index) = self.visible_rows().iter().position(|row| &row.path == path) {
            self.tree_cursor = index;
        }
    }

    pub fn open_selected(&mut self) {
        if let Some(path) = self.selected_path() {
            if let Err(err) = self.workspace.open_note(&path) {
                self.report(err);
            }
        }
    }

    pub fn toggle_selected_collapsed(&mut self) {
        let Some(path) = self.selected_path() else {
            return;
        };
        let has_children = self
            .workspace
            .resolve(&path)
            .map(|note| note.has_children())
            .unwrap_or(false);
        if !has_children {
            return;
        }
        if let Err(err) = self.workspace.toggle_collapsed(&path) {
            self.report(err);
        }
        self.select_path(&path);
    }

    /// Mouse click on the `row`-th line of the tree panel (0-based, on screen)
    pub fn click_tree_row(&mut self, row: usize) {
        let index = self.scroll_offset + row;
        if index < self.visible_rows().len() {
            self.tree_cursor = index;
            self.open_selected();
        }
    }

    // =========================
    // Tabs
    // =========================

    pub fn next_tab(&mut self) {
        self.workspace.focus_next_tab();
        self.follow_active_tab();
    }

    pub fn prev_tab(&mut self) {
        self.workspace.focus_previous_tab();
        self.follow_active_tab();
    }

    pub fn click_tab(&mut self, index: usize) {
        match self.workspace.focus_tab(index) {
            Ok(()) => self.follow_active_tab(),
            Err(err) => self.report(err),
        }
    }

    pub fn close_active_tab(&mut self) {
        match self.workspace.close_active_tab() {
            Ok(_) => self.follow_active_tab(),
            Err(err) => self.report(err),
        }
    }

    fn follow_active_tab(&mut self) {
        if let Some(path) = self.workspace.active_path().cloned() {
            self.select_path(&path);
        }
    }

    // =========================
    // Editing
    // =========================

    pub fn is_editing(&self) -> bool {
        matches!(
            self.mode,
            Mode::EditTitle | Mode::EditContent | Mode::NewNote { .. }
        )
    }

    pub fn start_edit_title(&mut self) {
        if let Some(note) = self.workspace.active_note() {
            let title = note.title().to_string();
            self.begin_edit(Mode::EditTitle, title);
        } else {
            self.set_status("Open a note first");
        }
    }

    pub fn start_edit_content(&mut self) {
        if let Some(note) = self.workspace.active_note() {
            let content = note.content().to_string();
            self.begin_edit(Mode::EditContent, content);
        } else {
            self.set_status("Open a note first");
        }
    }

    pub fn start_new_root(&mut self) {
        self.begin_edit(Mode::NewNote { parent: None }, String::new());
    }

    /// Prompt for a child of the selected tree row
    pub fn start_new_child(&mut self) {
        match self.selected_path() {
            Some(parent) => self.begin_edit(Mode::NewNote { parent: Some(parent) }, String::new()),
            None => self.start_new_root(),
        }
    }

    fn begin_edit(&mut self, mode: Mode, buffer: String) {
        self.edit_cursor_position = buffer.chars().count();
        self.edit_buffer = buffer;
        self.mode = mode;
        self.status_message = None;
    }

    pub fn cancel_edit(&mut self) {
        self.mode = Mode::Normal;
        self.edit_buffer.clear();
        self.edit_cursor_position = 0;
    }

    /// Write the edit buffer back through the workspace
    pub fn commit_edit(&mut self) {
        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let buffer = std::mem::take(&mut self.edit_buffer);
        self.edit_cursor_position = 0;
        let is_title = mode == Mode::EditTitle;

        let result = match mode {
            Mode::EditTitle | Mode::EditContent => {
                let Some(path) = self.workspace.active_path().cloned() else {
                    return;
                };
                if is_title {
                    self.workspace.set_title(&path, buffer.trim())
                } else {
                    self.workspace.set_content(&path, buffer)
                }
            }
            Mode::NewNote { parent } => self.create_note(parent.as_ref(), buffer.trim()),
            _ => Ok(()),
        };
        if let Err(err) = result {
            self.report(err);
        }
    }

    fn create_note(&mut self, parent: Option<&NotePath>, title: &str) -> grove_core::Result<()> {
        let path = match parent {
            Some(parent) => {
                let path = self.workspace.create_child(parent, title, "")?;
                // Make sure the new child is visible.
                if self.workspace.resolve(parent)?.is_collapsed() {
                    self.workspace.toggle_collapsed(parent)?;
                }
                path
            }
            None => self.workspace.create_root(title, ""),
        };
        self.workspace.open_note(&path)?;
        self.select_path(&path);
        Ok(())
    }

    pub fn insert_char(&mut self, ch: char) {
        let byte_pos = self.byte_offset(self.edit_cursor_position);
        self.edit_buffer.insert(byte_pos, ch);
        self.edit_cursor_position += 1;
    }

    pub fn backspace(&mut self) {
        if self.edit_cursor_position > 0 {
            let from = self.byte_offset(self.edit_cursor_position - 1);
            self.edit_buffer.remove(from);
            self.edit_cursor_position -= 1;
        }
    }

    pub fn cursor_left(&mut self) {
        self.edit_cursor_position = self.edit_cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.edit_cursor_position < self.edit_buffer.chars().count() {
            self.edit_cursor_position += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.edit_cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.edit_cursor_position = self.edit_buffer.chars().count();
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.edit_buffer
            .char_indices()
            .map(|(i, _)| i)
            .nth(char_index)
            .unwrap_or(self.edit_buffer.len())
    }

    // =========================
    // Search
    // =========================

    pub fn open_search(&mut self) {
        self.workspace.clear_search();
        self.mode = Mode::Search;
    }

    pub fn close_search(&mut self) {
        self.workspace.clear_search();
        self.mode = Mode::Normal;
    }

    pub fn commit_search(&mut self) {
        match self.workspace.commit_search() {
            Ok(Some(_)) => {
                self.mode = Mode::Normal;
                self.follow_active_tab();
            }
            Ok(None) => {}
            Err(err) => self.report(err),
        }
    }

    // =========================
    // Help
    // =========================

    pub fn open_help(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn close_help(&mut self) {
        self.mode = Mode::Normal;
    }
}
