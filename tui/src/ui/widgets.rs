use crate::app::{App, Mode};
use grove_core::tabs::{MISSING_NOTE_LABEL, UNTITLED_LABEL};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MAX_TAB_LABEL_WIDTH: usize = 20;
const TAB_SEPARATOR: &str = "│";

/// Shorten `text` to at most `max` display columns, marking the cut with `…`
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max - 1 {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

/// Render the header with the active note title and key hints
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.workspace.active_note() {
        Some(note) => format!(" {} ", display_title(note.title())),
        None => " Grove ".to_string(),
    };

    let keys = &app.config.keymap;
    let key_hints = match app.mode {
        Mode::EditContent => format!(" [{}:Save] [Esc:Cancel] [Enter:Newline] ", keys.save_edit),
        Mode::EditTitle | Mode::NewNote { .. } => " [Enter:Save] [Esc:Cancel] ".to_string(),
        Mode::Search => " [Esc:Close] [↑/↓:Select] [Enter:Open] [Type to search] ".to_string(),
        Mode::Help => " [Esc:Close] ".to_string(),
        Mode::Normal => format!(
            " [{}:Quit] [{}:Help] [{}:Search] [{}:New] [{}:Child] [{}:Title] [{}:Edit] [{}:Close tab] ",
            keys.quit,
            keys.help,
            keys.search,
            keys.new_root,
            keys.new_child,
            keys.edit_title,
            keys.edit_content,
            keys.close_tab,
        ),
    };

    let header_spans = vec![
        Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(key_hints, Style::default().fg(Color::DarkGray)),
    ];

    let header = Paragraph::new(Line::from(header_spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    frame.render_widget(header, area);
}

/// Render the open tabs and record where each one landed for mouse clicks
pub fn render_tab_bar(frame: &mut Frame, app: &mut App, area: Rect) {
    app.tab_hitboxes.clear();

    let labels = app.workspace.tab_labels();
    let active = app.workspace.tabs().active_index();
    let inner_left = area.x + 1;
    let inner_right = (area.x + area.width).saturating_sub(1);
    let row = area.y + 1;

    let mut spans = Vec::new();
    let mut x = inner_left;
    for (index, label) in labels.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(TAB_SEPARATOR, Style::default().fg(Color::DarkGray)));
            x = x.saturating_add(TAB_SEPARATOR.width() as u16);
        }
        let text = format!(" {} ", truncate_to_width(label, MAX_TAB_LABEL_WIDTH));
        let width = text.width() as u16;
        if x >= inner_right {
            break;
        }
        let visible = width.min(inner_right - x);
        app.tab_hitboxes.push((Rect::new(x, row, visible, 1), index));

        let style = if Some(index) == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(text, style));
        x = x.saturating_add(width);
    }

    let line = if labels.is_empty() {
        Line::from(Span::styled(" No open tabs ", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(spans)
    };
    let bar = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Tabs "));
    frame.render_widget(bar, area);
}

/// Render the note tree, one row per visible note
pub fn render_tree(frame: &mut Frame, app: &mut App, area: Rect) {
    app.tree_area = area;
    let height = area.height.saturating_sub(2) as usize;
    app.clamp_cursor(height);

    let rows = app.visible_rows();
    if rows.is_empty() {
        let empty_message = Paragraph::new(format!(
            "No notes yet. Press {} to create one.",
            app.config.keymap.new_root
        ))
        .block(Block::default().borders(Borders::ALL).title(" Notes "))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty_message, area);
        return;
    }

    let active = app.workspace.active_path();
    let label_width = (area.width as usize).saturating_sub(2);
    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(height)
        .map(|(i, row)| {
            let marker = if !row.note.has_children() {
                "•"
            } else if row.note.is_collapsed() {
                "▸"
            } else {
                "▾"
            };
            let text = format!(
                "{}{} {}",
                "  ".repeat(row.depth() - 1),
                marker,
                display_title(row.note.title())
            );
            let mut style = Style::default();
            if Some(&row.path) == active {
                style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
            }
            if i == app.tree_cursor {
                style = style.bg(Color::Blue).fg(Color::Black);
            }
            Line::from(Span::styled(truncate_to_width(&text, label_width), style))
        })
        .collect();

    let tree = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Notes ({}) ", app.workspace.tree().note_count())),
    );
    frame.render_widget(tree, area);
}

/// Render the active note's content, or the edit buffer while editing it
pub fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let (Some(path), Some(note)) = (app.workspace.active_path(), app.workspace.active_note())
    else {
        let title = if app.workspace.tabs().active_tab().is_some() {
            format!(" {} ", MISSING_NOTE_LABEL)
        } else {
            " Editor ".to_string()
        };
        let hint = Paragraph::new("No note open. Select one in the tree and press Enter.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, area);
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", display_title(note.title())))
        .title_alignment(Alignment::Left)
        .title(
            ratatui::widgets::block::Title::from(format!(" {} ", path))
                .alignment(Alignment::Right),
        );

    if app.mode == Mode::EditContent {
        let block = block.border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(area);
        let editor = Paragraph::new(Text::from(app.edit_buffer.as_str())).block(block);
        frame.render_widget(editor, area);

        let (line, column) = cursor_line_column(&app.edit_buffer, app.edit_cursor_position);
        if (line as u16) < inner.height {
            frame.set_cursor(
                inner.x + (column as u16).min(inner.width.saturating_sub(1)),
                inner.y + line as u16,
            );
        }
        return;
    }

    let content = if note.content().is_empty() {
        Text::styled(
            format!("Empty. Press {} to write.", app.config.keymap.edit_content),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Text::from(note.content())
    };
    let editor = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(editor, area);
}

/// Render the status bar: the last warning, or counts
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (status_text, style) = match &app.status_message {
        Some(message) => (
            format!(" {} ", message),
            Style::default().bg(Color::DarkGray).fg(Color::Yellow),
        ),
        None => (
            format!(
                " {} notes | {} tabs | {} ",
                app.workspace.tree().note_count(),
                app.workspace.tabs().len(),
                mode_name(&app.mode)
            ),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
    };

    let status_bar = Paragraph::new(status_text)
        .style(style)
        .alignment(Alignment::Center);

    frame.render_widget(status_bar, area);
}

/// Render the search overlay (center modal with query line and results)
pub fn render_search_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(20), Constraint::Percentage(60), Constraint::Percentage(20)])
        .split(area);

    let area_mid = popup_layout[1];
    let inner = Rect {
        x: area_mid.x + 1,
        y: area_mid.y + 1,
        width: area_mid.width.saturating_sub(2),
        height: area_mid.height.saturating_sub(2),
    };

    let hits = app.workspace.search_hits();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Search ({}) ", hits.len()));
    frame.render_widget(Clear, area_mid);
    frame.render_widget(block, area_mid);

    let inner_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let query = app.workspace.search().query();
    let input = Paragraph::new(Text::from(format!("/ {}", query)))
        .style(Style::default().fg(Color::White));
    frame.render_widget(input, inner_chunks[0]);
    frame.set_cursor(
        inner_chunks[0].x + 2 + query.width() as u16,
        inner_chunks[0].y,
    );

    if hits.is_empty() {
        let message = if query.is_empty() { "Type to search titles and content" } else { "No matches" };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner_chunks[1]);
        return;
    }

    let items: Vec<ListItem> = hits
        .iter()
        .map(|hit| {
            ListItem::new(Line::from(vec![
                Span::raw(display_title(hit.note.title()).to_string()),
                Span::styled(format!("  {}", hit.path), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.workspace.search().cursor()));

    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::Black))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, inner_chunks[1], &mut state);
}

/// Render the single-line prompt used for new notes and title edits
pub fn render_note_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.mode {
        Mode::NewNote { parent: Some(parent) } => {
            format!(" New child of {} (Enter:Create | Esc:Cancel) ", parent)
        }
        Mode::NewNote { parent: None } => " New note (Enter:Create | Esc:Cancel) ".to_string(),
        _ => " Rename note (Enter:Save | Esc:Cancel) ".to_string(),
    };

    let popup_width = 60.min(area.width);
    let popup_height = 5.min(area.height);
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let inner = Rect {
        x: popup_area.x + 2,
        y: popup_area.y + 2,
        width: popup_area.width.saturating_sub(4),
        height: 1,
    };

    let paragraph = Paragraph::new(app.edit_buffer.as_str()).style(Style::default().fg(Color::Yellow));
    frame.render_widget(paragraph, inner);

    let (_, column) = cursor_line_column(&app.edit_buffer, app.edit_cursor_position);
    frame.set_cursor(inner.x + (column as u16).min(inner.width), inner.y);
}

/// Render the help screen overlay from the configured keymap
pub fn render_help_screen(frame: &mut Frame, app: &App, size: Rect) {
    let keys = &app.config.keymap;
    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
    };
    let entry = |key: &str, what: &str| Line::from(format!("{:<12} {}", key, what));

    let help_text = vec![
        Line::from(""),
        heading("Tree"),
        entry(format!("{}/{}", keys.cursor_up, keys.cursor_down).as_str(), "Move cursor"),
        entry(keys.open_selected.as_str(), "Open note in a tab"),
        entry(keys.toggle_collapse.as_str(), "Collapse/expand"),
        entry(keys.new_root.as_str(), "New top-level note"),
        entry(keys.new_child.as_str(), "New child of selected note"),
        Line::from(""),
        heading("Editing"),
        entry(keys.edit_title.as_str(), "Edit title"),
        entry(keys.edit_content.as_str(), "Edit content"),
        entry(keys.save_edit.as_str(), "Save content"),
        entry("esc", "Cancel edit"),
        Line::from(""),
        heading("Tabs"),
        entry(keys.next_tab.as_str(), "Next tab"),
        entry(keys.prev_tab.as_str(), "Previous tab"),
        entry(keys.close_tab.as_str(), "Close tab"),
        entry("click", "Focus tab / open note"),
        Line::from(""),
        heading("Search"),
        entry(keys.search.as_str(), "Search titles and content"),
        entry("up/down", "Select result"),
        entry("enter", "Open result"),
        Line::from(""),
        heading("Interface"),
        entry(keys.help.as_str(), "Show this help"),
        entry(keys.quit.as_str(), "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            format!("Press '{}' or 'Esc' to close", keys.help),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup_width = 60.min(size.width);
    let popup_height = (help_text.len() as u16 + 2).min(size.height);
    let x = (size.width.saturating_sub(popup_width)) / 2;
    let y = (size.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    let block = Block::default()
        .title(" Help - Keyboard Shortcuts ")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let inner = Rect {
        x: popup_area.x + 1,
        y: popup_area.y + 1,
        width: popup_area.width.saturating_sub(2),
        height: popup_area.height.saturating_sub(2),
    };

    let paragraph = Paragraph::new(help_text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, inner);
}

fn display_title(title: &str) -> &str {
    if title.trim().is_empty() {
        UNTITLED_LABEL
    } else {
        title
    }
}

fn mode_name(mode: &Mode) -> &'static str {
    match mode {
        Mode::Normal => "NORMAL",
        Mode::EditTitle => "TITLE",
        Mode::EditContent => "EDIT",
        Mode::NewNote { .. } => "NEW",
        Mode::Search => "SEARCH",
        Mode::Help => "HELP",
    }
}

/// Line and display column of a char index within multi-line text
fn cursor_line_column(text: &str, char_index: usize) -> (usize, usize) {
    let before: String = text.chars().take(char_index).collect();
    let line = before.matches('\n').count();
    let column = before.rsplit('\n').next().unwrap_or("").width();
    (line, column)
}
