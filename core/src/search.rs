//! Substring search over the whole forest.
//!
//! No index is kept: every query walks the forest again. Results come back in
//! pre-order, never ranked.

use crate::models::NotePath;
use crate::tree::{Forest, NoteRef};
use log::debug;

/// One note together with the path that reaches it
#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    pub path: NotePath,
    pub note: NoteRef<'a>,
}

/// Every note in pre-order: parent first, then children left to right.
pub fn gather_all(forest: &Forest) -> Vec<SearchHit<'_>> {
    let mut hits = Vec::with_capacity(forest.len());
    let mut stack: Vec<SearchHit<'_>> = forest
        .roots()
        .enumerate()
        .rev()
        .map(|(i, note)| SearchHit {
            path: NotePath::root(i),
            note,
        })
        .collect();

    while let Some(hit) = stack.pop() {
        for (i, child) in hit.note.children().enumerate().rev() {
            stack.push(SearchHit {
                path: hit.path.child(i),
                note: child,
            });
        }
        hits.push(hit);
    }

    hits
}

/// Notes whose title or content contains `query`, ignoring case.
///
/// A blank query matches nothing.
pub fn search<'a>(forest: &'a Forest, query: &str) -> Vec<SearchHit<'a>> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    gather_all(forest)
        .into_iter()
        .filter(|hit| matches(&hit.note, &needle))
        .collect()
}

fn matches(note: &NoteRef<'_>, needle: &str) -> bool {
    note.title().to_lowercase().contains(needle) || note.content().to_lowercase().contains(needle)
}

/// Query, results and keyboard cursor of the search panel.
///
/// Results are stored as paths so the session does not borrow the forest
/// between keystrokes.
#[derive(Debug, Default, Clone)]
pub struct SearchSession {
    query: String,
    results: Vec<NotePath>,
    cursor: usize,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[NotePath] {
        &self.results
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Replace the query and recompute results; the cursor returns to the top
    pub fn set_query(&mut self, forest: &Forest, query: impl Into<String>) {
        self.query = query.into();
        self.refresh(forest);
    }

    pub fn push_char(&mut self, forest: &Forest, ch: char) {
        self.query.push(ch);
        self.refresh(forest);
    }

    pub fn pop_char(&mut self, forest: &Forest) {
        self.query.pop();
        self.refresh(forest);
    }

    /// Re-run the current query, e.g. after the forest changed
    pub fn refresh(&mut self, forest: &Forest) {
        self.results = search(forest, &self.query)
            .into_iter()
            .map(|hit| hit.path)
            .collect();
        self.cursor = 0;
        debug!(
            "event=search module=search query_len={} results={}",
            self.query.chars().count(),
            self.results.len()
        );
    }

    /// Re-run the current query without moving the cursor unless it fell off the end
    pub fn refresh_keep_cursor(&mut self, forest: &Forest) {
        let cursor = self.cursor;
        self.refresh(forest);
        if cursor < self.results.len() {
            self.cursor = cursor;
        }
    }

    /// Move down, wrapping from the last result to the first
    pub fn select_next(&mut self) {
        if self.results.is_empty() {
            return;
        }
        self.cursor = (self.cursor + 1) % self.results.len();
    }

    /// Move up, wrapping from the first result to the last
    pub fn select_previous(&mut self) {
        if self.results.is_empty() {
            return;
        }
        self.cursor = if self.cursor == 0 {
            self.results.len() - 1
        } else {
            self.cursor - 1
        };
    }

    pub fn selected(&self) -> Option<&NotePath> {
        self.results.get(self.cursor)
    }

    /// Take the selected path and reset the session
    pub fn commit(&mut self) -> Option<NotePath> {
        self.commit_at(self.cursor)
    }

    /// Take the path at `index` and reset the session.
    ///
    /// An index with no result leaves the session as it was.
    pub fn commit_at(&mut self, index: usize) -> Option<NotePath> {
        let path = self.results.get(index).cloned()?;
        self.clear();
        Some(path)
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.cursor = 0;
    }
}
