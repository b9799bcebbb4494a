//! Open-note tabs.
//!
//! A tab holds only a [`NotePath`]; the note behind it is looked up again on
//! every read, so renames show up in the tab bar immediately.

use crate::models::NotePath;
use crate::tree::Forest;
use crate::{Error, Result};
use log::debug;

/// Label shown for a tab whose path no longer resolves
pub const MISSING_NOTE_LABEL: &str = "(missing note)";

/// Label shown for a note with a blank title
pub const UNTITLED_LABEL: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    path: NotePath,
}

impl Tab {
    pub fn new(path: NotePath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &NotePath {
        &self.path
    }
}

/// Ordered tab set plus the active position (`None` when nothing is open)
#[derive(Debug, Default, Clone)]
pub struct TabManager {
    tabs: Vec<Tab>,
    active: Option<usize>,
}

impl TabManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.and_then(|index| self.tabs.get(index))
    }

    /// Focus the tab already showing `path`, or open a new one at the end.
    /// Returns the active index.
    pub fn open_or_focus(&mut self, path: &NotePath) -> usize {
        let index = match self.tabs.iter().position(|tab| tab.path == *path) {
            Some(existing) => existing,
            None => {
                self.tabs.push(Tab::new(path.clone()));
                debug!("event=tab_opened module=tabs path={} open={}", path, self.tabs.len());
                self.tabs.len() - 1
            }
        };
        self.active = Some(index);
        index
    }

    pub fn focus(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.active = Some(index);
        Ok(())
    }

    /// Cycle forward, wrapping past the last tab
    pub fn focus_next(&mut self) {
        if self.tabs.is_empty() {
            return;
        }
        self.active = Some(match self.active {
            Some(index) => (index + 1) % self.tabs.len(),
            None => 0,
        });
    }

    /// Cycle backward, wrapping before the first tab
    pub fn focus_previous(&mut self) {
        if self.tabs.is_empty() {
            return;
        }
        self.active = Some(match self.active {
            Some(0) | None => self.tabs.len() - 1,
            Some(index) => index - 1,
        });
    }

    /// Remove the tab at `index`.
    ///
    /// Closing the active tab selects its previous neighbour, or the new first
    /// tab when it was first, or nothing when it was the last one open. Closing
    /// a tab before the active one shifts `active` down so it keeps pointing at
    /// the same tab.
    pub fn close(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        let closed = self.tabs.remove(index);

        self.active = match self.active {
            _ if self.tabs.is_empty() => None,
            Some(active) if active == index => Some(index.saturating_sub(1)),
            Some(active) if index < active => Some(active - 1),
            other => other,
        };

        debug!(
            "event=tab_closed module=tabs path={} open={} active={:?}",
            closed.path,
            self.tabs.len(),
            self.active
        );
        Ok(())
    }

    /// Display label for `tab`, resolved against `forest` right now
    pub fn label(tab: &Tab, forest: &Forest) -> String {
        match forest.resolve(&tab.path) {
            Ok(note) if note.title().trim().is_empty() => UNTITLED_LABEL.to_string(),
            Ok(note) => note.title().to_string(),
            Err(_) => MISSING_NOTE_LABEL.to_string(),
        }
    }

    /// Labels for every tab, in order
    pub fn labels(&self, forest: &Forest) -> Vec<String> {
        self.tabs.iter().map(|tab| Self::label(tab, forest)).collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.tabs.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.tabs.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;

    fn p(i: usize) -> NotePath {
        NotePath::root(i)
    }

    /// Tabs for roots 0..n with `active` focused
    fn manager(n: usize, active: usize) -> TabManager {
        let mut tabs = TabManager::new();
        for i in 0..n {
            tabs.open_or_focus(&p(i));
        }
        tabs.focus(active).unwrap();
        tabs
    }

    fn paths(tabs: &TabManager) -> Vec<NotePath> {
        tabs.tabs().iter().map(|t| t.path().clone()).collect()
    }

    #[test]
    fn test_open_appends_and_focuses() {
        let mut tabs = TabManager::new();
        assert_eq!(tabs.active_index(), None);
        assert_eq!(tabs.open_or_focus(&p(0)), 0);
        assert_eq!(tabs.open_or_focus(&p(1)), 1);
        assert_eq!(tabs.active_index(), Some(1));
        assert_eq!(tabs.active_tab().unwrap().path(), &p(1));
    }

    #[test]
    fn test_open_or_focus_idempotent() {
        let mut tabs = TabManager::new();
        let nested = p(0).child(2);
        let first = tabs.open_or_focus(&nested);
        let second = tabs.open_or_focus(&nested);
        assert_eq!(first, second);
        assert_eq!(tabs.len(), 1);
    }

    #[test]
    fn test_open_existing_refocuses() {
        let mut tabs = manager(3, 2);
        assert_eq!(tabs.open_or_focus(&p(0)), 0);
        assert_eq!(tabs.active_index(), Some(0));
        assert_eq!(tabs.len(), 3);
    }

    #[test]
    fn test_paths_compared_element_wise() {
        let mut tabs = TabManager::new();
        tabs.open_or_focus(&p(1).child(0));
        tabs.open_or_focus(&p(1));
        tabs.open_or_focus(&p(0).child(1));
        assert_eq!(tabs.len(), 3);
    }

    #[test]
    fn test_focus_out_of_range() {
        let mut tabs = manager(2, 0);
        assert!(matches!(tabs.focus(2), Err(Error::OutOfRange { index: 2, len: 2 })));
        assert_eq!(tabs.active_index(), Some(0));
    }

    #[test]
    fn test_close_active_middle_selects_previous() {
        // [A, B, C] with B active
        let mut tabs = manager(3, 1);
        tabs.close(1).unwrap();
        assert_eq!(paths(&tabs), vec![p(0), p(2)]);
        assert_eq!(tabs.active_index(), Some(0));
    }

    #[test]
    fn test_close_only_tab() {
        let mut tabs = manager(1, 0);
        tabs.close(0).unwrap();
        assert!(tabs.is_empty());
        assert_eq!(tabs.active_index(), None);
        assert!(tabs.active_tab().is_none());
    }

    #[test]
    fn test_close_active_first_selects_new_first() {
        let mut tabs = manager(3, 0);
        tabs.close(0).unwrap();
        assert_eq!(paths(&tabs), vec![p(1), p(2)]);
        assert_eq!(tabs.active_index(), Some(0));
        assert_eq!(tabs.active_tab().unwrap().path(), &p(1));
    }

    #[test]
    fn test_close_active_last_selects_previous() {
        let mut tabs = manager(3, 2);
        tabs.close(2).unwrap();
        assert_eq!(tabs.active_index(), Some(1));
        assert_eq!(tabs.active_tab().unwrap().path(), &p(1));
    }

    #[test]
    fn test_close_before_active_keeps_same_tab() {
        let mut tabs = manager(4, 2);
        tabs.close(0).unwrap();
        assert_eq!(tabs.active_index(), Some(1));
        assert_eq!(tabs.active_tab().unwrap().path(), &p(2));
    }

    #[test]
    fn test_close_second_to_last_while_last_active() {
        let mut tabs = manager(3, 2);
        tabs.close(1).unwrap();
        assert_eq!(paths(&tabs), vec![p(0), p(2)]);
        assert_eq!(tabs.active_tab().unwrap().path(), &p(2));
    }

    #[test]
    fn test_close_after_active_keeps_index() {
        let mut tabs = manager(3, 0);
        tabs.close(2).unwrap();
        assert_eq!(tabs.active_index(), Some(0));
        assert_eq!(tabs.len(), 2);
    }

    #[test]
    fn test_close_out_of_range() {
        let mut tabs = manager(2, 1);
        assert!(matches!(tabs.close(5), Err(Error::OutOfRange { .. })));
        assert_eq!(tabs.len(), 2);
        assert!(matches!(TabManager::new().close(0), Err(Error::OutOfRange { len: 0, .. })));
    }

    #[test]
    fn test_focus_cycling_wraps() {
        let mut tabs = manager(3, 2);
        tabs.focus_next();
        assert_eq!(tabs.active_index(), Some(0));
        tabs.focus_previous();
        assert_eq!(tabs.active_index(), Some(2));
        tabs.focus_previous();
        assert_eq!(tabs.active_index(), Some(1));

        let mut empty = TabManager::new();
        empty.focus_next();
        empty.focus_previous();
        assert_eq!(empty.active_index(), None);
    }

    #[test]
    fn test_labels_resolve_lazily() {
        let forest = Forest::from_notes(vec![
            Note::new("Inbox", "").with_children(vec![Note::new("  ", "")]),
        ])
        .unwrap();
        let mut tabs = TabManager::new();
        tabs.open_or_focus(&p(0));
        tabs.open_or_focus(&p(0).child(0));
        tabs.open_or_focus(&p(9));

        assert_eq!(
            tabs.labels(&forest),
            vec!["Inbox", UNTITLED_LABEL, MISSING_NOTE_LABEL]
        );
    }
}
