//! Application context tying the note tree, tabs and search session together.

use crate::models::NotePath;
use crate::search::{SearchHit, SearchSession};
use crate::storage::{BlobStore, MemoryBlobStore, SqliteBlobStore};
use crate::tabs::TabManager;
use crate::tree::{NoteRef, NoteTree};
use crate::Result;
use log::info;
use std::path::Path;

/// Everything a front end needs for one session.
///
/// Owned by the application root and handed around by reference; there is no
/// other shared state.
pub struct Workspace {
    tree: NoteTree,
    tabs: TabManager,
    search: SearchSession,
}

impl Workspace {
    pub fn new(tree: NoteTree) -> Self {
        Self {
            tree,
            tabs: TabManager::new(),
            search: SearchSession::new(),
        }
    }

    /// Workspace persisted to the SQLite database at `db_path`
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let store = SqliteBlobStore::open(db_path)?;
        Ok(Self::with_store(Box::new(store)))
    }

    pub fn with_store(store: Box<dyn BlobStore>) -> Self {
        Self::new(NoteTree::with_store(store))
    }

    /// Workspace whose writes go nowhere durable
    pub fn in_memory() -> Self {
        Self::with_store(Box::new(MemoryBlobStore::new()))
    }

    pub fn tree(&self) -> &NoteTree {
        &self.tree
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    /// Populate an empty forest with a short introduction. Returns whether
    /// anything was created.
    pub fn seed_welcome(&mut self) -> Result<bool> {
        if !self.tree.forest().is_empty() {
            return Ok(false);
        }
        let welcome = self.tree.create_root(
            "Welcome to Grove",
            "Notes nest up to four levels deep. Open several at once as tabs.",
        );
        let keys = self
            .tree
            .create_child(&welcome, "Keys", "Press ? for the full key list.")?;
        self.tree
            .create_child(&keys, "Search", "Press / and type; Enter opens the selected note.")?;
        self.tree
            .create_child(&keys, "Tabs", "Tab and Shift+Tab switch, Ctrl+W closes.")?;
        info!("event=workspace_seeded module=workspace notes={}", self.tree.note_count());
        Ok(true)
    }

    // =========================
    // Notes
    // =========================

    pub fn create_root(&mut self, title: impl Into<String>, content: impl Into<String>) -> NotePath {
        let path = self.tree.create_root(title, content);
        self.refresh_search();
        path
    }

    pub fn create_child(
        &mut self,
        parent: &NotePath,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<NotePath> {
        let path = self.tree.create_child(parent, title, content)?;
        self.refresh_search();
        Ok(path)
    }

    pub fn set_title(&mut self, path: &NotePath, title: impl Into<String>) -> Result<()> {
        self.tree.set_title(path, title)?;
        self.refresh_search();
        Ok(())
    }

    pub fn set_content(&mut self, path: &NotePath, content: impl Into<String>) -> Result<()> {
        self.tree.set_content(path, content)?;
        self.refresh_search();
        Ok(())
    }

    pub fn toggle_collapsed(&mut self, path: &NotePath) -> Result<()> {
        self.tree.toggle_collapsed(path)
    }

    pub fn resolve(&self, path: &NotePath) -> Result<NoteRef<'_>> {
        self.tree.resolve(path)
    }

    // =========================
    // Tabs
    // =========================

    /// Open (or focus) a tab for `path`. The path must resolve.
    pub fn open_note(&mut self, path: &NotePath) -> Result<usize> {
        self.tree.resolve(path)?;
        Ok(self.tabs.open_or_focus(path))
    }

    pub fn focus_tab(&mut self, index: usize) -> Result<()> {
        self.tabs.focus(index)
    }

    pub fn focus_next_tab(&mut self) {
        self.tabs.focus_next();
    }

    pub fn focus_previous_tab(&mut self) {
        self.tabs.focus_previous();
    }

    pub fn close_tab(&mut self, index: usize) -> Result<()> {
        self.tabs.close(index)
    }

    /// Close whichever tab is active, if any
    pub fn close_active_tab(&mut self) -> Result<bool> {
        match self.tabs.active_index() {
            Some(index) => {
                self.tabs.close(index)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn active_path(&self) -> Option<&NotePath> {
        self.tabs.active_tab().map(|tab| tab.path())
    }

    /// Note shown in the editor; `None` with no tab open or a dangling path
    pub fn active_note(&self) -> Option<NoteRef<'_>> {
        let path = self.active_path()?;
        self.tree.resolve(path).ok()
    }

    pub fn tab_labels(&self) -> Vec<String> {
        self.tabs.labels(self.tree.forest())
    }

    // =========================
    // Search
    // =========================

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search.set_query(self.tree.forest(), query);
    }

    pub fn search_push(&mut self, ch: char) {
        self.search.push_char(self.tree.forest(), ch);
    }

    pub fn search_pop(&mut self) {
        self.search.pop_char(self.tree.forest());
    }

    pub fn search_next(&mut self) {
        self.search.select_next();
    }

    pub fn search_previous(&mut self) {
        self.search.select_previous();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// Current results resolved against the tree
    pub fn search_hits(&self) -> Vec<SearchHit<'_>> {
        self.search
            .results()
            .iter()
            .filter_map(|path| {
                self.tree.resolve(path).ok().map(|note| SearchHit {
                    path: path.clone(),
                    note,
                })
            })
            .collect()
    }

    /// Open the selected result in a tab and reset the search.
    ///
    /// `Ok(None)` when there is nothing selected.
    pub fn commit_search(&mut self) -> Result<Option<usize>> {
        match self.search.commit() {
            Some(path) => self.open_note(&path).map(Some),
            None => Ok(None),
        }
    }

    fn refresh_search(&mut self) {
        if !self.search.query().is_empty() {
            self.search.refresh_keep_cursor(self.tree.forest());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_DEPTH;
    use crate::tabs::MISSING_NOTE_LABEL;
    use crate::Error;
    use tempfile::tempdir;

    fn path(s: &str) -> NotePath {
        s.parse().unwrap()
    }

    #[test]
    fn test_shopping_scenario() {
        let mut ws = Workspace::in_memory();
        let shopping = ws.create_root("Shopping", "milk eggs");
        ws.create_child(&shopping, "Sub", "bread").unwrap();

        ws.set_search_query("bread");
        let hits = ws.search_hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path.depth(), 2);
        assert_eq!(hits[0].note.title(), "Sub");
    }

    #[test]
    fn test_depth_exceeded_scenario() {
        let mut ws = Workspace::in_memory();
        let mut current = ws.create_root("1", "");
        for depth in 2..=MAX_DEPTH {
            current = ws.create_child(&current, depth.to_string(), "").unwrap();
        }
        let before = ws.tree().to_json().unwrap();

        let err = ws.create_child(&current, "5", "").unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { .. }));
        assert_eq!(ws.tree().to_json().unwrap(), before);
        assert!(ws.tabs().is_empty());
    }

    #[test]
    fn test_commit_search_opens_tab_and_clears() {
        let mut ws = Workspace::in_memory();
        let a = ws.create_root("alpha", "");
        ws.create_child(&a, "alphabet", "").unwrap();
        ws.create_root("beta", "");

        for ch in "alp".chars() {
            ws.search_push(ch);
        }
        assert_eq!(ws.search().results().len(), 2);
        ws.search_next();

        assert_eq!(ws.commit_search().unwrap(), Some(0));
        assert_eq!(ws.active_path(), Some(&path("0/0")));
        assert_eq!(ws.active_note().unwrap().title(), "alphabet");
        assert_eq!(ws.search().query(), "");
        assert!(ws.search().is_empty());
        assert_eq!(ws.search().cursor(), 0);

        // Committing the same note again focuses the existing tab.
        ws.set_search_query("alphabet");
        ws.open_note(&path("1")).unwrap();
        assert_eq!(ws.commit_search().unwrap(), Some(0));
        assert_eq!(ws.tabs().len(), 2);
    }

    #[test]
    fn test_commit_search_without_results() {
        let mut ws = Workspace::in_memory();
        ws.create_root("alpha", "");
        ws.set_search_query("zzz");
        assert_eq!(ws.commit_search().unwrap(), None);
        assert!(ws.tabs().is_empty());
    }

    #[test]
    fn test_search_wraps_through_workspace() {
        let mut ws = Workspace::in_memory();
        ws.create_root("note one", "");
        ws.create_root("note two", "");
        ws.set_search_query("note");
        ws.search_previous();
        assert_eq!(ws.search().selected(), Some(&path("1")));
        ws.search_next();
        assert_eq!(ws.search().selected(), Some(&path("0")));
    }

    #[test]
    fn test_open_note_requires_resolvable_path() {
        let mut ws = Workspace::in_memory();
        assert!(matches!(ws.open_note(&path("0")), Err(Error::NotFound(_))));
        assert!(ws.tabs().is_empty());
    }

    #[test]
    fn test_edits_reflected_in_tab_label() {
        let mut ws = Workspace::in_memory();
        let a = ws.create_root("draft", "");
        ws.open_note(&a).unwrap();
        assert_eq!(ws.tab_labels(), vec!["draft"]);

        ws.set_title(&a, "final").unwrap();
        assert_eq!(ws.tab_labels(), vec!["final"]);
        assert_eq!(ws.active_note().unwrap().title(), "final");
    }

    #[test]
    fn test_closing_last_tab_clears_selection() {
        let mut ws = Workspace::in_memory();
        let a = ws.create_root("a", "");
        ws.open_note(&a).unwrap();
        assert!(ws.close_active_tab().unwrap());
        assert!(ws.active_path().is_none());
        assert!(ws.active_note().is_none());
        assert!(!ws.close_active_tab().unwrap());
    }

    #[test]
    fn test_search_results_follow_edits() {
        let mut ws = Workspace::in_memory();
        let a = ws.create_root("apple", "");
        ws.set_search_query("pear");
        assert!(ws.search().is_empty());

        ws.set_content(&a, "pear too").unwrap();
        assert_eq!(ws.search().results(), &[path("0")]);
    }

    #[test]
    fn test_collapsed_does_not_hide_from_search() {
        let mut ws = Workspace::in_memory();
        let a = ws.create_root("parent", "");
        ws.create_child(&a, "hidden child", "").unwrap();
        ws.toggle_collapsed(&a).unwrap();
        ws.set_search_query("hidden");
        assert_eq!(ws.search().results(), &[path("0/0")]);
    }

    #[test]
    fn test_seed_welcome_only_when_empty() {
        let mut ws = Workspace::in_memory();
        assert!(ws.seed_welcome().unwrap());
        let count = ws.tree().note_count();
        assert!(count > 1);
        assert!(!ws.seed_welcome().unwrap());
        assert_eq!(ws.tree().note_count(), count);
    }

    #[test]
    fn test_open_persists_to_sqlite() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("grove.db");
        {
            let mut ws = Workspace::open(&db_path).unwrap();
            let a = ws.create_root("kept", "body");
            ws.create_child(&a, "child", "").unwrap();
        }

        let ws = Workspace::open(&db_path).unwrap();
        assert_eq!(ws.resolve(&path("0")).unwrap().content(), "body");
        assert_eq!(ws.resolve(&path("0/0")).unwrap().title(), "child");
        assert!(ws.tabs().is_empty());
    }

    #[test]
    fn test_dangling_tab_shows_placeholder() {
        let mut ws = Workspace::new(NoteTree::new());
        ws.tabs.open_or_focus(&path("3/1"));
        assert_eq!(ws.tab_labels(), vec![MISSING_NOTE_LABEL]);
        assert!(ws.active_note().is_none());
    }
}
