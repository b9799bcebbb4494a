use super::codec;
use super::forest::{Forest, NoteFields, NoteRef};
use crate::models::{Note, NotePath, MAX_DEPTH};
use crate::storage::{BlobStore, FOREST_KEY};
use crate::{Error, Result};
use log::{debug, error, info, warn};

/// Owner of the forest. Every mutation is keyed by [`NotePath`] and, when a
/// store is attached, followed by a synchronous write-back of the whole forest.
pub struct NoteTree {
    forest: Forest,
    store: Option<Box<dyn BlobStore>>,
}

impl NoteTree {
    /// Empty tree with no persistence
    pub fn new() -> Self {
        Self {
            forest: Forest::new(),
            store: None,
        }
    }

    /// Tree over an existing forest, no persistence
    pub fn from_forest(forest: Forest) -> Self {
        Self {
            forest,
            store: None,
        }
    }

    /// Load the forest persisted in `store` and write back to it from now on.
    ///
    /// An absent key, an unreadable store, malformed JSON or a forest deeper than
    /// [`MAX_DEPTH`] all start from an empty forest.
    pub fn with_store(store: Box<dyn BlobStore>) -> Self {
        let forest = match store.load(FOREST_KEY) {
            Ok(Some(json)) => match Self::parse_forest(&json) {
                Ok(forest) => {
                    info!(
                        "event=forest_loaded module=tree status=ok notes={} roots={}",
                        forest.len(),
                        forest.root_count()
                    );
                    forest
                }
                Err(err) => {
                    warn!("event=forest_loaded module=tree status=discarded error={}", err);
                    Forest::new()
                }
            },
            Ok(None) => {
                info!("event=forest_loaded module=tree status=empty");
                Forest::new()
            }
            Err(err) => {
                warn!("event=forest_loaded module=tree status=unreadable error={}", err);
                Forest::new()
            }
        };

        Self {
            forest,
            store: Some(store),
        }
    }

    fn parse_forest(json: &str) -> Result<Forest> {
        let notes: Vec<Note> = serde_json::from_str(json)?;
        Forest::from_notes(notes)
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn resolve(&self, path: &NotePath) -> Result<NoteRef<'_>> {
        codec::resolve(&self.forest, path)
    }

    /// Number of notes at every depth
    pub fn note_count(&self) -> usize {
        self.forest.len()
    }

    pub fn roots(&self) -> impl DoubleEndedIterator<Item = NoteRef<'_>> + ExactSizeIterator {
        self.forest.roots()
    }

    pub fn to_notes(&self) -> Vec<Note> {
        self.forest.to_notes()
    }

    /// JSON array of root notes, the persisted form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.forest.to_notes())?)
    }

    /// Append a new root note and return its path
    pub fn create_root(&mut self, title: impl Into<String>, content: impl Into<String>) -> NotePath {
        let path = self.forest.push_root(NoteFields::new(title, content));
        info!("event=note_created module=tree path={} depth=1", path);
        self.persist();
        path
    }

    /// Append a new child under `parent` and return its path
    pub fn create_child(
        &mut self,
        parent: &NotePath,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<NotePath> {
        if parent.depth() >= MAX_DEPTH {
            warn!(
                "event=note_create_rejected module=tree reason=depth_exceeded parent={}",
                parent
            );
            return Err(Error::DepthExceeded {
                path: parent.clone(),
                max: MAX_DEPTH,
            });
        }
        let parent_id = codec::resolve_id(&self.forest, parent)?;
        let path = self
            .forest
            .push_child(parent_id, parent, NoteFields::new(title, content));
        info!(
            "event=note_created module=tree path={} depth={}",
            path,
            path.depth()
        );
        self.persist();
        Ok(path)
    }

    pub fn set_title(&mut self, path: &NotePath, title: impl Into<String>) -> Result<()> {
        let mut fields = self.resolve(path)?.fields();
        fields.title = title.into();
        self.apply(path, fields, "title")
    }

    pub fn set_content(&mut self, path: &NotePath, content: impl Into<String>) -> Result<()> {
        let mut fields = self.resolve(path)?.fields();
        fields.content = content.into();
        self.apply(path, fields, "content")
    }

    /// Flip the view-only collapsed flag
    pub fn toggle_collapsed(&mut self, path: &NotePath) -> Result<()> {
        let mut fields = self.resolve(path)?.fields();
        fields.collapsed = !fields.collapsed;
        self.apply(path, fields, "collapsed")
    }

    fn apply(&mut self, path: &NotePath, fields: NoteFields, field: &str) -> Result<()> {
        codec::replace(&mut self.forest, path, fields)?;
        debug!("event=note_updated module=tree path={} field={}", path, field);
        self.persist();
        Ok(())
    }

    fn persist(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let result = serde_json::to_string(&self.forest.to_notes())
            .map_err(Error::from)
            .and_then(|json| store.save(FOREST_KEY, &json));
        if let Err(err) = result {
            // The in-memory forest stays authoritative; the next mutation retries the full write.
            error!("event=forest_persist module=tree status=error error={}", err);
        }
    }
}

impl Default for NoteTree {
    fn default() -> Self {
        Self::new()
    }
}
