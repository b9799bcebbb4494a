use crate::models::{Note, NotePath, MAX_DEPTH};
use crate::{Error, Result};

/// Index of a note inside the forest arena. Only meaningful for the forest that
/// handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Scalar fields of a note, i.e. everything except its children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteFields {
    pub title: String,
    pub content: String,
    pub collapsed: bool,
}

impl NoteFields {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            collapsed: false,
        }
    }
}

#[derive(Debug)]
struct NoteNode {
    fields: NoteFields,
    children: Vec<NodeId>,
}

/// Arena-backed forest of notes.
///
/// Nodes are never removed, so a `NodeId` stays valid for the forest's
/// lifetime and sibling lists only grow at the end.
#[derive(Debug, Default)]
pub struct Forest {
    nodes: Vec<NoteNode>,
    roots: Vec<NodeId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the arena from the nested, persisted form.
    ///
    /// Fails with `DepthExceeded` if any note sits deeper than [`MAX_DEPTH`].
    pub fn from_notes(notes: Vec<Note>) -> Result<Self> {
        let mut forest = Self::new();
        // (note, parent, path of the note)
        let mut stack: Vec<(Note, Option<NodeId>, NotePath)> = notes
            .into_iter()
            .enumerate()
            .rev()
            .map(|(i, note)| (note, None, NotePath::root(i)))
            .collect();

        while let Some((note, parent, path)) = stack.pop() {
            if path.depth() > MAX_DEPTH {
                return Err(Error::DepthExceeded {
                    path: path.parent().unwrap_or(path),
                    max: MAX_DEPTH,
                });
            }
            let Note {
                title,
                content,
                children,
                collapsed,
            } = note;
            let id = forest.alloc(NoteFields {
                title,
                content,
                collapsed,
            });
            match parent {
                Some(parent_id) => forest.nodes[parent_id.0].children.push(id),
                None => forest.roots.push(id),
            }
            for (i, child) in children.into_iter().enumerate().rev() {
                stack.push((child, Some(id), path.child(i)));
            }
        }

        Ok(forest)
    }

    /// Materialise the nested, persisted form
    pub fn to_notes(&self) -> Vec<Note> {
        self.roots().map(|root| root.to_note()).collect()
    }

    /// Total number of notes at every depth
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Root notes in order
    pub fn roots(&self) -> impl DoubleEndedIterator<Item = NoteRef<'_>> + ExactSizeIterator {
        self.roots.iter().map(move |&id| NoteRef { forest: self, id })
    }

    pub fn resolve(&self, path: &NotePath) -> Result<NoteRef<'_>> {
        super::codec::resolve(self, path)
    }

    pub(crate) fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    pub(crate) fn child_ids(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub(crate) fn fields_mut(&mut self, id: NodeId) -> &mut NoteFields {
        &mut self.nodes[id.0].fields
    }

    pub(crate) fn note_ref(&self, id: NodeId) -> NoteRef<'_> {
        NoteRef { forest: self, id }
    }

    /// Append a root and return its path
    pub(crate) fn push_root(&mut self, fields: NoteFields) -> NotePath {
        let id = self.alloc(fields);
        self.roots.push(id);
        NotePath::root(self.roots.len() - 1)
    }

    /// Append a child under `parent` (already resolved from `parent_path`)
    pub(crate) fn push_child(&mut self, parent: NodeId, parent_path: &NotePath, fields: NoteFields) -> NotePath {
        let id = self.alloc(fields);
        let children = &mut self.nodes[parent.0].children;
        children.push(id);
        parent_path.child(children.len() - 1)
    }

    fn alloc(&mut self, fields: NoteFields) -> NodeId {
        self.nodes.push(NoteNode {
            fields,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }
}

/// Borrowed view of one note in a [`Forest`].
#[derive(Debug, Clone, Copy)]
pub struct NoteRef<'a> {
    forest: &'a Forest,
    id: NodeId,
}

impl<'a> NoteRef<'a> {
    pub fn title(&self) -> &'a str {
        &self.node().fields.title
    }

    pub fn content(&self) -> &'a str {
        &self.node().fields.content
    }

    pub fn is_collapsed(&self) -> bool {
        self.node().fields.collapsed
    }

    pub fn fields(&self) -> NoteFields {
        self.node().fields.clone()
    }

    pub fn child_count(&self) -> usize {
        self.node().children.len()
    }

    pub fn has_children(&self) -> bool {
        !self.node().children.is_empty()
    }

    /// Children in insertion order
    pub fn children(&self) -> impl DoubleEndedIterator<Item = NoteRef<'a>> + ExactSizeIterator + 'a {
        let forest = self.forest;
        self.node()
            .children
            .iter()
            .map(move |&id| NoteRef { forest, id })
    }

    /// Deep copy of this note and its subtree
    pub fn to_note(&self) -> Note {
        // Bounded by MAX_DEPTH, recursion is fine here.
        let fields = &self.node().fields;
        Note {
            title: fields.title.clone(),
            content: fields.content.clone(),
            children: self.children().map(|child| child.to_note()).collect(),
            collapsed: fields.collapsed,
        }
    }

    fn node(&self) -> &'a NoteNode {
        &self.forest.nodes[self.id.0]
    }
}
