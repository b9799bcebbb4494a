//! Path validation and navigation against a [`Forest`].
//!
//! Stateless. Resolution descends one level per path element; there is no
//! partial match.

use super::forest::{Forest, NodeId, NoteFields, NoteRef};
use crate::models::NotePath;
use crate::{Error, Result};

/// Locate the arena slot addressed by `path`
pub fn resolve_id(forest: &Forest, path: &NotePath) -> Result<NodeId> {
    let mut level = forest.root_ids();
    let mut found = None;
    for &index in path.indices() {
        let id = *level
            .get(index)
            .ok_or_else(|| Error::NotFound(path.clone()))?;
        level = forest.child_ids(id);
        found = Some(id);
    }
    // NotePath is never empty, so the loop ran at least once.
    found.ok_or_else(|| Error::NotFound(path.clone()))
}

/// Resolve `path` to a borrowed note
pub fn resolve<'a>(forest: &'a Forest, path: &NotePath) -> Result<NoteRef<'a>> {
    resolve_id(forest, path).map(|id| forest.note_ref(id))
}

/// Overwrite the scalar fields of the note at `path`.
///
/// Only the addressed node is written; siblings, ancestors and the children
/// list are left alone.
pub fn replace(forest: &mut Forest, path: &NotePath, fields: NoteFields) -> Result<()> {
    let id = resolve_id(forest, path)?;
    *forest.fields_mut(id) = fields;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;

    fn forest() -> Forest {
        Forest::from_notes(vec![
            Note::new("a", "").with_children(vec![Note::new("a0", ""), Note::new("a1", "")]),
            Note::new("b", ""),
        ])
        .unwrap()
    }

    fn path(s: &str) -> NotePath {
        s.parse().unwrap()
    }

    #[test]
    fn test_resolve_each_level() {
        let forest = forest();
        assert_eq!(resolve(&forest, &path("0")).unwrap().title(), "a");
        assert_eq!(resolve(&forest, &path("0/1")).unwrap().title(), "a1");
        assert_eq!(resolve(&forest, &path("1")).unwrap().title(), "b");
    }

    #[test]
    fn test_resolve_out_of_range() {
        let forest = forest();
        assert!(matches!(resolve(&forest, &path("2")), Err(Error::NotFound(_))));
        assert!(matches!(resolve(&forest, &path("0/2")), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_resolve_past_leaf() {
        let forest = forest();
        let err = resolve(&forest, &path("1/0")).unwrap_err();
        match err {
            Error::NotFound(p) => assert_eq!(p, path("1/0")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_on_empty_forest() {
        let forest = Forest::new();
        assert!(matches!(resolve(&forest, &path("0")), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_replace_touches_only_target() {
        let mut forest = forest();
        replace(&mut forest, &path("0/0"), NoteFields::new("changed", "body")).unwrap();

        let notes = forest.to_notes();
        assert_eq!(notes[0].title, "a");
        assert_eq!(notes[0].children[0].title, "changed");
        assert_eq!(notes[0].children[0].content, "body");
        assert_eq!(notes[0].children[1].title, "a1");
        assert_eq!(notes[1].title, "b");
    }

    #[test]
    fn test_replace_keeps_children() {
        let mut forest = forest();
        replace(&mut forest, &path("0"), NoteFields::new("root", "")).unwrap();
        assert_eq!(resolve(&forest, &path("0")).unwrap().child_count(), 2);
    }

    #[test]
    fn test_replace_missing_path() {
        let mut forest = forest();
        let err = replace(&mut forest, &path("5/0"), NoteFields::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
