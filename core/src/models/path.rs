use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Structural address of a note: `[root, child, grandchild, ...]`.
///
/// Never empty. A path only means something against a particular forest; it is
/// re-resolved every time it is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotePath(Vec<usize>);

impl NotePath {
    /// Build a path from raw indices, rejecting the empty sequence
    pub fn new(indices: Vec<usize>) -> Result<Self> {
        if indices.is_empty() {
            return Err(Error::InvalidInput("path must not be empty".to_string()));
        }
        Ok(Self(indices))
    }

    /// Path of the root note at `index`
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// Path of this note's child at `index`
    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    /// Nesting depth; a root has depth 1
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Position among siblings
    pub fn last(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    pub fn parent(&self) -> Option<NotePath> {
        if self.0.len() > 1 {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        } else {
            None
        }
    }
}

impl fmt::Display for NotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for NotePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("path must not be empty".to_string()));
        }
        let indices = trimmed
            .split('/')
            .map(|segment| {
                segment.trim().parse::<usize>().map_err(|_| {
                    Error::InvalidInput(format!("invalid path segment `{}` in `{}`", segment, trimmed))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(indices)
    }
}
