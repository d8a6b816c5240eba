//! Location tracking for tree walks.

use std::fmt;

use crate::error::TransformError;

use super::types::Key;

/// Default limit on container nesting for every tree walk.
///
/// Trees nested deeper than this are rejected even though they are valid
/// input; raise the limit with `with_max_depth` or `ECS_DEPLOY_MAX_DEPTH`.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Location of a node inside a nested value, rendered as `$.a[0].b`.
///
/// Walkers push a segment before descending and pop it on the way back, so
/// the depth of the path is the nesting depth of the current node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreePath {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
}

impl TreePath {
    /// The path of the root node.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Number of segments below the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Descends into a mapping entry.
    pub fn push_key(&mut self, key: &Key) {
        let label = match key {
            Key::Symbol(symbol) => symbol.as_str().to_string(),
            Key::String(s) => s.clone(),
            _ => key.describe(),
        };
        self.segments.push(Segment::Field(label));
    }

    /// Descends into a named field that is not a key of the tree.
    pub fn push_field(&mut self, label: impl Into<String>) {
        self.segments.push(Segment::Field(label.into()));
    }

    /// Descends into a sequence element.
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(Segment::Index(index));
    }

    /// Returns to the parent node.
    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Checks that a container at this path is within `limit` levels.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::CyclicStructure`] when the container sits
    /// `limit` or more levels below the root.
    pub fn enter_container(&self, limit: usize) -> Result<(), TransformError> {
        if self.depth() >= limit {
            return Err(TransformError::CyclicStructure {
                path: self.to_string(),
                limit,
            });
        }
        Ok(())
    }
}

fn is_plain(label: &str) -> bool {
    !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                Segment::Field(label) if is_plain(label) => write!(f, ".{label}")?,
                Segment::Field(label) => write!(f, "[{label:?}]")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
