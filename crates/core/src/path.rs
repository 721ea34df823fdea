//! Hierarchical (ltree-style) identifiers.
//!
//! Example identifiers, organization/course/content paths and deployment
//! paths all share one grammar: segments separated by `.` or `/`, each
//! matching `[a-z0-9]+([_-][a-z0-9]+)*`. A path may use either separator but
//! not both. The canonical form always uses `.`, so `week1/intro` and
//! `week1.intro` name the same position.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Separator used by the canonical form.
pub const CANONICAL_SEPARATOR: char = '.';

/// Longest allowed single segment (PostgreSQL ltree label limit).
pub const MAX_SEGMENT_LEN: usize = 255;

static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+([_-][a-z0-9]+)*$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path must not be empty")]
    Empty,

    #[error("path must not mix '.' and '/' separators")]
    MixedSeparators,

    #[error("path contains an empty segment")]
    EmptySegment,

    #[error("segment '{0}' is longer than {MAX_SEGMENT_LEN} characters")]
    SegmentTooLong(String),

    #[error("invalid segment '{0}': expected lowercase alphanumerics joined by '_' or '-'")]
    InvalidSegment(String),
}

impl From<PathError> for CoreError {
    fn from(err: PathError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

/// A validated, canonicalized hierarchical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HierarchicalPath(String);

impl HierarchicalPath {
    /// Parse and canonicalize a dot- or slash-separated path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let has_dot = raw.contains('.');
        let has_slash = raw.contains('/');
        if has_dot && has_slash {
            return Err(PathError::MixedSeparators);
        }
        let separator = if has_slash { '/' } else { CANONICAL_SEPARATOR };

        let mut segments = Vec::new();
        for segment in raw.split(separator) {
            validate_segment(segment)?;
            segments.push(segment);
        }

        Ok(Self(segments.join(".")))
    }

    /// The canonical dot-separated form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(CANONICAL_SEPARATOR)
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Last segment of the path.
    pub fn leaf(&self) -> &str {
        self.0
            .rsplit(CANONICAL_SEPARATOR)
            .next()
            .unwrap_or(self.0.as_str())
    }

    /// The enclosing path, or `None` for a single-segment path.
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rsplit_once(CANONICAL_SEPARATOR)
            .map(|(parent, _)| Self(parent.to_string()))
    }

    /// Whether `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0[self.0.len()..].starts_with(CANONICAL_SEPARATOR)
    }

    /// Render with `/` separators, for filesystem layouts.
    pub fn to_slash_path(&self) -> String {
        self.0.replace(CANONICAL_SEPARATOR, "/")
    }
}

fn validate_segment(segment: &str) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment);
    }
    if segment.len() > MAX_SEGMENT_LEN {
        return Err(PathError::SegmentTooLong(segment.to_string()));
    }
    if !SEGMENT_RE.is_match(segment) {
        return Err(PathError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

impl fmt::Display for HierarchicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for HierarchicalPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HierarchicalPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HierarchicalPath> for String {
    fn from(value: HierarchicalPath) -> Self {
        value.0
    }
}

impl AsRef<str> for HierarchicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate and canonicalize a path string in one step.
///
/// Convenience for DTO fields that are stored as plain strings.
pub fn canonicalize(raw: &str) -> Result<String, CoreError> {
    Ok(HierarchicalPath::parse(raw)?.0)
}
