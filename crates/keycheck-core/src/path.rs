//! # Key Paths — Dotted Locations in a Document or Schema
//!
//! A [`KeyPath`] is the only externally visible identifier of a location:
//! a dotted sequence of segments, each a field name, a JSON key, a 1-based
//! array ordinal, or a bracketed expected tag (`more.[whynot]`).
//!
//! Paths are built fresh at each recursion level by appending one segment
//! to the parent path; the root path is empty and renders as `""`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// A dotted hierarchical path.
///
/// Two paths compare equal only when their rendered text is identical;
/// case folding, where needed, is applied by the producer of the segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPath(String);

impl KeyPath {
    /// The empty root path.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Return a new path with `segment` appended.
    pub fn join(&self, segment: &str) -> Self {
        if self.0.is_empty() {
            Self(segment.to_string())
        } else {
            Self(format!("{}{SEPARATOR}{segment}", self.0))
        }
    }

    /// Return a new path with a 1-based array ordinal appended.
    pub fn join_ordinal(&self, ordinal: usize) -> Self {
        self.join(&ordinal.to_string())
    }

    /// Return a new path with `[tag]` appended, marking where a renamed
    /// field was addressed by its plain name.
    pub fn join_expected_tag(&self, tag: &str) -> Self {
        self.join(&format!("[{tag}]"))
    }

    /// Number of segments; the root has depth 0.
    pub fn depth(&self) -> usize {
        segment_count(&self.0)
    }

    /// Iterate over the segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// The rendered path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased copy, used for suppression matching.
    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }

    /// Consume the path and return the rendered text.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Number of dot-separated segments in a rendered path; empty text has none.
pub fn segment_count(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.split(SEPARATOR).count()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KeyPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for KeyPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for KeyPath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for KeyPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_from_root() {
        let p = KeyPath::root().join("More");
        assert_eq!(p, "More");
        assert_eq!(p.join("Another").join("Something"), "More.Another.Something");
    }

    #[test]
    fn test_ordinals_and_tags() {
        let p = KeyPath::root().join("failover").join_ordinal(2).join("add");
        assert_eq!(p.as_str(), "failover.2.add");
        assert_eq!(KeyPath::root().join_expected_tag("whynot"), "[whynot]");
        assert_eq!(
            KeyPath::from("more").join_expected_tag("whynot"),
            "more.[whynot]"
        );
    }

    #[test]
    fn test_depth_and_segments() {
        assert_eq!(KeyPath::root().depth(), 0);
        assert!(KeyPath::root().is_root());
        let p = KeyPath::from("a.b.c");
        assert_eq!(p.depth(), 3);
        assert_eq!(p.segments().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(segment_count(""), 0);
        assert_eq!(segment_count("why"), 1);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let p = KeyPath::from("More.Not");
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"More.Not\"");
    }
}
