//! Exact-duplicate detection within one generation call.
//!
//! Two attempts are duplicates when they come from the same blueprint (by
//! title template) and drew the same assignment. Resolved text is not
//! compared: distinct assignments that happen to render identically are
//! still distinct exercises.

use std::collections::HashSet;

use crate::generator::Result;
use crate::template::{Assignment, Blueprint};

/// Identity of one (blueprint, assignment) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    /// Builds the key from the title template and a canonical JSON encoding
    /// of the assignment. [`Assignment`] is ordered by key, so the encoding
    /// does not depend on sampling order.
    pub fn new(blueprint: &Blueprint, assignment: &Assignment) -> Result<Self> {
        let encoded = serde_json::to_string(assignment)?;
        Ok(Self(format!("{}\u{1f}{}", blueprint.title_template, encoded)))
    }
}

/// Set of keys already emitted during one call.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: HashSet<DedupKey>,
}

impl DedupSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key`, returning false if it was already present.
    pub fn insert(&mut self, key: DedupKey) -> bool {
        self.seen.insert(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ReplacementValue;

    fn blueprint(title: &str) -> Blueprint {
        Blueprint::new(title, "desc {col}", "SELECT {col} FROM t").with_replacement("col", ["a", "b"])
    }

    fn assignment(value: &str) -> Assignment {
        let mut a = Assignment::new();
        a.insert("col".to_string(), ReplacementValue::text(value));
        a
    }

    #[test]
    fn test_same_pair_same_key() {
        let bp = blueprint("Select {col}");
        let k1 = DedupKey::new(&bp, &assignment("a")).expect("key should build");
        let k2 = DedupKey::new(&bp, &assignment("a")).expect("key should build");
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_different_assignment_different_key() {
        let bp = blueprint("Select {col}");
        let k1 = DedupKey::new(&bp, &assignment("a")).expect("key should build");
        let k2 = DedupKey::new(&bp, &assignment("b")).expect("key should build");
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_different_blueprint_different_key() {
        let k1 = DedupKey::new(&blueprint("Select {col}"), &assignment("a")).expect("key should build");
        let k2 = DedupKey::new(&blueprint("Project {col}"), &assignment("a")).expect("key should build");
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_text_and_number_are_distinct() {
        let bp = blueprint("Limit {col}");
        let mut numeric = Assignment::new();
        numeric.insert("col".to_string(), ReplacementValue::Integer(5));
        let k1 = DedupKey::new(&bp, &numeric).expect("key should build");
        let k2 = DedupKey::new(&bp, &assignment("5")).expect("key should build");
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_set_rejects_repeats() {
        let bp = blueprint("Select {col}");
        let mut set = DedupSet::new();
        assert!(set.insert(DedupKey::new(&bp, &assignment("a")).expect("key should build")));
        assert!(!set.insert(DedupKey::new(&bp, &assignment("a")).expect("key should build")));
        assert!(set.insert(DedupKey::new(&bp, &assignment("b")).expect("key should build")));
    }
}
