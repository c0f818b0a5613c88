//! Replacement values and candidate lists for blueprint placeholders.
//!
//! A blueprint declares, for each placeholder key, the ordered list of values
//! the sampler may substitute. Values are either text or numbers and keep
//! the representation they had in the library file.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::template::placeholder::is_valid_key;

/// Placeholder key to candidate values, ordered by key.
pub type Replacements = BTreeMap<String, Vec<ReplacementValue>>;

/// The concrete values chosen for one instantiation attempt, ordered by key.
pub type Assignment = BTreeMap<String, ReplacementValue>;

/// A single substitution candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplacementValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ReplacementValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        ReplacementValue::Text(value.into())
    }
}

impl fmt::Display for ReplacementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementValue::Integer(n) => write!(f, "{n}"),
            ReplacementValue::Float(x) => write!(f, "{x}"),
            ReplacementValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ReplacementValue {
    fn from(value: &str) -> Self {
        ReplacementValue::Text(value.to_string())
    }
}

impl From<String> for ReplacementValue {
    fn from(value: String) -> Self {
        ReplacementValue::Text(value)
    }
}

impl From<i64> for ReplacementValue {
    fn from(value: i64) -> Self {
        ReplacementValue::Integer(value)
    }
}

impl From<f64> for ReplacementValue {
    fn from(value: f64) -> Self {
        ReplacementValue::Float(value)
    }
}

/// Validates the shape of a replacement table.
///
/// Every key must be a plain identifier, every candidate list must be
/// non-empty, and no text candidate may be blank. Cross-checking against the templates happens in
/// [`crate::template::Blueprint::validate`].
pub fn validate_replacements(
    blueprint: &str,
    replacements: &Replacements,
) -> Result<(), TemplateError> {
    for (key, candidates) in replacements {
        if !is_valid_key(key) {
            return Err(TemplateError::InvalidReplacementKey {
                blueprint: blueprint.to_string(),
                key: key.clone(),
            });
        }
        if candidates.is_empty() {
            return Err(TemplateError::EmptyCandidates {
                blueprint: blueprint.to_string(),
                key: key.clone(),
            });
        }
        for (index, candidate) in candidates.iter().enumerate() {
            if matches!(candidate, ReplacementValue::Text(text) if text.trim().is_empty()) {
                return Err(TemplateError::BlankCandidate {
                    blueprint: blueprint.to_string(),
                    key: key.clone(),
                    index,
                });
            }
        }
    }
    Ok(())
}

/// Number of distinct assignments a replacement table can produce.
///
/// Saturates instead of overflowing; anything that large is effectively
/// unlimited for sampling purposes.
pub fn combinations(replacements: &Replacements) -> u64 {
    replacements
        .values()
        .fold(1u64, |acc, candidates| acc.saturating_mul(candidates.len() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_yaml_values() {
        let values: Vec<ReplacementValue> =
            serde_yaml::from_str("[nome, 10, 2.5, \"42\"]").expect("should parse");
        assert_eq!(
            values,
            vec![
                ReplacementValue::text("nome"),
                ReplacementValue::Integer(10),
                ReplacementValue::Float(2.5),
                ReplacementValue::text("42"),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ReplacementValue::Integer(7).to_string(), "7");
        assert_eq!(ReplacementValue::Float(0.25).to_string(), "0.25");
        assert_eq!(ReplacementValue::text("utenti").to_string(), "utenti");
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let mut replacements = Replacements::new();
        replacements.insert("col".to_string(), vec![]);
        let result = validate_replacements("bp", &replacements);
        assert!(matches!(result, Err(TemplateError::EmptyCandidates { .. })));
    }

    #[test]
    fn test_blank_text_candidate_rejected() {
        let mut replacements = Replacements::new();
        replacements.insert("col".to_string(), vec!["nome".into(), "  ".into()]);
        let result = validate_replacements("bp", &replacements);
        assert!(matches!(
            result,
            Err(TemplateError::BlankCandidate { index: 1, .. })
        ));

        replacements.insert("col".to_string(), vec!["".into()]);
        assert!(validate_replacements("bp", &replacements).is_err());
    }

    #[test]
    fn test_invalid_key_rejected() {
        let mut replacements = Replacements::new();
        replacements.insert("my col".to_string(), vec!["a".into()]);
        let result = validate_replacements("bp", &replacements);
        assert!(matches!(
            result,
            Err(TemplateError::InvalidReplacementKey { .. })
        ));
    }

    #[test]
    fn test_combinations() {
        let mut replacements = Replacements::new();
        assert_eq!(combinations(&replacements), 1);
        replacements.insert("col".to_string(), vec!["a".into(), "b".into()]);
        replacements.insert("n".to_string(), vec![1i64.into(), 2i64.into(), 3i64.into()]);
        assert_eq!(combinations(&replacements), 6);
    }
}
