//! Blueprint schema: the parameterized template behind every exercise.
//!
//! A blueprint carries the templated text fields of an exercise together with
//! the candidate values for each `{key}` placeholder those fields reference.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::template::placeholder::referenced_keys;
use crate::template::variables::{self, ReplacementValue, Replacements};

/// A static, parameterized exercise template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Title with `{key}` placeholders. Also the blueprint's identity for deduplication.
    pub title_template: String,
    /// Task description with placeholders.
    pub desc_template: String,
    /// Reference solution query with placeholders.
    pub query_template: String,
    /// Progressive hints, each with placeholders.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
    /// Explanation shown after solving. Never substituted.
    #[serde(default)]
    pub explanation: String,
    /// Candidate values per placeholder key.
    #[serde(default, skip_serializing_if = "Replacements::is_empty")]
    pub replacements: Replacements,
    /// Buggy query for "find the bug" exercises.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broken_code: Option<String>,
    /// Hint pointing at the bug in `broken_code`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_hint: Option<String>,
}

impl Blueprint {
    /// Creates a blueprint with the three required templates.
    pub fn new(
        title_template: impl Into<String>,
        desc_template: impl Into<String>,
        query_template: impl Into<String>,
    ) -> Self {
        Self {
            title_template: title_template.into(),
            desc_template: desc_template.into(),
            query_template: query_template.into(),
            hints: Vec::new(),
            explanation: String::new(),
            replacements: Replacements::new(),
            broken_code: None,
            debug_hint: None,
        }
    }

    /// Appends a hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Sets the explanation.
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    /// Declares the candidate values for a placeholder key.
    pub fn with_replacement<V: Into<ReplacementValue>>(
        mut self,
        key: impl Into<String>,
        candidates: impl IntoIterator<Item = V>,
    ) -> Self {
        self.replacements
            .insert(key.into(), candidates.into_iter().map(Into::into).collect());
        self
    }

    /// Turns this blueprint into a "find the bug" variant.
    pub fn with_broken_code(
        mut self,
        broken_code: impl Into<String>,
        debug_hint: impl Into<String>,
    ) -> Self {
        self.broken_code = Some(broken_code.into());
        self.debug_hint = Some(debug_hint.into());
        self
    }

    /// Returns true if this blueprint carries a broken-code variant.
    pub fn is_debugging(&self) -> bool {
        self.broken_code.is_some()
    }

    /// Number of distinct assignments this blueprint can produce.
    pub fn combinations(&self) -> u64 {
        variables::combinations(&self.replacements)
    }

    /// Returns every placeholder-bearing field as `(field name, text)`.
    pub fn templated_fields(&self) -> Vec<(String, &str)> {
        let mut fields = vec![
            ("title".to_string(), self.title_template.as_str()),
            ("description".to_string(), self.desc_template.as_str()),
            ("query".to_string(), self.query_template.as_str()),
        ];
        for (i, hint) in self.hints.iter().enumerate() {
            fields.push((format!("hints[{i}]"), hint.as_str()));
        }
        if let Some(code) = &self.broken_code {
            fields.push(("broken_code".to_string(), code.as_str()));
        }
        if let Some(hint) = &self.debug_hint {
            fields.push(("debug_hint".to_string(), hint.as_str()));
        }
        fields
    }

    /// Cross-checks placeholders against declared replacement keys.
    ///
    /// Reports both directions: keys referenced in a field but never declared,
    /// and declared keys that no field references.
    pub fn placeholder_issues(&self) -> Vec<TemplateError> {
        let mut issues = Vec::new();
        let mut referenced = BTreeSet::new();

        for (field, text) in self.templated_fields() {
            for key in referenced_keys(text) {
                if !self.replacements.contains_key(key) {
                    issues.push(TemplateError::UndeclaredPlaceholder {
                        blueprint: self.title_template.clone(),
                        field: field.clone(),
                        key: key.to_string(),
                    });
                }
                referenced.insert(key);
            }
        }

        for key in self.replacements.keys() {
            if !referenced.contains(key.as_str()) {
                issues.push(TemplateError::UnreferencedReplacement {
                    blueprint: self.title_template.clone(),
                    key: key.clone(),
                });
            }
        }

        issues
    }

    /// Validates the structural requirements of this blueprint.
    ///
    /// Required templates must be non-empty, `debug_hint` needs `broken_code`,
    /// and the replacement table must be well formed. Placeholder
    /// cross-checks are separate, see [`Blueprint::placeholder_issues`].
    pub fn validate_structure(&self) -> Result<(), TemplateError> {
        let required = [
            ("title_template", &self.title_template),
            ("desc_template", &self.desc_template),
            ("query_template", &self.query_template),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(TemplateError::MissingRequiredField {
                    blueprint: self.title_template.clone(),
                    field: field.to_string(),
                });
            }
        }

        if self.debug_hint.is_some() && self.broken_code.is_none() {
            return Err(TemplateError::MissingRequiredField {
                blueprint: self.title_template.clone(),
                field: "broken_code".to_string(),
            });
        }

        variables::validate_replacements(&self.title_template, &self.replacements)
    }

    /// Validates structure and placeholders, returning the first problem found.
    pub fn validate(&self) -> Result<(), TemplateError> {
        self.validate_structure()?;
        match self.placeholder_issues().into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_blueprint() -> Blueprint {
        Blueprint::new(
            "Select {col}",
            "Show the {col} column of every row in {table}.",
            "SELECT {col} FROM {table}",
        )
        .with_hint("Start with SELECT {col}")
        .with_explanation("SELECT picks columns, FROM picks the table.")
        .with_replacement("col", ["nome", "email"])
        .with_replacement("table", ["utenti"])
    }

    #[test]
    fn test_valid_blueprint() {
        assert!(select_blueprint().validate().is_ok());
    }

    #[test]
    fn test_undeclared_placeholder() {
        let bp = select_blueprint().with_hint("Filter on {age}");
        let issues = bp.placeholder_issues();
        assert_eq!(issues.len(), 1);
        match &issues[0] {
            TemplateError::UndeclaredPlaceholder { field, key, .. } => {
                assert_eq!(field, "hints[1]");
                assert_eq!(key, "age");
            }
            other => panic!("unexpected issue: {other}"),
        }
    }

    #[test]
    fn test_unreferenced_replacement() {
        let bp = select_blueprint().with_replacement("limit", [5i64, 10]);
        let result = bp.validate();
        assert!(matches!(
            result,
            Err(TemplateError::UnreferencedReplacement { ref key, .. }) if key == "limit"
        ));
    }

    #[test]
    fn test_placeholder_in_broken_code_counts_as_reference() {
        let bp = Blueprint::new("Fix the query", "Find the bug.", "SELECT * FROM t")
            .with_replacement("table", ["ordini"])
            .with_broken_code("SELEC * FROM {table}", "Check the keyword spelling.");
        assert!(bp.validate().is_ok());
        assert!(bp.is_debugging());
    }

    #[test]
    fn test_empty_required_field() {
        let bp = Blueprint::new("Title", "  ", "SELECT 1");
        assert!(matches!(
            bp.validate(),
            Err(TemplateError::MissingRequiredField { ref field, .. }) if field == "desc_template"
        ));
    }

    #[test]
    fn test_debug_hint_without_broken_code() {
        let mut bp = Blueprint::new("Title", "Desc", "SELECT 1");
        bp.debug_hint = Some("look closer".to_string());
        assert!(matches!(
            bp.validate_structure(),
            Err(TemplateError::MissingRequiredField { ref field, .. }) if field == "broken_code"
        ));
    }

    #[test]
    fn test_yaml_roundtrip_keeps_optional_fields_out() {
        let bp = Blueprint::new("Count rows", "Count the rows.", "SELECT COUNT(*) FROM t");
        let yaml = serde_yaml::to_string(&bp).expect("serialization should succeed");
        assert!(!yaml.contains("broken_code"));
        assert!(!yaml.contains("replacements"));
        let parsed: Blueprint = serde_yaml::from_str(&yaml).expect("should parse");
        assert_eq!(parsed, bp);
    }

    #[test]
    fn test_combinations() {
        assert_eq!(select_blueprint().combinations(), 2);
    }
}
