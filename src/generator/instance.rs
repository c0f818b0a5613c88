//! Exercise instantiation from blueprints.
//!
//! This module turns one [`Blueprint`] plus one replacement [`Assignment`] into
//! a fully resolved [`Exercise`]. Instantiation is pure: the same inputs always
//! yield the same exercise.

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::template::placeholder::substitute;
use crate::template::{Assignment, Blueprint};
use crate::topics::Topic;

/// What a generated exercise is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseKind {
    /// Write a query from a description.
    Practice,
    /// Find and fix the bug in `broken_code`.
    Debugging,
    /// Placeholder returned when the topic has no blueprints.
    NoContent,
    /// Placeholder returned when generation failed.
    Error,
}

impl ExerciseKind {
    /// Returns true for the placeholder kinds that carry no real content.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, ExerciseKind::NoContent | ExerciseKind::Error)
    }
}

/// A fully resolved, ready-to-present practice item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// Identifier unique within a call and, in practice, across calls.
    pub id: String,
    pub topic: Topic,
    pub difficulty: Difficulty,
    pub kind: ExerciseKind,
    pub title: String,
    pub description: String,
    pub solution_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broken_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_hint: Option<String>,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

impl Exercise {
    /// The placeholder returned when no blueprints exist for a topic.
    pub fn no_content(topic: Topic, difficulty: Difficulty) -> Self {
        Self {
            id: format!("{topic}-{difficulty}-empty"),
            topic,
            difficulty,
            kind: ExerciseKind::NoContent,
            title: "No exercises available".to_string(),
            description: format!(
                "There are no exercises for {} yet. Try another topic.",
                topic.display_name()
            ),
            solution_query: "-- no exercises available".to_string(),
            broken_code: None,
            debug_hint: None,
            hints: vec![format!("This topic covers {}.", topic.keywords().join(", "))],
            explanation: String::new(),
        }
    }

    /// The placeholder returned when generation failed.
    pub fn error(topic: Topic, difficulty: Difficulty, message: impl Into<String>) -> Self {
        Self {
            id: format!("{topic}-{difficulty}-error"),
            topic,
            difficulty,
            kind: ExerciseKind::Error,
            title: "Exercises could not be generated".to_string(),
            description: "Something went wrong while preparing this session. Please try again."
                .to_string(),
            solution_query: "-- generation failed".to_string(),
            broken_code: None,
            debug_hint: None,
            hints: Vec::new(),
            explanation: message.into(),
        }
    }

    /// Returns true if this is a placeholder rather than a real exercise.
    pub fn is_sentinel(&self) -> bool {
        self.kind.is_sentinel()
    }
}

/// Resolves blueprints into exercises for one topic and difficulty.
#[derive(Debug, Clone, Copy)]
pub struct TemplateInstantiator {
    topic: Topic,
    difficulty: Difficulty,
}

impl TemplateInstantiator {
    /// Creates an instantiator labelling exercises with `topic` and `difficulty`.
    pub fn new(topic: Topic, difficulty: Difficulty) -> Self {
        Self { topic, difficulty }
    }

    /// Substitutes `assignment` into every templated field of `blueprint`.
    ///
    /// Every `{key}` with a value in `assignment` is replaced in title,
    /// description, query, hints, broken code and debug hint. The explanation
    /// is copied verbatim. Placeholders without a value stay as written.
    pub fn instantiate(&self, id: String, blueprint: &Blueprint, assignment: &Assignment) -> Exercise {
        let resolve = |text: &str| substitute(text, assignment).into_owned();

        Exercise {
            id,
            topic: self.topic,
            difficulty: self.difficulty,
            kind: if blueprint.is_debugging() {
                ExerciseKind::Debugging
            } else {
                ExerciseKind::Practice
            },
            title: resolve(&blueprint.title_template),
            description: resolve(&blueprint.desc_template),
            solution_query: resolve(&blueprint.query_template),
            broken_code: blueprint.broken_code.as_deref().map(resolve),
            debug_hint: blueprint.debug_hint.as_deref().map(resolve),
            hints: blueprint.hints.iter().map(|hint| resolve(hint)).collect(),
            explanation: blueprint.explanation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ReplacementValue;

    fn assignment(pairs: &[(&str, &str)]) -> Assignment {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ReplacementValue::text(*v)))
            .collect()
    }

    #[test]
    fn test_substitutes_every_field() {
        let bp = Blueprint::new(
            "Select {col} from {table}",
            "Show {col} for each row of {table}.",
            "SELECT {col} FROM {table}",
        )
        .with_hint("The table is {table}")
        .with_hint("Only one column: {col}")
        .with_explanation("Use {braces} literally here")
        .with_replacement("col", ["nome"])
        .with_replacement("table", ["utenti"]);

        let a = assignment(&[("col", "nome"), ("table", "utenti")]);
        let exercise = TemplateInstantiator::new(Topic::Basics, Difficulty::Easy)
            .instantiate("id-1".to_string(), &bp, &a);

        assert_eq!(exercise.id, "id-1");
        assert_eq!(exercise.kind, ExerciseKind::Practice);
        assert_eq!(exercise.title, "Select nome from utenti");
        assert_eq!(exercise.description, "Show nome for each row of utenti.");
        assert_eq!(exercise.solution_query, "SELECT nome FROM utenti");
        assert_eq!(exercise.hints, vec!["The table is utenti", "Only one column: nome"]);
        assert_eq!(exercise.explanation, "Use {braces} literally here");
        assert!(exercise.broken_code.is_none());
    }

    #[test]
    fn test_debugging_variant() {
        let bp = Blueprint::new("Fix {table}", "Fix the query on {table}.", "SELECT * FROM {table}")
            .with_replacement("table", ["ordini"])
            .with_broken_code("SELECT * FORM {table}", "Look at the word after *: is {table} reachable?");

        let a = assignment(&[("table", "ordini")]);
        let exercise = TemplateInstantiator::new(Topic::Basics, Difficulty::Medium)
            .instantiate("id-2".to_string(), &bp, &a);

        assert_eq!(exercise.kind, ExerciseKind::Debugging);
        assert_eq!(exercise.broken_code.as_deref(), Some("SELECT * FORM ordini"));
        assert_eq!(
            exercise.debug_hint.as_deref(),
            Some("Look at the word after *: is ordini reachable?")
        );
        assert_eq!(exercise.difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_undeclared_placeholder_passes_through() {
        let bp = Blueprint::new("Filter", "Older than {age}", "SELECT * FROM t WHERE eta > {age}");
        let exercise = TemplateInstantiator::new(Topic::Filtering, Difficulty::Easy)
            .instantiate("id-3".to_string(), &bp, &Assignment::new());
        assert_eq!(exercise.solution_query, "SELECT * FROM t WHERE eta > {age}");
    }

    #[test]
    fn test_sentinels() {
        let empty = Exercise::no_content(Topic::Joins, Difficulty::Hard);
        assert!(empty.is_sentinel());
        assert_eq!(empty.kind, ExerciseKind::NoContent);
        assert!(!empty.title.is_empty());
        assert!(empty.hints[0].contains("LEFT JOIN"));

        let failed = Exercise::error(Topic::Joins, Difficulty::Hard, "boom");
        assert!(failed.is_sentinel());
        assert_eq!(failed.explanation, "boom");
    }

    #[test]
    fn test_json_uses_camel_case() {
        let exercise = Exercise::no_content(Topic::Basics, Difficulty::Easy);
        let json = serde_json::to_value(&exercise).expect("serialization should succeed");
        assert_eq!(json["solutionQuery"], "-- no exercises available");
        assert_eq!(json["kind"], "no-content");
        assert_eq!(json["topic"], "basics");
        assert!(json.get("brokenCode").is_none());
    }
}
