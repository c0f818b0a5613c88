//! Error types for sql-forge operations.
//!
//! Defines error types for the major subsystems:
//! - Blueprint library loading and validation
//! - Exercise sampling and instantiation

use thiserror::Error;

use crate::generator::config::ConfigError;

/// Errors that can occur while loading or validating blueprint libraries.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Unknown topic '{0}'")]
    UnknownTopic(String),

    #[error("Invalid difficulty level '{0}': must be 'easy', 'medium', or 'hard'")]
    InvalidDifficultyLevel(String),

    #[error("Failed to parse blueprint library '{path}': {message}")]
    ParseError { path: String, message: String },

    #[error("Blueprint '{blueprint}' is missing required field '{field}'")]
    MissingRequiredField { blueprint: String, field: String },

    #[error("Empty candidate list for replacement '{key}' in blueprint '{blueprint}'")]
    EmptyCandidates { blueprint: String, key: String },

    #[error("Blank candidate at position {index} of replacement '{key}' in blueprint '{blueprint}'")]
    BlankCandidate {
        blueprint: String,
        key: String,
        index: usize,
    },

    #[error("Invalid replacement key '{key}' in blueprint '{blueprint}': keys must be identifiers")]
    InvalidReplacementKey { blueprint: String, key: String },

    #[error("Blueprint '{blueprint}' references placeholder '{{{key}}}' in {field} but does not declare it")]
    UndeclaredPlaceholder {
        blueprint: String,
        field: String,
        key: String,
    },

    #[error("Blueprint '{blueprint}' declares replacement '{key}' that no template references")]
    UnreferencedReplacement { blueprint: String, key: String },

    #[error("Section {topic}/{difficulty} is defined in more than one library file")]
    DuplicateSection { topic: String, difficulty: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Library validation failed with {} error(s)", .0.len())]
    Invalid(Vec<TemplateError>),
}

/// Errors that can occur while generating exercises.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Blueprint '{blueprint}' has no candidates for replacement '{key}'")]
    EmptyCandidates { blueprint: String, key: String },

    #[error("Blueprint index {index} out of range for a pool of {len}")]
    BlueprintOutOfRange { index: usize, len: usize },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
