//! Difficulty levels for practice exercises.
//!
//! Difficulty is the second key of the blueprint store. Every topic is
//! expected to carry at least an `Easy` section, which doubles as the
//! fallback when a harder section is missing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// The difficulty level of a practice exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Returns all difficulty levels, easiest first.
    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    /// Returns the lowercase name used in blueprint files and exercise ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Returns the level to try when this one has no blueprints.
    ///
    /// The chain is one step deep: anything other than `Easy` falls back to
    /// `Easy`, and `Easy` has nowhere left to go.
    pub fn fallback(&self) -> Option<Difficulty> {
        match self {
            Difficulty::Easy => None,
            Difficulty::Medium | Difficulty::Hard => Some(Difficulty::Easy),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(TemplateError::InvalidDifficultyLevel(other.to_string())),
        }
    }
}
