//! sql-forge: SQL practice exercise generator.
//!
//! This library turns a static library of parameterized exercise blueprints
//! into sessions of distinct, fully resolved SQL exercises for a chosen topic
//! and difficulty.
//!
//! ```ignore
//! use sql_forge::{Difficulty, ExerciseGenerator, Topic};
//!
//! let generator = ExerciseGenerator::builtin()?;
//! for exercise in generator.generate(Topic::Filtering, Difficulty::Easy) {
//!     println!("{}: {}", exercise.title, exercise.solution_query);
//! }
//! ```

// Core modules
pub mod cli;
pub mod difficulty;
pub mod error;
pub mod generator;
pub mod template;
pub mod topics;

pub use difficulty::Difficulty;
pub use error::{GeneratorError, TemplateError};
pub use generator::{Exercise, ExerciseGenerator, ExerciseKind, GeneratorConfig};
pub use template::{Blueprint, BlueprintStore, PlaceholderPolicy, TemplateLoader};
pub use topics::Topic;
