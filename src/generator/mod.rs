//! Exercise generation pipeline for sql-forge.
//!
//! This module implements the path from blueprint store to practice session:
//!
//! 1. **Resolution** - Look up blueprints for (topic, difficulty), falling back to Easy
//! 2. **Replacement Sampling** - Draw one candidate per placeholder key
//! 3. **Instantiation** - Substitute the draw into every templated field
//! 4. **Sampling Control** - Repeat with deduplication until the target count or
//!    the retry budget is reached, then shuffle
//!
//! # Example
//!
//! ```ignore
//! use sql_forge::generator::ExerciseGenerator;
//! use sql_forge::{Difficulty, Topic};
//!
//! let generator = ExerciseGenerator::builtin()?;
//! let exercises = generator.generate(Topic::Joins, Difficulty::Medium);
//! assert!(!exercises.is_empty());
//! ```

pub mod config;
pub mod controller;
pub mod dedup;
pub mod instance;
pub mod sampler;

pub use config::{ConfigError, GeneratorConfig, DEFAULT_RETRY_FACTOR, DEFAULT_TARGET_COUNT};
pub use controller::{FinishReason, SamplingReport, SamplingRun, StepOutcome};
pub use dedup::{DedupKey, DedupSet};
pub use instance::{Exercise, ExerciseKind, TemplateInstantiator};
pub use sampler::ReplacementSampler;

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::difficulty::Difficulty;
use crate::error::{GeneratorError, TemplateError};
use crate::template::BlueprintStore;
use crate::topics::Topic;

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// How a generation call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Blueprints were sampled; the report describes the run.
    Sampled(SamplingReport),
    /// Neither the requested difficulty nor its fallback had blueprints.
    NoContent,
    /// Generation failed and a single error placeholder was returned.
    Failed(String),
}

/// Exercises returned by one call, with how they were obtained.
#[derive(Debug, Clone)]
pub struct Generation {
    pub exercises: Vec<Exercise>,
    pub outcome: GenerationOutcome,
}

impl Generation {
    /// Returns the sampling report, if blueprints were sampled.
    pub fn report(&self) -> Option<&SamplingReport> {
        match &self.outcome {
            GenerationOutcome::Sampled(report) => Some(report),
            _ => None,
        }
    }
}

/// Generator of practice sessions over an immutable blueprint store.
///
/// Every call owns its RNG and accumulator, so one generator can serve many
/// threads through a shared reference.
#[derive(Debug, Clone)]
pub struct ExerciseGenerator {
    store: Arc<BlueprintStore>,
    config: GeneratorConfig,
}

impl ExerciseGenerator {
    /// Creates a generator with default configuration.
    pub fn new(store: Arc<BlueprintStore>) -> Self {
        Self::with_config(store, GeneratorConfig::default())
    }

    /// Creates a generator with the given configuration.
    pub fn with_config(store: Arc<BlueprintStore>, config: GeneratorConfig) -> Self {
        Self { store, config }
    }

    /// Creates a generator over the built-in library.
    pub fn builtin() -> std::result::Result<Self, TemplateError> {
        Ok(Self::new(Arc::new(BlueprintStore::builtin()?)))
    }

    /// Returns the blueprint store.
    pub fn store(&self) -> &BlueprintStore {
        &self.store
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Produces a practice session for `topic` at `difficulty`.
    ///
    /// Never returns an empty list: when no content exists or generation
    /// fails, the list holds a single placeholder exercise instead.
    pub fn generate(&self, topic: Topic, difficulty: Difficulty) -> Vec<Exercise> {
        self.generate_with_report(topic, difficulty).exercises
    }

    /// Like [`ExerciseGenerator::generate`], also returning how the call went.
    pub fn generate_with_report(&self, topic: Topic, difficulty: Difficulty) -> Generation {
        match self.try_generate(topic, difficulty) {
            Ok(generation) => generation,
            Err(e) => {
                error!(%topic, %difficulty, error = %e, "Exercise generation failed");
                Generation {
                    exercises: vec![Exercise::error(topic, difficulty, e.to_string())],
                    outcome: GenerationOutcome::Failed(e.to_string()),
                }
            }
        }
    }

    /// Fallible core of [`ExerciseGenerator::generate`].
    ///
    /// Missing content and a short result are not errors here; an invalid
    /// configuration and faults while sampling or instantiating are.
    pub fn try_generate(&self, topic: Topic, difficulty: Difficulty) -> Result<Generation> {
        self.config.validate()?;

        let Some((resolved, blueprints)) = self.store.resolve(topic, difficulty) else {
            warn!(%topic, %difficulty, "No blueprints for topic, returning placeholder");
            return Ok(Generation {
                exercises: vec![Exercise::no_content(topic, difficulty)],
                outcome: GenerationOutcome::NoContent,
            });
        };

        if resolved != difficulty {
            warn!(
                %topic,
                requested = %difficulty,
                resolved = %resolved,
                "No blueprints at requested difficulty, falling back"
            );
        }

        let run = SamplingRun::new(
            topic,
            difficulty,
            resolved,
            blueprints,
            self.config.target_count,
            self.config.retry_factor,
            self.config.create_rng(),
        );
        let (exercises, report) = run.run()?;

        match report.finish {
            FinishReason::TargetReached => debug!(
                %topic,
                %difficulty,
                produced = report.produced,
                attempts = report.attempts,
                "Generated exercises"
            ),
            FinishReason::BudgetExhausted => warn!(
                %topic,
                %difficulty,
                produced = report.produced,
                target = report.target,
                attempts = report.attempts,
                pool = report.pool_size,
                "Retry budget exhausted before reaching target"
            ),
        }

        Ok(Generation {
            exercises,
            outcome: GenerationOutcome::Sampled(report),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Blueprint, PlaceholderPolicy, TemplateLoader};

    fn store_with(blueprints: Vec<(Topic, Difficulty, Blueprint)>) -> Arc<BlueprintStore> {
        let mut loader = TemplateLoader::with_policy(PlaceholderPolicy::PassThrough);
        for (topic, difficulty, blueprint) in blueprints {
            loader.register(topic, difficulty, blueprint);
        }
        Arc::new(loader.finish().expect("test store should validate"))
    }

    fn varied(title: &str) -> Blueprint {
        Blueprint::new(title, "Show {col} of {table}", "SELECT {col} FROM {table}")
            .with_replacement("col", ["nome", "email", "citta", "eta"])
            .with_replacement("table", ["utenti", "clienti", "fornitori"])
    }

    #[test]
    fn test_generate_full_session() {
        let store = store_with(vec![
            (Topic::Basics, Difficulty::Easy, varied("A {col}")),
            (Topic::Basics, Difficulty::Easy, varied("B {col}")),
            (Topic::Basics, Difficulty::Easy, varied("C {col}")),
        ]);
        let generator = ExerciseGenerator::new(store);
        let generation = generator.generate_with_report(Topic::Basics, Difficulty::Easy);

        assert_eq!(generation.exercises.len(), DEFAULT_TARGET_COUNT);
        let report = generation.report().expect("should have sampled");
        assert_eq!(report.finish, FinishReason::TargetReached);
        assert!(!report.fell_back());
    }

    #[test]
    fn test_no_content_placeholder() {
        let store = store_with(vec![(Topic::Basics, Difficulty::Easy, varied("A {col}"))]);
        let generator = ExerciseGenerator::new(store);
        let generation = generator.generate_with_report(Topic::Joins, Difficulty::Hard);

        assert_eq!(generation.exercises.len(), 1);
        assert_eq!(generation.exercises[0].kind, ExerciseKind::NoContent);
        assert_eq!(generation.outcome, GenerationOutcome::NoContent);
    }

    #[test]
    fn test_fallback_to_easy() {
        let store = store_with(vec![(Topic::Sorting, Difficulty::Easy, varied("A {col}"))]);
        let generator = ExerciseGenerator::new(store);
        let generation = generator.generate_with_report(Topic::Sorting, Difficulty::Hard);

        let report = generation.report().expect("should have sampled");
        assert_eq!(report.resolved_difficulty, Difficulty::Easy);
        assert_eq!(generation.exercises.len(), 12);
    }

    #[test]
    fn test_runtime_error_becomes_error_placeholder() {
        let mut broken = varied("Broken {col}");
        broken.replacements.insert("col".to_string(), Vec::new());

        // Skips validation, which would reject the empty candidate list.
        let mut sections = crate::template::Library::new();
        sections
            .entry(Topic::Basics)
            .or_default()
            .insert(Difficulty::Easy, vec![broken]);
        let store = Arc::new(BlueprintStore::unchecked(sections));

        let generator = ExerciseGenerator::new(store);
        let generation = generator.generate_with_report(Topic::Basics, Difficulty::Easy);

        assert_eq!(generation.exercises.len(), 1);
        assert_eq!(generation.exercises[0].kind, ExerciseKind::Error);
        assert!(matches!(generation.outcome, GenerationOutcome::Failed(_)));
        assert!(generator.try_generate(Topic::Basics, Difficulty::Easy).is_err());
    }

    #[test]
    fn test_invalid_config_yields_error_placeholder() {
        let store = store_with(vec![(Topic::Basics, Difficulty::Easy, varied("A {col}"))]);

        for config in [
            GeneratorConfig::new().with_target_count(0),
            GeneratorConfig::new().with_retry_factor(0),
        ] {
            let generator = ExerciseGenerator::with_config(Arc::clone(&store), config);
            assert!(matches!(
                generator.try_generate(Topic::Basics, Difficulty::Easy),
                Err(GeneratorError::Config(_))
            ));

            let exercises = generator.generate(Topic::Basics, Difficulty::Easy);
            assert_eq!(exercises.len(), 1);
            assert_eq!(exercises[0].kind, ExerciseKind::Error);
        }
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let store = store_with(vec![
            (Topic::Basics, Difficulty::Easy, varied("A {col}")),
            (Topic::Basics, Difficulty::Easy, varied("B {col}")),
        ]);
        let config = GeneratorConfig::new().with_seed(2024);
        let generator = ExerciseGenerator::with_config(store, config);

        let queries = |exercises: Vec<Exercise>| {
            exercises
                .into_iter()
                .map(|e| (e.title, e.solution_query))
                .collect::<Vec<_>>()
        };
        let first = queries(generator.generate(Topic::Basics, Difficulty::Easy));
        let second = queries(generator.generate(Topic::Basics, Difficulty::Easy));
        assert_eq!(first, second);
    }

    #[test]
    fn test_generator_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExerciseGenerator>();
    }
}
