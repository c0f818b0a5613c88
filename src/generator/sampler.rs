//! Replacement sampling for blueprint instantiation.
//!
//! Draws one candidate per declared placeholder key, uniformly at random.
//! Keys are visited in sorted order so a seeded RNG always yields the same
//! assignment for the same blueprint.

use crate::error::GeneratorError;
use crate::generator::Result;
use crate::template::{Assignment, Blueprint};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Uniform sampler of replacement assignments.
///
/// The sampler borrows the caller's RNG for the duration of one generation
/// call; it holds no state of its own across calls.
pub struct ReplacementSampler<'r> {
    rng: &'r mut ChaCha8Rng,
}

impl<'r> ReplacementSampler<'r> {
    /// Creates a sampler drawing from `rng`.
    pub fn new(rng: &'r mut ChaCha8Rng) -> Self {
        Self { rng }
    }

    /// Draws one value for every key declared by `blueprint`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::EmptyCandidates`] if a key has no candidates.
    /// Validated libraries never contain such keys.
    pub fn sample(&mut self, blueprint: &Blueprint) -> Result<Assignment> {
        let mut assignment = Assignment::new();
        for (key, candidates) in &blueprint.replacements {
            let value = candidates
                .choose(&mut *self.rng)
                .ok_or_else(|| GeneratorError::EmptyCandidates {
                    blueprint: blueprint.title_template.clone(),
                    key: key.clone(),
                })?;
            assignment.insert(key.clone(), value.clone());
        }
        Ok(assignment)
    }
}
