//! Bounded sampling of distinct exercises from a blueprint pool.
//!
//! [`SamplingRun`] is an explicit state machine over two counters: emitted
//! exercises (towards the target) and attempts (towards the retry budget).
//! Every call to [`SamplingRun::step`] consumes one attempt, so a run can
//! never take more than `budget` steps before it finishes.
//!
//! Blueprint selection walks the shuffled pool once in order, which spreads
//! the first exercises over as many templates as possible, then falls back to
//! uniform picks so small pools can be reused with fresh substitutions.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::difficulty::Difficulty;
use crate::error::GeneratorError;
use crate::generator::dedup::{DedupKey, DedupSet};
use crate::generator::instance::{Exercise, TemplateInstantiator};
use crate::generator::sampler::ReplacementSampler;
use crate::generator::Result;
use crate::template::Blueprint;
use crate::topics::Topic;

/// Why a sampling run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    /// The target number of distinct exercises was collected.
    TargetReached,
    /// The retry budget ran out first.
    BudgetExhausted,
}

/// Result of a single [`SamplingRun::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A new exercise was added.
    Emitted,
    /// The attempt repeated an earlier (blueprint, assignment) pair and was discarded.
    Duplicate,
    /// The run is over; no attempt was consumed.
    Finished(FinishReason),
}

/// Summary of a finished sampling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingReport {
    pub topic: Topic,
    pub requested_difficulty: Difficulty,
    /// Difficulty whose blueprints were used after applying the fallback chain.
    pub resolved_difficulty: Difficulty,
    pub pool_size: usize,
    pub target: usize,
    pub budget: usize,
    pub produced: usize,
    pub attempts: usize,
    pub duplicates: usize,
    pub finish: FinishReason,
}

impl SamplingReport {
    /// Returns true if the requested difficulty had to fall back.
    pub fn fell_back(&self) -> bool {
        self.requested_difficulty != self.resolved_difficulty
    }
}

/// One call's worth of sampling state.
pub struct SamplingRun<'a> {
    topic: Topic,
    requested: Difficulty,
    resolved: Difficulty,
    /// Pool in presentation order after the initial shuffle.
    blueprints: Vec<&'a Blueprint>,
    instantiator: TemplateInstantiator,
    rng: ChaCha8Rng,
    target: usize,
    budget: usize,
    attempts: usize,
    duplicates: usize,
    seen: DedupSet,
    exercises: Vec<Exercise>,
    /// Hex timestamp shared by every id of this run.
    stamp: String,
}

impl<'a> SamplingRun<'a> {
    /// Starts a run over `blueprints`, shuffling them once.
    ///
    /// Exercises are labelled with `requested`; `resolved` names the
    /// difficulty the pool actually came from. The retry budget is
    /// `target * retry_factor` attempts.
    pub fn new(
        topic: Topic,
        requested: Difficulty,
        resolved: Difficulty,
        blueprints: &'a [Blueprint],
        target: usize,
        retry_factor: usize,
        mut rng: ChaCha8Rng,
    ) -> Self {
        let mut pool: Vec<&'a Blueprint> = blueprints.iter().collect();
        pool.shuffle(&mut rng);

        Self {
            topic,
            requested,
            resolved,
            blueprints: pool,
            instantiator: TemplateInstantiator::new(topic, requested),
            rng,
            target,
            budget: target.saturating_mul(retry_factor),
            attempts: 0,
            duplicates: 0,
            seen: DedupSet::new(),
            exercises: Vec::with_capacity(target),
            stamp: format!("{:x}", chrono::Utc::now().timestamp_millis()),
        }
    }

    /// Returns the finish reason once the run is over.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        if self.exercises.len() >= self.target {
            Some(FinishReason::TargetReached)
        } else if self.attempts >= self.budget {
            Some(FinishReason::BudgetExhausted)
        } else {
            None
        }
    }

    /// Performs one generation attempt.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if let Some(reason) = self.finish_reason() {
            return Ok(StepOutcome::Finished(reason));
        }

        let iteration = self.attempts;
        self.attempts += 1;

        let blueprint = self.pick(iteration)?;
        let assignment = ReplacementSampler::new(&mut self.rng).sample(blueprint)?;
        let key = DedupKey::new(blueprint, &assignment)?;

        if !self.seen.insert(key) {
            self.duplicates += 1;
            return Ok(StepOutcome::Duplicate);
        }

        let id = self.next_id();
        let exercise = self.instantiator.instantiate(id, blueprint, &assignment);
        self.exercises.push(exercise);
        Ok(StepOutcome::Emitted)
    }

    /// Steps until the run finishes, then shuffles the collected exercises.
    pub fn run(mut self) -> Result<(Vec<Exercise>, SamplingReport)> {
        let finish = loop {
            if let StepOutcome::Finished(reason) = self.step()? {
                break reason;
            }
        };

        let report = SamplingReport {
            topic: self.topic,
            requested_difficulty: self.requested,
            resolved_difficulty: self.resolved,
            pool_size: self.blueprints.len(),
            target: self.target,
            budget: self.budget,
            produced: self.exercises.len(),
            attempts: self.attempts,
            duplicates: self.duplicates,
            finish,
        };

        let mut exercises = self.exercises;
        exercises.shuffle(&mut self.rng);
        Ok((exercises, report))
    }

    /// Number of attempts consumed so far.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Exercises collected so far, in emission order.
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    fn pick(&mut self, iteration: usize) -> Result<&'a Blueprint> {
        let len = self.blueprints.len();
        if len == 0 {
            return Err(GeneratorError::BlueprintOutOfRange { index: 0, len });
        }

        let index = if iteration < self.target.min(len) {
            iteration
        } else {
            self.rng.random_range(0..len)
        };

        self.blueprints
            .get(index)
            .copied()
            .ok_or(GeneratorError::BlueprintOutOfRange { index, len })
    }

    fn next_id(&mut self) -> String {
        let nonce: u32 = self.rng.random_range(0..0x0100_0000);
        format!(
            "{}-{}-{}-{}{:06x}",
            self.topic,
            self.requested,
            self.exercises.len(),
            self.stamp,
            nonce
        )
    }
}
