//! Generator configuration.
//!
//! This module provides the knobs of the exercise generator: how many
//! exercises a call aims for, how many attempts it may spend, an optional
//! seed for reproducible output, and the placeholder policy used when loading
//! blueprint libraries.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::template::{PlaceholderPolicy, TemplateLoader};

/// Number of exercises a call aims to return.
pub const DEFAULT_TARGET_COUNT: usize = 30;

/// Attempts allowed per requested exercise.
pub const DEFAULT_RETRY_FACTOR: usize = 10;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration for [`crate::generator::ExerciseGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of distinct exercises to aim for.
    pub target_count: usize,
    /// Retry budget multiplier: a call may make `target_count * retry_factor` attempts.
    pub retry_factor: usize,
    /// Seed for reproducible output. `None` draws a fresh seed per call.
    pub seed: Option<u64>,
    /// Placeholder policy for libraries loaded through [`GeneratorConfig::loader`].
    pub placeholder_policy: PlaceholderPolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            retry_factor: DEFAULT_RETRY_FACTOR,
            seed: None,
            placeholder_policy: PlaceholderPolicy::Strict,
        }
    }
}

impl GeneratorConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SQL_FORGE_TARGET_COUNT`: Exercises per call (default: 30)
    /// - `SQL_FORGE_RETRY_FACTOR`: Attempts per requested exercise (default: 10)
    /// - `SQL_FORGE_SEED`: Fixed RNG seed (default: unset, random per call)
    /// - `SQL_FORGE_PLACEHOLDER_POLICY`: `strict` or `pass-through` (default: strict)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SQL_FORGE_TARGET_COUNT") {
            config.target_count = parse_env_value(&val, "SQL_FORGE_TARGET_COUNT")?;
        }

        if let Ok(val) = std::env::var("SQL_FORGE_RETRY_FACTOR") {
            config.retry_factor = parse_env_value(&val, "SQL_FORGE_RETRY_FACTOR")?;
        }

        if let Ok(val) = std::env::var("SQL_FORGE_SEED") {
            config.seed = Some(parse_env_value(&val, "SQL_FORGE_SEED")?);
        }

        if let Ok(val) = std::env::var("SQL_FORGE_PLACEHOLDER_POLICY") {
            config.placeholder_policy =
                val.parse().map_err(|message| ConfigError::InvalidValue {
                    key: "SQL_FORGE_PLACEHOLDER_POLICY".to_string(),
                    message,
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_count == 0 {
            return Err(ConfigError::ValidationFailed(
                "target_count must be greater than 0".to_string(),
            ));
        }

        if self.retry_factor == 0 {
            return Err(ConfigError::ValidationFailed(
                "retry_factor must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the retry budget for one call.
    pub fn retry_budget(&self) -> usize {
        self.target_count.saturating_mul(self.retry_factor)
    }

    /// Builder method to set the target count.
    pub fn with_target_count(mut self, count: usize) -> Self {
        self.target_count = count;
        self
    }

    /// Builder method to set the retry factor.
    pub fn with_retry_factor(mut self, factor: usize) -> Self {
        self.retry_factor = factor;
        self
    }

    /// Builder method to fix the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method to set the placeholder policy.
    pub fn with_placeholder_policy(mut self, policy: PlaceholderPolicy) -> Self {
        self.placeholder_policy = policy;
        self
    }

    /// Creates a library loader using this configuration's placeholder policy.
    pub fn loader(&self) -> TemplateLoader {
        TemplateLoader::with_policy(self.placeholder_policy)
    }

    /// Creates the random number generator for one call.
    pub(crate) fn create_rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

/// Parse an environment variable value into the target type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.target_count, 30);
        assert_eq!(config.retry_factor, 10);
        assert_eq!(config.retry_budget(), 300);
        assert_eq!(config.seed, None);
        assert_eq!(config.placeholder_policy, PlaceholderPolicy::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = GeneratorConfig::new()
            .with_target_count(12)
            .with_retry_factor(3)
            .with_seed(99)
            .with_placeholder_policy(PlaceholderPolicy::PassThrough);

        assert_eq!(config.target_count, 12);
        assert_eq!(config.retry_budget(), 36);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.loader().policy(), PlaceholderPolicy::PassThrough);
    }

    #[test]
    fn test_validate_rejects_zero() {
        let zero_target = GeneratorConfig::new().with_target_count(0);
        assert!(matches!(
            zero_target.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));

        let zero_factor = GeneratorConfig::new().with_retry_factor(0);
        assert!(zero_factor.validate().is_err());
    }

    #[test]
    fn test_parse_env_value() {
        let n: usize = parse_env_value(" 42 ", "KEY").expect("should parse");
        assert_eq!(n, 42);
        let bad: Result<usize, _> = parse_env_value("many", "KEY");
        assert!(matches!(bad, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        use rand::RngExt;

        let config = GeneratorConfig::new().with_seed(5);
        let a: u64 = config.create_rng().random();
        let b: u64 = config.create_rng().random();
        assert_eq!(a, b);
    }
}
