//! Blueprint library for sql-forge.
//!
//! This module provides the infrastructure for defining, loading, and validating
//! the blueprint store: a read-only mapping from topic to difficulty to an
//! ordered list of [`Blueprint`]s. Libraries are YAML documents shaped like
//!
//! ```yaml
//! basics:
//!   easy:
//!     - title_template: "Select {col}"
//!       desc_template: "Show {col} from {table}."
//!       query_template: "SELECT {col} FROM {table}"
//!       replacements:
//!         col: [nome, email]
//!         table: [utenti]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sql_forge::template::TemplateLoader;
//!
//! let mut loader = TemplateLoader::new();
//! loader.load_directory("blueprints/")?;
//! let store = loader.finish()?;
//! ```

pub mod placeholder;
pub mod schema;
pub mod variables;

pub use schema::Blueprint;
pub use variables::{Assignment, ReplacementValue, Replacements};

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::difficulty::Difficulty;
use crate::error::TemplateError;
use crate::topics::Topic;

/// The library shipped with the crate.
pub(crate) const BUILTIN_LIBRARY: &str = include_str!("../../data/blueprints.yaml");

/// On-disk shape of a blueprint library.
pub type Library = BTreeMap<Topic, BTreeMap<Difficulty, Vec<Blueprint>>>;

/// How load-time validation treats placeholder/replacement mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceholderPolicy {
    /// Reject blueprints that reference undeclared keys or declare unused ones.
    #[default]
    Strict,
    /// Keep such blueprints and log each mismatch. Unresolved `{key}` text is
    /// emitted verbatim.
    PassThrough,
}

impl FromStr for PlaceholderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(PlaceholderPolicy::Strict),
            "pass-through" | "passthrough" | "lenient" => Ok(PlaceholderPolicy::PassThrough),
            other => Err(format!(
                "expected 'strict' or 'pass-through', got '{other}'"
            )),
        }
    }
}

/// Immutable store of blueprints keyed by topic and difficulty.
///
/// Built once through [`TemplateLoader`] and then only read. Share it between
/// generators with an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct BlueprintStore {
    sections: Library,
}

impl BlueprintStore {
    /// Loads and validates the built-in library.
    pub fn builtin() -> Result<Self, TemplateError> {
        let mut loader = TemplateLoader::new();
        loader.load_str(BUILTIN_LIBRARY, "builtin")?;
        loader.finish()
    }

    /// Returns the blueprints for one section, or an empty slice.
    pub fn blueprints(&self, topic: Topic, difficulty: Difficulty) -> &[Blueprint] {
        self.sections
            .get(&topic)
            .and_then(|levels| levels.get(&difficulty))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolves a section, walking the difficulty fallback chain.
    ///
    /// Returns the difficulty that was actually used together with its
    /// blueprints, or `None` when neither the requested level nor any of its
    /// fallbacks has content.
    pub fn resolve(&self, topic: Topic, difficulty: Difficulty) -> Option<(Difficulty, &[Blueprint])> {
        let mut level = Some(difficulty);
        while let Some(current) = level {
            let blueprints = self.blueprints(topic, current);
            if !blueprints.is_empty() {
                return Some((current, blueprints));
            }
            level = current.fallback();
        }
        None
    }

    /// Iterates over every non-empty section.
    pub fn sections(&self) -> impl Iterator<Item = (Topic, Difficulty, &[Blueprint])> {
        self.sections.iter().flat_map(|(topic, levels)| {
            levels
                .iter()
                .filter(|(_, blueprints)| !blueprints.is_empty())
                .map(move |(difficulty, blueprints)| (*topic, *difficulty, blueprints.as_slice()))
        })
    }

    /// Returns the topics that have at least one blueprint.
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.sections().map(|(topic, _, _)| topic).collect();
        topics.dedup();
        topics
    }

    /// Wraps sections without validating them.
    #[cfg(test)]
    pub(crate) fn unchecked(sections: Library) -> Self {
        Self { sections }
    }

    /// Total number of blueprints across all sections.
    pub fn len(&self) -> usize {
        self.sections().map(|(_, _, blueprints)| blueprints.len()).sum()
    }

    /// Returns true if the store holds no blueprints.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loader that collects blueprint sections and validates them into a store.
#[derive(Debug, Default)]
pub struct TemplateLoader {
    /// Sections collected so far.
    sections: Library,
    /// Origin of every section loaded from a document, for duplicate detection.
    origins: BTreeMap<(Topic, Difficulty), String>,
    /// Policy applied by [`TemplateLoader::finish`].
    policy: PlaceholderPolicy,
}

impl TemplateLoader {
    /// Creates an empty loader with the strict placeholder policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty loader with the given placeholder policy.
    pub fn with_policy(policy: PlaceholderPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Returns the placeholder policy.
    pub fn policy(&self) -> PlaceholderPolicy {
        self.policy
    }

    /// Parses a YAML library document and merges its sections.
    ///
    /// `origin` names the document in error messages. A section that was
    /// already loaded, from this or any other document, rejects the whole
    /// document and leaves the loader unchanged.
    pub fn load_str(&mut self, content: &str, origin: &str) -> Result<usize, TemplateError> {
        let library: Library =
            serde_yaml::from_str(content).map_err(|e| TemplateError::ParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        for (topic, levels) in &library {
            for difficulty in levels.keys() {
                if let Some(previous) = self.origins.get(&(*topic, *difficulty)) {
                    warn!(%topic, %difficulty, previous = %previous, origin, "Section already loaded");
                    return Err(TemplateError::DuplicateSection {
                        topic: topic.to_string(),
                        difficulty: difficulty.to_string(),
                    });
                }
            }
        }

        let mut count = 0;
        for (topic, levels) in library {
            for (difficulty, blueprints) in levels {
                self.origins.insert((topic, difficulty), origin.to_string());
                count += blueprints.len();
                self.section_mut(topic, difficulty).extend(blueprints);
            }
        }

        debug!(origin, blueprints = count, "Loaded blueprint library");
        Ok(count)
    }

    /// Loads a single YAML library file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, TemplateError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        self.load_str(&content, &path.display().to_string())
    }

    /// Loads every `.yaml`/`.yml` file in a directory (non-recursive), in
    /// file-name order.
    ///
    /// Returns the number of blueprints loaded.
    pub fn load_directory<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize, TemplateError> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.is_dir() {
                continue;
            }
            let is_yaml = path
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
            if is_yaml {
                paths.push(path);
            }
        }
        paths.sort();

        let mut count = 0;
        for path in &paths {
            count += self.load_file(path)?;
        }
        Ok(count)
    }

    /// Loads a file or every library file in a directory.
    pub fn load_path<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, TemplateError> {
        let path = path.as_ref();
        if path.is_dir() {
            self.load_directory(path)
        } else {
            self.load_file(path)
        }
    }

    /// Adds a single blueprint to a section.
    pub fn register(&mut self, topic: Topic, difficulty: Difficulty, blueprint: Blueprint) {
        self.section_mut(topic, difficulty).push(blueprint);
    }

    /// Number of blueprints collected so far.
    pub fn len(&self) -> usize {
        self.sections.values().flat_map(|levels| levels.values()).map(Vec::len).sum()
    }

    /// Returns true if nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates all collected blueprints.
    ///
    /// Returns a list of `(location, error)` pairs. Placeholder mismatches are
    /// only reported under [`PlaceholderPolicy::Strict`].
    pub fn validate_all(&self) -> Vec<(String, TemplateError)> {
        let mut errors = Vec::new();

        for (topic, levels) in &self.sections {
            for (difficulty, blueprints) in levels {
                let mut titles = HashSet::new();
                for (index, blueprint) in blueprints.iter().enumerate() {
                    let location = format!("{topic}/{difficulty}[{index}]");

                    if let Err(e) = blueprint.validate_structure() {
                        errors.push((location.clone(), e));
                    }
                    if !titles.insert(blueprint.title_template.as_str()) {
                        warn!(
                            location = %location,
                            title = %blueprint.title_template,
                            "Title template reused within a section; their exercises share a dedup namespace"
                        );
                    }

                    for issue in blueprint.placeholder_issues() {
                        match self.policy {
                            PlaceholderPolicy::Strict => errors.push((location.clone(), issue)),
                            PlaceholderPolicy::PassThrough => {
                                warn!(location = %location, "{}", issue);
                            }
                        }
                    }
                }
            }
        }

        errors
    }

    /// Validates everything and freezes it into a [`BlueprintStore`].
    pub fn finish(self) -> Result<BlueprintStore, TemplateError> {
        let errors = self.validate_all();
        if !errors.is_empty() {
            for (location, error) in &errors {
                warn!(location = %location, "Invalid blueprint: {}", error);
            }
            return Err(TemplateError::Invalid(
                errors.into_iter().map(|(_, e)| e).collect(),
            ));
        }

        Ok(BlueprintStore {
            sections: self.sections,
        })
    }

    fn section_mut(&mut self, topic: Topic, difficulty: Difficulty) -> &mut Vec<Blueprint> {
        self.sections
            .entry(topic)
            .or_default()
            .entry(difficulty)
            .or_default()
    }
}
