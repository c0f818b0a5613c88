//! CLI command definitions for sql-forge.
//!
//! The binary is a developer tool around the library: it generates practice
//! sessions, validates blueprint libraries, and summarises their coverage.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::difficulty::Difficulty;
use crate::generator::{ExerciseGenerator, Generation, GenerationOutcome, GeneratorConfig};
use crate::template::{BlueprintStore, PlaceholderPolicy};
use crate::topics::Topic;

/// SQL practice exercise generator.
#[derive(Parser)]
#[command(name = "sql-forge")]
#[command(about = "Generate SQL practice exercises from blueprint libraries")]
#[command(version)]
#[command(
    long_about = "sql-forge turns parameterized SQL blueprints into sessions of distinct, ready-to-present exercises.\n\nWithout --library the built-in library is used.\n\nExample usage:\n  sql-forge generate --topic joins --difficulty medium --count 10"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate a practice session for one topic and difficulty.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Load a blueprint library and report every validation error.
    Validate(LibraryArgs),

    /// Show how many blueprints and combinations each section holds.
    Stats(LibraryArgs),
}

/// Arguments shared by commands that read a library.
#[derive(Parser, Debug)]
pub struct LibraryArgs {
    /// YAML library file or directory of library files. Defaults to the built-in library.
    #[arg(long)]
    pub library: Option<String>,

    /// Placeholder policy: strict or pass-through. Overrides SQL_FORGE_PLACEHOLDER_POLICY.
    #[arg(long)]
    pub policy: Option<PlaceholderPolicy>,

    /// Output as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `sql-forge generate`.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Topic to practise (e.g. basics, filtering, joins).
    #[arg(short = 't', long)]
    pub topic: Topic,

    /// Difficulty level (easy, medium, hard).
    #[arg(short = 'd', long, default_value = "easy")]
    pub difficulty: Difficulty,

    /// Number of exercises to aim for. Overrides SQL_FORGE_TARGET_COUNT.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Attempts allowed per requested exercise. Overrides SQL_FORGE_RETRY_FACTOR.
    #[arg(long)]
    pub retry_factor: Option<usize>,

    /// Fixed RNG seed for reproducible sessions. Overrides SQL_FORGE_SEED.
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub library: LibraryArgs,
}

impl LibraryArgs {
    /// Environment configuration with the command-line policy applied.
    fn config(&self) -> anyhow::Result<GeneratorConfig> {
        let mut config = GeneratorConfig::from_env()?;
        if let Some(policy) = self.policy {
            config = config.with_placeholder_policy(policy);
        }
        Ok(config)
    }
}

impl GenerateArgs {
    fn config(&self) -> anyhow::Result<GeneratorConfig> {
        let mut config = self.library.config()?;
        if let Some(count) = self.count {
            config = config.with_target_count(count);
        }
        if let Some(factor) = self.retry_factor {
            config = config.with_retry_factor(factor);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config.validate()?;
        Ok(config)
    }
}

/// One line of `sql-forge stats` output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SectionStats {
    topic: Topic,
    difficulty: Difficulty,
    blueprints: usize,
    debugging: usize,
    combinations: u64,
}

/// Parse CLI arguments without running any command.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli())
}

/// Run the CLI with the parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => run_generate_command(args),
        Commands::Validate(args) => run_validate_command(args),
        Commands::Stats(args) => run_stats_command(args),
    }
}

/// Loads the library named by `args`, or the built-in one.
fn load_store(args: &LibraryArgs, config: &GeneratorConfig) -> anyhow::Result<BlueprintStore> {
    let store = match &args.library {
        Some(path) => {
            let mut loader = config.loader();
            let count = loader.load_path(Path::new(path))?;
            info!(path = %path, blueprints = count, "Loaded blueprint library");
            loader.finish()?
        }
        None => BlueprintStore::builtin()?,
    };
    Ok(store)
}

fn run_generate_command(args: GenerateArgs) -> anyhow::Result<()> {
    let config = args.config()?;
    let store = Arc::new(load_store(&args.library, &config)?);
    let generator = ExerciseGenerator::with_config(store, config);

    let Generation { exercises, outcome } =
        generator.generate_with_report(args.topic, args.difficulty);

    if args.library.json {
        let report = match &outcome {
            GenerationOutcome::Sampled(report) => serde_json::to_value(report)?,
            GenerationOutcome::NoContent => serde_json::json!({ "status": "no-content" }),
            GenerationOutcome::Failed(message) => {
                serde_json::json!({ "status": "failed", "error": message })
            }
        };
        let output = serde_json::json!({
            "exercises": exercises,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for (i, exercise) in exercises.iter().enumerate() {
        println!("{:>3}. [{}] {}", i + 1, exercise.id, exercise.title);
        println!("     {}", exercise.description);
        if let Some(code) = &exercise.broken_code {
            println!("     broken:   {code}");
        }
        println!("     solution: {}", exercise.solution_query);
    }

    println!();
    match outcome {
        GenerationOutcome::Sampled(report) => {
            println!(
                "Generated {}/{} exercises in {} attempts ({} duplicates, pool of {})",
                report.produced, report.target, report.attempts, report.duplicates, report.pool_size
            );
            if report.fell_back() {
                println!(
                    "  No {} blueprints for {}; used {} instead",
                    report.requested_difficulty, report.topic, report.resolved_difficulty
                );
            }
        }
        GenerationOutcome::NoContent => {
            println!("No blueprints available for {}", args.topic);
        }
        GenerationOutcome::Failed(message) => {
            anyhow::bail!("Generation failed: {message}");
        }
    }
    Ok(())
}

fn run_validate_command(args: LibraryArgs) -> anyhow::Result<()> {
    let mut loader = args.config()?.loader();
    let origin = match &args.library {
        Some(path) => {
            loader.load_path(Path::new(path))?;
            path.clone()
        }
        None => {
            loader.load_str(crate::template::BUILTIN_LIBRARY, "builtin")?;
            "builtin".to_string()
        }
    };

    let errors = loader.validate_all();

    if args.json {
        let output = serde_json::json!({
            "library": origin,
            "blueprints": loader.len(),
            "valid": errors.is_empty(),
            "errors": errors
                .iter()
                .map(|(location, error)| serde_json::json!({
                    "location": location,
                    "error": error.to_string(),
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if errors.is_empty() {
        println!("✓ {} blueprints in {} are valid", loader.len(), origin);
    } else {
        println!("✗ {} error(s) in {}", errors.len(), origin);
        for (location, error) in &errors {
            println!("  {location}: {error}");
        }
    }

    if !errors.is_empty() {
        anyhow::bail!("Library validation failed with {} error(s)", errors.len());
    }
    Ok(())
}

fn run_stats_command(args: LibraryArgs) -> anyhow::Result<()> {
    let store = load_store(&args, &args.config()?)?;

    let stats: Vec<SectionStats> = store
        .sections()
        .map(|(topic, difficulty, blueprints)| SectionStats {
            topic,
            difficulty,
            blueprints: blueprints.len(),
            debugging: blueprints.iter().filter(|bp| bp.is_debugging()).count(),
            combinations: blueprints
                .iter()
                .map(|bp| bp.combinations())
                .fold(0u64, u64::saturating_add),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!(
        "{:<14} {:<8} {:>10} {:>10} {:>13}",
        "topic", "level", "blueprints", "debugging", "combinations"
    );
    for s in &stats {
        println!(
            "{:<14} {:<8} {:>10} {:>10} {:>13}",
            s.topic.as_str(),
            s.difficulty.as_str(),
            s.blueprints,
            s.debugging,
            s.combinations
        );
    }

    let missing: Vec<&str> = Topic::all()
        .into_iter()
        .filter(|topic| store.blueprints(*topic, Difficulty::Easy).is_empty())
        .map(|topic| topic.as_str())
        .collect();
    println!();
    println!("Total blueprints: {}", store.len());
    if !missing.is_empty() {
        println!("Topics without easy blueprints: {}", missing.join(", "));
    }
    Ok(())
}
