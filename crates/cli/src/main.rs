mod config;
mod error;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use policy::{EvalContext, PermissionOutcome, PolicyEngine, PolicyRule, Preset};

use config::RulesFile;
use error::{Error, Result};

const RULES_FILE: &str = "featuregate.toml";

#[derive(Parser)]
#[command(name = "featuregate")]
#[command(about = "Evaluate feature-gating policies from the command line", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one feature invocation against the rules file
    Check {
        /// Path to the rules TOML file
        #[arg(short, long, default_value = RULES_FILE)]
        rules: PathBuf,
        /// Feature to evaluate
        #[arg(short, long)]
        feature: String,
        /// Calling user id
        #[arg(short, long)]
        user: Option<String>,
        /// Calling location
        #[arg(short, long)]
        location: Option<String>,
        /// Amount, for monetary features
        #[arg(short, long)]
        amount: Option<f64>,
        /// Evaluation instant (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
        /// Emit the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate and record repeatedly to watch a rate limit engage
    Simulate {
        /// Path to the rules TOML file
        #[arg(short, long, default_value = RULES_FILE)]
        rules: PathBuf,
        /// Feature to simulate
        #[arg(short, long)]
        feature: String,
        /// Number of invocation attempts
        #[arg(short, long, default_value = "5")]
        count: u32,
    },
    /// Print the rules TOML for a named preset
    Preset {
        /// Preset name: open, balanced, or locked
        name: Preset,
        /// Features the preset covers
        #[arg(short, long, value_delimiter = ',')]
        features: Vec<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            rules,
            feature,
            user,
            location,
            amount,
            at,
            json,
        } => cmd_check(&rules, &feature, user, location, amount, at.as_deref(), json),
        Commands::Simulate {
            rules,
            feature,
            count,
        } => cmd_simulate(&rules, &feature, count),
        Commands::Preset { name, features } => cmd_preset(name, features),
    }
}

fn cmd_check(
    rules_path: &Path,
    feature: &str,
    user: Option<String>,
    location: Option<String>,
    amount: Option<f64>,
    at: Option<&str>,
    json: bool,
) -> Result<()> {
    let rules = RulesFile::load(rules_path)?;
    let rule = rules.rule_for(feature);

    let mut context = EvalContext::at(parse_at(at)?);
    context.user_id = user;
    context.location = location;
    context.amount = amount;

    // A fresh engine sees an empty usage map, so `check` only reflects uses
    // recorded within this process; `simulate` is where the limiter shows.
    let engine = PolicyEngine::new();
    let outcome = engine.evaluate(&rule, &context);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{feature}: {outcome}");
    }

    if !proceeds(&outcome) {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_simulate(rules_path: &Path, feature: &str, count: u32) -> Result<()> {
    let rules = RulesFile::load(rules_path)?;
    let rule = rules.rule_for(feature);
    let engine = PolicyEngine::new();

    for attempt in 1..=count {
        let context = EvalContext::now();
        let outcome = engine.evaluate(&rule, &context);
        println!("[{attempt}/{count}] {feature}: {outcome}");

        // Confirmation is auto-granted in simulation; only a performed
        // action counts against the rate limit.
        if proceeds(&outcome) {
            if let Some(limit) = rule.rate_limit {
                engine.record_use(&rule.feature_id, limit.unit, context.at);
            }
        }
    }
    Ok(())
}

fn cmd_preset(preset: Preset, features: Vec<String>) -> Result<()> {
    let mut map: HashMap<String, PolicyRule> = HashMap::new();
    preset.apply(&mut map, features);
    let file = RulesFile { features: map };
    print!("{}", file.to_toml()?);
    Ok(())
}

/// The outcome lets the host perform the action (directly or after asking).
fn proceeds(outcome: &PermissionOutcome) -> bool {
    matches!(
        outcome,
        PermissionOutcome::Allowed | PermissionOutcome::NeedsConfirmation { .. }
    )
}

fn parse_at(at: Option<&str>) -> Result<DateTime<Utc>> {
    match at {
        None => Ok(Utc::now()),
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::InvalidTimestamp(raw.to_string())),
    }
}
