//! Headless Live Simulator
//!
//! Loads a TOML scenario and prints scores as JSON or text.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use stage_sim::core::error::{Result, SimError};
use stage_sim::engine::CustomRun;
use stage_sim::results::ScoreStatistics;
use stage_sim::scenario::Scenario;
use stage_sim::simulator::{judgement_counts, PreparedSimulation, Simulator};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Perfect,
    Random,
    Autoplay,
    Abuse,
    Custom,
}

/// Live Simulator - score a unit against a chart
#[derive(Parser, Debug)]
#[command(name = "live_sim")]
#[command(about = "Simulate a rhythm-game live and report scores")]
struct Args {
    /// Scenario file (skills, cards, live, config)
    scenario: PathBuf,

    #[arg(long, value_enum, default_value = "perfect")]
    mode: Mode,

    /// Trials for random mode
    #[arg(long, default_value_t = 1000)]
    trials: usize,

    /// Only PERFECT timing in random mode (skill rolls still random)
    #[arg(long)]
    perfect_only: bool,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Autoplay input lag in milliseconds
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset_ms: i64,

    /// Extra autoplay lag for flick/long/slide notes in milliseconds
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    special_offset_ms: i64,

    /// JSON file describing a custom run (disabled skills, note offsets, misses)
    #[arg(long)]
    custom: Option<PathBuf>,

    /// Include per-note detail in JSON output
    #[arg(long)]
    detail: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

#[derive(Serialize)]
struct RunSummary {
    mode: String,
    total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<ScoreStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    /// PERFECT, GREAT, NICE, BAD, MISS
    #[serde(skip_serializing_if = "Option::is_none")]
    judgements: Option<[usize; 5]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<serde_json::Value>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("stage_sim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(summary) => {
            if args.format == "text" {
                print_text(&summary);
            } else {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<RunSummary> {
    let scenario = Scenario::load(&args.scenario)?;
    let prepared = Simulator::setup(scenario.formation, scenario.live, scenario.config)?;

    let summary = match args.mode {
        Mode::Perfect => {
            let result = Simulator::run_perfect(&prepared);
            RunSummary {
                judgements: Some(judgement_counts(&result.detail)),
                ..summary("perfect", result.total, detail_json(args, &result.detail)?)
            }
        }
        Mode::Random => random(args, &prepared),
        Mode::Autoplay => {
            let result = Simulator::run_autoplay(&prepared, args.offset_ms, args.special_offset_ms);
            summary("autoplay", result.total, detail_json(args, &result)?)
        }
        Mode::Abuse => {
            let result = Simulator::run_abuse(&prepared);
            summary("abuse", result.total, detail_json(args, &result.data)?)
        }
        Mode::Custom => {
            let path = args
                .custom
                .as_ref()
                .ok_or_else(|| SimError::InvalidConfig("custom mode needs --custom <file>".to_string()))?;
            let content = fs::read_to_string(path)?;
            let custom: CustomRun = serde_json::from_str(&content)?;
            let result = Simulator::run_custom(&prepared, &custom);
            RunSummary {
                judgements: Some(judgement_counts(&result.detail)),
                ..summary("custom", result.total, detail_json(args, &result.detail)?)
            }
        }
    };
    Ok(summary)
}

fn random(args: &Args, prepared: &PreparedSimulation) -> RunSummary {
    let seed = args.seed.unwrap_or_else(rand::random);
    let scores = Simulator::run_probabilistic(prepared, args.trials, args.perfect_only, seed);
    let statistics = ScoreStatistics::from_scores(&scores);
    RunSummary {
        mode: "random".to_string(),
        total: statistics.as_ref().map_or(0, |s| s.mean.round() as u64),
        statistics,
        seed: Some(seed),
        judgements: None,
        detail: None,
    }
}

fn summary(mode: &str, total: u64, detail: Option<serde_json::Value>) -> RunSummary {
    RunSummary {
        mode: mode.to_string(),
        total,
        statistics: None,
        seed: None,
        judgements: None,
        detail,
    }
}

fn detail_json<T: Serialize>(args: &Args, value: &T) -> Result<Option<serde_json::Value>> {
    if !args.detail {
        return Ok(None);
    }
    Ok(Some(serde_json::to_value(value)?))
}

fn print_text(summary: &RunSummary) {
    println!("Mode: {}", summary.mode);
    println!("Score: {}", summary.total);
    if let Some(stats) = &summary.statistics {
        println!("{}", stats.summary());
        for (p, score) in &stats.percentiles {
            println!("  p{:<3} {:.0}", p, score);
        }
    }
    if let Some([perfect, great, nice, bad, miss]) = summary.judgements {
        println!(
            "PERFECT {} / GREAT {} / NICE {} / BAD {} / MISS {}",
            perfect, great, nice, bad, miss
        );
    }
    if let Some(seed) = summary.seed {
        println!("Seed: {}", seed);
    }
}
