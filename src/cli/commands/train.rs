//! Train command - Run headless training episodes on a lake map

use std::{fs, path::PathBuf};

use anyhow::{Result, anyhow};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    app::{App, SessionConfig},
    export::SessionReport,
    intervention::InterventionRule,
    pipeline::{JsonlObserver, ProgressObserver, TrainingConfig, TrainingPipeline},
    types::RewardSchedule,
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    result: crate::pipeline::TrainingResult,
    q_table_stats: crate::q_learning::QTableStats,
    metadata: SummaryMetadata,
}

#[derive(Debug, Serialize)]
struct SummaryMetadata {
    map: Vec<String>,
    seed: u64,
    rule: String,
    learning_rate: f64,
    discount: f64,
    exploration_rate: f64,
}

pub(crate) fn parse_reward_schedule(value: &str) -> Result<RewardSchedule> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(anyhow!(
            "Invalid reward schedule '{value}' (expected 'hole,goal,frozen')"
        ));
    }
    let mut values = [0.0f64; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| anyhow!("Invalid reward value '{part}' in '{value}'"))?;
    }
    Ok(RewardSchedule::new(values[0], values[1], values[2]))
}

fn load_map(args: &TrainArgs) -> Result<Vec<String>> {
    if let Some(path) = &args.map_file {
        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read map file {path:?}: {e}"))?;
        let lines: Vec<String> = contents
            .lines()
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(anyhow!("Map file {path:?} contains no rows"));
        }
        Ok(lines)
    } else {
        Ok(crate::grid::GridWorld::named(&args.map)?.to_lines())
    }
}

#[derive(Parser, Debug)]
#[command(about = "Run headless training episodes", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Built-in map name (4x4, 8x8, 1x4)
    #[arg(long, short = 'm', default_value = "4x4")]
    pub map: String,

    /// Path to a map file (one row of cell codes per line); overrides --map
    #[arg(long)]
    pub map_file: Option<PathBuf>,

    /// Number of episodes to run
    #[arg(long, short = 'e', default_value_t = 500)]
    pub episodes: usize,

    /// Learning rate α
    #[arg(long, default_value_t = 0.5)]
    pub learning_rate: f64,

    /// Discount factor γ
    #[arg(long, default_value_t = 0.9)]
    pub discount: f64,

    /// Exploration rate ε
    #[arg(long, default_value_t = 0.1)]
    pub exploration: f64,

    /// Reward schedule as hole,goal,frozen
    #[arg(long)]
    pub reward: Option<String>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Intervention rule selected for the session
    #[arg(long, default_value = "suggestion")]
    pub rule: String,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional file for JSONL observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for saving the session snapshot
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = true)]
    pub progress: bool,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let map = load_map(&args)?;
    let rule: InterventionRule = args.rule.parse()?;

    let mut config = SessionConfig::new(map)
        .with_learning_rate(args.learning_rate)
        .with_discount(args.discount)
        .with_exploration_rate(args.exploration)
        .with_rule(rule);
    if let Some(reward) = &args.reward {
        config = config.with_reward_schedule(parse_reward_schedule(reward)?);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let app = App::new();
    let mut controller = app.create_session(config)?;

    let mut pipeline = TrainingPipeline::new(TrainingConfig {
        episodes: args.episodes,
        ..Default::default()
    });
    if args.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        pipeline = pipeline.with_observer(Box::new(JsonlObserver::new(path)?));
    }

    let result = pipeline.run(&mut controller)?;

    println!(
        "Completed {} episodes: {} reached the goal ({:.1}% success), {:.1} steps per episode.",
        result.episodes,
        result.successes,
        result.success_rate * 100.0,
        result.average_steps
    );

    let report = SessionReport::from_controller(&controller);
    println!("Greedy policy:");
    for row in &report.policy {
        println!("  {row}");
    }

    if let Some(path) = &args.summary {
        let summary = TrainingSummaryFile {
            result,
            q_table_stats: controller.q_table_stats(),
            metadata: SummaryMetadata {
                map: controller.grid().to_lines(),
                seed: controller.seed(),
                rule: controller.intervention_rule().to_string(),
                learning_rate: args.learning_rate,
                discount: args.discount,
                exploration_rate: args.exploration,
            },
        };
        let file = fs::File::create(path)
            .map_err(|e| anyhow!("Failed to create summary file {path:?}: {e}"))?;
        to_writer_pretty(file, &summary)?;
        println!("Summary written to {}", path.display());
    }

    if let Some(path) = &args.output {
        app.save_session(&controller, path)?;
        println!("Session snapshot written to {}", path.display());
    }

    Ok(())
}
