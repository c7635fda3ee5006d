//! Headless training pipeline for sessions

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    episode::{EpisodeController, RunningTotals},
    ports::SessionObserver,
};

/// Training configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of episodes to run
    pub episodes: usize,

    /// Upper bound on clock ticks before the run is abandoned
    pub tick_budget: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            tick_budget: 200_000,
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Total episodes completed
    pub episodes: usize,

    /// Episodes that reached the goal
    pub successes: usize,

    /// Episodes that ended in a hole
    pub failures: usize,

    /// successes / episodes
    pub success_rate: f64,

    /// Steps across all episodes
    pub total_steps: usize,

    /// Reward across all episodes
    pub total_reward: f64,

    /// Mean episode length
    pub average_steps: f64,
}

impl TrainingResult {
    fn from_totals(totals: &RunningTotals) -> Self {
        let average_steps = if totals.episodes > 0 {
            totals.total_steps as f64 / totals.episodes as f64
        } else {
            0.0
        };
        Self {
            episodes: totals.episodes,
            successes: totals.successes,
            failures: totals.episodes - totals.successes,
            success_rate: totals.success_rate(),
            total_steps: totals.total_steps,
            total_reward: totals.total_reward,
            average_steps,
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Drives a session's virtual clock until the configured episode count.
///
/// The pipeline owns a set of observers and forwards every transition,
/// intervention, and episode end to them, decoupling the drive loop from
/// output formats.
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Run the session until `config.episodes` more episodes complete.
    ///
    /// Advances the controller clock one step-delay at a time so steps and
    /// settle delays fire in their natural order. If the tick budget runs
    /// out first, the run stops early with a warning on stderr.
    pub fn run(&mut self, controller: &mut EpisodeController) -> Result<TrainingResult> {
        for observer in &mut self.observers {
            observer.on_session_start(self.config.episodes)?;
        }

        let baseline_episodes = controller.episode_stats().episodes;
        let target = baseline_episodes + self.config.episodes;
        let tick = controller.step_delay_ms();
        let mut reported_episodes = controller.episode_log().len();
        let mut reported_interventions = controller.intervention_history().len();
        let mut ticks = 0usize;

        controller.start()?;

        while controller.episode_stats().episodes < target {
            if ticks >= self.config.tick_budget {
                eprintln!(
                    "Warning: training stopped early after {} ticks with {} of {} episodes complete.",
                    ticks,
                    controller.episode_stats().episodes - baseline_episodes,
                    self.config.episodes
                );
                break;
            }

            let episode = controller.episode_log().len();
            let outcomes = controller.advance(tick)?;
            for outcome in &outcomes {
                for observer in &mut self.observers {
                    observer.on_step(episode, outcome)?;
                }
            }

            while reported_interventions < controller.intervention_history().len() {
                let record = controller.intervention_history()[reported_interventions];
                for observer in &mut self.observers {
                    observer.on_intervention(&record)?;
                }
                reported_interventions += 1;
            }

            while reported_episodes < controller.episode_log().len() {
                let record = controller.episode_log()[reported_episodes];
                for observer in &mut self.observers {
                    observer.on_episode_end(&record)?;
                }
                reported_episodes += 1;
            }

            ticks += 1;
        }

        controller.pause();

        for observer in &mut self.observers {
            observer.on_session_end()?;
        }

        Ok(TrainingResult::from_totals(controller.running_totals()))
    }
}
