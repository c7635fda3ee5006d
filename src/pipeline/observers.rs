//! Observer implementations for training pipelines
//!
//! Observers allow composable data collection during training without
//! coupling the drive loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::{
    Result,
    episode::StepOutcome,
    ports::SessionObserver,
    types::{EpisodeRecord, InterventionRecord},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    episodes: usize,
    successes: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            episodes: 0,
            successes: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for ProgressObserver {
    fn on_session_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, record: &EpisodeRecord) -> Result<()> {
        self.episodes += 1;
        if record.success {
            self.successes += 1;
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(self.episodes as u64);
            pb.set_message(format!("{} reached goal", self.successes));
        }
        Ok(())
    }

    fn on_session_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("{} reached goal", self.successes));
        }
        Ok(())
    }
}

/// Metrics observer - Tracks aggregate counters during a run
#[derive(Debug, Default)]
pub struct MetricsObserver {
    episodes: usize,
    successes: usize,
    steps: usize,
    total_reward: f64,
    interventions: usize,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn successes(&self) -> usize {
        self.successes
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    pub fn interventions(&self) -> usize {
        self.interventions
    }

    pub fn success_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.successes as f64 / self.episodes as f64
        }
    }
}

impl SessionObserver for MetricsObserver {
    fn on_step(&mut self, _episode: usize, outcome: &StepOutcome) -> Result<()> {
        self.steps += 1;
        self.total_reward += outcome.reward;
        Ok(())
    }

    fn on_intervention(&mut self, _record: &InterventionRecord) -> Result<()> {
        self.interventions += 1;
        Ok(())
    }

    fn on_episode_end(&mut self, record: &EpisodeRecord) -> Result<()> {
        self.episodes += 1;
        if record.success {
            self.successes += 1;
        }
        Ok(())
    }
}

/// One JSON line per session event.
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum SessionEvent<'a> {
    Step {
        episode: usize,
        #[serde(flatten)]
        outcome: &'a StepOutcome,
    },
    Intervention {
        #[serde(flatten)]
        record: &'a InterventionRecord,
    },
    EpisodeEnd {
        #[serde(flatten)]
        record: &'a EpisodeRecord,
    },
}

/// JSONL observer - Writes every event as one JSON object per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create an observer writing to `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| crate::Error::Io {
            operation: format!("create observations file {path:?}"),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write_event(&mut self, event: &SessionEvent<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

impl SessionObserver for JsonlObserver {
    fn on_step(&mut self, episode: usize, outcome: &StepOutcome) -> Result<()> {
        self.write_event(&SessionEvent::Step { episode, outcome })
    }

    fn on_intervention(&mut self, record: &InterventionRecord) -> Result<()> {
        self.write_event(&SessionEvent::Intervention { record })
    }

    fn on_episode_end(&mut self, record: &EpisodeRecord) -> Result<()> {
        self.write_event(&SessionEvent::EpisodeEnd { record })
    }

    fn on_session_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
