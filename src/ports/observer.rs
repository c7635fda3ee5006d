//! Observer port - abstraction for session observation and data collection

use crate::{
    Result,
    episode::StepOutcome,
    types::{EpisodeRecord, InterventionRecord},
};

/// Observer trait for monitoring a training session
///
/// Observers can be composed to collect different kinds of data while the
/// episode loop runs. Examples include:
/// - Progress bars for user feedback
/// - JSONL export for analysis
/// - Metrics tracking for evaluation
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_session_start(total_episodes)` - Once at the beginning
/// 2. For each executed transition: `on_step(...)`
/// 3. `on_intervention(...)` - When a human intervention commits
/// 4. `on_episode_end(...)` - When an episode reaches a terminal cell
/// 5. `on_session_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use floe::{ports::SessionObserver, types::EpisodeRecord};
///
/// struct SuccessCounter {
///     successes: usize,
/// }
///
/// impl SessionObserver for SuccessCounter {
///     fn on_episode_end(&mut self, record: &EpisodeRecord) -> floe::Result<()> {
///         if record.success {
///             self.successes += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait SessionObserver: Send {
    /// Called once when the drive loop starts.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to initialize observation state.
    fn on_session_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called for every executed transition, normal or intervened.
    ///
    /// `episode` is the index of the episode the step belongs to.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to observe individual transitions.
    fn on_step(&mut self, _episode: usize, _outcome: &StepOutcome) -> Result<()> {
        Ok(())
    }

    /// Called when an intervention has been committed to the Q-table.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to record interventions.
    fn on_intervention(&mut self, _record: &InterventionRecord) -> Result<()> {
        Ok(())
    }

    /// Called when an episode ends on a Hole or Goal cell.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to record episode outcomes.
    fn on_episode_end(&mut self, _record: &EpisodeRecord) -> Result<()> {
        Ok(())
    }

    /// Called once when the drive loop completes.
    ///
    /// Use this to finalize outputs, flush files, or display summaries.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to perform cleanup or final reporting.
    fn on_session_end(&mut self) -> Result<()> {
        Ok(())
    }
}
