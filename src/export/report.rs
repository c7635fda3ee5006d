//! JSON session report over the controller read model.

use std::{fs::File, io::Write, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    episode::{AgentState, EpisodeController, EpisodeStats},
    error::Error,
    q_learning::QTableStats,
    types::{EpisodeRecord, InterventionRecord},
};

/// Serializable snapshot of everything a dashboard or notebook needs to
/// render a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub map: Vec<String>,
    pub seed: u64,
    pub agent: AgentState,
    pub stats: EpisodeStats,
    pub q_table_stats: QTableStats,
    /// Greedy policy as one row of action letters per grid row.
    pub policy: Vec<String>,
    pub episodes: Vec<EpisodeRecord>,
    pub interventions: Vec<InterventionRecord>,
}

impl SessionReport {
    /// Build a report from the controller's read model.
    pub fn from_controller(controller: &EpisodeController) -> Self {
        let cols = controller.grid().cols();
        let policy: Vec<String> = controller
            .policy()
            .chunks(cols)
            .map(|row| row.iter().map(|action| action.to_char()).collect())
            .collect();

        Self {
            map: controller.grid().to_lines(),
            seed: controller.seed(),
            agent: *controller.agent_state(),
            stats: controller.episode_stats(),
            q_table_stats: controller.q_table_stats(),
            policy,
            episodes: controller.episode_log().to_vec(),
            interventions: controller.intervention_history().to_vec(),
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Save the report to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create report file {path:?}"),
            source,
        })?;
        self.write(file)
    }
}
