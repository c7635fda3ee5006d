//! Serializable session snapshot: everything needed to persist and restore
//! a training session.

use serde::{Deserialize, Serialize};

use crate::{
    episode::{EpisodeController, RunningTotals},
    intervention::InterventionRule,
    q_learning::{LearningParams, QTable},
    types::{EpisodeRecord, InterventionRecord, RewardSchedule},
};

/// Persistent state of a session.
///
/// The transient pieces — agent position, announcements, pending timers —
/// are deliberately not stored; a restored session begins at the start state
/// with its random stream replayed from the recorded seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub map: Vec<String>,
    pub reward_schedule: RewardSchedule,
    pub params: LearningParams,
    pub step_delay_ms: u64,
    pub settle_delay_ms: u64,
    pub seed: u64,
    pub rule: InterventionRule,
    pub q_table: QTable,
    pub totals: RunningTotals,
    pub episode_log: Vec<EpisodeRecord>,
    pub history: Vec<InterventionRecord>,
}

impl SessionSnapshot {
    /// Capture the persistent state of a controller.
    pub fn capture(controller: &EpisodeController) -> Self {
        Self {
            map: controller.grid().to_lines(),
            reward_schedule: *controller.reward_schedule(),
            params: *controller.learning_params(),
            step_delay_ms: controller.step_delay_ms(),
            settle_delay_ms: controller.settle_delay_ms(),
            seed: controller.seed(),
            rule: controller.intervention_rule(),
            q_table: controller.q_table().clone(),
            totals: *controller.running_totals(),
            episode_log: controller.episode_log().to_vec(),
            history: controller.intervention_history().to_vec(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::{
        grid::GridWorld,
        q_learning::LearningParams,
        types::{Action, ActionKind, EpisodeRecord, InterventionRecord},
    };

    /// A small populated snapshot for adapter tests.
    pub(crate) fn sample_snapshot() -> SessionSnapshot {
        let grid = GridWorld::named("1x4").unwrap();
        let params = LearningParams::for_grid(&grid, 0.5, 0.9, 0.1).unwrap();
        let mut q_table = QTable::zeroed(params.state_count, params.action_count);
        q_table.set(2, Action::Right.index(), 5.0);

        let mut totals = RunningTotals::default();
        totals.record_episode_end(true, 10.0, 3, 1);

        SessionSnapshot {
            map: grid.to_lines(),
            reward_schedule: RewardSchedule::default(),
            params,
            step_delay_ms: 500,
            settle_delay_ms: 1_000,
            seed: 42,
            rule: InterventionRule::Impede,
            q_table,
            totals,
            episode_log: vec![EpisodeRecord {
                episode: 0,
                steps: 3,
                reward: 10.0,
                success: true,
                interventions: 1,
            }],
            history: vec![InterventionRecord {
                occurred_at: 500,
                from_state: 1,
                to_state: 2,
                rule: InterventionRule::Impede,
                reward: 0.0,
                action: Action::Right,
                action_kind: ActionKind::Exploitation,
            }],
        }
    }
}
