//! ε-greedy Q-learning engine with the action announcement protocol.
//!
//! Every policy decision is recorded as an [`AnnouncedAction`] before it is
//! executed. Interventions read that record through
//! [`QLearningEngine::announced_action`] instead of resampling, which keeps
//! the shared random stream in one linear sequence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::{
    error::{Error, Result},
    grid::GridWorld,
    q_learning::q_table::QTable,
    random::RandomSource,
    types::{Action, ActionKind, AnnouncedAction, State},
};

/// Learning hyperparameters and table dimensions.
///
/// Derived from the active grid; changing the grid dimensions forces a
/// zero-filled Q-table reallocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningParams {
    /// α, the Bellman step size.
    pub learning_rate: f64,
    /// γ, the future-value discount.
    pub discount: f64,
    /// ε, the exploration probability.
    pub exploration_rate: f64,
    pub state_count: usize,
    pub action_count: usize,
    pub rows: usize,
    pub cols: usize,
}

impl LearningParams {
    /// Build parameters for a grid, validating the unit-interval ranges.
    pub fn for_grid(
        grid: &GridWorld,
        learning_rate: f64,
        discount: f64,
        exploration_rate: f64,
    ) -> Result<Self> {
        validate_unit("learning rate", learning_rate)?;
        validate_unit("discount", discount)?;
        validate_unit("exploration rate", exploration_rate)?;
        Ok(Self {
            learning_rate,
            discount,
            exploration_rate,
            state_count: grid.state_count(),
            action_count: Action::COUNT,
            rows: grid.rows(),
            cols: grid.cols(),
        })
    }
}

fn validate_unit(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidLearningParam { name, value })
    }
}

/// Summary statistics over the Q-values reachable by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QTableStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n − 1 denominator).
    pub std_dev: f64,
}

/// Owns the Q-table, the ε-greedy policy, and the announcement map.
#[derive(Debug, Clone)]
pub struct QLearningEngine {
    params: LearningParams,
    q_table: QTable,
    rng: RandomSource,
    announcements: HashMap<State, AnnouncedAction>,
    decisions: u64,
}

impl QLearningEngine {
    /// Create an engine with a zero-filled table.
    pub fn new(params: LearningParams, rng: RandomSource) -> Self {
        Self {
            q_table: QTable::zeroed(params.state_count, params.action_count),
            params,
            rng,
            announcements: HashMap::new(),
            decisions: 0,
        }
    }

    /// Create an engine around an existing table (snapshot restore).
    pub fn with_table(params: LearningParams, rng: RandomSource, q_table: QTable) -> Result<Self> {
        check_dimensions(&params, &q_table)?;
        Ok(Self {
            params,
            q_table,
            rng,
            announcements: HashMap::new(),
            decisions: 0,
        })
    }

    /// ε-greedy action selection with announcement.
    ///
    /// Draws one uniform value; below ε the action is drawn uniformly from
    /// the available set, otherwise the arg-max available action wins, with
    /// ties broken by a uniform draw over the maxima. Every call overwrites
    /// the announcement for `state`, whether or not the action is later
    /// executed.
    pub fn choose_action(&mut self, grid: &GridWorld, state: State) -> Result<Action> {
        self.check_state(state)?;

        let draw = self.rng.uniform(0.0, 1.0);
        let available = grid.available_actions(state);
        let (action, kind) = if available.is_empty() {
            // Degenerate map edge: fall back to a fixed action.
            (Action::Left, ActionKind::Exploitation)
        } else if draw < self.params.exploration_rate {
            let action = *self.rng.choice(&available).unwrap();
            (action, ActionKind::Exploration)
        } else {
            (self.greedy_among(state, &available), ActionKind::Exploitation)
        };

        let announced_at = self.decisions;
        self.decisions += 1;
        self.announcements.insert(
            state,
            AnnouncedAction {
                state,
                action,
                kind,
                random_draw: draw,
                announced_at,
            },
        );
        Ok(action)
    }

    /// Arg-max over `available`, consuming a tie-break draw only when more
    /// than one action attains the maximum.
    fn greedy_among(&mut self, state: State, available: &[Action]) -> Action {
        let best = available
            .iter()
            .map(|action| self.q_table.get(state, action.index()))
            .fold(f64::NEG_INFINITY, f64::max);
        let maxima: Vec<Action> = available
            .iter()
            .copied()
            .filter(|action| self.q_table.get(state, action.index()) == best)
            .collect();
        if maxima.len() == 1 {
            maxima[0]
        } else {
            *self.rng.choice(&maxima).unwrap()
        }
    }

    /// Standard Bellman update for an executed transition.
    pub fn update_q_value(
        &mut self,
        state: State,
        action: Action,
        reward: f64,
        new_state: State,
    ) -> Result<()> {
        self.check_state(state)?;
        self.check_state(new_state)?;
        self.q_table.q_learning_update(
            state,
            action.index(),
            reward,
            new_state,
            self.params.learning_rate,
            self.params.discount,
        );
        Ok(())
    }

    /// Commit a transformed table (intervention results).
    pub fn update_q_table(&mut self, table: QTable) -> Result<()> {
        check_dimensions(&self.params, &table)?;
        self.q_table = table;
        Ok(())
    }

    /// Reallocate a zero-filled table and purge stale announcements.
    pub fn reset_q_table(&mut self) {
        self.q_table = QTable::zeroed(self.params.state_count, self.params.action_count);
        self.announcements.clear();
    }

    /// Resize the table to new dimensions, zero-filled.
    pub fn resize(&mut self, state_count: usize, action_count: usize) {
        self.params.state_count = state_count;
        self.params.action_count = action_count;
        self.q_table = QTable::zeroed(state_count, action_count);
        self.announcements.clear();
    }

    /// The announcement for `state`, if one exists. Pure lookup, no draw.
    pub fn announced_action(&self, state: State) -> Option<&AnnouncedAction> {
        self.announcements.get(&state)
    }

    /// Purge every announcement (episode boundary).
    pub fn clear_announcements(&mut self) {
        self.announcements.clear();
    }

    /// Restart the random stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Greedy action per state over available actions, ties resolved
    /// deterministically. Read-only: never draws.
    pub fn policy(&self, grid: &GridWorld) -> Vec<Action> {
        (0..self.params.state_count)
            .map(|state| {
                let available = grid.available_actions(state);
                available
                    .iter()
                    .copied()
                    .max_by(|a, b| {
                        let qa = self.q_table.get(state, a.index());
                        let qb = self.q_table.get(state, b.index());
                        qa.partial_cmp(&qb).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .unwrap_or(Action::Left)
            })
            .collect()
    }

    /// Min/max/mean/std over the Q-values of available actions.
    pub fn q_table_stats(&self, grid: &GridWorld) -> QTableStats {
        let values: Vec<f64> = (0..self.params.state_count)
            .flat_map(|state| {
                grid.available_actions(state)
                    .into_iter()
                    .map(move |action| (state, action))
            })
            .map(|(state, action)| self.q_table.get(state, action.index()))
            .collect();

        if values.is_empty() {
            return QTableStats {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        QTableStats {
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
            mean: Statistics::mean(values.iter()),
            std_dev: if values.len() > 1 {
                Statistics::std_dev(values.iter())
            } else {
                0.0
            },
        }
    }

    fn check_state(&self, state: State) -> Result<()> {
        if state < self.params.state_count {
            Ok(())
        } else {
            Err(Error::StateOutOfRange {
                state,
                state_count: self.params.state_count,
            })
        }
    }
}

fn check_dimensions(params: &LearningParams, table: &QTable) -> Result<()> {
    if table.state_count() == params.state_count && table.action_count() == params.action_count {
        Ok(())
    } else {
        Err(Error::QTableDimensionMismatch {
            expected_states: params.state_count,
            expected_actions: params.action_count,
            got_states: table.state_count(),
            got_actions: table.action_count(),
        })
    }
}
