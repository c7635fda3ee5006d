//! Dense Q-table for temporal difference learning

use serde::{Deserialize, Serialize};

use crate::types::State;

/// Q-table storing one utility per (state, action) pair.
///
/// The table is a dense `state_count × action_count` matrix in row-major
/// order. It is replaced wholesale on resize or reset and mutated
/// cell-by-cell otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    state_count: usize,
    action_count: usize,
    values: Vec<f64>,
}

impl QTable {
    /// Create a zero-filled table of the given dimensions.
    pub fn zeroed(state_count: usize, action_count: usize) -> Self {
        Self {
            state_count,
            action_count,
            values: vec![0.0; state_count * action_count],
        }
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn action_count(&self) -> usize {
        self.action_count
    }

    /// Get the Q-value for a state-action pair.
    pub fn get(&self, state: State, action: usize) -> f64 {
        self.values[state * self.action_count + action]
    }

    /// Set the Q-value for a state-action pair.
    pub fn set(&mut self, state: State, action: usize, value: f64) {
        self.values[state * self.action_count + action] = value;
    }

    /// All Q-values for one state, in action index order.
    pub fn row(&self, state: State) -> &[f64] {
        let offset = state * self.action_count;
        &self.values[offset..offset + self.action_count]
    }

    /// Maximum Q-value over all actions of `state`.
    ///
    /// The maximum deliberately ranges over every action, available or not;
    /// unexplored actions keep their initial 0 and only affect the result
    /// when every explored value is negative.
    pub fn max_value(&self, state: State) -> f64 {
        self.row(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    pub fn q_learning_update(
        &mut self,
        state: State,
        action: usize,
        reward: f64,
        next_state: State,
        learning_rate: f64,
        discount: f64,
    ) {
        let current_q = self.get(state, action);
        let td_target = reward + discount * self.max_value(next_state);
        let td_error = td_target - current_q;
        self.set(state, action, current_q + learning_rate * td_error);
    }

    /// Flat view of all Q-values, row-major.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
