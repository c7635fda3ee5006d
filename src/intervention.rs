//! Intervention rules: pure Q-table transforms applied when a human
//! relocates the agent mid-episode.
//!
//! Every rule is copy-on-write over the table and acts only on the announced
//! action and the explicit state transition. Rules never draw randomness and
//! never consult the available-action set.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    q_learning::QTable,
    types::{Action, State},
};

/// Named update rule selected for interventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum InterventionRule {
    /// Reinforce the direction of the relocation with a fixed +1 signal.
    #[default]
    Suggestion,
    /// Standard Bellman update with the announced action and the real reward.
    Reset,
    /// Discard the timestep entirely; the table is returned unchanged.
    Interrupt,
    /// Penalize the announced action with a fixed -1 signal.
    Impede,
}

impl fmt::Display for InterventionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InterventionRule::Suggestion => "suggestion",
            InterventionRule::Reset => "reset",
            InterventionRule::Interrupt => "interrupt",
            InterventionRule::Impede => "impede",
        };
        f.write_str(label)
    }
}

impl FromStr for InterventionRule {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suggestion" | "suggest" => Ok(InterventionRule::Suggestion),
            "reset" => Ok(InterventionRule::Reset),
            "interrupt" => Ok(InterventionRule::Interrupt),
            "impede" => Ok(InterventionRule::Impede),
            _ => Err(crate::Error::ParseInterventionRule {
                input: s.to_string(),
                expected: "suggestion, reset, interrupt, impede".to_string(),
            }),
        }
    }
}

/// Everything a rule may look at: the transition, the announced action, and
/// the learning parameters of the session.
#[derive(Debug, Clone, Copy)]
pub struct InterventionContext {
    /// State the agent was relocated from.
    pub state: State,
    /// State the agent was relocated to.
    pub new_state: State,
    /// The action that had been announced for `state`.
    pub action: Action,
    /// Reward of the destination cell.
    pub reward: f64,
    pub learning_rate: f64,
    pub discount: f64,
    pub rows: usize,
    pub cols: usize,
}

/// Dispatch a rule by name. Returns a new table; the input is untouched.
pub fn apply_rule(rule: InterventionRule, table: &QTable, ctx: &InterventionContext) -> QTable {
    match rule {
        InterventionRule::Suggestion => suggestion_update(table, ctx),
        InterventionRule::Reset => reset_update(table, ctx),
        InterventionRule::Interrupt => interrupt_update(table, ctx),
        InterventionRule::Impede => impede_update(table, ctx),
    }
}

/// Q[s][dir] += α·(1 + γ·max Q[s'] − Q[s][dir]) for the direction implied by
/// the relocation geometry. The +1 is a literal shaping signal; the actual
/// reward is deliberately ignored.
fn suggestion_update(table: &QTable, ctx: &InterventionContext) -> QTable {
    let direction = directional_action(ctx);
    let mut next = table.clone();
    next.q_learning_update(
        ctx.state,
        direction.index(),
        1.0,
        ctx.new_state,
        ctx.learning_rate,
        ctx.discount,
    );
    next
}

/// Standard Bellman update with the announced action and the real reward.
fn reset_update(table: &QTable, ctx: &InterventionContext) -> QTable {
    let mut next = table.clone();
    next.q_learning_update(
        ctx.state,
        ctx.action.index(),
        ctx.reward,
        ctx.new_state,
        ctx.learning_rate,
        ctx.discount,
    );
    next
}

/// Identity: the timestep is discarded.
fn interrupt_update(table: &QTable, _ctx: &InterventionContext) -> QTable {
    table.clone()
}

/// Q[s][a] += α·(−1 + γ·max Q[s'] − Q[s][a]); the −1 is literal, independent
/// of the real reward.
fn impede_update(table: &QTable, ctx: &InterventionContext) -> QTable {
    let mut next = table.clone();
    next.q_learning_update(
        ctx.state,
        ctx.action.index(),
        -1.0,
        ctx.new_state,
        ctx.learning_rate,
        ctx.discount,
    );
    next
}

/// Direction implied by the `state → new_state` displacement.
///
/// The axis with the larger coordinate delta wins; ties and one-row grids
/// resolve to the horizontal axis. Non-positive deltas map to Left / Up.
fn directional_action(ctx: &InterventionContext) -> Action {
    let (from_row, from_col) = (ctx.state / ctx.cols, ctx.state % ctx.cols);
    let (to_row, to_col) = (ctx.new_state / ctx.cols, ctx.new_state % ctx.cols);
    let row_diff = to_row as isize - from_row as isize;
    let col_diff = to_col as isize - from_col as isize;

    if ctx.rows <= 1 || col_diff.abs() >= row_diff.abs() {
        if col_diff > 0 { Action::Right } else { Action::Left }
    } else if row_diff > 0 {
        Action::Down
    } else {
        Action::Up
    }
}
