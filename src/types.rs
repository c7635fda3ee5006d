//! Shared value types for the learning engine and its read model.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::intervention::InterventionRule;

/// Flat grid state index (`row * cols + col`).
pub type State = usize;

/// One of the four grid moves, in the conventional frozen-lake index order
/// (Left = 0, Down = 1, Right = 2, Up = 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Down,
    Right,
    Up,
}

impl Action {
    /// Number of actions in the action space.
    pub const COUNT: usize = 4;

    /// All actions in index order.
    pub const ALL: [Action; 4] = [Action::Left, Action::Down, Action::Right, Action::Up];

    /// Index of the action in the Q-table column order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Action::index`].
    pub fn from_index(index: usize) -> Option<Action> {
        Self::ALL.get(index).copied()
    }

    /// Row/column displacement of the move.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::Left => (0, -1),
            Action::Down => (1, 0),
            Action::Right => (0, 1),
            Action::Up => (-1, 0),
        }
    }

    /// Single-letter code used in policy renderings.
    pub fn to_char(self) -> char {
        match self {
            Action::Left => 'L',
            Action::Down => 'D',
            Action::Right => 'R',
            Action::Up => 'U',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Left => "left",
            Action::Down => "down",
            Action::Right => "right",
            Action::Up => "up",
        };
        f.write_str(label)
    }
}

impl FromStr for Action {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" | "0" => Ok(Action::Left),
            "down" | "d" | "1" => Ok(Action::Down),
            "right" | "r" | "2" => Ok(Action::Right),
            "up" | "u" | "3" => Ok(Action::Up),
            _ => Err(crate::Error::ParseAction {
                input: s.to_string(),
            }),
        }
    }
}

/// Whether an announced action came from the exploration or exploitation
/// branch of the ε-greedy policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Exploration,
    Exploitation,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionKind::Exploration => "exploration",
            ActionKind::Exploitation => "exploitation",
        };
        f.write_str(label)
    }
}

/// Deterministic record of what the policy decided for a state the last
/// time it was asked.
///
/// Interventions must read this record instead of resampling; a fresh draw
/// would desynchronize the shared random stream for every later decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnouncedAction {
    /// State the decision was made for.
    pub state: State,
    /// The decided action.
    pub action: Action,
    /// Which policy branch produced the action.
    pub kind: ActionKind,
    /// The uniform exploration draw that selected the branch.
    pub random_draw: f64,
    /// Monotone decision counter at announcement time.
    pub announced_at: u64,
}

/// Reward values for entering each terminal/non-terminal cell class.
///
/// Start cells are rewarded as Frozen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardSchedule {
    pub hole: f64,
    pub goal: f64,
    pub frozen: f64,
}

impl RewardSchedule {
    pub fn new(hole: f64, goal: f64, frozen: f64) -> Self {
        Self { hole, goal, frozen }
    }
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self {
            hole: -10.0,
            goal: 10.0,
            frozen: 0.0,
        }
    }
}

/// Immutable record of one committed intervention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterventionRecord {
    /// Virtual-clock milliseconds when the intervention was committed.
    pub occurred_at: u64,
    pub from_state: State,
    pub to_state: State,
    pub rule: InterventionRule,
    /// Reward of the destination cell at commit time.
    pub reward: f64,
    /// The action that had been announced for `from_state`.
    pub action: Action,
    pub action_kind: ActionKind,
}

/// Per-episode summary appended to the session log at episode end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Zero-based episode index within the session.
    pub episode: usize,
    pub steps: usize,
    pub reward: f64,
    pub success: bool,
    pub interventions: usize,
}
