//! Frozen-lake Q-learning with human intervention rules
//!
//! This crate provides:
//! - A deterministic tabular Q-learning engine with an action announcement
//!   protocol (every policy decision is recorded before execution)
//! - Four interchangeable intervention rules applied when a human relocates
//!   the agent mid-episode
//! - An episodic state machine with virtual-clock scheduling for automatic
//!   ticking and episode auto-reset
//! - A headless training pipeline with composable observers
//! - Session snapshots behind a repository port, plus report/CSV export

pub mod adapters;
pub mod app;
pub mod cli;
pub mod episode;
pub mod error;
pub mod export;
pub mod grid;
pub mod intervention;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod random;
pub mod snapshot;
pub mod types;

pub use episode::{
    AgentState, EpisodeController, EpisodeStats, RunningTotals, SessionStatus, StepOutcome,
};
pub use error::{Error, Result};
pub use grid::{CellKind, GridWorld};
pub use intervention::{InterventionContext, InterventionRule, apply_rule};
pub use q_learning::{LearningParams, QLearningEngine, QTable, QTableStats};
pub use random::RandomSource;
pub use snapshot::SessionSnapshot;
pub use types::{
    Action, ActionKind, AnnouncedAction, EpisodeRecord, InterventionRecord, RewardSchedule, State,
};
