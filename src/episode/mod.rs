//! The episode state machine and its virtual-clock scheduler.

pub mod controller;
pub mod scheduler;

pub use controller::{
    AgentState, EpisodeController, EpisodeStats, RunningTotals, SessionStatus, StepOutcome,
};
pub use scheduler::{Scheduler, TaskHandle};
