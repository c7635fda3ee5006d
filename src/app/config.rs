//! Configuration types for session creation.

use crate::{
    Result,
    error::Error,
    grid::GridWorld,
    intervention::InterventionRule,
    types::RewardSchedule,
};

/// Configuration for creating a training session.
///
/// This type provides a builder-style API for configuring sessions before
/// creation through the application container.
///
/// # Examples
///
/// ```
/// use floe::app::SessionConfig;
/// use floe::InterventionRule;
///
/// let config = SessionConfig::named_map("4x4")?
///     .with_seed(42)
///     .with_exploration_rate(0.2)
///     .with_rule(InterventionRule::Impede);
/// # Ok::<(), floe::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Map rows as single-character cell codes.
    pub map: Vec<String>,
    /// Rewards for hole/goal/frozen cells.
    pub reward_schedule: RewardSchedule,
    /// α, the Bellman step size.
    pub learning_rate: f64,
    /// γ, the future-value discount.
    pub discount: f64,
    /// ε, the exploration probability.
    pub exploration_rate: f64,
    /// Automatic ticking cadence in virtual milliseconds.
    pub step_delay_ms: u64,
    /// Settle delay before an ended episode auto-resets.
    pub settle_delay_ms: u64,
    /// Random seed; None draws one from entropy at creation.
    pub seed: Option<u64>,
    /// Intervention rule selected for the session.
    pub rule: InterventionRule,
}

impl SessionConfig {
    /// Create a configuration for the given map rows.
    ///
    /// Uses default values for everything else: reward schedule
    /// (-10/10/0), α = 0.5, γ = 0.9, ε = 0.1, 500 ms step delay, 1000 ms
    /// settle delay, entropy seed, suggestion rule.
    pub fn new(map: Vec<String>) -> Self {
        Self {
            map,
            reward_schedule: RewardSchedule::default(),
            learning_rate: 0.5,
            discount: 0.9,
            exploration_rate: 0.1,
            step_delay_ms: 500,
            settle_delay_ms: 1_000,
            seed: None,
            rule: InterventionRule::default(),
        }
    }

    /// Create a configuration for one of the built-in layouts.
    pub fn named_map(name: &str) -> Result<Self> {
        Ok(Self::new(GridWorld::named(name)?.to_lines()))
    }

    pub fn with_reward_schedule(mut self, schedule: RewardSchedule) -> Self {
        self.reward_schedule = schedule;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_exploration_rate(mut self, exploration_rate: f64) -> Self {
        self.exploration_rate = exploration_rate;
        self
    }

    pub fn with_step_delay_ms(mut self, step_delay_ms: u64) -> Self {
        self.step_delay_ms = step_delay_ms;
        self
    }

    pub fn with_settle_delay_ms(mut self, settle_delay_ms: u64) -> Self {
        self.settle_delay_ms = settle_delay_ms;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_rule(mut self, rule: InterventionRule) -> Self {
        self.rule = rule;
        self
    }

    /// Validate the timing parameters. The learning parameters are
    /// validated when the engine is built.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.step_delay_ms == 0 {
            return Err(Error::InvalidDelay { name: "step delay" });
        }
        if self.settle_delay_ms == 0 {
            return Err(Error::InvalidDelay {
                name: "settle delay",
            });
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::named_map("4x4").expect("built-in 4x4 map is valid")
    }
}
