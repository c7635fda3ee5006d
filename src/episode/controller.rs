//! Episode state machine: pending-action execution, episode boundaries,
//! auto-restart timing, and intervention arbitration.

use serde::{Deserialize, Serialize};

use crate::{
    episode::scheduler::{Scheduler, TaskHandle},
    error::{Error, Result},
    grid::{CellKind, GridWorld},
    intervention::{InterventionContext, InterventionRule, apply_rule},
    q_learning::{LearningParams, QLearningEngine, QTable, QTableStats},
    types::{
        Action, ActionKind, AnnouncedAction, EpisodeRecord, InterventionRecord, RewardSchedule,
        State,
    },
};

/// Drive-loop status of the session.
///
/// Intervention is not a status of its own; it is a transient guard layered
/// over Running or Paused while one intervention is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Stopped,
    Running,
    Paused,
}

/// Mutable per-episode agent bookkeeping. Reset at every episode start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub current_state: State,
    pub total_reward: f64,
    pub steps: usize,
    pub last_reward: f64,
    pub is_done: bool,
}

impl AgentState {
    fn at_start(start: State) -> Self {
        Self {
            current_state: start,
            total_reward: 0.0,
            steps: 0,
            last_reward: 0.0,
            is_done: false,
        }
    }
}

/// Append-only counters across episodes.
///
/// [`RunningTotals::record_episode_end`] is the sole entry point for episode
/// accounting, whatever caused the termination.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunningTotals {
    pub episodes: usize,
    pub successes: usize,
    pub total_reward: f64,
    pub total_steps: usize,
    pub total_interventions: usize,
}

impl RunningTotals {
    pub fn record_episode_end(
        &mut self,
        success: bool,
        reward: f64,
        steps: usize,
        interventions: usize,
    ) {
        self.episodes += 1;
        if success {
            self.successes += 1;
        }
        self.total_reward += reward;
        self.total_steps += steps;
        self.total_interventions += interventions;
    }

    pub fn success_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.successes as f64 / self.episodes as f64
        }
    }
}

/// Read-model view of the running totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub episodes: usize,
    pub successes: usize,
    pub success_rate: f64,
    pub total_reward: f64,
    pub total_steps: usize,
    pub total_interventions: usize,
}

impl From<&RunningTotals> for EpisodeStats {
    fn from(totals: &RunningTotals) -> Self {
        Self {
            episodes: totals.episodes,
            successes: totals.successes,
            success_rate: totals.success_rate(),
            total_reward: totals.total_reward,
            total_steps: totals.total_steps,
            total_interventions: totals.total_interventions,
        }
    }
}

/// One executed transition, normal or intervened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub from_state: State,
    pub action: Action,
    pub kind: ActionKind,
    pub to_state: State,
    pub reward: f64,
    pub terminal: bool,
    pub success: bool,
    pub intervention: bool,
}

#[derive(Debug, Clone, Copy)]
enum Task {
    Step,
    EpisodeReset,
}

/// The episodic learning/intervention engine.
///
/// Owns the grid, the learning engine, the virtual-clock scheduler, the
/// intervention history, and all episode accounting. External collaborators
/// (UI, export, persistence) drive it through `start`/`pause`/`step`/
/// `advance`/`intervene`/`reset` and read the exposed read model.
pub struct EpisodeController {
    grid: GridWorld,
    engine: QLearningEngine,
    rule: InterventionRule,
    reward_schedule: RewardSchedule,
    step_delay: u64,
    settle_delay: u64,
    seed: u64,
    status: SessionStatus,
    intervening: bool,
    agent: AgentState,
    totals: RunningTotals,
    episode_log: Vec<EpisodeRecord>,
    history: Vec<InterventionRecord>,
    episode_interventions: usize,
    scheduler: Scheduler<Task>,
    pending_step: Option<TaskHandle>,
    pending_reset: Option<TaskHandle>,
}

impl EpisodeController {
    pub fn new(
        grid: GridWorld,
        engine: QLearningEngine,
        rule: InterventionRule,
        reward_schedule: RewardSchedule,
        step_delay: u64,
        settle_delay: u64,
        seed: u64,
    ) -> Self {
        let agent = AgentState::at_start(grid.start_state());
        Self {
            grid,
            engine,
            rule,
            reward_schedule,
            step_delay,
            settle_delay,
            seed,
            status: SessionStatus::Stopped,
            intervening: false,
            agent,
            totals: RunningTotals::default(),
            episode_log: Vec::new(),
            history: Vec::new(),
            episode_interventions: 0,
            scheduler: Scheduler::new(),
            pending_step: None,
            pending_reset: None,
        }
    }

    /// Rebuild a controller from persisted session state.
    pub(crate) fn with_session_state(
        grid: GridWorld,
        engine: QLearningEngine,
        rule: InterventionRule,
        reward_schedule: RewardSchedule,
        step_delay: u64,
        settle_delay: u64,
        seed: u64,
        totals: RunningTotals,
        episode_log: Vec<EpisodeRecord>,
        history: Vec<InterventionRecord>,
    ) -> Self {
        let mut controller = Self::new(
            grid,
            engine,
            rule,
            reward_schedule,
            step_delay,
            settle_delay,
            seed,
        );
        controller.totals = totals;
        controller.episode_log = episode_log;
        controller.history = history;
        controller
    }

    /// Begin (or resume) automatic ticking.
    ///
    /// Announces an action for the current state if none is pending yet.
    pub fn start(&mut self) -> Result<()> {
        if self.status == SessionStatus::Running {
            return Ok(());
        }
        self.status = SessionStatus::Running;
        if self.agent.is_done {
            if self.pending_reset.is_none() {
                self.pending_reset = Some(self.scheduler.schedule_in(self.settle_delay, Task::EpisodeReset));
            }
        } else {
            if self.engine.announced_action(self.agent.current_state).is_none() {
                self.engine.choose_action(&self.grid, self.agent.current_state)?;
            }
            self.schedule_step();
        }
        Ok(())
    }

    /// Freeze the step timer, preserving the pending announced action.
    ///
    /// A pending episode-reset settle timer is left in place; only `reset`
    /// cancels episode-boundary handling.
    pub fn pause(&mut self) {
        if self.status != SessionStatus::Running {
            return;
        }
        self.status = SessionStatus::Paused;
        if let Some(handle) = self.pending_step.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Execute the pending announced action once.
    ///
    /// No-op (returns `None`) when the state is terminal, no action is
    /// pending, or an intervention is in flight.
    pub fn step(&mut self) -> Result<Option<StepOutcome>> {
        if self.intervening {
            return Ok(None);
        }
        self.execute_pending_action()
    }

    /// Drive the virtual clock forward by `dt` milliseconds, firing due
    /// step and episode-reset tasks. Returns the executed transitions.
    pub fn advance(&mut self, dt: u64) -> Result<Vec<StepOutcome>> {
        let deadline = self.scheduler.now().saturating_add(dt);
        let mut outcomes = Vec::new();
        while let Some((_, task)) = self.scheduler.pop_due(deadline) {
            match task {
                Task::Step => {
                    self.pending_step = None;
                    if self.status == SessionStatus::Running && !self.intervening {
                        if let Some(outcome) = self.execute_pending_action()? {
                            outcomes.push(outcome);
                        }
                    }
                }
                Task::EpisodeReset => {
                    self.pending_reset = None;
                    self.begin_episode()?;
                }
            }
        }
        self.scheduler.advance_to(deadline);
        Ok(outcomes)
    }

    /// Relocate the agent using the session's selected rule.
    pub fn intervene(&mut self, from_state: State, to_state: State) -> Result<StepOutcome> {
        self.intervene_with_rule(from_state, to_state, self.rule)
    }

    /// Relocate the agent from `from_state` to `to_state`, updating the
    /// Q-table with `rule` against the *previously announced* action.
    ///
    /// Fails without touching the table when another intervention is in
    /// flight, the source does not match the agent position, the target is
    /// out of range, or no action has been announced for the source.
    pub fn intervene_with_rule(
        &mut self,
        from_state: State,
        to_state: State,
        rule: InterventionRule,
    ) -> Result<StepOutcome> {
        if self.intervening {
            return Err(Error::InterventionInFlight);
        }
        if from_state != self.agent.current_state {
            return Err(Error::InterventionMismatch {
                expected: self.agent.current_state,
                got: from_state,
            });
        }
        self.grid.check_state(to_state)?;
        let announced = match self.engine.announced_action(from_state) {
            Some(announced) => *announced,
            None => return Err(Error::NoAnnouncedAction { state: from_state }),
        };

        self.intervening = true;
        let result = self.commit_intervention(announced, from_state, to_state, rule);
        self.intervening = false;
        result
    }

    fn commit_intervention(
        &mut self,
        announced: AnnouncedAction,
        from_state: State,
        to_state: State,
        rule: InterventionRule,
    ) -> Result<StepOutcome> {
        let params = *self.engine.params();
        let reward = self.grid.reward(to_state, &self.reward_schedule);
        let ctx = InterventionContext {
            state: from_state,
            new_state: to_state,
            action: announced.action,
            reward,
            learning_rate: params.learning_rate,
            discount: params.discount,
            rows: params.rows,
            cols: params.cols,
        };

        // Copy-then-commit: the live table is replaced only once the rule
        // has produced a complete replacement.
        let updated = apply_rule(rule, self.engine.q_table(), &ctx);
        self.engine.update_q_table(updated)?;

        self.history.push(InterventionRecord {
            occurred_at: self.scheduler.now(),
            from_state,
            to_state,
            rule,
            reward,
            action: announced.action,
            action_kind: announced.kind,
        });
        self.episode_interventions += 1;

        self.apply_transition(from_state, announced.action, announced.kind, to_state, reward, true)
    }

    /// Select the rule used by [`EpisodeController::intervene`].
    pub fn set_intervention_rule(&mut self, rule: InterventionRule) {
        self.rule = rule;
    }

    pub fn intervention_rule(&self) -> InterventionRule {
        self.rule
    }

    /// Stop the session and clear agent state, statistics, and intervention
    /// history. The Q-table is untouched; resetting it is a separate,
    /// caller-issued operation.
    pub fn reset(&mut self) {
        self.scheduler.clear();
        self.pending_step = None;
        self.pending_reset = None;
        self.status = SessionStatus::Stopped;
        self.intervening = false;
        self.agent = AgentState::at_start(self.grid.start_state());
        self.totals = RunningTotals::default();
        self.episode_log.clear();
        self.history.clear();
        self.episode_interventions = 0;
        self.engine.clear_announcements();
    }

    /// Zero the Q-table and purge announcements. Session statistics and
    /// history are untouched.
    pub fn reset_q_table(&mut self) {
        self.engine.reset_q_table();
    }

    fn execute_pending_action(&mut self) -> Result<Option<StepOutcome>> {
        if self.agent.is_done {
            return Ok(None);
        }
        let from_state = self.agent.current_state;
        let announced = match self.engine.announced_action(from_state) {
            Some(announced) => *announced,
            None => return Ok(None),
        };

        let to_state = self.grid.apply_action(from_state, announced.action);
        let reward = self.grid.reward(to_state, &self.reward_schedule);
        self.engine.update_q_value(from_state, announced.action, reward, to_state)?;

        self.apply_transition(from_state, announced.action, announced.kind, to_state, reward, false)
            .map(Some)
    }

    /// Advance the agent and handle the episode boundary. Shared by normal
    /// steps and interventions so accounting happens in exactly one place.
    fn apply_transition(
        &mut self,
        from_state: State,
        action: Action,
        kind: ActionKind,
        to_state: State,
        reward: f64,
        intervention: bool,
    ) -> Result<StepOutcome> {
        self.agent.current_state = to_state;
        self.agent.steps += 1;
        self.agent.total_reward += reward;
        self.agent.last_reward = reward;

        let terminal = self.grid.is_terminal(to_state);
        let success = terminal && self.grid.cell_kind(to_state) == CellKind::Goal;
        if terminal {
            self.agent.is_done = true;
            self.finish_episode(success);
        } else {
            self.engine.choose_action(&self.grid, to_state)?;
            if self.status == SessionStatus::Running {
                self.schedule_step();
            }
        }

        Ok(StepOutcome {
            from_state,
            action,
            kind,
            to_state,
            reward,
            terminal,
            success,
            intervention,
        })
    }

    fn finish_episode(&mut self, success: bool) {
        self.totals.record_episode_end(
            success,
            self.agent.total_reward,
            self.agent.steps,
            self.episode_interventions,
        );
        self.episode_log.push(EpisodeRecord {
            episode: self.episode_log.len(),
            steps: self.agent.steps,
            reward: self.agent.total_reward,
            success,
            interventions: self.episode_interventions,
        });

        if let Some(handle) = self.pending_step.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = self.pending_reset.take() {
            self.scheduler.cancel(handle);
        }
        self.pending_reset = Some(self.scheduler.schedule_in(self.settle_delay, Task::EpisodeReset));
    }

    fn begin_episode(&mut self) -> Result<()> {
        self.agent = AgentState::at_start(self.grid.start_state());
        self.episode_interventions = 0;
        self.engine.clear_announcements();
        if self.status == SessionStatus::Running {
            self.engine.choose_action(&self.grid, self.agent.current_state)?;
            self.schedule_step();
        }
        Ok(())
    }

    fn schedule_step(&mut self) {
        if let Some(handle) = self.pending_step.take() {
            self.scheduler.cancel(handle);
        }
        self.pending_step = Some(self.scheduler.schedule_in(self.step_delay, Task::Step));
    }

    // Read model

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn agent_state(&self) -> &AgentState {
        &self.agent
    }

    pub fn episode_stats(&self) -> EpisodeStats {
        EpisodeStats::from(&self.totals)
    }

    pub(crate) fn running_totals(&self) -> &RunningTotals {
        &self.totals
    }

    pub fn q_table(&self) -> &QTable {
        self.engine.q_table()
    }

    pub fn q_table_stats(&self) -> QTableStats {
        self.engine.q_table_stats(&self.grid)
    }

    pub fn policy(&self) -> Vec<Action> {
        self.engine.policy(&self.grid)
    }

    /// Ordered, append-only intervention history.
    pub fn intervention_history(&self) -> &[InterventionRecord] {
        &self.history
    }

    /// Per-episode log, one record per completed episode.
    pub fn episode_log(&self) -> &[EpisodeRecord] {
        &self.episode_log
    }

    pub fn announced_action(&self, state: State) -> Option<&AnnouncedAction> {
        self.engine.announced_action(state)
    }

    pub fn grid(&self) -> &GridWorld {
        &self.grid
    }

    pub fn reward_schedule(&self) -> &RewardSchedule {
        &self.reward_schedule
    }

    pub fn learning_params(&self) -> &LearningParams {
        self.engine.params()
    }

    pub fn step_delay_ms(&self) -> u64 {
        self.step_delay
    }

    pub fn settle_delay_ms(&self) -> u64 {
        self.settle_delay
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }
}
