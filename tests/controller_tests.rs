//! Integration tests for the episode state machine and interventions

use floe::{
    Action, ActionKind, CellKind, InterventionRule, RewardSchedule, SessionStatus,
    app::{App, SessionConfig},
    error::Error,
};

/// Corridor session: `SFFG`, rewards [-10, 10, 0], α = 0.5, γ = 0.9.
///
/// With ε = 0 and seed 42 the exploitation tie-breaks resolve to Right at
/// every state, so the agent walks deterministically to the goal in three
/// steps.
fn corridor_session(rule: InterventionRule) -> floe::EpisodeController {
    let app = App::for_testing().build();
    let config = SessionConfig::named_map("1x4")
        .unwrap()
        .with_reward_schedule(RewardSchedule::new(-10.0, 10.0, 0.0))
        .with_exploration_rate(0.0)
        .with_seed(42)
        .with_rule(rule);
    app.create_session(config).unwrap()
}

#[test]
fn test_start_announces_action_for_start_state() {
    let mut session = corridor_session(InterventionRule::Suggestion);
    assert!(session.announced_action(0).is_none());

    session.start().unwrap();
    let announced = session.announced_action(0).unwrap();
    assert_eq!(announced.action, Action::Right);
    assert_eq!(announced.kind, ActionKind::Exploitation);
    assert_eq!(session.status(), SessionStatus::Running);
}

#[test]
fn test_corridor_walk_reaches_goal_in_three_steps() {
    let mut session = corridor_session(InterventionRule::Suggestion);
    session.start().unwrap();

    let first = session.step().unwrap().unwrap();
    assert_eq!((first.from_state, first.to_state), (0, 1));
    assert_eq!(first.action, Action::Right);
    assert_eq!(first.reward, 0.0);

    let second = session.step().unwrap().unwrap();
    assert_eq!((second.from_state, second.to_state), (1, 2));
    assert_eq!(second.action, Action::Right);

    let third = session.step().unwrap().unwrap();
    assert_eq!((third.from_state, third.to_state), (2, 3));
    assert_eq!(third.reward, 10.0);
    assert!(third.terminal);
    assert!(third.success);

    let agent = session.agent_state();
    assert!(agent.is_done);
    assert_eq!(agent.current_state, 3);
    assert_eq!(agent.steps, 3);
    assert_eq!(agent.total_reward, 10.0);
    assert_eq!(agent.last_reward, 10.0);

    // Final Bellman update: 0 + 0.5 * (10 + 0.9 * max Q[3] - 0) = 5.
    assert_eq!(session.q_table().get(2, Action::Right.index()), 5.0);
    assert_eq!(session.q_table().get(0, Action::Right.index()), 0.0);
    assert_eq!(session.q_table().get(1, Action::Right.index()), 0.0);

    let stats = session.episode_stats();
    assert_eq!(stats.episodes, 1);
    assert_eq!(stats.successes, 1);
    assert_eq!(stats.success_rate, 1.0);
    assert_eq!(stats.total_steps, 3);
}

#[test]
fn test_step_is_no_op_without_announcement() {
    let mut session = corridor_session(InterventionRule::Suggestion);
    // Not started: nothing announced yet.
    assert!(session.step().unwrap().is_none());
    assert_eq!(session.agent_state().steps, 0);
}

#[test]
fn test_automatic_ticking_and_episode_reset() {
    let mut session = corridor_session(InterventionRule::Suggestion);
    session.start().unwrap();

    // Steps fire at 500 ms intervals: 500, 1000, 1500.
    let outcomes = session.advance(1_500).unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(session.agent_state().is_done);
    assert_eq!(session.episode_stats().episodes, 1);

    // The settle delay has not elapsed yet.
    let outcomes = session.advance(999).unwrap();
    assert!(outcomes.is_empty());
    assert!(session.agent_state().is_done);

    // Reset fires at 2500 ms; a fresh episode begins with an announcement.
    session.advance(1).unwrap();
    let agent = session.agent_state();
    assert!(!agent.is_done);
    assert_eq!(agent.current_state, 0);
    assert_eq!(agent.steps, 0);
    assert!(session.announced_action(0).is_some());

    // Still running, so the walk continues into the second episode.
    let outcomes = session.advance(500).unwrap();
    assert_eq!(outcomes.len(), 1);
}

#[test]
fn test_pause_freezes_timer_and_preserves_announcement() {
    let mut session = corridor_session(InterventionRule::Suggestion);
    session.start().unwrap();
    session.pause();
    assert_eq!(session.status(), SessionStatus::Paused);

    let announced = *session.announced_action(0).unwrap();
    let outcomes = session.advance(10_000).unwrap();
    assert!(outcomes.is_empty());
    assert_eq!(session.agent_state().steps, 0);
    assert_eq!(*session.announced_action(0).unwrap(), announced);

    // Resuming picks the preserved announcement back up.
    session.start().unwrap();
    let outcomes = session.advance(500).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].action, announced.action);
}

#[test]
fn test_reset_cancels_pending_episode_restart() {
    let mut session = corridor_session(InterventionRule::Suggestion);
    session.start().unwrap();
    session.advance(1_500).unwrap();
    assert!(session.agent_state().is_done);

    // Reset mid-settle: the pending restart must not resurrect anything.
    session.reset();
    assert_eq!(session.status(), SessionStatus::Stopped);

    let outcomes = session.advance(60_000).unwrap();
    assert!(outcomes.is_empty());
    assert_eq!(session.episode_stats().episodes, 0);
    assert!(session.episode_log().is_empty());
    assert!(session.intervention_history().is_empty());
    assert!(!session.agent_state().is_done);
    assert_eq!(session.agent_state().current_state, 0);

    // The Q-table survives a session reset.
    assert_eq!(session.q_table().get(2, Action::Right.index()), 5.0);

    session.reset_q_table();
    assert!(session.q_table().values().iter().all(|&v| v == 0.0));
}

#[test]
fn test_intervene_applies_rule_against_announced_action() {
    let mut session = corridor_session(InterventionRule::Impede);
    session.start().unwrap();

    let outcome = session.intervene(0, 2).unwrap();
    assert!(outcome.intervention);
    assert_eq!((outcome.from_state, outcome.to_state), (0, 2));
    assert_eq!(outcome.action, Action::Right);

    // Impede: 0.5 * (-1 + 0.9 * 0 - 0) = -0.5 on the announced action.
    assert_eq!(session.q_table().get(0, Action::Right.index()), -0.5);

    let agent = session.agent_state();
    assert_eq!(agent.current_state, 2);
    assert_eq!(agent.steps, 1);
    assert!(!agent.is_done);

    let record = session.intervention_history()[0];
    assert_eq!(record.from_state, 0);
    assert_eq!(record.to_state, 2);
    assert_eq!(record.rule, InterventionRule::Impede);
    assert_eq!(record.action, Action::Right);
    assert_eq!(record.action_kind, ActionKind::Exploitation);
    assert_eq!(record.reward, 0.0);

    // A new action was announced for the destination.
    assert!(session.announced_action(2).is_some());
}

#[test]
fn test_intervention_onto_goal_terminates_episode() {
    let mut session = corridor_session(InterventionRule::Reset);
    session.start().unwrap();

    session.intervene(0, 2).unwrap();
    let outcome = session.intervene(2, 3).unwrap();
    assert!(outcome.terminal);
    assert!(outcome.success);
    assert_eq!(outcome.reward, 10.0);

    let stats = session.episode_stats();
    assert_eq!(stats.episodes, 1);
    assert_eq!(stats.successes, 1);
    assert_eq!(stats.total_interventions, 2);
    assert_eq!(session.episode_log()[0].interventions, 2);

    // The settle delay restarts the episode just like a normal ending.
    session.advance(1_000).unwrap();
    assert!(!session.agent_state().is_done);
    assert_eq!(session.agent_state().current_state, 0);
}

#[test]
fn test_intervene_rejects_mismatched_source() {
    let mut session = corridor_session(InterventionRule::Suggestion);
    session.start().unwrap();

    let before = session.q_table().clone();
    let result = session.intervene(1, 2);
    assert!(matches!(
        result,
        Err(Error::InterventionMismatch {
            expected: 0,
            got: 1
        })
    ));
    assert_eq!(session.q_table(), &before);
    assert!(session.intervention_history().is_empty());
    assert_eq!(session.agent_state().steps, 0);
}

#[test]
fn test_intervene_rejects_out_of_range_target() {
    let mut session = corridor_session(InterventionRule::Suggestion);
    session.start().unwrap();
    assert!(matches!(
        session.intervene(0, 9),
        Err(Error::StateOutOfRange { state: 9, .. })
    ));
    assert!(session.intervention_history().is_empty());
}

#[test]
fn test_intervene_requires_announced_action() {
    let mut session = corridor_session(InterventionRule::Suggestion);
    // Never started: no announcement exists for the start state.
    assert!(matches!(
        session.intervene(0, 1),
        Err(Error::NoAnnouncedAction { state: 0 })
    ));

    // After the episode ends, the terminal state has no announcement either.
    session.start().unwrap();
    session.advance(1_500).unwrap();
    assert!(session.agent_state().is_done);
    assert!(matches!(
        session.intervene(3, 1),
        Err(Error::NoAnnouncedAction { state: 3 })
    ));
}

#[test]
fn test_interrupt_rule_discards_timestep_but_moves_agent() {
    let mut session = corridor_session(InterventionRule::Interrupt);
    session.start().unwrap();

    let before = session.q_table().clone();
    session.intervene(0, 1).unwrap();

    // The table is bit-identical; the relocation itself still happened.
    for (a, b) in session.q_table().values().iter().zip(before.values()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert_eq!(session.agent_state().current_state, 1);
    assert_eq!(session.intervention_history().len(), 1);
}

#[test]
fn test_suggestion_rule_reinforces_direction_of_relocation() {
    let app = App::for_testing().build();
    let config = SessionConfig::named_map("4x4")
        .unwrap()
        .with_exploration_rate(0.0)
        .with_seed(42)
        .with_rule(InterventionRule::Suggestion);
    let mut session = app.create_session(config).unwrap();
    session.start().unwrap();

    // 0 -> 2 is purely horizontal; Right gets the +1 shaping signal.
    session.intervene(0, 2).unwrap();
    assert_eq!(session.q_table().get(0, Action::Right.index()), 0.5);
    assert_eq!(session.q_table().get(0, Action::Down.index()), 0.0);
    assert_eq!(session.q_table().get(0, Action::Up.index()), 0.0);
}

#[test]
fn test_set_intervention_rule_switches_behavior() {
    let mut session = corridor_session(InterventionRule::Interrupt);
    session.start().unwrap();

    session.set_intervention_rule(InterventionRule::Impede);
    assert_eq!(session.intervention_rule(), InterventionRule::Impede);

    session.intervene(0, 1).unwrap();
    assert_eq!(session.q_table().get(0, Action::Right.index()), -0.5);
    assert_eq!(
        session.intervention_history()[0].rule,
        InterventionRule::Impede
    );
}

#[test]
fn test_hole_episode_counts_as_failure() {
    let app = App::for_testing().build();
    let config = SessionConfig::named_map("4x4")
        .unwrap()
        .with_exploration_rate(0.0)
        .with_seed(42)
        .with_rule(InterventionRule::Reset);
    let mut session = app.create_session(config).unwrap();
    session.start().unwrap();

    // Relocate straight into the hole at state 5.
    let outcome = session.intervene(0, 5).unwrap();
    assert!(outcome.terminal);
    assert!(!outcome.success);
    assert_eq!(session.grid().cell_kind(5), CellKind::Hole);
    assert_eq!(outcome.reward, -10.0);

    let stats = session.episode_stats();
    assert_eq!(stats.episodes, 1);
    assert_eq!(stats.successes, 0);
    assert_eq!(stats.success_rate, 0.0);
}
