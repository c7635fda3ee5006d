//! Dependency injection container for the floe application.
//!
//! This module provides centralized dependency management following
//! hexagonal architecture principles. The container owns infrastructure
//! dependencies and provides factory methods for creating sessions.

use std::{path::Path, sync::Arc};

use super::config::SessionConfig;
use crate::{
    Result,
    adapters::JsonRepository,
    episode::EpisodeController,
    grid::GridWorld,
    ports::SnapshotRepository,
    q_learning::{LearningParams, QLearningEngine},
    random::{self, RandomSource},
    snapshot::SessionSnapshot,
};

/// Application with dependency injection.
///
/// Centralizes creation and wiring of dependencies. The snapshot repository
/// is owned here and injected wherever persistence is needed.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use floe::app::{App, SessionConfig};
///
/// let app = App::new();
/// let config = SessionConfig::named_map("4x4")?.with_seed(42);
/// let session = app.create_session(config)?;
/// # Ok::<(), floe::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use floe::adapters::InMemoryRepository;
/// use floe::app::App;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for session persistence
    repository: Arc<dyn SnapshotRepository + Send + Sync>,
    /// Default random seed (None = entropy per session)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults: a `JsonRepository` and no
    /// default seed.
    pub fn new() -> Self {
        Self {
            repository: Arc::new(JsonRepository::new()),
            default_seed: None,
        }
    }

    /// Create a builder for constructing an app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the snapshot repository.
    pub fn repository(&self) -> Arc<dyn SnapshotRepository + Send + Sync> {
        Arc::clone(&self.repository)
    }

    /// Create a new session from a configuration.
    ///
    /// The seed resolution order is: config seed, app default seed, fresh
    /// entropy. The resolved seed is recorded on the session so it stays
    /// reproducible either way.
    pub fn create_session(&self, config: SessionConfig) -> Result<EpisodeController> {
        config.validate()?;
        let grid = GridWorld::parse(&config.map)?;
        let params = LearningParams::for_grid(
            &grid,
            config.learning_rate,
            config.discount,
            config.exploration_rate,
        )?;
        let seed = config
            .seed
            .or(self.default_seed)
            .unwrap_or_else(random::entropy_seed);
        let engine = QLearningEngine::new(params, RandomSource::new(seed));
        Ok(EpisodeController::new(
            grid,
            engine,
            config.rule,
            config.reward_schedule,
            config.step_delay_ms,
            config.settle_delay_ms,
            seed,
        ))
    }

    /// Persist a session through the app's repository.
    pub fn save_session(&self, controller: &EpisodeController, path: &Path) -> Result<()> {
        self.repository.save(&SessionSnapshot::capture(controller), path)
    }

    /// Load and rebuild a session through the app's repository.
    pub fn restore_session(&self, path: &Path) -> Result<EpisodeController> {
        let snapshot = self.repository.load(path)?;
        Self::session_from_snapshot(snapshot)
    }

    /// Rebuild a session from an already-loaded snapshot.
    ///
    /// The Q-table, totals, and histories are restored as captured; the
    /// agent restarts at the start state and the random stream replays from
    /// the recorded seed.
    pub fn session_from_snapshot(snapshot: SessionSnapshot) -> Result<EpisodeController> {
        let grid = GridWorld::parse(&snapshot.map)?;
        if grid.state_count() != snapshot.params.state_count
            || grid.rows() != snapshot.params.rows
            || grid.cols() != snapshot.params.cols
        {
            return Err(crate::error::Error::QTableDimensionMismatch {
                expected_states: grid.state_count(),
                expected_actions: snapshot.params.action_count,
                got_states: snapshot.params.state_count,
                got_actions: snapshot.params.action_count,
            });
        }
        let engine = QLearningEngine::with_table(
            snapshot.params,
            RandomSource::new(snapshot.seed),
            snapshot.q_table,
        )?;
        Ok(EpisodeController::with_session_state(
            grid,
            engine,
            snapshot.rule,
            snapshot.reward_schedule,
            snapshot.step_delay_ms,
            snapshot.settle_delay_ms,
            snapshot.seed,
            snapshot.totals,
            snapshot.episode_log,
            snapshot.history,
        ))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for apps with custom dependencies, primarily for tests.
pub struct AppBuilder {
    repository: Option<Arc<dyn SnapshotRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    fn new() -> Self {
        Self {
            repository: None,
            default_seed: None,
        }
    }

    /// Use a custom repository implementation.
    pub fn with_repository<R>(mut self, repository: R) -> Self
    where
        R: SnapshotRepository + Send + Sync + 'static,
    {
        self.repository = Some(Arc::new(repository));
        self
    }

    /// Seed every session that does not carry its own seed.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    pub fn build(self) -> App {
        App {
            repository: self
                .repository
                .unwrap_or_else(|| Arc::new(JsonRepository::new())),
            default_seed: self.default_seed,
        }
    }
}
