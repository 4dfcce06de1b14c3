//! Game controller.
//!
//! The single entry point for presentation collaborators. It owns the current
//! [`Session`], the [`Scheduler`] holding that session's timers, and the
//! outbox of [`GameEvent`]s. Inbound calls become reducer events; the
//! reducer's effects are applied here.
//!
//! Time is driven by the host through [`GameController::advance`].

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::board::{Permutation, TileId};
use super::config::{ConfigError, PuzzleConfig};
use super::events::{GameEvent, SessionSnapshot};
use super::moves::{Direction, MoveCommand};
use super::phase::GamePhase;
use super::scheduler::{Scheduler, SessionId};
use super::session::{Effect, Event, Session};

/// Puzzle image loading status. Rounds start only once it is `Ready`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetStatus {
    Pending,
    #[default]
    Ready,
    Failed { reason: String },
}

/// Controller errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("puzzle assets are still loading")]
    AssetsPending,
    #[error("puzzle assets failed to load: {0}")]
    AssetsFailed(String),
    #[error("permutation is for a {got}x{got} grid, expected {expected}x{expected}")]
    GridMismatch { expected: usize, got: usize },
}

/// Top-level game controller.
#[derive(Debug)]
pub struct GameController {
    config: PuzzleConfig,
    rng: fastrand::Rng,
    assets: AssetStatus,
    session: Session,
    scheduler: Scheduler,
    next_session_id: SessionId,
    now: Duration,
    events: Vec<GameEvent>,
}

impl GameController {
    /// Create a controller with assets already available.
    pub fn new(config: PuzzleConfig) -> Result<Self, ConfigError> {
        Self::build(config, fastrand::Rng::new())
    }

    /// Create a controller with a seeded shuffle, for reproducible rounds.
    pub fn with_seed(config: PuzzleConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::build(config, fastrand::Rng::with_seed(seed))
    }

    fn build(config: PuzzleConfig, rng: fastrand::Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            grid_size = config.grid_size,
            duration = config.round_duration_secs,
            "Creating game controller"
        );
        Ok(Self {
            session: Session::new(&config),
            config,
            rng,
            assets: AssetStatus::Ready,
            scheduler: Scheduler::new(),
            next_session_id: 0,
            now: Duration::ZERO,
            events: Vec::new(),
        })
    }

    /// Gate initialization on the puzzle image loading.
    pub fn awaiting_assets(mut self) -> Self {
        self.assets = AssetStatus::Pending;
        self
    }

    /// The puzzle image finished loading.
    pub fn asset_loaded(&mut self) {
        if self.assets == AssetStatus::Pending {
            debug!("Assets ready");
            self.assets = AssetStatus::Ready;
        }
    }

    /// The puzzle image could not be loaded.
    pub fn asset_load_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(%reason, "Asset load failed");
        self.assets = AssetStatus::Failed {
            reason: reason.clone(),
        };
        self.events.push(GameEvent::AssetLoadFailed { reason });
    }

    pub fn asset_status(&self) -> &AssetStatus {
        &self.assets
    }

    /// Start a new round on a freshly shuffled board.
    ///
    /// Any previous round is torn down first: its timers are cancelled and
    /// its board, clock and transit state are discarded.
    pub fn initialize(&mut self) -> Result<SessionId, ControllerError> {
        self.check_assets()?;
        let permutation = Permutation::shuffled(self.config.grid_size, &mut self.rng);
        self.start_round(permutation)
    }

    /// Start a new round on a given board.
    pub fn initialize_with(
        &mut self,
        permutation: Permutation,
    ) -> Result<SessionId, ControllerError> {
        self.check_assets()?;
        if permutation.grid_size() != self.config.grid_size {
            return Err(ControllerError::GridMismatch {
                expected: self.config.grid_size,
                got: permutation.grid_size(),
            });
        }
        self.start_round(permutation)
    }

    fn check_assets(&self) -> Result<(), ControllerError> {
        match &self.assets {
            AssetStatus::Ready => Ok(()),
            AssetStatus::Pending => Err(ControllerError::AssetsPending),
            AssetStatus::Failed { reason } => Err(ControllerError::AssetsFailed(reason.clone())),
        }
    }

    #[instrument(skip(self, permutation), fields(previous = self.session.id))]
    fn start_round(&mut self, permutation: Permutation) -> Result<SessionId, ControllerError> {
        let cancelled = self.scheduler.cancel_session(self.session.id);
        self.next_session_id += 1;
        let session_id = self.next_session_id;
        info!(session_id, cancelled, board = %permutation, "Starting round");

        self.dispatch(Event::Initialize {
            session_id,
            permutation,
            started_at: chrono::Utc::now(),
        });
        Ok(session_id)
    }

    /// Submit a move for a tile.
    #[instrument(skip(self), fields(session_id = self.session.id))]
    pub fn submit_move(&mut self, tile_id: TileId, direction: Direction) {
        self.dispatch(Event::SubmitMove(MoveCommand::new(tile_id, direction)));
    }

    /// Record which tile holds keyboard focus.
    pub fn focus_tile(&mut self, tile_id: Option<TileId>) {
        self.dispatch(Event::Focus(tile_id));
    }

    /// Key press. `focused` is the tile holding focus when the key went down.
    pub fn on_key_down(&mut self, key: &str, focused: Option<TileId>) {
        self.dispatch(Event::Focus(focused));
        self.on_key_down_focused(key);
    }

    /// Key press attributed to the last reported focus.
    pub fn on_key_down_focused(&mut self, key: &str) {
        self.dispatch(Event::KeyDown(key.to_string()));
    }

    pub fn on_touch_start(&mut self, tile_id: TileId, x: f32, y: f32) {
        self.dispatch(Event::TouchStart { tile_id, x, y });
    }

    pub fn on_touch_end(&mut self, x: f32, y: f32) {
        self.dispatch(Event::TouchEnd { x, y });
    }

    /// Move virtual time forward, firing every task that comes due in order.
    pub fn advance(&mut self, elapsed: Duration) {
        let target = self.now + elapsed;
        while let Some(task) = self.scheduler.pop_due(target) {
            self.now = task.due;
            if task.session != self.session.id {
                warn!(task_session = task.session, "Dropping task for stale session");
                continue;
            }
            self.dispatch(Event::Timer(task.kind));
        }
        self.now = target;
    }

    /// Cancel all timers and return to Idle.
    #[instrument(skip(self), fields(session_id = self.session.id))]
    pub fn shutdown(&mut self) {
        let cancelled = self.scheduler.clear();
        debug!(cancelled, "Shutting down");
        self.dispatch(Event::Reset);
    }

    fn dispatch(&mut self, event: Event) {
        let transition = self.session.reduce(&event, &self.config);
        self.session = transition.session;
        let session_id = self.session.id;

        for effect in transition.effects {
            match effect {
                Effect::Emit(event) => {
                    match &event {
                        GameEvent::GameWon => {
                            info!(session_id, moves = self.session.moves, "Puzzle solved")
                        }
                        GameEvent::GameTimedOut => info!(session_id, "Time expired"),
                        _ => {}
                    }
                    self.events.push(event);
                }
                Effect::Schedule { kind, delay } => {
                    self.scheduler.schedule(session_id, kind, self.now + delay);
                }
                Effect::Cancel(kind) => {
                    self.scheduler.cancel(session_id, kind);
                }
            }
        }
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_id(&self) -> SessionId {
        self.session.id
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn permutation(&self) -> &Permutation {
        &self.session.permutation
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    /// Virtual time since the controller was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// When the next timer fires, if any is pending.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Number of pending timers.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.session.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::scheduler::TaskKind;
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller() -> GameController {
        GameController::with_seed(PuzzleConfig::default(), 5).unwrap()
    }

    /// tile0@pos1, tile1@pos0, tile2@pos3, tile3@pos2
    fn scenario_board() -> Permutation {
        Permutation::from_positions(2, vec![1, 0, 3, 2]).unwrap()
    }

    fn count(events: &[GameEvent], name: &str) -> usize {
        events.iter().filter(|e| e.name() == name).count()
    }

    #[test]
    fn test_controller_new() {
        let game = controller();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.pending_timers(), 0);
        assert!(GameController::new(PuzzleConfig::new().with_grid_size(1)).is_err());
    }

    #[test]
    fn test_huge_grid_is_refused_before_allocation() {
        let config = PuzzleConfig {
            grid_size: 100_000,
            ..PuzzleConfig::default()
        };
        assert!(matches!(
            GameController::new(config),
            Err(ConfigError::GridTooLarge(_))
        ));
    }

    #[test]
    fn test_initialize_starts_clock() {
        let mut game = controller();
        let id = game.initialize().unwrap();

        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.session_id(), id);
        assert!(game.permutation().is_bijection());
        assert_eq!(game.next_deadline(), Some(ms(1000)));

        let events = game.drain_events();
        assert_eq!(count(&events, "game_started"), 1);
        assert_eq!(count(&events, "state_changed"), 1);
    }

    #[test]
    fn test_scenario_a_first_swap() {
        let mut game = controller();
        game.initialize_with(scenario_board()).unwrap();

        // tile0 sits in the right column and cannot go further right
        game.submit_move(0, Direction::Right);
        assert!(matches!(
            game.drain_events().last(),
            Some(GameEvent::MoveRejected { .. })
        ));

        // The tile on its left moves right and swaps with it
        game.submit_move(1, Direction::Right);
        assert_eq!(game.snapshot().moving_tile, Some(1));
        game.advance(ms(149));
        assert_eq!(game.permutation().positions(), &[1, 0, 3, 2]);
        game.advance(ms(1));

        assert_eq!(game.permutation().positions(), &[0, 1, 3, 2]);
        assert!(!game.permutation().is_solved());
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.snapshot().moving_tile, None);
    }

    #[test]
    fn test_scenario_b_win_and_reveal() {
        let mut game = controller();
        game.initialize_with(scenario_board()).unwrap();
        game.submit_move(1, Direction::Right);
        game.advance(ms(150));
        game.submit_move(3, Direction::Right);
        game.advance(ms(150));

        assert_eq!(game.permutation().positions(), &[0, 1, 2, 3]);
        assert_eq!(game.phase(), GamePhase::AnimatingJoin);
        assert!(!game.session().clock.is_running());
        assert_eq!(game.snapshot().moves, 2);

        game.advance(ms(999));
        assert_eq!(game.phase(), GamePhase::AnimatingJoin);
        game.advance(ms(1));
        assert_eq!(game.phase(), GamePhase::Revealed);

        // Long after the round would have expired
        game.advance(Duration::from_secs(60));
        assert_eq!(game.phase(), GamePhase::Revealed);
        assert_eq!(game.pending_timers(), 0);

        let events = game.drain_events();
        assert_eq!(count(&events, "game_won"), 1);
        assert_eq!(count(&events, "game_timed_out"), 0);
    }

    #[test]
    fn test_scenario_c_timeout() {
        let mut game = controller();
        game.initialize_with(scenario_board()).unwrap();
        game.advance(Duration::from_secs(29));
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.session().clock.remaining_seconds, 1);

        game.advance(Duration::from_secs(1));
        assert_eq!(game.phase(), GamePhase::TimedOut);
        assert_eq!(game.session().clock.remaining_seconds, 0);

        let events = game.drain_events();
        assert_eq!(count(&events, "time_tick"), 30);
        assert_eq!(count(&events, "game_timed_out"), 1);

        game.submit_move(1, Direction::Right);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::MoveRejected {
                command: MoveCommand::new(1, Direction::Right),
                reason: crate::state::moves::MoveRejection::NotPlaying {
                    phase: GamePhase::TimedOut
                },
            }]
        );
        assert_eq!(game.permutation().positions(), &[1, 0, 3, 2]);

        game.advance(Duration::from_secs(60));
        assert_eq!(count(&game.drain_events(), "game_timed_out"), 0);
    }

    #[test]
    fn test_timeout_preempts_transit() {
        let mut game = controller();
        game.initialize_with(scenario_board()).unwrap();
        game.advance(ms(29_900));
        game.submit_move(1, Direction::Right);
        game.advance(ms(100));

        assert_eq!(game.phase(), GamePhase::TimedOut);
        assert_eq!(game.snapshot().moving_tile, None);
        game.advance(ms(100));
        assert_eq!(game.permutation().positions(), &[1, 0, 3, 2]);
    }

    #[test]
    fn test_commits_are_serialized() {
        let mut game = controller();
        game.initialize_with(scenario_board()).unwrap();
        game.submit_move(1, Direction::Right);
        game.advance(ms(50));
        game.submit_move(3, Direction::Right);

        // Second swap waits a full window after the first commit
        game.advance(ms(100));
        assert_eq!(game.permutation().positions(), &[0, 1, 3, 2]);
        assert_eq!(game.snapshot().moving_tile, Some(3));
        game.advance(ms(149));
        assert_eq!(game.permutation().positions(), &[0, 1, 3, 2]);
        game.advance(ms(1));
        assert_eq!(game.phase(), GamePhase::AnimatingJoin);
    }

    #[test]
    fn test_reinitialize_cancels_old_timers() {
        let mut game = controller();
        let first = game.initialize_with(scenario_board()).unwrap();
        game.submit_move(1, Direction::Right);
        game.advance(ms(100));

        let second = game.initialize_with(scenario_board()).unwrap();
        assert_ne!(first, second);
        assert_eq!(game.pending_timers(), 1);

        // The old commit never lands on the new board
        game.advance(ms(200));
        assert_eq!(game.permutation().positions(), &[1, 0, 3, 2]);
        assert_eq!(game.snapshot().moves, 0);

        // The new clock counts from its own start
        game.drain_events();
        game.advance(ms(800));
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::TimeTick {
                remaining_seconds: 29
            }]
        );
    }

    #[test]
    fn test_play_again_after_timeout() {
        let mut game = controller();
        game.initialize().unwrap();
        game.advance(Duration::from_secs(30));
        assert_eq!(game.phase(), GamePhase::TimedOut);

        game.initialize().unwrap();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.session().clock.remaining_seconds, 30);
    }

    #[test]
    fn test_keyboard_routing() {
        let mut game = controller();
        game.initialize_with(scenario_board()).unwrap();
        game.drain_events();

        // No focus: nothing happens
        game.on_key_down("ArrowRight", None);
        assert!(game.drain_events().is_empty());

        game.on_key_down("ArrowRight", Some(1));
        assert_eq!(game.snapshot().moving_tile, Some(1));
        assert_eq!(game.snapshot().focused_tile, Some(1));

        game.advance(ms(150));
        game.focus_tile(Some(3));
        game.on_key_down_focused("ArrowRight");
        game.advance(ms(150));
        assert_eq!(game.phase(), GamePhase::AnimatingJoin);
    }

    #[test]
    fn test_swipe_routing() {
        let mut game = controller();
        game.initialize_with(scenario_board()).unwrap();

        game.on_touch_start(1, 100.0, 100.0);
        game.on_touch_end(129.0, 100.0);
        assert_eq!(game.snapshot().moving_tile, None);

        // Touch end without a start
        game.on_touch_end(200.0, 100.0);
        assert_eq!(game.snapshot().moving_tile, None);

        game.on_touch_start(1, 100.0, 100.0);
        game.on_touch_end(131.0, 100.0);
        assert_eq!(game.snapshot().moving_tile, Some(1));
    }

    #[test]
    fn test_asset_gate() {
        let mut game = controller().awaiting_assets();
        assert_eq!(game.initialize(), Err(ControllerError::AssetsPending));
        assert_eq!(game.phase(), GamePhase::Idle);

        game.asset_loaded();
        assert!(game.initialize().is_ok());

        let mut game = controller().awaiting_assets();
        game.asset_load_failed("404");
        assert_eq!(
            game.initialize(),
            Err(ControllerError::AssetsFailed("404".to_string()))
        );
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::AssetLoadFailed {
                reason: "404".to_string()
            }]
        );
    }

    #[test]
    fn test_grid_mismatch() {
        let mut game = controller();
        assert_eq!(
            game.initialize_with(Permutation::solved(3)),
            Err(ControllerError::GridMismatch {
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn test_shutdown() {
        let mut game = controller();
        game.initialize().unwrap();
        game.submit_move(0, Direction::Down);
        game.shutdown();

        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.pending_timers(), 0);
        assert!(!game.session().clock.is_running());
    }

    #[test]
    fn test_larger_grid() {
        let config = PuzzleConfig::new().with_grid_size(3).with_round_duration(60);
        let mut game = GameController::with_seed(config, 11).unwrap();
        let mut board = Permutation::solved(3);
        board.swap(4, 5);
        game.initialize_with(board).unwrap();

        // tile4 sits at 5; moving it left restores the board
        game.submit_move(4, Direction::Left);
        game.advance(ms(150));
        assert_eq!(game.phase(), GamePhase::AnimatingJoin);
        assert!(game
            .scheduler
            .has_pending(game.session_id(), TaskKind::RevealWin));
    }

    #[test]
    fn test_snapshot_json() {
        let mut game = controller();
        game.initialize_with(scenario_board()).unwrap();
        let json = game.to_json();
        assert_eq!(json["phase"], "playing");
        assert_eq!(json["positions"], serde_json::json!([1, 0, 3, 2]));
        assert_eq!(json["formatted_time"], "0:30");
    }
}
