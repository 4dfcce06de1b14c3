//! Session state and reducer.
//!
//! A [`Session`] is one round: board, clock, input, phase and the move in
//! transit. [`Session::reduce`] is the only way to change it. It takes the
//! current snapshot and an [`Event`] and returns the next snapshot plus the
//! [`Effect`]s the owner must carry out (emit an event, schedule or cancel a
//! timer). It never reads wall time or randomness.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::board::{Permutation, Position, TileId};
use super::clock::{GameClock, Tick};
use super::config::PuzzleConfig;
use super::events::{GameEvent, SessionSnapshot};
use super::input::InputTranslator;
use super::moves::{self, MoveCommand, MoveRejection};
use super::phase::{GamePhase, PhaseEvent};
use super::scheduler::{SessionId, TaskKind};

/// Inbound events.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Replace the session with a fresh round on `permutation`
    Initialize {
        session_id: SessionId,
        permutation: Permutation,
        started_at: DateTime<Utc>,
    },
    /// Tear the round down to Idle
    Reset,
    SubmitMove(MoveCommand),
    /// Keyboard focus moved to a tile, or away from all tiles
    Focus(Option<TileId>),
    KeyDown(String),
    TouchStart { tile_id: TileId, x: f32, y: f32 },
    TouchEnd { x: f32, y: f32 },
    /// A scheduled task fired
    Timer(TaskKind),
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Emit(GameEvent),
    Schedule { kind: TaskKind, delay: Duration },
    Cancel(TaskKind),
}

/// Result of reducing one event.
#[derive(Debug, Clone)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl Transition {
    /// Events emitted by this transition.
    pub fn events(&self) -> impl Iterator<Item = &GameEvent> {
        self.effects.iter().filter_map(|e| match e {
            Effect::Emit(event) => Some(event),
            _ => None,
        })
    }
}

/// A move inside its transit window. The swap is not committed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transit {
    pub command: MoveCommand,
    pub from: Position,
    pub to: Position,
}

/// One round of the puzzle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub phase: GamePhase,
    pub permutation: Permutation,
    pub clock: GameClock,
    pub input: InputTranslator,

    /// Move waiting for its commit
    pub transit: Option<Transit>,

    /// Accepted moves waiting for the current transit to finish
    pub queued: VecDeque<MoveCommand>,

    /// Committed swaps
    pub moves: u32,

    pub started_at: Option<DateTime<Utc>>,
}

impl Session {
    /// An idle session on a solved board.
    pub fn new(config: &PuzzleConfig) -> Self {
        Self::with_permutation(0, Permutation::solved(config.grid_size), config)
    }

    fn with_permutation(id: SessionId, permutation: Permutation, config: &PuzzleConfig) -> Self {
        Self {
            id,
            phase: GamePhase::Idle,
            permutation,
            clock: GameClock::new(config.round_duration_secs),
            input: InputTranslator::new(config.swipe_threshold_px),
            transit: None,
            queued: VecDeque::new(),
            moves: 0,
            started_at: None,
        }
    }

    /// Compute the next state for an event.
    pub fn reduce(&self, event: &Event, config: &PuzzleConfig) -> Transition {
        let mut next = self.clone();
        let mut effects = Vec::new();
        next.handle(event, config, &mut effects);
        Transition {
            session: next,
            effects,
        }
    }

    /// Tile currently inside its transit window.
    pub fn moving_tile(&self) -> Option<TileId> {
        self.transit.map(|t| t.command.tile_id)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            phase: self.phase,
            grid_size: self.permutation.grid_size(),
            positions: self.permutation.positions().to_vec(),
            remaining_seconds: self.clock.remaining_seconds,
            formatted_time: self.clock.formatted(),
            time_progress: self.clock.progress_percent(),
            moving_tile: self.moving_tile(),
            queued_moves: self.queued.len(),
            focused_tile: self.input.focused_tile(),
            moves: self.moves,
            started_at: self.started_at,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.snapshot().to_json()
    }

    fn handle(&mut self, event: &Event, config: &PuzzleConfig, fx: &mut Vec<Effect>) {
        match event {
            Event::Initialize {
                session_id,
                permutation,
                started_at,
            } => self.initialize(*session_id, permutation.clone(), *started_at, config, fx),
            Event::Reset => self.reset(fx),
            Event::SubmitMove(command) => self.submit(*command, config, fx),
            Event::Focus(tile_id) => self.input.set_focus(*tile_id),
            Event::KeyDown(key) => {
                if let Some(command) = self.input.key_down(key) {
                    self.submit(command, config, fx);
                }
            }
            Event::TouchStart { tile_id, x, y } => {
                if self.phase.is_playing() {
                    self.input.touch_start(*tile_id, *x, *y);
                }
            }
            Event::TouchEnd { x, y } => {
                if let Some(command) = self.input.touch_end(*x, *y) {
                    self.submit(command, config, fx);
                }
            }
            Event::Timer(TaskKind::ClockTick) => self.tick(config, fx),
            Event::Timer(TaskKind::CommitMove) => self.commit(config, fx),
            Event::Timer(TaskKind::RevealWin) => self.reveal(fx),
        }
    }

    fn initialize(
        &mut self,
        id: SessionId,
        permutation: Permutation,
        started_at: DateTime<Utc>,
        config: &PuzzleConfig,
        fx: &mut Vec<Effect>,
    ) {
        *self = Self::with_permutation(id, permutation, config);
        if !self.transition(PhaseEvent::Start) {
            return;
        }
        self.clock.start(config.round_duration_secs);
        self.started_at = Some(started_at);

        fx.push(Effect::Schedule {
            kind: TaskKind::ClockTick,
            delay: config.tick_interval(),
        });
        fx.push(Effect::Emit(GameEvent::GameStarted { session_id: id }));
        self.emit_state(fx);
    }

    fn reset(&mut self, fx: &mut Vec<Effect>) {
        tracing::debug!(
            session_id = self.id,
            finished = self.phase.is_over(),
            won = self.phase.is_won(),
            moves = self.moves,
            "Resetting session"
        );
        self.transition(PhaseEvent::Reset);
        self.clock.stop();
        self.discard_pending_moves();
        for kind in [TaskKind::ClockTick, TaskKind::CommitMove, TaskKind::RevealWin] {
            fx.push(Effect::Cancel(kind));
        }
        self.emit_state(fx);
    }

    fn submit(&mut self, command: MoveCommand, config: &PuzzleConfig, fx: &mut Vec<Effect>) {
        if !self.phase.is_playing() {
            reject(command, MoveRejection::NotPlaying { phase: self.phase }, fx);
            return;
        }

        let target = match moves::validate(&self.permutation, command.tile_id, command.direction)
        {
            Ok(target) => target,
            Err(reason) => {
                reject(command, reason, fx);
                return;
            }
        };

        if self.transit.is_some() {
            if self.queued.len() >= config.max_queued_moves {
                let limit = config.max_queued_moves;
                reject(command, MoveRejection::QueueFull { limit }, fx);
                return;
            }
            tracing::trace!(tile_id = command.tile_id, "Queueing move behind transit");
            self.queued.push_back(command);
            self.emit_state(fx);
        } else {
            self.begin_transit(command, target, config, fx);
        }
    }

    fn begin_transit(
        &mut self,
        command: MoveCommand,
        to: Position,
        config: &PuzzleConfig,
        fx: &mut Vec<Effect>,
    ) {
        let Some(from) = self.permutation.position_of(command.tile_id) else {
            reject(
                command,
                MoveRejection::UnknownTile {
                    tile_id: command.tile_id,
                },
                fx,
            );
            return;
        };
        self.transit = Some(Transit { command, from, to });
        fx.push(Effect::Schedule {
            kind: TaskKind::CommitMove,
            delay: config.transit_delay(),
        });
        self.emit_state(fx);
    }

    /// Start the next queued move, re-resolving it against the settled board.
    fn start_next_queued(&mut self, config: &PuzzleConfig, fx: &mut Vec<Effect>) {
        while let Some(command) = self.queued.pop_front() {
            match moves::validate(&self.permutation, command.tile_id, command.direction) {
                Ok(target) => {
                    self.begin_transit(command, target, config, fx);
                    return;
                }
                Err(reason) => reject(command, reason, fx),
            }
        }
    }

    fn commit(&mut self, config: &PuzzleConfig, fx: &mut Vec<Effect>) {
        if !self.phase.is_playing() {
            return;
        }
        let Some(transit) = self.transit.take() else {
            return;
        };

        self.permutation.swap(transit.from, transit.to);
        self.moves += 1;
        tracing::debug!(
            tile_id = transit.command.tile_id,
            from = transit.from,
            to = transit.to,
            moves = self.moves,
            misplaced = self.permutation.misplaced(),
            "Committed move"
        );

        if self.permutation.is_solved() {
            self.win(config, fx);
        } else {
            self.emit_state(fx);
            self.start_next_queued(config, fx);
        }
    }

    fn win(&mut self, config: &PuzzleConfig, fx: &mut Vec<Effect>) {
        if !self.transition(PhaseEvent::Solve) {
            return;
        }
        self.clock.stop();
        self.discard_pending_moves();

        fx.push(Effect::Cancel(TaskKind::ClockTick));
        fx.push(Effect::Cancel(TaskKind::CommitMove));
        fx.push(Effect::Schedule {
            kind: TaskKind::RevealWin,
            delay: config.reveal_delay(),
        });
        self.emit_state(fx);
        fx.push(Effect::Emit(GameEvent::GameWon));
    }

    fn reveal(&mut self, fx: &mut Vec<Effect>) {
        if self.phase != GamePhase::AnimatingJoin {
            return;
        }
        if self.transition(PhaseEvent::Reveal) {
            self.emit_state(fx);
        }
    }

    fn tick(&mut self, config: &PuzzleConfig, fx: &mut Vec<Effect>) {
        if !self.phase.is_playing() {
            return;
        }

        match self.clock.tick() {
            Tick::Counting { remaining } => {
                fx.push(Effect::Emit(GameEvent::TimeTick {
                    remaining_seconds: remaining,
                }));
                fx.push(Effect::Schedule {
                    kind: TaskKind::ClockTick,
                    delay: config.tick_interval(),
                });
            }
            Tick::Expired => {
                fx.push(Effect::Emit(GameEvent::TimeTick {
                    remaining_seconds: 0,
                }));
                if !self.transition(PhaseEvent::Expire) {
                    return;
                }
                self.discard_pending_moves();
                fx.push(Effect::Cancel(TaskKind::CommitMove));
                self.emit_state(fx);
                fx.push(Effect::Emit(GameEvent::GameTimedOut));
            }
            Tick::Inactive => {}
        }
    }

    /// Drop the move in transit, queued moves and any half-finished swipe.
    fn discard_pending_moves(&mut self) {
        self.transit = None;
        self.queued.clear();
        self.input.cancel_touch();
    }

    fn transition(&mut self, event: PhaseEvent) -> bool {
        match self.phase.apply(event) {
            Ok(phase) => {
                tracing::debug!(
                    session_id = self.id,
                    from = %self.phase,
                    to = %phase,
                    "Phase transition"
                );
                self.phase = phase;
                true
            }
            Err(err) => {
                tracing::warn!(session_id = self.id, error = %err, "Ignoring phase event");
                false
            }
        }
    }

    fn emit_state(&self, fx: &mut Vec<Effect>) {
        fx.push(Effect::Emit(GameEvent::StateChanged {
            phase: self.phase,
            snapshot: self.snapshot(),
        }));
    }
}

fn reject(command: MoveCommand, reason: MoveRejection, fx: &mut Vec<Effect>) {
    tracing::debug!(
        tile_id = command.tile_id,
        direction = %command.direction,
        %reason,
        "Move rejected"
    );
    fx.push(Effect::Emit(GameEvent::MoveRejected { command, reason }));
}
