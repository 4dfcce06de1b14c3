//! State management module for the tile puzzle.
//!
//! This module provides the core state types:
//!
//! - `config` - Round parameters (grid size, durations, swipe threshold)
//! - `board` - Tile permutation and win check
//! - `moves` - Directions, move commands and move validation
//! - `clock` - Countdown clock
//! - `input` - Keyboard and swipe translation
//! - `phase` - Lifecycle state machine
//! - `scheduler` - Cancellable delayed tasks keyed by session
//! - `session` - Per-round state and the reducer
//! - `events` - Outbound events and snapshots
//! - `controller` - The entry point collaborators talk to
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                          GameController                              │
//! │                                                                      │
//! │   inbound calls ──▶ Event ──▶ Session::reduce ──▶ (Session, Effects) │
//! │                                                          │           │
//! │        ┌─────────────────────┬───────────────────────────┤           │
//! │        ▼                     ▼                           ▼           │
//! │  ┌───────────┐      ┌─────────────────┐        ┌─────────────────┐   │
//! │  │  outbox   │      │    Scheduler    │        │     Session     │   │
//! │  │ GameEvent │      │ (session, kind) │        │ Permutation     │   │
//! │  │           │      │   → due time    │        │ GameClock       │   │
//! │  └───────────┘      └────────┬────────┘        │ InputTranslator │   │
//! │                              │ advance()       │ GamePhase       │   │
//! │                              └──▶ Event::Timer │ Transit / queue │   │
//! │                                                └─────────────────┘   │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//! use tilepuzzle_state::state::{
//!     controller::GameController, config::PuzzleConfig, moves::Direction, phase::GamePhase,
//! };
//!
//! let mut game = GameController::new(PuzzleConfig::default()).unwrap();
//! game.initialize().unwrap();
//! assert_eq!(game.phase(), GamePhase::Playing);
//!
//! game.submit_move(0, Direction::Down);
//! game.advance(Duration::from_millis(150));
//!
//! for event in game.drain_events() {
//!     println!("{}", event.to_json());
//! }
//! ```

pub mod board;
pub mod clock;
pub mod config;
pub mod controller;
pub mod events;
pub mod input;
pub mod moves;
pub mod phase;
pub mod scheduler;
pub mod session;

// Re-export commonly used types
pub use board::{is_solved, Permutation, Position, Tile, TileId};
pub use clock::{format_time, ClockStatus, GameClock, Tick};
pub use config::{ConfigError, PuzzleConfig};
pub use controller::{AssetStatus, ControllerError, GameController};
pub use events::{GameEvent, SessionSnapshot};
pub use input::{ArrowKey, InputTranslator, SwipeGesture};
pub use moves::{validate, Direction, MoveCommand, MoveRejection};
pub use phase::{GamePhase, InvalidTransition, PhaseEvent};
pub use scheduler::{ScheduledTask, Scheduler, SessionId, TaskKind};
pub use session::{Effect, Event, Session, Transition};
