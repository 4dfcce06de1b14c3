//! Tile Puzzle State Library
//!
//! This crate provides the logic engine for a timed tile puzzle: a small
//! square grid of tiles must be put back in order, one adjacent swap at a
//! time, before a countdown runs out.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Board** - A permutation of tiles over grid cells, kept a bijection at
//!   all times, with move validation and the win check.
//!
//! - **Countdown** - A clock that ticks once per interval and expires exactly once.
//!
//! - **Input** - Arrow keys on the focused tile and swipes on the touched tile
//!   become move commands.
//!
//! - **Lifecycle** - `Idle → Playing → {AnimatingJoin → Revealed, TimedOut}`
//!   with validated transitions.
//!
//! # Design Principles
//!
//! 1. **One reducer** - Every change goes through `Session::reduce`, which returns
//!    the next state plus the timers and events it wants.
//!
//! 2. **Timers belong to a session** - Starting a new round cancels exactly the
//!    old round's pending tasks.
//!
//! 3. **No rendering** - This crate is pure state; collaborators drain events.
//!
//! 4. **Serialization-ready** - Snapshots and events convert to JSON for clients.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use tilepuzzle_state::{Direction, GameController, GamePhase, Permutation, PuzzleConfig};
//!
//! let mut game = GameController::new(PuzzleConfig::default()).unwrap();
//!
//! // tile0@1, tile1@0, tile2@3, tile3@2
//! let board = Permutation::from_positions(2, vec![1, 0, 3, 2]).unwrap();
//! game.initialize_with(board).unwrap();
//!
//! game.submit_move(1, Direction::Right);
//! game.advance(Duration::from_millis(150));
//! game.submit_move(3, Direction::Right);
//! game.advance(Duration::from_millis(150));
//! assert_eq!(game.phase(), GamePhase::AnimatingJoin);
//!
//! game.advance(Duration::from_secs(1));
//! assert_eq!(game.phase(), GamePhase::Revealed);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
