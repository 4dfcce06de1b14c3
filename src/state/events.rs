//! Outbound events.
//!
//! Everything a renderer or notifier needs to know arrives as a
//! [`GameEvent`]. None of these are errors; a rejected move is feedback only.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::board::{Position, TileId};
use super::moves::{MoveCommand, MoveRejection};
use super::phase::GamePhase;
use super::scheduler::SessionId;

/// Events emitted by the controller, in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A new round began
    GameStarted { session_id: SessionId },

    /// Phase, board or transit state changed
    StateChanged {
        phase: GamePhase,
        snapshot: SessionSnapshot,
    },

    /// A move was refused and nothing changed
    MoveRejected {
        command: MoveCommand,
        reason: MoveRejection,
    },

    /// The countdown ticked
    TimeTick { remaining_seconds: u32 },

    /// Puzzle solved before the countdown ran out
    GameWon,

    /// Countdown reached zero first
    GameTimedOut,

    /// The puzzle image could not be loaded; no round can start
    AssetLoadFailed { reason: String },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GameStarted { .. } => "game_started",
            Self::StateChanged { .. } => "state_changed",
            Self::MoveRejected { .. } => "move_rejected",
            Self::TimeTick { .. } => "time_tick",
            Self::GameWon => "game_won",
            Self::GameTimedOut => "game_timed_out",
            Self::AssetLoadFailed { .. } => "asset_load_failed",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"type": self.name()}))
    }
}

/// Everything a renderer needs to draw one frame of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub phase: GamePhase,
    pub grid_size: usize,
    /// Current cell of each tile, indexed by tile id
    pub positions: Vec<Position>,
    pub remaining_seconds: u32,
    pub formatted_time: String,
    /// Remaining time as a percentage of the round
    pub time_progress: f32,
    /// Tile whose move is inside its transit window
    pub moving_tile: Option<TileId>,
    pub queued_moves: usize,
    pub focused_tile: Option<TileId>,
    /// Committed swaps this round
    pub moves: u32,
    pub started_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
