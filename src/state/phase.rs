//! Game lifecycle state machine.
//!
//! Tracks where a round is and validates transitions.
//!
//! # State Diagram
//!
//! ```text
//! ┌──────┐  start  ┌─────────┐  solve  ┌───────────────┐  reveal  ┌──────────┐
//! │ Idle │────────▶│ Playing │────────▶│ AnimatingJoin │─────────▶│ Revealed │
//! └──────┘         └────┬────┘         └───────────────┘          └──────────┘
//!     ▲                 │ expire
//!     │                 ▼
//!     │            ┌──────────┐
//!     │            │ TimedOut │
//!     │            └──────────┘
//!     │
//!     └──── reset (accepted from every state)
//! ```

use std::fmt;

use serde::Serialize;

/// Where a round currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// No round running
    #[default]
    Idle,

    /// Clock running, moves accepted
    Playing,

    /// Solved; join animation in progress
    AnimatingJoin,

    /// Terminal win state
    Revealed,

    /// Terminal loss state
    TimedOut,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::AnimatingJoin => "animating_join",
            Self::Revealed => "revealed",
            Self::TimedOut => "timed_out",
        }
    }

    /// Check if moves can be accepted.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if the round was won (animating or revealed).
    pub fn is_won(&self) -> bool {
        matches!(self, Self::AnimatingJoin | Self::Revealed)
    }

    /// Check if the round is over. Only a reset leaves these states.
    pub fn is_over(&self) -> bool {
        matches!(self, Self::AnimatingJoin | Self::Revealed | Self::TimedOut)
    }

    /// Apply an event, returning the new phase or an error.
    pub fn apply(&self, event: PhaseEvent) -> Result<Self, InvalidTransition> {
        use GamePhase::*;
        use PhaseEvent::*;

        let invalid = |reason: &'static str| InvalidTransition {
            from: *self,
            event,
            reason,
        };

        match (self, event) {
            // Reset: Any -> Idle
            (_, Reset) => Ok(Idle),

            // Start: Idle -> Playing
            (Idle, Start) => Ok(Playing),
            (_, Start) => Err(invalid("Must reset before starting")),

            // Solve: Playing -> AnimatingJoin
            (Playing, Solve) => Ok(AnimatingJoin),
            (_, Solve) => Err(invalid("Not playing")),

            // Reveal: AnimatingJoin -> Revealed
            (AnimatingJoin, Reveal) => Ok(Revealed),
            (_, Reveal) => Err(invalid("No join animation in progress")),

            // Expire: Playing -> TimedOut
            (Playing, Expire) => Ok(TimedOut),
            (_, Expire) => Err(invalid("Not playing")),
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle transition events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseEvent {
    Reset,
    Start,
    Solve,
    Reveal,
    Expire,
}

/// Error when a lifecycle transition is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid transition from {from} via {event:?}: {reason}")]
pub struct InvalidTransition {
    pub from: GamePhase,
    pub event: PhaseEvent,
    pub reason: &'static str,
}
