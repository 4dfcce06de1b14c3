//! Countdown clock.
//!
//! A round runs against a fixed countdown. The clock itself holds no timer;
//! whoever owns it calls [`GameClock::tick`] once per tick interval.

use serde::Serialize;

/// Clock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockStatus {
    /// Not counting (never started, or stopped before expiry)
    #[default]
    Stopped,

    /// Counting down
    Running,

    /// Reached zero
    Expired,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; seconds left after this tick
    Counting { remaining: u32 },

    /// This tick reached zero. Returned exactly once per run.
    Expired,

    /// Clock was not running; nothing changed
    Inactive,
}

/// Countdown state machine: `Stopped -> Running -> Expired`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameClock {
    pub status: ClockStatus,
    pub remaining_seconds: u32,
    pub duration_seconds: u32,
}

impl GameClock {
    /// Create a stopped clock.
    pub fn new(duration_seconds: u32) -> Self {
        Self {
            status: ClockStatus::Stopped,
            remaining_seconds: duration_seconds,
            duration_seconds,
        }
    }

    /// Start (or restart) counting from `duration_seconds`.
    pub fn start(&mut self, duration_seconds: u32) {
        self.duration_seconds = duration_seconds;
        self.remaining_seconds = duration_seconds;
        self.status = ClockStatus::Running;
    }

    /// Stop without expiring. No-op unless running.
    pub fn stop(&mut self) -> bool {
        if self.status == ClockStatus::Running {
            self.status = ClockStatus::Stopped;
            true
        } else {
            false
        }
    }

    /// Count down one second.
    pub fn tick(&mut self) -> Tick {
        if self.status != ClockStatus::Running {
            return Tick::Inactive;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.status = ClockStatus::Expired;
            Tick::Expired
        } else {
            Tick::Counting {
                remaining: self.remaining_seconds,
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == ClockStatus::Running
    }

    pub fn is_expired(&self) -> bool {
        self.status == ClockStatus::Expired
    }

    /// Remaining time as a percentage of the round.
    pub fn progress_percent(&self) -> f32 {
        if self.duration_seconds == 0 {
            return 0.0;
        }
        self.remaining_seconds as f32 / self.duration_seconds as f32 * 100.0
    }

    /// Remaining time as `m:ss`.
    pub fn formatted(&self) -> String {
        format_time(self.remaining_seconds)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": self.status,
            "remaining_seconds": self.remaining_seconds,
            "duration_seconds": self.duration_seconds,
            "formatted": self.formatted()
        })
    }
}

/// Format seconds as `m:ss`.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
