//! Puzzle configuration.
//!
//! Every timing and sizing parameter of a round lives here. The defaults
//! reproduce the shipped game: a 2x2 grid, a 30 second round, a 150ms move
//! transit and a one second join animation before the reveal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default grid edge length (tiles per row).
pub const DEFAULT_GRID_SIZE: usize = 2;

/// Largest grid edge a config may ask for.
pub const MAX_GRID_SIZE: usize = 16;

/// Default round length (30 seconds).
pub const DEFAULT_ROUND_DURATION_SECS: u32 = 30;

/// Default move transit window (150ms).
pub const DEFAULT_TRANSIT_DELAY: Duration = Duration::from_millis(150);

/// Default join animation before the reveal (1 second).
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(1000);

/// Default countdown tick period (1 second).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Default number of moves that may wait behind a transit.
pub const DEFAULT_MAX_QUEUED_MOVES: usize = 3;

/// Default minimum swipe distance in pixels.
pub const DEFAULT_SWIPE_THRESHOLD_PX: f32 = 30.0;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("grid size must be at least 2, got {0}")]
    GridTooSmall(usize),
    #[error("grid size must be at most {max}, got {0}", max = MAX_GRID_SIZE)]
    GridTooLarge(usize),
    #[error("round duration must be non-zero")]
    ZeroDuration,
    #[error("tick interval must be non-zero")]
    ZeroTickInterval,
    #[error("swipe threshold must be a finite, non-negative distance, got {0}")]
    InvalidSwipeThreshold(f32),
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Named parameters for a puzzle round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    /// Tiles per row and per column
    pub grid_size: usize,

    /// Countdown length in seconds
    pub round_duration_secs: u32,

    /// Delay between accepting a move and committing it
    pub transit_delay_ms: u64,

    /// Delay between solving and the terminal reveal
    pub reveal_delay_ms: u64,

    /// Countdown tick period
    pub tick_interval_ms: u64,

    /// Minimum dominant-axis travel for a swipe to count as a move
    pub swipe_threshold_px: f32,

    /// Moves held back while another is in transit; extras are rejected
    pub max_queued_moves: usize,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            round_duration_secs: DEFAULT_ROUND_DURATION_SECS,
            transit_delay_ms: DEFAULT_TRANSIT_DELAY.as_millis() as u64,
            reveal_delay_ms: DEFAULT_REVEAL_DELAY.as_millis() as u64,
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
            max_queued_moves: DEFAULT_MAX_QUEUED_MOVES,
        }
    }
}

impl PuzzleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different grid size.
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Use a different round length.
    pub fn with_round_duration(mut self, seconds: u32) -> Self {
        self.round_duration_secs = seconds;
        self
    }

    /// Parse a (possibly partial) JSON document; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the parameters describe a playable round.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 2 {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge(self.grid_size));
        }
        if self.round_duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if !self.swipe_threshold_px.is_finite() || self.swipe_threshold_px < 0.0 {
            return Err(ConfigError::InvalidSwipeThreshold(self.swipe_threshold_px));
        }
        Ok(())
    }

    /// Number of tiles on the board.
    pub fn tile_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    pub fn transit_delay(&self) -> Duration {
        Duration::from_millis(self.transit_delay_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = PuzzleConfig::new();
        assert_eq!(config.grid_size, 2);
        assert_eq!(config.round_duration_secs, 30);
        assert_eq!(config.transit_delay(), Duration::from_millis(150));
        assert_eq!(config.reveal_delay(), Duration::from_secs(1));
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.tile_count(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = PuzzleConfig::from_json(r#"{"grid_size": 4}"#).unwrap();
        assert_eq!(config, PuzzleConfig::new().with_grid_size(4));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            PuzzleConfig::from_json(r#"{"grid_size": 1}"#),
            Err(ConfigError::GridTooSmall(1))
        ));
        assert!(matches!(
            PuzzleConfig::from_json(r#"{"grid_size": 17}"#),
            Err(ConfigError::GridTooLarge(17))
        ));
        assert!(matches!(
            PuzzleConfig::from_json(r#"{"round_duration_secs": 0}"#),
            Err(ConfigError::ZeroDuration)
        ));
        assert!(matches!(
            PuzzleConfig::from_json(r#"{"tick_interval_ms": 0}"#),
            Err(ConfigError::ZeroTickInterval)
        ));
        assert!(matches!(
            PuzzleConfig::from_json(r#"{"swipe_threshold_px": -1.0}"#),
            Err(ConfigError::InvalidSwipeThreshold(_))
        ));
        assert!(matches!(
            PuzzleConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_grid_size_bounds() {
        assert!(PuzzleConfig::new().with_grid_size(MAX_GRID_SIZE).validate().is_ok());
        assert!(matches!(
            PuzzleConfig::from_json(r#"{"grid_size": 4294967296}"#),
            Err(ConfigError::GridTooLarge(4294967296))
        ));
        assert!(matches!(
            PuzzleConfig::new().with_grid_size(usize::MAX).validate(),
            Err(ConfigError::GridTooLarge(usize::MAX))
        ));
    }

    #[test]
    fn test_to_json() {
        let json = PuzzleConfig::new().to_json();
        assert_eq!(json["grid_size"], 2);
        assert_eq!(json["transit_delay_ms"], 150);
        assert_eq!(json["max_queued_moves"], 3);
    }
}
