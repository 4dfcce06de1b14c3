//! Input translation.
//!
//! Turns keyboard presses and touch swipes into [`MoveCommand`]s. Keyboard
//! input goes to the focused tile, which the presentation layer reports
//! explicitly. Swipes go to the tile the touch started on.

use serde::Serialize;
use strum::EnumString;

use super::board::TileId;
use super::config::DEFAULT_SWIPE_THRESHOLD_PX;
use super::moves::{Direction, MoveCommand};

/// Arrow keys, parsed from DOM-style key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum ArrowKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl ArrowKey {
    /// Parse a key name. Anything but an arrow key yields `None`.
    pub fn parse(key: &str) -> Option<Self> {
        key.parse().ok()
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::ArrowUp => Direction::Up,
            Self::ArrowDown => Direction::Down,
            Self::ArrowLeft => Direction::Left,
            Self::ArrowRight => Direction::Right,
        }
    }
}

/// A finished touch gesture in screen coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SwipeGesture {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
}

impl SwipeGesture {
    pub fn new(start: (f32, f32), end: (f32, f32)) -> Self {
        Self {
            start_x: start.0,
            start_y: start.1,
            end_x: end.0,
            end_y: end.1,
        }
    }

    /// Resolve the dominant axis. Travel must exceed `threshold` strictly;
    /// ties between the axes resolve to nothing.
    pub fn direction(&self, threshold: f32) -> Option<Direction> {
        let dx = self.end_x - self.start_x;
        let dy = self.end_y - self.start_y;

        if dx.abs() > dy.abs() && dx.abs() > threshold {
            Some(if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            })
        } else if dy.abs() > dx.abs() && dy.abs() > threshold {
            Some(if dy > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            })
        } else {
            None
        }
    }
}

/// Where a touch began.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TouchStart {
    pub tile_id: TileId,
    pub x: f32,
    pub y: f32,
}

/// Keyboard focus and in-progress touch for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputTranslator {
    focused_tile: Option<TileId>,
    touch: Option<TouchStart>,
    swipe_threshold: f32,
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD_PX)
    }
}

impl InputTranslator {
    pub fn new(swipe_threshold: f32) -> Self {
        Self {
            focused_tile: None,
            touch: None,
            swipe_threshold,
        }
    }

    /// Record which tile holds keyboard focus (`None` on blur).
    pub fn set_focus(&mut self, tile_id: Option<TileId>) {
        self.focused_tile = tile_id;
    }

    pub fn focused_tile(&self) -> Option<TileId> {
        self.focused_tile
    }

    /// Arrow key press on the focused tile. Other keys, or no focus, yield nothing.
    pub fn key_down(&self, key: &str) -> Option<MoveCommand> {
        let tile_id = self.focused_tile?;
        let arrow = ArrowKey::parse(key)?;
        Some(MoveCommand::new(tile_id, arrow.direction()))
    }

    /// Begin a swipe on a tile. A second start replaces the first.
    pub fn touch_start(&mut self, tile_id: TileId, x: f32, y: f32) {
        self.touch = Some(TouchStart { tile_id, x, y });
    }

    /// Finish a swipe. Without a matching start this is a no-op.
    pub fn touch_end(&mut self, x: f32, y: f32) -> Option<MoveCommand> {
        let start = self.touch.take()?;
        let gesture = SwipeGesture::new((start.x, start.y), (x, y));
        let direction = gesture.direction(self.swipe_threshold)?;
        Some(MoveCommand::new(start.tile_id, direction))
    }

    /// Forget any in-progress touch.
    pub fn cancel_touch(&mut self) {
        self.touch = None;
    }

    pub fn pending_touch(&self) -> Option<&TouchStart> {
        self.touch.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arrow_keys() {
        assert_eq!(ArrowKey::parse("ArrowUp"), Some(ArrowKey::ArrowUp));
        assert_eq!(
            ArrowKey::parse("ArrowRight").map(|k| k.direction()),
            Some(Direction::Right)
        );
        assert_eq!(ArrowKey::parse("Enter"), None);
        assert_eq!(ArrowKey::parse("arrowup"), None);
    }

    #[test]
    fn test_key_needs_focus() {
        let mut input = InputTranslator::default();
        assert_eq!(input.key_down("ArrowLeft"), None);

        input.set_focus(Some(3));
        assert_eq!(
            input.key_down("ArrowLeft"),
            Some(MoveCommand::new(3, Direction::Left))
        );
        assert_eq!(input.key_down("Tab"), None);

        input.set_focus(None);
        assert_eq!(input.key_down("ArrowLeft"), None);
    }

    #[test]
    fn test_swipe_threshold() {
        let below = SwipeGesture::new((100.0, 100.0), (129.0, 100.0));
        assert_eq!(below.direction(30.0), None);

        let at = SwipeGesture::new((100.0, 100.0), (130.0, 100.0));
        assert_eq!(at.direction(30.0), None);

        let right = SwipeGesture::new((100.0, 100.0), (131.0, 100.0));
        assert_eq!(right.direction(30.0), Some(Direction::Right));

        let left = SwipeGesture::new((100.0, 100.0), (69.0, 100.0));
        assert_eq!(left.direction(30.0), Some(Direction::Left));
    }

    #[test]
    fn test_swipe_dominant_axis() {
        let down = SwipeGesture::new((0.0, 0.0), (20.0, 45.0));
        assert_eq!(down.direction(30.0), Some(Direction::Down));

        let up = SwipeGesture::new((0.0, 0.0), (-20.0, -45.0));
        assert_eq!(up.direction(30.0), Some(Direction::Up));

        let diagonal = SwipeGesture::new((0.0, 0.0), (50.0, 50.0));
        assert_eq!(diagonal.direction(30.0), None);

        let mostly_right = SwipeGesture::new((0.0, 0.0), (50.0, -49.0));
        assert_eq!(mostly_right.direction(30.0), Some(Direction::Right));
    }

    #[test]
    fn test_touch_round_trip() {
        let mut input = InputTranslator::new(30.0);
        input.touch_start(2, 10.0, 10.0);
        assert_eq!(input.pending_touch().map(|t| t.tile_id), Some(2));

        assert_eq!(
            input.touch_end(10.0, 60.0),
            Some(MoveCommand::new(2, Direction::Down))
        );
        assert!(input.pending_touch().is_none());

        // No matching start
        assert_eq!(input.touch_end(100.0, 100.0), None);
    }

    #[test]
    fn test_short_touch_clears_start() {
        let mut input = InputTranslator::new(30.0);
        input.touch_start(1, 0.0, 0.0);
        assert_eq!(input.touch_end(5.0, 5.0), None);
        assert!(input.pending_touch().is_none());
    }
}
