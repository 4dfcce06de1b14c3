//! Move validation.
//!
//! A move names a tile and a direction. It is legal when the neighbouring
//! cell in that direction exists; the tile then swaps with whichever tile
//! occupies that cell.

use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

use super::board::{Permutation, Position, TileId};
use super::phase::GamePhase;

/// Move direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// A request to move one tile one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MoveCommand {
    pub tile_id: TileId,
    pub direction: Direction,
}

impl MoveCommand {
    pub fn new(tile_id: TileId, direction: Direction) -> Self {
        Self { tile_id, direction }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "tile_id": self.tile_id,
            "direction": self.direction.as_str()
        })
    }
}

/// Why a move was refused. Rejections are no-ops, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MoveRejection {
    #[error("no tile with id {tile_id}")]
    UnknownTile { tile_id: TileId },
    #[error("cannot move {direction} from position {from}")]
    OffBoard { from: Position, direction: Direction },
    #[error("no tile occupies position {target}")]
    NoTileAtTarget { target: Position },
    #[error("moves are not accepted while {phase}")]
    NotPlaying { phase: GamePhase },
    #[error("already {limit} moves waiting")]
    QueueFull { limit: usize },
}

/// Cell adjacent to `from` in `direction`, if it lies on the board.
pub fn neighbour(from: Position, direction: Direction, grid_size: usize) -> Option<Position> {
    let count = grid_size * grid_size;
    if from >= count {
        return None;
    }
    match direction {
        Direction::Up => from.checked_sub(grid_size),
        Direction::Down => Some(from + grid_size).filter(|&t| t < count),
        Direction::Left => (from % grid_size != 0).then(|| from - 1),
        Direction::Right => (from % grid_size != grid_size - 1).then(|| from + 1),
    }
}

/// Resolve a move against the settled permutation.
///
/// Returns the target cell the tile would swap into.
pub fn validate(
    permutation: &Permutation,
    tile_id: TileId,
    direction: Direction,
) -> Result<Position, MoveRejection> {
    let from = permutation
        .position_of(tile_id)
        .ok_or(MoveRejection::UnknownTile { tile_id })?;

    let target = neighbour(from, direction, permutation.grid_size())
        .ok_or(MoveRejection::OffBoard { from, direction })?;

    if permutation.tile_at(target).is_none() {
        return Err(MoveRejection::NoTileAtTarget { target });
    }

    Ok(target)
}
