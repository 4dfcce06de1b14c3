//! Board state.
//!
//! Tracks which grid cell every tile occupies. Every cell always holds
//! exactly one tile; there is no blank. Moves exchange two occupied cells.

use std::fmt;

use serde::Serialize;

/// Tile identifier. Tile `i` belongs at position `i`.
pub type TileId = usize;

/// Grid cell index in row-major order.
pub type Position = usize;

/// A single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Tile {
    pub id: TileId,
    pub correct_pos: Position,
}

impl Tile {
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            correct_pos: id,
        }
    }
}

/// Assignment of tiles to grid cells.
///
/// `positions[tile]` is the tile's current cell and `occupants[cell]` is the
/// tile in that cell. Both are kept in sync so the mapping stays a bijection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permutation {
    grid_size: usize,
    positions: Vec<Position>,
    #[serde(skip)]
    occupants: Vec<TileId>,
}

impl Permutation {
    /// Every tile in its correct cell.
    pub fn solved(grid_size: usize) -> Self {
        let positions: Vec<Position> = (0..grid_size * grid_size).collect();
        Self {
            grid_size,
            occupants: positions.clone(),
            positions,
        }
    }

    /// Fisher-Yates shuffle of the cells, assigned to tiles in id order.
    ///
    /// No solvability filter is applied: any two neighbouring cells may be
    /// exchanged, so every arrangement can be sorted back.
    pub fn shuffled(grid_size: usize, rng: &mut fastrand::Rng) -> Self {
        let mut positions: Vec<Position> = (0..grid_size * grid_size).collect();
        for i in (1..positions.len()).rev() {
            let j = rng.usize(..=i);
            positions.swap(i, j);
        }
        Self::from_valid_positions(grid_size, positions)
    }

    /// Build from explicit tile positions, checking they form a bijection.
    pub fn from_positions(grid_size: usize, positions: Vec<Position>) -> Option<Self> {
        let count = grid_size.checked_mul(grid_size)?;
        if positions.len() != count {
            return None;
        }
        let mut seen = vec![false; count];
        for &pos in &positions {
            if pos >= count || seen[pos] {
                return None;
            }
            seen[pos] = true;
        }
        Some(Self::from_valid_positions(grid_size, positions))
    }

    fn from_valid_positions(grid_size: usize, positions: Vec<Position>) -> Self {
        let mut occupants = vec![0; positions.len()];
        for (tile, &pos) in positions.iter().enumerate() {
            occupants[pos] = tile;
        }
        Self {
            grid_size,
            positions,
            occupants,
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Number of tiles (and cells).
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Current cell of a tile.
    pub fn position_of(&self, tile: TileId) -> Option<Position> {
        self.positions.get(tile).copied()
    }

    /// Tile currently in a cell.
    pub fn tile_at(&self, pos: Position) -> Option<TileId> {
        self.occupants.get(pos).copied()
    }

    /// Tile positions indexed by tile id.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// All tiles in id order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..self.positions.len()).map(Tile::new)
    }

    /// Exchange the tiles holding two cells. Out-of-range cells are ignored.
    pub fn swap(&mut self, a: Position, b: Position) -> bool {
        let (Some(tile_a), Some(tile_b)) = (self.tile_at(a), self.tile_at(b)) else {
            return false;
        };
        self.positions.swap(tile_a, tile_b);
        self.occupants.swap(a, b);
        true
    }

    /// Check that every cell holds exactly one tile.
    pub fn is_bijection(&self) -> bool {
        let count = self.grid_size * self.grid_size;
        if self.positions.len() != count || self.occupants.len() != count {
            return false;
        }
        self.positions
            .iter()
            .enumerate()
            .all(|(tile, &pos)| self.occupants.get(pos) == Some(&tile))
    }

    /// True when every tile sits in its correct cell.
    pub fn is_solved(&self) -> bool {
        is_solved(self)
    }

    /// Number of tiles away from their correct cell.
    pub fn misplaced(&self) -> usize {
        self.tiles()
            .filter(|t| self.positions[t.id] != t.correct_pos)
            .count()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "grid_size": self.grid_size,
            "positions": self.positions
        })
    }
}

/// Win check: every tile at its correct position.
pub fn is_solved(permutation: &Permutation) -> bool {
    permutation
        .tiles()
        .all(|tile| permutation.position_of(tile.id) == Some(tile.correct_pos))
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.grid_size {
            for col in 0..self.grid_size {
                if let Some(tile) = self.tile_at(row * self.grid_size + col) {
                    write!(f, "{tile:>02} ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
