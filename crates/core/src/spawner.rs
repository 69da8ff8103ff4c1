//! Tile spawning - places a 2 or a 4 on a uniformly chosen empty cell

use crate::grid::Grid;
use crate::rng::{pick_index, RandomSource};
use crate::types::{Cell, SPAWN_HIGH_PROBABILITY, SPAWN_HIGH_VALUE, SPAWN_LOW_VALUE};

/// A tile placed by the spawner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpawnedTile {
    /// Flat row-major cell index
    pub index: usize,
    pub value: Cell,
}

/// Chooses where and what to spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSpawner {
    high_probability: f64,
}

impl TileSpawner {
    pub fn new(high_probability: f64) -> Self {
        Self {
            high_probability: high_probability.clamp(0.0, 1.0),
        }
    }

    /// Spawn one tile, or do nothing when the grid is full
    ///
    /// Draws twice from `rng`: once for the cell, once for the value.
    pub fn spawn<R: RandomSource + ?Sized>(&self, grid: &mut Grid, rng: &mut R) -> Option<SpawnedTile> {
        let empty = grid.empty_indices();
        if empty.is_empty() {
            return None;
        }

        let index = empty[pick_index(rng.next_f64(), empty.len())];
        let value = if rng.next_f64() < self.high_probability {
            SPAWN_HIGH_VALUE
        } else {
            SPAWN_LOW_VALUE
        };
        grid.set_index(index, value);
        Some(SpawnedTile { index, value })
    }
}

impl Default for TileSpawner {
    fn default() -> Self {
        Self::new(SPAWN_HIGH_PROBABILITY)
    }
}
