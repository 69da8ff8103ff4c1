//! Game snapshots - the plain value handed to renderers and the wire protocol

use crate::types::{Cell, GameStatus, EMPTY, GRID_WIDTH};

/// Read-only copy of everything a renderer or observer needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub cells: [[Cell; GRID_WIDTH]; GRID_WIDTH],
    pub score: u32,
    pub best_score: u32,
    pub status: GameStatus,
    pub won: bool,
    pub lost: bool,
    pub can_undo: bool,
    pub episode_id: u32,
    pub move_id: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn playable(&self) -> bool {
        !self.lost
    }

    pub fn max_tile(&self) -> Cell {
        self.cells
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(EMPTY)
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            cells: [[EMPTY; GRID_WIDTH]; GRID_WIDTH],
            score: 0,
            best_score: 0,
            status: GameStatus::InProgress,
            won: false,
            lost: false,
            can_undo: false,
            episode_id: 0,
            move_id: 0,
        }
    }
}
