//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains all the game rules, state management, and simulation logic.
//! It has **no dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games (for replays and tests)
//! - **Testable**: Comprehensive unit tests for all game rules
//! - **Portable**: Can run in any environment (terminal, server, headless)
//! - **Independent**: Every [`GameEngine`] owns its state; sessions share nothing
//!
//! # Module Structure
//!
//! - [`grid`]: 4x4 grid with line extraction and the single-pass merge
//! - [`engine`]: Complete game state including score, undo and terminal flags
//! - [`spawner`]: Random 2/4 tile placement
//! - [`rng`]: Pluggable uniform random sources (seeded or entropy)
//! - [`snapshot`]: Plain copies of the state for renderers and the wire
//!
//! # Game Rules
//!
//! - **Slide**: Every row (Left/Right) or column (Up/Down) compacts toward the
//!   direction of motion
//! - **Merge**: Equal neighbours merge once per move, leading edge first; no
//!   cascading, so `4 4 4 4` becomes `8 8`
//! - **Score**: Each merge adds the new tile's value
//! - **Spawn**: After a move, a 2 (90%) or 4 (10%) appears on a random empty cell
//! - **Undo**: One level; a second undo in a row does nothing
//! - **Won**: Some tile equals 2048. Play may continue
//! - **Lost**: Grid is full and no two neighbours are equal
//!
//! # Example
//!
//! ```
//! use tui_2048_core::{GameEngine, SimpleRng};
//! use tui_2048_types::{Direction, GameStatus};
//!
//! // Create a game: two tiles are already on the grid
//! let mut game = GameEngine::new(SimpleRng::new(12345));
//!
//! // Apply moves
//! game.apply_move(Direction::Left);
//! game.apply_move(Direction::Up);
//!
//! // Undo the last one
//! game.undo();
//!
//! assert_eq!(game.status(), GameStatus::InProgress);
//! ```

pub mod engine;
pub mod error;
pub mod grid;
pub mod rng;
pub mod snapshot;
pub mod spawner;

pub use tui_2048_types as types;

// Re-export commonly used types for convenience
pub use engine::{BestScoreObserver, EngineConfig, GameEngine, MoveOutcome, SpawnPolicy};
pub use error::EngineError;
pub use grid::{combine_line, Grid, Line};
pub use rng::{RandomSource, SimpleRng, StdRandom};
pub use snapshot::GameSnapshot;
pub use spawner::{SpawnedTile, TileSpawner};
