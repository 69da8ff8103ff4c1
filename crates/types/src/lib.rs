//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, session protocol).
//!
//! # Grid Dimensions
//!
//! The playfield is a square of `GRID_WIDTH x GRID_WIDTH` cells stored as a
//! flat row-major sequence: index `i` is row `i / GRID_WIDTH`, column
//! `i % GRID_WIDTH`.
//!
//! # Tile Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `GRID_WIDTH` | 4 | Cells per row and per column |
//! | `GRID_CELLS` | 16 | Total cells |
//! | `WIN_TILE` | 2048 | Tile value that wins the game |
//! | `SPAWN_LOW_VALUE` | 2 | Common spawn value |
//! | `SPAWN_HIGH_VALUE` | 4 | Rare spawn value |
//! | `SPAWN_HIGH_PROBABILITY` | 0.1 | Chance that a spawn is `SPAWN_HIGH_VALUE` |
//!
//! # Examples
//!
//! ```
//! use tui_2048_types::{Direction, GameAction, GRID_WIDTH};
//!
//! // Parse from string (case-insensitive)
//! let parsed = Direction::from_str("Left").unwrap();
//! assert_eq!(parsed, Direction::Left);
//!
//! // Parse a session action
//! let action = GameAction::from_str("undo").unwrap();
//! assert_eq!(action, GameAction::Undo);
//!
//! assert_eq!(GRID_WIDTH, 4);
//! ```

/// Grid width (and height) in cells
pub const GRID_WIDTH: usize = 4;

/// Total number of cells on the grid
pub const GRID_CELLS: usize = GRID_WIDTH * GRID_WIDTH;

/// Reaching this tile value wins the game
pub const WIN_TILE: u32 = 2048;

/// Value of the common spawned tile
pub const SPAWN_LOW_VALUE: u32 = 2;

/// Value of the rare spawned tile
pub const SPAWN_HIGH_VALUE: u32 = 4;

/// Probability that a spawned tile is `SPAWN_HIGH_VALUE`
pub const SPAWN_HIGH_PROBABILITY: f64 = 0.1;

/// Number of tiles placed on an empty grid at game start
pub const INITIAL_TILES: usize = 2;

/// A cell value: 0 is empty, anything else is a power of two
pub type Cell = u32;

/// Marker for an empty cell
pub const EMPTY: Cell = 0;


/// The four slide directions
///
/// Lines are always processed from their leading edge: for `Left` and `Up`
/// that is storage order, for `Right` and `Down` it is reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in protocol index order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Parse direction from string (case-insensitive)
    ///
    /// Accepts full names or single letters: "up" | "u", "down" | "d",
    /// "left" | "l", "right" | "r".
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_types::Direction;
    ///
    /// assert_eq!(Direction::from_str("UP"), Some(Direction::Up));
    /// assert_eq!(Direction::from_str("r"), Some(Direction::Right));
    /// assert_eq!(Direction::from_str("sideways"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Convert a u8 to a direction (0=Up, 1=Down, 2=Left, 3=Right)
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Convert to lowercase string for the session protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// True for `Left` and `Right`, whose lines are rows
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// True when the leading edge is at the end of storage order
    pub fn is_reversed(&self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }

    /// The direction seen through a left/right mirror
    pub fn mirrored_horizontal(&self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            other => *other,
        }
    }

    /// The direction seen through an up/down mirror
    pub fn mirrored_vertical(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            other => *other,
        }
    }
}

/// Actions that can be applied to a game
///
/// These actions are used by both keyboard input and the session server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Slide every tile in a direction
    Move(Direction),
    /// Restore the state from before the last move (single level)
    Undo,
    /// Start a fresh game, keeping the best score
    Restart,
}

impl GameAction {
    /// Parse action from string (for the session protocol)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_types::{Direction, GameAction};
    ///
    /// assert_eq!(GameAction::from_str("up"), Some(GameAction::Move(Direction::Up)));
    /// assert_eq!(GameAction::from_str("undo"), Some(GameAction::Undo));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "undo" => Some(GameAction::Undo),
            "restart" | "reset" => Some(GameAction::Restart),
            other => Direction::from_str(other).map(GameAction::Move),
        }
    }

    /// Convert to lowercase string for the session protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Move(direction) => direction.as_str(),
            GameAction::Undo => "undo",
            GameAction::Restart => "restart",
        }
    }
}

/// Folded terminal status of a game
///
/// `Won` and `Lost` are tracked independently by the engine; this enum is the
/// single-value view where a 2048 tile on the board reports `Won` even when no
/// move remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    /// Fold independent won/lost flags into one status
    pub fn from_flags(won: bool, lost: bool) -> Self {
        if won {
            GameStatus::Won
        } else if lost {
            GameStatus::Lost
        } else {
            GameStatus::InProgress
        }
    }

    /// Convert to snake_case string for the session protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::InProgress => "in_progress",
            GameStatus::Won => "won",
            GameStatus::Lost => "lost",
        }
    }
}
