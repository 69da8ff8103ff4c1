//! Game engine module - owns one game's full state
//!
//! This module ties together the grid, the tile spawner, the random source and
//! the single-level undo snapshot. It handles moves, undo, reset, and the
//! independent won/lost flags. Best score is held in memory and reported to an
//! optional observer; persisting it is the caller's job.

use std::fmt;

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::grid::Grid;
use crate::rng::{RandomSource, StdRandom};
use crate::snapshot::GameSnapshot;
use crate::spawner::{SpawnedTile, TileSpawner};
use crate::types::*;

/// When a move spawns a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpawnPolicy {
    /// Spawn only if the slide changed the grid; otherwise the move is a no-op
    #[default]
    OnChange,
    /// Snapshot and spawn after every move, even one that slid nothing
    Always,
}

impl SpawnPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "on_change" | "onchange" | "changed" => Some(SpawnPolicy::OnChange),
            "always" => Some(SpawnPolicy::Always),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnPolicy::OnChange => "on_change",
            SpawnPolicy::Always => "always",
        }
    }
}

/// Construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub spawn_policy: SpawnPolicy,
    /// Best score loaded from external storage
    pub best_score: u32,
    /// Probability of spawning a 4 instead of a 2
    pub high_probability: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            spawn_policy: SpawnPolicy::default(),
            best_score: 0,
            high_probability: SPAWN_HIGH_PROBABILITY,
        }
    }
}

/// What a single move did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveOutcome {
    pub direction: Direction,
    /// The slide changed at least one cell
    pub moved: bool,
    /// Sum of tiles created by merges
    pub merged_score: u32,
    pub spawned: Option<SpawnedTile>,
    pub best_score_changed: bool,
}

/// Receives the new best score whenever a move raises it
pub trait BestScoreObserver {
    fn best_score_changed(&mut self, best: u32);
}

impl<F: FnMut(u32)> BestScoreObserver for F {
    fn best_score_changed(&mut self, best: u32) {
        self(best)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UndoSnapshot {
    grid: Grid,
    score: u32,
}

/// One game session
pub struct GameEngine<R: RandomSource = StdRandom> {
    grid: Grid,
    score: u32,
    /// Never decreases, survives resets.
    best_score: u32,
    won: bool,
    lost: bool,
    /// State before the last applied move (consumed by undo).
    undo: Option<UndoSnapshot>,
    rng: R,
    spawner: TileSpawner,
    spawn_policy: SpawnPolicy,
    /// Monotonic episode id (increments on reset).
    episode_id: u32,
    /// Moves currently in effect this episode (undo steps it back).
    move_id: u32,
    /// Last move outcome (consumed by observers).
    last_move: Option<MoveOutcome>,
    best_observer: Option<Box<dyn BestScoreObserver + Send>>,
}

impl<R: RandomSource> GameEngine<R> {
    /// Create a started game with default rules
    pub fn new(rng: R) -> Self {
        Self::with_config(EngineConfig::default(), rng)
    }

    /// Create a started game: empty grid plus two spawned tiles
    pub fn with_config(config: EngineConfig, rng: R) -> Self {
        let mut engine = Self {
            grid: Grid::new(),
            score: 0,
            best_score: config.best_score,
            won: false,
            lost: false,
            undo: None,
            rng,
            spawner: TileSpawner::new(config.high_probability),
            spawn_policy: config.spawn_policy,
            episode_id: 0,
            move_id: 0,
            last_move: None,
            best_observer: None,
        };
        engine.initialize();
        engine
    }

    /// Clear the grid and score, drop undo, spawn the starting tiles
    pub fn initialize(&mut self) {
        self.grid.clear();
        self.score = 0;
        self.undo = None;
        self.last_move = None;
        self.move_id = 0;
        for _ in 0..INITIAL_TILES {
            self.spawner.spawn(&mut self.grid, &mut self.rng);
        }
        self.refresh_status();
    }

    /// Start a new episode; best score is kept
    pub fn reset(&mut self) {
        self.episode_id = self.episode_id.wrapping_add(1);
        self.initialize();
        debug!(episode_id = self.episode_id, "game reset");
    }

    /// Slide toward `direction`, merge, spawn, and recompute status
    pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
        let before = UndoSnapshot {
            grid: self.grid,
            score: self.score,
        };

        let mut next = self.grid;
        let merged_score = next.slide(direction);
        let moved = next != self.grid;

        if !moved && self.spawn_policy == SpawnPolicy::OnChange {
            let outcome = MoveOutcome {
                direction,
                moved: false,
                merged_score: 0,
                spawned: None,
                best_score_changed: false,
            };
            self.last_move = Some(outcome);
            debug!(direction = direction.as_str(), "move changed nothing");
            return outcome;
        }

        self.undo = Some(before);
        self.grid = next;
        self.score = self.score.saturating_add(merged_score);

        let best_score_changed = self.score > self.best_score;
        if best_score_changed {
            self.best_score = self.score;
        }

        let spawned = self.spawner.spawn(&mut self.grid, &mut self.rng);
        self.move_id = self.move_id.wrapping_add(1);
        self.refresh_status();

        if best_score_changed {
            if let Some(observer) = self.best_observer.as_mut() {
                observer.best_score_changed(self.best_score);
            }
        }

        let outcome = MoveOutcome {
            direction,
            moved,
            merged_score,
            spawned,
            best_score_changed,
        };
        self.last_move = Some(outcome);

        debug!(
            direction = direction.as_str(),
            moved,
            merged_score,
            score = self.score,
            won = self.won,
            lost = self.lost,
            "move applied"
        );
        outcome
    }

    /// Parse and apply a direction name; rejected input leaves the game untouched
    pub fn apply_named_move(&mut self, name: &str) -> Result<MoveOutcome, EngineError> {
        match Direction::from_str(name) {
            Some(direction) => Ok(self.apply_move(direction)),
            None => {
                warn!(input = name, "rejected move with invalid direction");
                Err(EngineError::InvalidDirection(name.to_string()))
            }
        }
    }

    /// Apply a game action, returning whether the game state changed
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Move(direction) => {
                let outcome = self.apply_move(direction);
                outcome.moved || outcome.spawned.is_some()
            }
            GameAction::Undo => self.undo(),
            GameAction::Restart => {
                self.reset();
                true
            }
        }
    }

    /// Restore grid and score from before the last move
    ///
    /// Returns false (and changes nothing) when there is no snapshot, so a
    /// second undo in a row is a no-op. Best score is not rolled back.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo.take() else {
            return false;
        };

        self.grid = snapshot.grid;
        self.score = snapshot.score;
        self.move_id = self.move_id.saturating_sub(1);
        self.last_move = None;
        self.refresh_status();
        debug!(score = self.score, "move undone");
        true
    }

    /// Replace the position, e.g. to resume a saved game
    ///
    /// Drops the undo snapshot and recomputes status. Raises the best score
    /// if `score` exceeds it.
    pub fn set_position(&mut self, grid: Grid, score: u32) {
        self.grid = grid;
        self.score = score;
        self.best_score = self.best_score.max(score);
        self.undo = None;
        self.last_move = None;
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        self.won = self.grid.has_tile(WIN_TILE);
        self.lost = self.grid.is_stuck();
    }

    pub fn set_best_score_observer<O>(&mut self, observer: O)
    where
        O: BestScoreObserver + Send + 'static,
    {
        self.best_observer = Some(Box::new(observer));
    }

    pub fn clear_best_score_observer(&mut self) {
        self.best_observer = None;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn status(&self) -> GameStatus {
        GameStatus::from_flags(self.won, self.lost)
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    pub fn can_undo(&self) -> bool {
        self.undo.is_some()
    }

    pub fn spawn_policy(&self) -> SpawnPolicy {
        self.spawn_policy
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn move_id(&self) -> u32 {
        self.move_id
    }

    pub fn last_move(&self) -> Option<MoveOutcome> {
        self.last_move
    }

    pub fn take_last_move(&mut self) -> Option<MoveOutcome> {
        self.last_move.take()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.grid.write_rows(&mut out.cells);
        out.score = self.score;
        out.best_score = self.best_score;
        out.status = self.status();
        out.won = self.won;
        out.lost = self.lost;
        out.can_undo = self.can_undo();
        out.episode_id = self.episode_id;
        out.move_id = self.move_id;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Default for GameEngine<StdRandom> {
    fn default() -> Self {
        Self::new(StdRandom::from_entropy())
    }
}

impl<R: RandomSource> fmt::Debug for GameEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("grid", &self.grid)
            .field("score", &self.score)
            .field("best_score", &self.best_score)
            .field("won", &self.won)
            .field("lost", &self.lost)
            .field("can_undo", &self.undo.is_some())
            .field("spawn_policy", &self.spawn_policy)
            .field("episode_id", &self.episode_id)
            .field("move_id", &self.move_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimpleRng;
    use std::sync::{Arc, Mutex};

    fn engine() -> GameEngine<SimpleRng> {
        GameEngine::new(SimpleRng::new(12345))
    }

    fn engine_with(policy: SpawnPolicy) -> GameEngine<SimpleRng> {
        let config = EngineConfig {
            spawn_policy: policy,
            ..EngineConfig::default()
        };
        GameEngine::with_config(config, SimpleRng::new(12345))
    }

    fn tile_count(engine: &GameEngine<SimpleRng>) -> usize {
        engine.grid().cells().iter().filter(|&&v| v != EMPTY).count()
    }

    #[test]
    fn test_new_game_state() {
        let state = engine();

        assert_eq!(tile_count(&state), 2);
        assert_eq!(state.score(), 0);
        assert_eq!(state.best_score(), 0);
        assert_eq!(state.status(), GameStatus::InProgress);
        assert!(!state.can_undo());
        assert_eq!(state.episode_id(), 0);
        assert_eq!(state.move_id(), 0);
        assert!(state
            .grid()
            .cells()
            .iter()
            .all(|&v| v == EMPTY || v == 2 || v == 4));
    }

    #[test]
    fn test_best_score_seed_from_config() {
        let config = EngineConfig {
            best_score: 500,
            ..EngineConfig::default()
        };
        let state = GameEngine::with_config(config, SimpleRng::new(1));
        assert_eq!(state.best_score(), 500);
    }

    #[test]
    fn test_move_merges_and_scores() {
        let mut state = engine();
        state.set_position(
            Grid::from_rows([[2, 2, 2, 2], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
            0,
        );

        let outcome = state.apply_move(Direction::Left);
        assert!(outcome.moved);
        assert_eq!(outcome.merged_score, 8);
        assert_eq!(state.score(), 8);
        assert_eq!(&state.grid().rows()[0][..2], &[4, 4]);
        assert!(outcome.spawned.is_some());
        assert_eq!(tile_count(&state), 3);
        assert_eq!(state.move_id(), 1);
    }

    #[test]
    fn test_noop_move_on_change_policy() {
        let mut state = engine_with(SpawnPolicy::OnChange);
        let grid = Grid::from_rows([[2, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        state.set_position(grid, 0);

        let outcome = state.apply_move(Direction::Left);
        assert!(!outcome.moved);
        assert_eq!(outcome.spawned, None);
        assert_eq!(*state.grid(), grid);
        assert!(!state.can_undo());
        assert_eq!(state.move_id(), 0);
    }

    #[test]
    fn test_noop_move_always_policy_still_spawns() {
        let mut state = engine_with(SpawnPolicy::Always);
        let grid = Grid::from_rows([[2, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        state.set_position(grid, 0);

        let outcome = state.apply_move(Direction::Left);
        assert!(!outcome.moved);
        assert!(outcome.spawned.is_some());
        assert_eq!(tile_count(&state), 3);
        assert!(state.can_undo());
    }

    #[test]
    fn test_invalid_direction_rejected_without_side_effects() {
        let mut state = engine();
        let before = state.snapshot();

        let err = state.apply_named_move("sideways").unwrap_err();
        assert_eq!(err, EngineError::InvalidDirection("sideways".to_string()));
        assert_eq!(state.snapshot(), before);
        assert!(state.last_move().is_none());
    }

    #[test]
    fn test_named_move_accepts_direction() {
        let mut state = engine_with(SpawnPolicy::Always);
        let outcome = state.apply_named_move("UP").unwrap();
        assert_eq!(outcome.direction, Direction::Up);
    }

    #[test]
    fn test_undo_restores_and_is_single_level() {
        let mut state = engine();
        state.set_position(
            Grid::from_rows([[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
            12,
        );
        let before = *state.grid();

        state.apply_move(Direction::Left);
        assert_eq!(state.score(), 16);
        assert!(state.undo());
        assert_eq!(*state.grid(), before);
        assert_eq!(state.score(), 12);
        assert_eq!(state.move_id(), 0);

        let after_first = state.snapshot();
        assert!(!state.undo());
        assert_eq!(state.snapshot(), after_first);
    }

    #[test]
    fn test_undo_keeps_best_score() {
        let mut state = engine();
        state.set_position(
            Grid::from_rows([[8, 8, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
            0,
        );
        state.apply_move(Direction::Right);
        assert_eq!(state.best_score(), 16);
        state.undo();
        assert_eq!(state.score(), 0);
        assert_eq!(state.best_score(), 16);
    }

    #[test]
    fn test_undo_without_snapshot_is_noop() {
        let mut state = engine();
        let before = state.snapshot();
        assert!(!state.undo());
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_reset_keeps_best_and_clears_undo() {
        let mut state = engine();
        state.set_position(
            Grid::from_rows([[4, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
            100,
        );
        state.apply_move(Direction::Left);
        assert_eq!(state.best_score(), 108);

        state.reset();
        assert_eq!(state.score(), 0);
        assert_eq!(state.best_score(), 108);
        assert!(!state.can_undo());
        assert_eq!(tile_count(&state), 2);
        assert_eq!(state.episode_id(), 1);
        assert_eq!(state.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_lost_detection() {
        let mut state = engine();
        state.set_position(
            Grid::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]),
            0,
        );
        assert!(state.is_lost());
        assert!(!state.is_won());
        assert_eq!(state.status(), GameStatus::Lost);
    }

    #[test]
    fn test_won_detection_is_independent() {
        let mut state = engine();
        state.set_position(
            Grid::from_rows([[2048, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
            0,
        );
        assert!(state.is_won());
        assert_eq!(state.status(), GameStatus::Won);

        // Won does not stop play.
        let outcome = state.apply_move(Direction::Right);
        assert!(outcome.moved);
        assert!(state.is_won());

        state.set_position(
            Grid::from_rows([[2048, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]),
            0,
        );
        assert!(state.is_won());
        assert!(state.is_lost());
        assert_eq!(state.status(), GameStatus::Won);
    }

    #[test]
    fn test_win_needs_exact_2048_tile() {
        let mut state = engine();
        state.set_position(
            Grid::from_rows([[4096, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 2]]),
            0,
        );
        assert!(!state.is_won());
        assert_eq!(state.status(), GameStatus::InProgress);

        // Merging two 2048s into 4096 ends the win.
        state.set_position(
            Grid::from_rows([[2048, 2048, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
            0,
        );
        assert!(state.is_won());
        state.apply_move(Direction::Left);
        assert_eq!(state.grid().get(0, 0), Some(4096));
        assert!(!state.is_won());
    }

    #[test]
    fn test_best_score_observer_called_on_raise_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut state = engine();
        state.set_best_score_observer(move |best: u32| sink.lock().unwrap().push(best));
        state.set_position(
            Grid::from_rows([[2, 2, 4, 4], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
            0,
        );

        let outcome = state.apply_move(Direction::Left);
        assert!(outcome.best_score_changed);
        assert_eq!(*seen.lock().unwrap(), vec![12]);

        state.undo();
        state.set_position(
            Grid::from_rows([[2, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
            0,
        );
        let outcome = state.apply_move(Direction::Right);
        assert!(!outcome.best_score_changed);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_apply_action_dispatch() {
        let mut state = engine();
        state.set_position(
            Grid::from_rows([[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
            0,
        );
        assert!(state.apply_action(GameAction::Move(Direction::Left)));
        assert!(state.apply_action(GameAction::Undo));
        assert!(!state.apply_action(GameAction::Undo));
        assert!(state.apply_action(GameAction::Restart));
        assert_eq!(state.episode_id(), 1);
    }

    #[test]
    fn test_take_last_move() {
        let mut state = engine_with(SpawnPolicy::Always);
        state.apply_move(Direction::Down);
        assert!(state.take_last_move().is_some());
        assert!(state.take_last_move().is_none());
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut state = engine();
        state.set_position(
            Grid::from_rows([[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
            40,
        );
        state.apply_move(Direction::Left);
        let snap = state.snapshot();
        assert_eq!(snap.cells, state.grid().rows());
        assert_eq!(snap.score, 44);
        assert_eq!(snap.best_score, 44);
        assert!(snap.can_undo);
        assert_eq!(snap.move_id, 1);
        assert_eq!(snap.status, GameStatus::InProgress);
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = engine_with(SpawnPolicy::Always);
        let mut b = engine_with(SpawnPolicy::Always);
        for d in [Direction::Left, Direction::Up, Direction::Right, Direction::Down].repeat(10) {
            a.apply_move(d);
            b.apply_move(d);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_spawn_policy_parse() {
        assert_eq!(SpawnPolicy::from_str("always"), Some(SpawnPolicy::Always));
        assert_eq!(SpawnPolicy::from_str("ON_CHANGE"), Some(SpawnPolicy::OnChange));
        assert_eq!(SpawnPolicy::from_str("never"), None);
    }
}
