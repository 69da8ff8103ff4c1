//! TUI 2048 (workspace facade crate).
//!
//! The game lives in dedicated crates under `crates/`; this package re-exports
//! them as `tui_2048::{core,adapter,term,input,types}` and owns the pieces that
//! only the binaries need: environment configuration and best-score storage.

pub mod best_score;
pub mod config;

pub use tui_2048_adapter as adapter;
pub use tui_2048_core as core;
pub use tui_2048_input as input;
pub use tui_2048_term as term;
pub use tui_2048_types as types;

pub use best_score::BestScoreFile;
pub use config::GameConfig;
