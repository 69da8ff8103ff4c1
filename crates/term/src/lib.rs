//! Terminal renderer for the 2048 game.
//!
//! Rendering goes through a plain framebuffer instead of a widget toolkit:
//! `GameView` projects a `GameSnapshot` into cells, and `TerminalRenderer`
//! flushes only the cells that changed since the previous frame.
//!
//! - `GameView` is pure and unit-tested
//! - Tiles are drawn 6 columns by 3 rows to offset the glyph aspect ratio

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{tile_color, tile_style, AnchorY, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
