//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Cell, EMPTY, GRID_WIDTH};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

const BOARD_BG: Rgb = Rgb::hex("#bbada0");
const EMPTY_TILE: Rgb = Rgb::hex("#cdc1b4");
const DARK_TEXT: Rgb = Rgb::hex("#776e65");
const LIGHT_TEXT: Rgb = Rgb::hex("#f9f6f2");
const SUPER_TILE: Rgb = Rgb::hex("#3c3a32");

/// Background colour for a tile value.
pub fn tile_color(value: Cell) -> Rgb {
    match value {
        EMPTY => EMPTY_TILE,
        2 => Rgb::hex("#eee4da"),
        4 => Rgb::hex("#ede0c8"),
        8 => Rgb::hex("#f2b179"),
        16 => Rgb::hex("#f59563"),
        32 => Rgb::hex("#f67c5f"),
        64 => Rgb::hex("#f65e3b"),
        128 => Rgb::hex("#edcf72"),
        256 => Rgb::hex("#edcc61"),
        512 => Rgb::hex("#edc850"),
        1024 => Rgb::hex("#edc53f"),
        2048 => Rgb::hex("#edc22e"),
        _ => SUPER_TILE,
    }
}

/// Text style for a tile value: dark digits on 2 and 4, light above.
pub fn tile_style(value: Cell) -> CellStyle {
    let fg = if value <= 4 { DARK_TEXT } else { LIGHT_TEXT };
    CellStyle::new(fg, tile_color(value)).bold()
}

/// Terminal renderer for the 2048 board.
pub struct GameView {
    /// Tile width in terminal columns.
    tile_w: u16,
    /// Tile height in terminal rows.
    tile_h: u16,
    /// Spacing between tiles and around the grid.
    gap: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        Self {
            tile_w: 6,
            tile_h: 3,
            gap: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(tile_w: u16, tile_h: u16) -> Self {
        Self {
            tile_w: tile_w.max(1),
            tile_h: tile_h.max(1),
            ..Self::default()
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    pub fn with_gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    /// Outer size of the bordered board in terminal cells.
    pub fn frame_size(&self) -> (u16, u16) {
        let n = GRID_WIDTH as u16;
        (
            n * self.tile_w + (n + 1) * self.gap + 2,
            n * self.tile_h + (n + 1) * self.gap + 2,
        )
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    ///
    /// Callers keep one framebuffer across frames; nothing is allocated unless
    /// the viewport grew.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let (frame_w, frame_h) = self.frame_size();
        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };

        let board = CellStyle::new(BOARD_BG, BOARD_BG);
        fb.fill_rect(start_x + 1, start_y + 1, frame_w - 2, frame_h - 2, ' ', board);
        draw_border(
            fb,
            start_x,
            start_y,
            frame_w,
            frame_h,
            CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0)),
        );

        for (row, cells) in snap.cells.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                self.draw_tile(fb, start_x, start_y, row as u16, col as u16, value);
            }
        }

        self.draw_side_panel(fb, snap, viewport, start_x, start_y, frame_w);

        if snap.won {
            draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "YOU WIN!");
        } else if snap.lost {
            draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "GAME OVER");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    /// Top-left terminal cell of the tile at `(row, col)`.
    pub fn tile_origin(&self, start_x: u16, start_y: u16, row: u16, col: u16) -> (u16, u16) {
        (
            start_x + 1 + self.gap + col * (self.tile_w + self.gap),
            start_y + 1 + self.gap + row * (self.tile_h + self.gap),
        )
    }

    fn draw_tile(&self, fb: &mut FrameBuffer, start_x: u16, start_y: u16, row: u16, col: u16, value: Cell) {
        let (x, y) = self.tile_origin(start_x, start_y, row, col);
        let style = tile_style(value);
        fb.fill_rect(x, y, self.tile_w, self.tile_h, ' ', style);
        if value == EMPTY {
            return;
        }

        let digits = digit_count(value);
        let text_y = y + self.tile_h / 2;
        if digits <= self.tile_w {
            fb.put_u32(x + (self.tile_w - digits) / 2, text_y, value, style);
        } else {
            // Too wide for the tile; show the exponent instead.
            fb.put_char(x, text_y, '^', style);
            fb.put_u32(x + 1, text_y, value.trailing_zeros(), style);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 10 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let hint = value.dim();

        let mut y = start_y;
        for (name, n) in [
            ("SCORE", snap.score),
            ("BEST", snap.best_score),
            ("MOVES", snap.move_id),
        ] {
            fb.put_str(panel_x, y, name, label);
            fb.put_u32(panel_x, y.saturating_add(1), n, value);
            y = y.saturating_add(3);
        }

        if snap.can_undo {
            fb.put_str(panel_x, y, "UNDO READY", value);
        }
        y = y.saturating_add(2);

        for line in ["arrows/hjkl/wasd", "u undo", "r restart", "q quit"] {
            if y >= viewport.height {
                break;
            }
            fb.put_str(panel_x, y, line, hint);
            y = y.saturating_add(1);
        }
    }
}

fn digit_count(mut value: u32) -> u16 {
    let mut n = 1;
    while value >= 10 {
        value /= 10;
        n += 1;
    }
    n
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }
    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, start_x: u16, start_y: u16, frame_w: u16, frame_h: u16, text: &str) {
    let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
    let padded_w = text.chars().count() as u16 + 4;
    let x = start_x.saturating_add(frame_w.saturating_sub(padded_w) / 2);
    let y = start_y.saturating_add(frame_h / 2);
    fb.fill_rect(x, y, padded_w, 1, ' ', style);
    fb.put_centered(x, y, padded_w, text, style);
}
