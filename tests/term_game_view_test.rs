use tui_2048::core::{GameEngine, GameSnapshot, Grid, SimpleRng};
use tui_2048::term::{tile_color, AnchorY, FrameBuffer, GameView, Viewport};

fn screen_text(fb: &FrameBuffer) -> String {
    let mut all = String::new();
    for y in 0..fb.height() {
        for x in 0..fb.width() {
            all.push(fb.get(x, y).unwrap().ch);
        }
        all.push('\n');
    }
    all
}

fn snapshot_of(rows: [[u32; 4]; 4]) -> GameSnapshot {
    let mut game = GameEngine::new(SimpleRng::new(1));
    game.set_position(Grid::from_rows(rows), 0);
    game.snapshot()
}

#[test]
fn term_view_renders_border_corners() {
    let snap = GameSnapshot::default();
    let view = GameView::default();

    // 4 tiles of 6 columns plus 5 gaps plus border => 31 wide.
    // 4 tiles of 3 rows plus 5 gaps plus border => 19 tall.
    let fb = view.render(&snap, Viewport::new(31, 19));

    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(30, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 18).unwrap().ch, '└');
    assert_eq!(fb.get(30, 18).unwrap().ch, '┘');
}

#[test]
fn term_view_draws_tile_value_centered_with_palette() {
    let snap = snapshot_of([[0, 0, 0, 0], [0, 2048, 0, 0], [0, 0, 0, 0], [0, 0, 0, 2]]);
    let view = GameView::default().with_anchor_y(AnchorY::Top);
    let fb = view.render(&snap, Viewport::new(31, 19));

    // Tile (1, 1) starts at x = 1 + 1 + 7, y = 1 + 1 + 4; text sits on its middle row.
    let (x0, y0) = view.tile_origin(0, 0, 1, 1);
    assert_eq!((x0, y0), (9, 6));
    let text: String = (0..6).map(|dx| fb.get(x0 + dx, y0 + 1).unwrap().ch).collect();
    assert_eq!(text, " 2048 ");
    assert_eq!(fb.get(x0, y0).unwrap().style.bg, tile_color(2048));

    let (x3, y3) = view.tile_origin(0, 0, 3, 3);
    let text: String = (0..6).map(|dx| fb.get(x3 + dx, y3 + 1).unwrap().ch).collect();
    assert_eq!(text.trim(), "2");
    assert_eq!(fb.get(x3, y3).unwrap().style.bg, tile_color(2));
}

#[test]
fn term_view_draws_side_panel_when_wide_enough() {
    let mut snap = GameSnapshot::default();
    snap.score = 1234;
    snap.best_score = 5678;
    snap.move_id = 42;

    let view = GameView::default();
    let text = screen_text(&view.render(&snap, Viewport::new(70, 24)));
    assert!(text.contains("SCORE"));
    assert!(text.contains("1234"));
    assert!(text.contains("BEST"));
    assert!(text.contains("5678"));
    assert!(text.contains("MOVES"));
    assert!(text.contains("42"));

    let narrow = screen_text(&view.render(&snap, Viewport::new(31, 19)));
    assert!(!narrow.contains("SCORE"));
}

#[test]
fn term_view_overlays_terminal_states() {
    let view = GameView::default();

    let won = snapshot_of([[2048, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 2]]);
    assert!(screen_text(&view.render(&won, Viewport::new(40, 20))).contains("YOU WIN!"));

    let lost = snapshot_of([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
    let text = screen_text(&view.render(&lost, Viewport::new(40, 20)));
    assert!(text.contains("GAME OVER"));
    assert!(!text.contains("YOU WIN!"));

    // A stuck grid holding 2048 still reads as a win.
    let stuck_win = snapshot_of([[2048, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
    let text = screen_text(&view.render(&stuck_win, Viewport::new(40, 20)));
    assert!(text.contains("YOU WIN!"));
    assert!(!text.contains("GAME OVER"));

    let playing = snapshot_of([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
    let text = screen_text(&view.render(&playing, Viewport::new(40, 20)));
    assert!(!text.contains("GAME OVER"));
    assert!(!text.contains("YOU WIN!"));
}

#[test]
fn term_view_centers_board_by_default_on_tall_viewports() {
    let view = GameView::default();
    let fb = view.render(&GameSnapshot::default(), Viewport::new(31, 29));

    // start_y = (29 - 19) / 2 = 5
    assert_eq!(fb.get(0, 5).unwrap().ch, '┌');
}

#[test]
fn render_into_reuses_buffer_across_sizes() {
    let view = GameView::default();
    let snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(10, 10);

    view.render_into(&snap, Viewport::new(40, 20), &mut fb);
    assert_eq!((fb.width(), fb.height()), (40, 20));

    view.render_into(&snap, Viewport::new(31, 19), &mut fb);
    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
}
