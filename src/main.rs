//! Terminal 2048 runner (default binary).
//!
//! Turn based: the loop blocks on input and redraws after every key press or
//! resize. It uses crossterm for input and the framebuffer renderer from
//! `tui_2048::term`.

use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, info};

use tui_2048::core::{GameEngine, GameSnapshot, StdRandom};
use tui_2048::input::{handle_key_event, should_quit};
use tui_2048::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use tui_2048::{BestScoreFile, GameConfig};

fn main() -> Result<()> {
    let config = GameConfig::from_env();
    init_logging(&config)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Log to a file when configured; raw-mode stdout is not an option.
fn init_logging(config: &GameConfig) -> Result<()> {
    let Some(path) = config.log_path.as_ref() else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("failed to open log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn run(term: &mut TerminalRenderer, config: &GameConfig) -> Result<()> {
    let store = config.best_score_path.clone().map(BestScoreFile::new);
    let best = store.as_ref().map(BestScoreFile::load_or_zero).unwrap_or(0);

    let rng = match config.seed {
        Some(seed) => StdRandom::seeded(seed),
        None => StdRandom::from_entropy(),
    };
    let mut game = GameEngine::with_config(config.engine_config(best), rng);
    if let Some(store) = store {
        game.set_best_score_observer(move |best: u32| store.store_or_warn(best));
    }
    info!(seed = ?config.seed, best, spawn_policy = game.spawn_policy().as_str(), "game started");

    let view = GameView::default();
    let mut snap = GameSnapshot::default();
    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut fb = FrameBuffer::new(w, h);

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        game.snapshot_into(&mut snap);
        view.render_into(&snap, Viewport::new(w, h), &mut fb);
        term.draw(&fb)?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if should_quit(key) {
                    break;
                }
                if let Some(action) = handle_key_event(key) {
                    let changed = game.apply_action(action);
                    debug!(action = action.as_str(), changed, score = game.score(), "key applied");
                }
            }
            Event::Resize(..) => term.invalidate(),
            _ => {}
        }
    }

    info!(score = game.score(), best = game.best_score(), "game closed");
    Ok(())
}
