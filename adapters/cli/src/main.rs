#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a headless maze-painter session.
//!
//! Loads a level from JSON (or the built-in demo maze), feeds a scripted
//! move sequence through the session at a fixed pace, and presents each
//! frame through a logging presenter. Useful for soak-testing the engine
//! without a graphical frontend.

use std::{cell::RefCell, collections::VecDeque, fs, path::PathBuf, rc::Rc};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use maze_painter_core::{
    Direction, FrameTime, LevelSpec, PlayerIdentity, ProgressSaveRequest, StartCoord,
};
use maze_painter_rendering::{BoardPresentation, Presenter, Scene, Viewport};
use maze_painter_session::{
    AccountProvider, InputSource, InputSubscription, LevelCompletion, ProgressSink, Session,
};

/// Headless driver for the maze-painter engine.
#[derive(Debug, Parser)]
#[command(name = "maze-painter", about = "Drive a maze-painting session headlessly")]
struct Args {
    /// Path to a JSON level specification; uses the built-in demo level when
    /// omitted.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Move script, one character per intent: u, d, l, r.
    #[arg(long, default_value = "rdlu")]
    moves: String,

    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 16)]
    frame_millis: u64,

    /// Frames to wait between scripted intents.
    #[arg(long, default_value_t = 45)]
    frames_per_move: u64,

    /// Username to record progress for; omitted means guest play.
    #[arg(long)]
    username: Option<String>,

    /// Viewport width used for camera framing, in pixels.
    #[arg(long, default_value_t = 640.0)]
    viewport_width: f32,

    /// Viewport height used for camera framing, in pixels.
    #[arg(long, default_value_t = 480.0)]
    viewport_height: f32,

    /// Tile side length in pixels.
    #[arg(long, default_value_t = 40.0)]
    tile_length: f32,

    /// Simulated-time budget before giving up on an incomplete level.
    #[arg(long, default_value_t = 120_000)]
    budget_millis: u64,
}

/// Scripted input source that releases at most one intent per pacing window.
#[derive(Debug)]
struct PacedInput {
    script: VecDeque<Direction>,
    interval: u64,
    cooldown: u64,
}

impl PacedInput {
    fn new(script: Vec<Direction>, interval: u64) -> Self {
        Self {
            script: script.into(),
            interval,
            cooldown: 0,
        }
    }

    fn advance_frame(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    fn is_drained(&self) -> bool {
        self.script.is_empty()
    }
}

/// Shared handle over a [`PacedInput`] that satisfies the orphan rule when
/// implementing the foreign [`InputSource`] trait.
#[derive(Debug, Clone)]
struct SharedInput(Rc<RefCell<PacedInput>>);

impl InputSource for SharedInput {
    fn subscribe(&mut self) -> InputSubscription {
        InputSubscription::new(1)
    }

    fn next_intent(&mut self) -> Option<Direction> {
        let mut inner = self.0.borrow_mut();
        if inner.cooldown > 0 {
            return None;
        }
        let intent = inner.script.pop_front();
        if intent.is_some() {
            inner.cooldown = inner.interval;
        }
        intent
    }

    fn release(&mut self, subscription: InputSubscription) {
        debug!("input subscription {} released", subscription.token());
    }
}

/// Progress transport stub that records saves to the log.
///
/// A real deployment posts these to a backend; failure stays in here either
/// way.
#[derive(Debug, Default)]
struct LoggingSink;

impl ProgressSink for LoggingSink {
    fn submit(&mut self, request: &ProgressSaveRequest) {
        info!(
            "progress save: {} level {} at ({}, {}) painted {} [t={}ms]",
            request.username,
            request.level.get(),
            request.x,
            request.y,
            request.painted,
            request.timestamp_ms
        );
    }
}

/// Account accessor backed by the command line.
#[derive(Debug)]
struct CliAccounts {
    identity: PlayerIdentity,
}

impl AccountProvider for CliAccounts {
    fn current_user(&self) -> PlayerIdentity {
        self.identity.clone()
    }
}

/// Presenter that narrates frames to the log instead of drawing them.
#[derive(Debug, Default)]
struct LogPresenter;

impl Presenter for LogPresenter {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        debug!(
            "frame: player ({:.2}, {:.2}) progress {:.2} moving {} camera ({:.1}, {:.1}) painted {}/{}",
            scene.player.x,
            scene.player.y,
            scene.progress,
            scene.moving,
            scene.camera.offset().x,
            scene.camera.offset().y,
            scene.painted,
            scene.total
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let spec = load_level(&args)?;
    let script = parse_moves(&args.moves);
    let identity = args.username.clone().map_or(PlayerIdentity::Guest, |username| {
        PlayerIdentity::SignedIn {
            uid: format!("cli-{username}"),
            username,
        }
    });

    let input = Rc::new(RefCell::new(PacedInput::new(script, args.frames_per_move)));
    let completion: Rc<RefCell<Option<LevelCompletion>>> = Rc::new(RefCell::new(None));
    let recorded = Rc::clone(&completion);

    let mut session = Session::new(
        spec,
        SharedInput(Rc::clone(&input)),
        LoggingSink,
        CliAccounts { identity },
        move |finished| {
            *recorded.borrow_mut() = Some(finished);
        },
    );
    session.start();

    let (columns, rows) = session.grid_dimensions();
    let board = BoardPresentation::new(columns, rows, args.tile_length)?;
    let viewport = Viewport::new(args.viewport_width, args.viewport_height)?;
    let mut presenter = LogPresenter;

    let mut now = 0u64;
    while completion.borrow().is_none() && now < args.budget_millis {
        now += args.frame_millis;
        input.borrow_mut().advance_frame();
        let snapshot = session.frame(FrameTime::from_millis(now));

        let scene = Scene::compose(snapshot, session.completion(), board, viewport);
        if let Err(error) = presenter.present(&scene) {
            warn!("presenter failure ignored: {error:#}");
        }

        if input.borrow().is_drained() && !snapshot.moving {
            break;
        }
    }
    session.stop();

    let summary = session.completion();
    match completion.borrow().as_ref() {
        Some(finished) => println!(
            "level {} complete: painted {}/{} in {now}ms of simulated time",
            finished.level.get(),
            finished.painted,
            finished.total
        ),
        None => println!(
            "level {} incomplete: painted {}/{} after {now}ms of simulated time",
            session.level().get(),
            summary.painted,
            summary.total
        ),
    }

    Ok(())
}

fn load_level(args: &Args) -> Result<LevelSpec> {
    match &args.level {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading level file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing level file {}", path.display()))
        }
        None => Ok(demo_level()),
    }
}

/// Built-in ring maze covered exactly by the default "rdlu" script.
fn demo_level() -> LevelSpec {
    LevelSpec {
        id: Some(1),
        grid: vec![
            vec![1, 1, 1, 1, 1, 1],
            vec![1, 0, 0, 0, 0, 1],
            vec![1, 0, 1, 1, 0, 1],
            vec![1, 0, 0, 0, 2, 1],
            vec![1, 1, 1, 1, 1, 1],
        ],
        start: Some(StartCoord { x: 1, y: 1 }),
    }
}

fn parse_moves(moves: &str) -> Vec<Direction> {
    moves
        .chars()
        .filter_map(|symbol| {
            let direction = match symbol.to_ascii_lowercase() {
                'u' => Some(Direction::North),
                'd' => Some(Direction::South),
                'l' => Some(Direction::West),
                'r' => Some(Direction::East),
                _ => None,
            };
            if direction.is_none() {
                warn!("ignoring unknown move symbol {symbol:?}");
            }
            direction
        })
        .collect()
}
