//! Flip Maze headless runner
//!
//! Loads a level (or level pack) file, or a built-in demo level, and plays a
//! scripted drag through it, logging every emitted event.
//!
//! Usage: `flip-maze [level.json] [settings.json]`
//!
//! A settings path that does not exist yet is written with the defaults.

use flip_maze::sim::{GameEvent, PointerEvent, TickInput};
use flip_maze::{CompletedLevels, Game, Level, LevelError, LevelPack, Settings, cell_center};
use glam::IVec2;
use std::path::Path;

const FRAME_DT: f32 = 1.0 / 60.0;

/// Ball 1 walks onto the well, drops to the rear and rolls home
const DEMO_LEVEL: &str = r#"{
    "name": "demo",
    "board": {
        "front": ["p0 p0 w0", "x0 __ __"],
        "rear":  ["p0 p0 p0", "__ __ p0"]
    },
    "balls": [{ "start": [0, 0], "end": [-2, -1], "color": 0 }]
}"#;

fn load_pack(path: Option<&str>) -> Result<LevelPack, LevelError> {
    let Some(path) = path else {
        return LevelPack::new(vec![Level::from_json(DEMO_LEVEL)?]);
    };
    // Accept both a pack and a single level
    match LevelPack::load(path) {
        Ok(pack) => Ok(pack),
        Err(err @ LevelError::Io(_)) => Err(err),
        Err(_) => LevelPack::new(vec![Level::load(path)?]),
    }
}

/// Settings from `path`; a missing file is created with the defaults
fn load_settings(path: Option<&str>) -> Settings {
    let Some(path) = path else {
        return Settings::default();
    };
    if Path::new(path).exists() {
        return Settings::load(path);
    }
    let settings = Settings::default();
    if let Err(err) = settings.save(path) {
        log::warn!("Could not write default settings to {path}: {err}");
    }
    settings
}

fn run_frames(game: &mut Game<CompletedLevels>, pointer: Vec<PointerEvent>, secs: f32) -> Vec<GameEvent> {
    let mut events = game.tick(
        &TickInput {
            pointer,
            ..Default::default()
        },
        FRAME_DT,
    );
    let frames = (secs / FRAME_DT).ceil() as usize;
    for _ in 0..frames {
        events.extend(game.tick(&TickInput::default(), FRAME_DT));
    }
    for event in &events {
        log::info!("event: {event:?}");
    }
    events
}

/// Drag ball along a list of cells, releasing at the end
fn drag_path(game: &mut Game<CompletedLevels>, path: &[IVec2]) -> Vec<GameEvent> {
    let grid = game.settings().grid_size;
    let Some((first, rest)) = path.split_first() else {
        return Vec::new();
    };
    let mut events = run_frames(game, vec![PointerEvent::Down(cell_center(*first, grid))], 0.1);
    for cell in rest {
        events.extend(run_frames(game, vec![PointerEvent::Move(cell_center(*cell, grid))], 0.2));
    }
    events.extend(run_frames(game, vec![PointerEvent::Up], 1.5));
    events
}

fn main() {
    env_logger::init();
    log::info!("Flip Maze (headless) starting...");

    let mut args = std::env::args().skip(1);
    let level_path = args.next();
    let settings = load_settings(args.next().as_deref());

    let pack = match load_pack(level_path.as_deref()) {
        Ok(pack) => pack,
        Err(err) => {
            log::error!("Could not load levels: {err}");
            std::process::exit(1);
        }
    };
    let mut game = match Game::new(pack, settings, CompletedLevels::new()) {
        Ok(game) => game,
        Err(err) => {
            log::error!("Could not start: {err}");
            std::process::exit(1);
        }
    };

    for row in game.state().view().code_rows() {
        println!("  {row}");
    }

    if level_path.is_none() {
        // Front: (0,0) -> (2,0) well; rear lands on (0,0), then -> (2,0) -> (2,1)
        drag_path(&mut game, &[IVec2::new(0, 0), IVec2::new(1, 0), IVec2::new(2, 0)]);
        drag_path(
            &mut game,
            &[IVec2::new(0, 0), IVec2::new(1, 0), IVec2::new(2, 0), IVec2::new(2, 1)],
        );
    }

    let state = game.state();
    println!(
        "face: {}, complete: {}, levels done: {}",
        state.visible_face(),
        state.complete,
        game.progress().count()
    );
}
