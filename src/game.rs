//! Level lifecycle
//!
//! Owns the level list and rebuilds the game state wholesale on every load,
//! reset or level change. A refused load leaves the current level untouched.

use crate::level::{Level, LevelError, LevelPack};
use crate::progress::{LevelChange, ProgressSink};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, TickInput, tick};

pub struct Game<P: ProgressSink = ()> {
    levels: Vec<Level>,
    index: usize,
    settings: Settings,
    state: GameState,
    progress: P,
}

impl<P: ProgressSink> Game<P> {
    /// Start on the first level of the pack
    pub fn new(pack: LevelPack, settings: Settings, mut progress: P) -> Result<Self, LevelError> {
        let levels = pack.levels;
        let first = levels.first().ok_or(LevelError::EmptyPack)?;
        let state = GameState::new(first, settings.clone());
        progress.level_changed(0, LevelChange::Load);
        log::info!("Starting level 0 of {}", levels.len());
        Ok(Self {
            levels,
            index: 0,
            settings,
            state,
            progress,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn level_index(&self) -> usize {
        self.index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn current_level(&self) -> &Level {
        &self.levels[self.index]
    }

    fn enter(&mut self, index: usize, change: LevelChange) {
        self.index = index;
        self.state = GameState::new(&self.levels[index], self.settings.clone());
        self.progress.level_changed(index, change);
        let name = self.levels[index].name.as_deref().unwrap_or("untitled");
        log::info!("Level {index} ({name}) {change:?}");
    }

    /// Jump to a level of the pack
    pub fn load_level(&mut self, index: usize) -> Result<(), LevelError> {
        if index >= self.levels.len() {
            return Err(LevelError::NoSuchLevel {
                index,
                count: self.levels.len(),
            });
        }
        self.enter(index, LevelChange::Load);
        Ok(())
    }

    /// Validate and play an external level document; appended after the pack
    pub fn load_level_json(&mut self, json: &str) -> Result<usize, LevelError> {
        let level = Level::from_json(json)?;
        self.levels.push(level);
        let index = self.levels.len() - 1;
        self.enter(index, LevelChange::Load);
        Ok(index)
    }

    /// Rebuild the current level from scratch
    pub fn reset_level(&mut self) {
        self.enter(self.index, LevelChange::Reset);
    }

    /// Advance to the next level; false on the last one
    pub fn next_level(&mut self) -> bool {
        if self.index + 1 >= self.levels.len() {
            return false;
        }
        self.enter(self.index + 1, LevelChange::Next);
        true
    }

    /// Go back one level; false on the first one
    pub fn previous_level(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.enter(self.index - 1, LevelChange::Previous);
        true
    }

    /// Advance one frame and return what it emitted
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        tick(&mut self.state, input, dt);
        let events = self.state.drain_events();
        if events.contains(&GameEvent::LevelComplete) {
            self.progress.level_completed(self.index);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_center;
    use crate::progress::CompletedLevels;
    use crate::sim::{BallId, Face, PointerEvent};
    use glam::IVec2;

    const PACK: &str = r#"{ "levels": [
        { "name": "one", "board": { "front": ["p0 p0"] },
          "balls": [{ "start": [0, 0], "end": [1, 0] }] },
        { "name": "two", "board": { "front": ["p0 p0 p0"] },
          "balls": [{ "start": [2, 0], "end": [0, 0] }] }
    ] }"#;

    fn game() -> Game<CompletedLevels> {
        let pack = LevelPack::from_json(PACK).unwrap();
        Game::new(pack, Settings::default(), CompletedLevels::new()).unwrap()
    }

    fn center(x: i32, y: i32) -> glam::Vec2 {
        cell_center(IVec2::new(x, y), Settings::default().grid_size)
    }

    fn frames(game: &mut Game<CompletedLevels>, events: Vec<PointerEvent>, count: usize) -> Vec<GameEvent> {
        let mut out = game.tick(
            &TickInput {
                pointer: events,
                ..Default::default()
            },
            1.0 / 60.0,
        );
        for _ in 0..count {
            out.extend(game.tick(&TickInput::default(), 1.0 / 60.0));
        }
        out
    }

    #[test]
    fn test_completion_reaches_progress() {
        let mut game = game();
        frames(
            &mut game,
            vec![PointerEvent::Down(center(0, 0)), PointerEvent::Move(center(1, 0))],
            30,
        );
        let events = frames(&mut game, vec![PointerEvent::Up], 30);
        assert_eq!(events, vec![GameEvent::LevelComplete]);
        assert!(game.progress().is_completed(0));
    }

    #[test]
    fn test_next_previous_and_bounds() {
        let mut game = game();
        assert!(!game.previous_level());
        assert!(game.next_level());
        assert_eq!(game.level_index(), 1);
        assert_eq!(game.progress().current, 1);
        assert!(!game.next_level());
        assert!(game.previous_level());
        assert_eq!(game.current_level().name.as_deref(), Some("one"));
        assert!(matches!(
            game.load_level(5),
            Err(LevelError::NoSuchLevel { index: 5, count: 2 })
        ));
    }

    #[test]
    fn test_reset_rebuilds_state() {
        let mut game = game();
        frames(
            &mut game,
            vec![PointerEvent::Down(center(0, 0)), PointerEvent::Move(center(1, 0))],
            30,
        );
        frames(&mut game, vec![PointerEvent::Up], 30);
        assert!(game.state().complete);

        game.reset_level();
        assert!(!game.state().complete);
        assert!(game.state().drag.is_none());
        assert_eq!(
            game.state().ball_cell(BallId(1)),
            Some((Face::Front, IVec2::new(0, 0)))
        );
    }

    #[test]
    fn test_refused_load_keeps_current_level() {
        let mut game = game();
        game.next_level();
        let err = game.load_level_json(r#"{ "board": { "front": ["p0 p0", "p0"] }, "balls": [] }"#);
        assert!(err.is_err());
        assert_eq!(game.level_index(), 1);
        assert_eq!(game.level_count(), 2);
        assert_eq!(
            game.state().ball_cell(BallId(1)),
            Some((Face::Front, IVec2::new(2, 0)))
        );

        let index = game
            .load_level_json(r#"{ "board": { "front": ["w0"] }, "balls": [{ "start": [0, 0], "end": [0, 0] }] }"#)
            .unwrap();
        assert_eq!(index, 2);
        assert_eq!(game.level_index(), 2);
    }

    #[test]
    fn test_every_load_starts_on_front() {
        let pack = LevelPack::from_json(
            r#"{ "levels": [
                { "board": { "front": ["p0"], "rear": ["p0"] },
                  "balls": [{ "start": [0, 0], "end": [-0, -0] }] }
            ] }"#,
        )
        .unwrap();
        let mut game = Game::new(pack, Settings::default(), ()).unwrap();
        game.tick(
            &TickInput {
                flip_view: true,
                ..Default::default()
            },
            1.0,
        );
        assert_eq!(game.state().visible_face(), Face::Rear);
        game.reset_level();
        assert_eq!(game.state().visible_face(), Face::Front);
    }
}
