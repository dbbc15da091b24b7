//! Game state for one loaded level
//!
//! Built wholesale from a `Level` and thrown away on reset or level change.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::ball::{BallId, BallRegistry};
use super::board::{Board, Face};
use super::flip::FlipMachine;
use super::movement::DragSession;
use super::win;
use crate::level::Level;
use crate::settings::Settings;
use crate::view::BoardView;

/// Signals for the host; fire-and-forget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelComplete,
    FaceFlipped(Face),
    TransferBlocked(BallId),
}

/// Complete puzzle state
#[derive(Debug, Clone)]
pub struct GameState {
    pub board: Board,
    pub balls: BallRegistry,
    pub flip: FlipMachine,
    /// Active drag, if a ball is clamped
    pub drag: Option<DragSession>,
    pub settings: Settings,
    /// Level marked complete (sticky until the next load)
    pub complete: bool,
    /// Seconds simulated since load
    pub time: f32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh state for a level; always starts on the front face
    pub fn new(level: &Level, settings: Settings) -> Self {
        let mut state = Self {
            board: level.board.clone(),
            balls: BallRegistry::new(&level.balls, settings.grid_size),
            flip: FlipMachine::new(settings.flip_duration, settings.flip_swap_fraction),
            drag: None,
            settings,
            complete: false,
            time: 0.0,
            events: Vec::new(),
        };
        state.refresh_links();
        state
    }

    pub fn visible_face(&self) -> Face {
        self.flip.visible_face()
    }

    /// New clamps are refused while true
    pub fn interaction_locked(&self) -> bool {
        self.complete || self.flip.is_flipping() || self.balls.all().iter().any(|b| b.is_collapsing())
    }

    /// Ball currently being dragged
    pub fn clamped(&self) -> Option<BallId> {
        self.drag.as_ref().map(|d| d.ball)
    }

    pub fn emit(&mut self, event: GameEvent) {
        log::debug!("event: {event:?}");
        self.events.push(event);
    }

    /// Events emitted since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recompute every ball's links and the drag session's connected nodes
    pub fn refresh_links(&mut self) {
        self.balls.refresh_links(&self.board);
        if let Some(drag) = &mut self.drag {
            let face = self.balls.get(drag.ball).map(|b| b.face).unwrap_or_default();
            drag.connected_nodes =
                self.balls
                    .legal_neighbors(&self.board, drag.ball, face, drag.last_settled);
        }
    }

    /// Run the win check; marks completion and signals it once
    pub fn evaluate_win(&mut self) -> bool {
        if self.complete {
            return true;
        }
        if win::is_complete(&self.balls, self.settings.goal_policy) {
            log::info!("Level complete after {:.2}s", self.time);
            self.complete = true;
            self.emit(GameEvent::LevelComplete);
        }
        self.complete
    }

    /// Balls sharing a cell (empty whenever the occupancy invariant holds)
    pub fn overlapping_balls(&self) -> Vec<(BallId, BallId)> {
        let balls = self.balls.all();
        let mut pairs = Vec::new();
        for (i, a) in balls.iter().enumerate() {
            for b in &balls[i + 1..] {
                if a.face == b.face && a.grid_pos == b.grid_pos {
                    pairs.push((a.id, b.id));
                }
            }
        }
        pairs
    }

    /// Settled cell of a ball
    pub fn ball_cell(&self, id: BallId) -> Option<(Face, IVec2)> {
        self.balls.get(id).map(|b| (b.face, b.grid_pos))
    }

    /// Snapshot for the renderer
    pub fn view(&self) -> BoardView {
        BoardView::capture(self)
    }
}
