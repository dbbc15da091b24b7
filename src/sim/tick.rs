//! Frame tick
//!
//! Applies the frame's pointer events in order, then advances the flip and
//! every ball animation by the frame delta and dispatches what completed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::BallCompletion;
use super::movement;
use super::state::{GameEvent, GameState};
use super::transfer;

/// Pointer sample in board pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
    Cancel,
}

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer events since the previous frame, oldest first
    pub pointer: Vec<PointerEvent>,
    /// Flip the board to look at the other face
    pub flip_view: bool,
}

/// Start a manual flip; refused while dragging, locked or any ball is animating
pub fn request_flip(state: &mut GameState) -> bool {
    if state.drag.is_some() || state.interaction_locked() {
        return false;
    }
    if state.balls.all().iter().any(|b| b.is_busy()) {
        return false;
    }
    let started = state.flip.toggle(state.board.has_rear());
    if started {
        log::info!("Flipping to {}", state.visible_face().opposite());
    }
    started
}

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    for event in &input.pointer {
        match *event {
            PointerEvent::Down(p) => {
                movement::pointer_down(state, p);
            }
            PointerEvent::Move(p) => {
                movement::pointer_move(state, p);
            }
            PointerEvent::Up | PointerEvent::Cancel => {
                movement::pointer_up(state);
            }
        }
    }
    if input.flip_view {
        request_flip(state);
    }

    state.time += dt;

    // Flip first so one started by a transfer below begins next frame
    let step = state.flip.advance(dt);
    if let Some(face) = step.swapped_to {
        log::debug!("showing {face}");
        state.refresh_links();
    }
    if let Some(face) = step.finished_on {
        log::info!("Board flipped to {face}");
        state.emit(GameEvent::FaceFlipped(face));
        if !state.complete {
            state.evaluate_win();
        }
    }

    let grid_size = state.settings.grid_size;
    let completions: Vec<_> = state
        .balls
        .iter_mut()
        .filter_map(|ball| ball.advance(dt, grid_size).map(|done| (ball.id, done)))
        .collect();

    for (id, done) in completions {
        match done {
            BallCompletion::Step(to) => movement::on_step_complete(state, id, to),
            BallCompletion::Snap(at) => movement::on_snap_complete(state, id, at),
            BallCompletion::Collapsed(destination) => {
                transfer::on_collapsed(state, id, destination)
            }
            BallCompletion::BlockedDone => transfer::on_blocked_done(state, id),
        }
    }
}
