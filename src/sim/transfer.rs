//! Well transfers between the two faces
//!
//! A ball that settles on a well moves to the mirrored column of the opposite
//! face, unless another ball already rests there. A blocked transfer is a
//! normal outcome and only plays the blocked animation.

use glam::IVec2;

use super::ball::{BallId, EffectKind, SignedCoord};
use super::board::Face;
use super::state::{GameEvent, GameState};
use crate::cell_center;

/// What a well arrival started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Collapse animation running; the ball lands on `destination` afterwards
    Collapsing { face: Face, destination: IVec2 },
    /// Destination occupied; the ball stays put
    Blocked,
}

/// Destination of a well on `face` at `well`
pub fn destination(state: &GameState, face: Face, well: IVec2) -> (Face, IVec2) {
    (face.opposite(), state.board.mirror(well))
}

/// A ball settled on a well
pub fn on_well(state: &mut GameState, id: BallId) -> Option<TransferOutcome> {
    let (face, well) = state.ball_cell(id)?;
    let (to_face, to_cell) = destination(state, face, well);

    if state.balls.occupied_by(to_face, to_cell, Some(id)) {
        log::debug!("{id} blocked: {to_face} {to_cell} is taken");
        let duration = state.settings.blocked_duration;
        state.balls.get_mut(id)?.start_effect(EffectKind::Blocked, duration);
        state.emit(GameEvent::TransferBlocked(id));
        return Some(TransferOutcome::Blocked);
    }

    log::info!("{id} entering well at {face} {well} -> {to_face} {to_cell}");
    let duration = state.settings.collapse_duration;
    state.balls.get_mut(id)?.start_effect(
        EffectKind::Collapse {
            destination: to_cell,
        },
        duration,
    );
    Some(TransferOutcome::Collapsing {
        face: to_face,
        destination: to_cell,
    })
}

/// Collapse finished: move the ball across and flip the board
pub(crate) fn on_collapsed(state: &mut GameState, id: BallId, destination: IVec2) {
    let grid_size = state.settings.grid_size;
    let Some(ball) = state.balls.get_mut(id) else {
        return;
    };
    let face = ball.face.opposite();
    ball.face = face;
    ball.grid_pos = destination;
    ball.pixel_pos = cell_center(destination, grid_size);
    ball.original_start = SignedCoord {
        face,
        pos: destination,
    };
    state.refresh_links();

    // Win check waits for the flip that shows the ball's new face
    if state.flip.target_face() == face {
        if !state.flip.is_flipping() {
            state.evaluate_win();
        }
    } else if !state.flip.toggle(state.board.has_rear()) {
        log::warn!("{id} moved to {face} but the board could not flip");
        state.evaluate_win();
    }
}

/// Blocked animation finished
pub(crate) fn on_blocked_done(state: &mut GameState, _id: BallId) {
    state.evaluate_win();
}
