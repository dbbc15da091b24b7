//! Drag resolution: continuous pointer motion to discrete node steps
//!
//! A drag session exists from pointer-down to pointer-up. While it lives,
//! each pointer sample either pins the ball to its settled node (dead zone),
//! holds it, or starts one eased step to the neighbor that brings the ball
//! closer to the pointer. Steps chain on completion, so a single continuous
//! drag can cross several cells.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::ball::{BallId, MotionKind};
use super::board::NodeType;
use super::state::GameState;
use super::transfer;
use crate::{cell_center, manhattan};

/// The clamped ball and its drag bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    pub ball: BallId,
    pub last_settled: IVec2,
    /// Legal, unoccupied neighbors of `last_settled`
    pub connected_nodes: Vec<IVec2>,
    /// Latest pointer sample
    pub pointer: Vec2,
    /// A step is animating
    pub in_flight: bool,
}

/// What a pointer sample did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No drag session
    Idle,
    /// A step is animating; the sample was recorded only
    Busy,
    /// Pointer inside the dead zone; ball follows it
    Stay,
    /// No improving neighbor, or pointer not far enough yet
    Hold,
    /// A step toward this cell started
    Step(IVec2),
}

/// Neighbor whose center is strictly closer to `pointer` than `from`'s center
pub fn closest_improving(
    from: IVec2,
    candidates: &[IVec2],
    pointer: Vec2,
    grid_size: f32,
) -> Option<IVec2> {
    let current = manhattan(pointer, cell_center(from, grid_size));
    candidates
        .iter()
        .map(|&cell| (cell, manhattan(pointer, cell_center(cell, grid_size))))
        .filter(|&(_, distance)| distance < current)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(cell, _)| cell)
}

/// Clamp the nearest pickable ball on the visible face
pub fn pointer_down(state: &mut GameState, pointer: Vec2) -> Option<BallId> {
    if state.drag.is_some() {
        pointer_up(state);
    }
    if state.interaction_locked() {
        return None;
    }

    let face = state.visible_face();
    let radius = state.settings.pick_radius();
    let ball = state
        .balls
        .all()
        .iter()
        .filter(|b| b.face == face && !b.is_busy())
        .map(|b| (b, b.pixel_pos.distance(pointer)))
        .filter(|&(_, distance)| distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(b, _)| b)?;

    log::debug!("clamped {} at {}", ball.id, ball.grid_pos);
    state.drag = Some(DragSession {
        ball: ball.id,
        last_settled: ball.grid_pos,
        connected_nodes: ball.links.clone(),
        pointer,
        in_flight: false,
    });
    let id = ball.id;
    resolve(state);
    Some(id)
}

/// Feed a pointer sample to the clamped ball
pub fn pointer_move(state: &mut GameState, pointer: Vec2) -> Resolution {
    match &mut state.drag {
        Some(drag) => drag.pointer = pointer,
        None => return Resolution::Idle,
    }
    resolve(state)
}

/// Run the step rules against the session's latest pointer
pub(crate) fn resolve(state: &mut GameState) -> Resolution {
    let Some(drag) = &state.drag else {
        return Resolution::Idle;
    };
    if drag.in_flight {
        return Resolution::Busy;
    }
    let (id, settled, pointer) = (drag.ball, drag.last_settled, drag.pointer);
    let grid_size = state.settings.grid_size;

    let distance = manhattan(pointer, cell_center(settled, grid_size));
    if distance <= state.settings.dead_zone() {
        if let Some(ball) = state.balls.get_mut(id) {
            ball.pixel_pos = pointer;
        }
        return Resolution::Stay;
    }
    if distance <= state.settings.hysteresis() {
        return Resolution::Hold;
    }

    let Some(face) = state.balls.get(id).map(|b| b.face) else {
        return Resolution::Idle;
    };
    // Re-check each candidate; links can lag a peer's in-flight step
    let candidates: Vec<IVec2> = drag
        .connected_nodes
        .iter()
        .copied()
        .filter(|&cell| state.board.connected(id, face, settled, cell))
        .filter(|&cell| !state.balls.occupied_by(face, cell, Some(id)))
        .collect();
    let Some(next) = closest_improving(settled, &candidates, pointer, grid_size) else {
        return Resolution::Hold;
    };

    let duration = state.settings.step_duration;
    if let Some(ball) = state.balls.get_mut(id) {
        ball.start_motion(MotionKind::Step, next, duration);
    }
    if let Some(drag) = &mut state.drag {
        drag.in_flight = true;
    }
    log::debug!("{id} stepping {settled} -> {next}");
    Resolution::Step(next)
}

/// End the drag and snap the ball to the nearest legal node
///
/// Also used for pointer-cancel. An in-flight step is abandoned.
pub fn pointer_up(state: &mut GameState) -> Option<IVec2> {
    let drag = state.drag.take()?;
    let id = drag.ball;
    let grid_size = state.settings.grid_size;

    let (face, pixel) = {
        let ball = state.balls.get_mut(id)?;
        ball.motion = None;
        (ball.face, ball.pixel_pos)
    };

    let target = nearest_legal_node(state, id, pixel, drag.last_settled)
        .unwrap_or(drag.last_settled);
    state.balls.set_grid_position(id, target);
    let duration = state.settings.snap_duration;
    if let Some(ball) = state.balls.get_mut(id) {
        ball.start_motion(MotionKind::Snap, target, duration);
    }
    state.refresh_links();

    log::debug!(
        "released {id} on {face} at {target} ({:.1}px off-grid)",
        manhattan(pixel, cell_center(target, grid_size))
    );
    Some(target)
}

/// Closest accessible, unoccupied cell on the ball's face; ties keep `prefer`
fn nearest_legal_node(state: &GameState, id: BallId, pixel: Vec2, prefer: IVec2) -> Option<IVec2> {
    let face = state.balls.get(id)?.face;
    let grid = state.board.grid(face)?;
    let grid_size = state.settings.grid_size;
    let legal = |cell: IVec2| {
        state.board.accessible_to(id, face, cell) && !state.balls.occupied_by(face, cell, Some(id))
    };

    let mut best: Option<(IVec2, f32)> = None;
    for cell in grid.positions().filter(|&cell| legal(cell)) {
        let distance = manhattan(pixel, cell_center(cell, grid_size));
        let better = match best {
            None => true,
            Some((_, best_distance)) => {
                distance < best_distance || (distance == best_distance && cell == prefer)
            }
        };
        if better {
            best = Some((cell, distance));
        }
    }
    best.map(|(cell, _)| cell)
}

/// A drag step arrived: settle, refresh links, keep following the pointer
pub(crate) fn on_step_complete(state: &mut GameState, id: BallId, to: IVec2) {
    let grid_size = state.settings.grid_size;
    state.balls.set_grid_position(id, to);
    if let Some(ball) = state.balls.get_mut(id) {
        ball.pixel_pos = cell_center(to, grid_size);
    }

    let mut follow = false;
    if let Some(drag) = &mut state.drag {
        if drag.ball == id {
            drag.last_settled = to;
            drag.in_flight = false;
            follow = true;
        }
    }
    state.refresh_links();
    if follow {
        resolve(state);
    }
}

/// A release snap arrived: wells hand off to the transfer resolver
pub(crate) fn on_snap_complete(state: &mut GameState, id: BallId, at: IVec2) {
    let grid_size = state.settings.grid_size;
    let Some(face) = state.balls.get(id).map(|b| b.face) else {
        return;
    };
    if let Some(ball) = state.balls.get_mut(id) {
        ball.pixel_pos = cell_center(at, grid_size);
    }
    state.refresh_links();

    if state.board.node_type(face, at) == Some(NodeType::Well) && state.board.has_rear() {
        transfer::on_well(state, id);
    } else {
        state.evaluate_win();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_improving_picks_minimum() {
        let from = IVec2::new(1, 1);
        let candidates = [IVec2::new(2, 1), IVec2::new(1, 2), IVec2::new(0, 1)];
        // Pointer down-right, more right than down
        let pointer = Vec2::new(170.0, 110.0);
        assert_eq!(
            closest_improving(from, &candidates, pointer, 64.0),
            Some(IVec2::new(2, 1))
        );
    }

    #[test]
    fn test_closest_improving_requires_strict_gain() {
        let from = IVec2::new(0, 0);
        // Pointer straight up, off the board: no neighbor gets closer
        let pointer = Vec2::new(32.0, -80.0);
        assert_eq!(
            closest_improving(from, &[IVec2::new(1, 0), IVec2::new(0, 1)], pointer, 64.0),
            None
        );
        assert_eq!(closest_improving(from, &[], pointer, 64.0), None);
    }
}
