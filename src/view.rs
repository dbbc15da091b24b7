//! Render snapshot
//!
//! Everything an external renderer needs for one frame: the visible face's
//! grid, the flip progress and the balls on the visible face.

use glam::Vec2;
use serde::Serialize;

use crate::sim::{BallId, Face, GameState, NodeType};

/// One drawable ball
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallSprite {
    pub id: BallId,
    pub color: u32,
    pub face: Face,
    pub pixel_pos: Vec2,
    pub scale: f32,
    pub opacity: f32,
    /// Being dragged right now
    pub clamped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub face: Face,
    pub width: i32,
    pub height: i32,
    pub grid_size: f32,
    /// Visible face cells, row-major
    pub rows: Vec<Vec<NodeType>>,
    pub flipping: bool,
    /// Rotation progress in [0, 1] while flipping
    pub flip_progress: f32,
    pub balls: Vec<BallSprite>,
    pub complete: bool,
}

impl BoardView {
    pub fn capture(state: &GameState) -> Self {
        let face = state.visible_face();
        let rows = state
            .board
            .grid(face)
            .map(|grid| grid.rows().map(<[NodeType]>::to_vec).collect())
            .unwrap_or_default();
        let clamped = state.clamped();
        let balls = state
            .balls
            .all()
            .iter()
            .filter(|b| b.face == face)
            .map(|b| BallSprite {
                id: b.id,
                color: b.color,
                face: b.face,
                pixel_pos: b.pixel_pos,
                scale: b.scale,
                opacity: b.opacity,
                clamped: clamped == Some(b.id),
            })
            .collect();

        Self {
            face,
            width: state.board.width(),
            height: state.board.height(),
            grid_size: state.settings.grid_size,
            rows,
            flipping: state.flip.is_flipping(),
            flip_progress: state.flip.progress(),
            balls,
            complete: state.complete,
        }
    }

    /// Row codes, handy for text renderers and debugging
    pub fn code_rows(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|n| n.code()).collect::<Vec<_>>().join(" "))
            .collect()
    }

    pub fn sprite(&self, id: BallId) -> Option<&BallSprite> {
        self.balls.iter().find(|b| b.id == id)
    }

    /// Sprite under a pixel position, for hover feedback
    pub fn sprite_at(&self, pos: Vec2) -> Option<&BallSprite> {
        let radius = self.grid_size * 0.5;
        self.balls
            .iter()
            .find(|b| b.pixel_pos.distance(pos) <= radius * b.scale)
    }
}
