//! Ball entities and the registry that owns them
//!
//! The registry is the only place a ball's grid cell is stored, so it also
//! answers occupancy questions.

use std::fmt;

use glam::{IVec2, Vec2};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::anim::{Easing, Tween};
use super::board::{Board, Face};
use crate::cell_center;
use crate::consts::{BLOCKED_OPACITY_DIP, BLOCKED_SCALE_DIP};
use crate::level::BallSpec;

/// Ball identity, 1-based in level order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BallId(pub u32);

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ball#{}", self.0)
    }
}

/// A grid position tagged with its face
///
/// In level documents this is a pair where a negative component (sign bit
/// set, so `-0` counts) puts the position on the rear face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignedCoord {
    pub face: Face,
    pub pos: IVec2,
}

impl SignedCoord {
    pub fn new(face: Face, x: i32, y: i32) -> Self {
        Self {
            face,
            pos: IVec2::new(x, y),
        }
    }

    pub fn front(x: i32, y: i32) -> Self {
        Self::new(Face::Front, x, y)
    }

    pub fn rear(x: i32, y: i32) -> Self {
        Self::new(Face::Rear, x, y)
    }

    /// Decode a document pair; `None` if a component is not a whole number
    pub fn from_components(x: f64, y: f64) -> Option<Self> {
        let whole = |v: f64| v.is_finite() && v.fract() == 0.0 && v.abs() <= f64::from(i32::MAX);
        if !whole(x) || !whole(y) {
            return None;
        }
        let face = if x.is_sign_negative() || y.is_sign_negative() {
            Face::Rear
        } else {
            Face::Front
        };
        Some(Self::new(face, x.abs() as i32, y.abs() as i32))
    }

    /// Encode as a document pair (rear components are negated, `0` as `-0`)
    pub fn to_components(self) -> [f64; 2] {
        let x = f64::from(self.pos.x);
        let y = f64::from(self.pos.y);
        match self.face {
            Face::Front => [x, y],
            Face::Rear => [-x, -y],
        }
    }
}

impl Serialize for SignedCoord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_components().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SignedCoord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [x, y] = <[f64; 2]>::deserialize(deserializer)?;
        SignedCoord::from_components(x, y)
            .ok_or_else(|| de::Error::custom(format!("[{x}, {y}] is not a grid coordinate")))
    }
}

/// Why a ball is moving between two pixel positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionKind {
    /// Drag step to a neighbor; the cell is taken on arrival
    Step,
    /// Release snap; the cell was taken when the snap started
    Snap,
}

/// Pixel interpolation toward a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub kind: MotionKind,
    pub from: Vec2,
    pub to: IVec2,
    pub tween: Tween,
}

/// Scale/opacity effects played by the well resolver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Shrink and fade before moving to `destination` on the other face
    Collapse { destination: IVec2 },
    /// Dip and recover; the destination was occupied
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub tween: Tween,
}

/// What finished for a ball during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallCompletion {
    Step(IVec2),
    Snap(IVec2),
    Collapsed(IVec2),
    BlockedDone,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    /// Index into the host's color table
    pub color: u32,
    pub face: Face,
    /// Settled cell (a drag step claims its target through `motion`)
    pub grid_pos: IVec2,
    pub pixel_pos: Vec2,
    /// Start position, rewritten when a well moves the ball to the other face
    pub original_start: SignedCoord,
    /// Goals in document order; the first is the primary goal
    pub goals: Vec<SignedCoord>,
    pub scale: f32,
    pub opacity: f32,
    pub motion: Option<Motion>,
    pub effect: Option<Effect>,
    /// Legal, unoccupied neighbors of `grid_pos`
    #[serde(skip)]
    pub links: Vec<IVec2>,
}

impl Ball {
    pub fn new(id: BallId, spec: &BallSpec, grid_size: f32) -> Self {
        Self {
            id,
            color: spec.color,
            face: spec.start.face,
            grid_pos: spec.start.pos,
            pixel_pos: cell_center(spec.start.pos, grid_size),
            original_start: spec.start,
            goals: spec.goals.clone(),
            scale: 1.0,
            opacity: 1.0,
            motion: None,
            effect: None,
            links: Vec::new(),
        }
    }

    /// Settled position with its face
    pub fn settled(&self) -> SignedCoord {
        SignedCoord {
            face: self.face,
            pos: self.grid_pos,
        }
    }

    pub fn primary_goal(&self) -> Option<SignedCoord> {
        self.goals.first().copied()
    }

    /// Animating in any way
    pub fn is_busy(&self) -> bool {
        self.motion.is_some() || self.effect.is_some()
    }

    pub fn is_collapsing(&self) -> bool {
        matches!(
            self.effect,
            Some(Effect {
                kind: EffectKind::Collapse { .. },
                ..
            })
        )
    }

    /// Cells this ball holds: its settled cell plus an in-flight step target
    pub fn claims(&self, face: Face, pos: IVec2) -> bool {
        if self.face != face {
            return false;
        }
        self.grid_pos == pos
            || matches!(self.motion, Some(Motion { kind: MotionKind::Step, to, .. }) if to == pos)
    }

    /// Begin interpolating toward a cell from the current pixel position
    pub fn start_motion(&mut self, kind: MotionKind, to: IVec2, duration: f32) {
        self.motion = Some(Motion {
            kind,
            from: self.pixel_pos,
            to,
            tween: Tween::new(duration, Easing::EaseOut),
        });
    }

    pub fn start_effect(&mut self, kind: EffectKind, duration: f32) {
        self.effect = Some(Effect {
            kind,
            tween: Tween::new(duration, Easing::Linear),
        });
    }

    /// Advance this ball's animation clock
    pub fn advance(&mut self, dt: f32, grid_size: f32) -> Option<BallCompletion> {
        if let Some(motion) = &mut self.motion {
            let done = motion.tween.advance(dt);
            let target = cell_center(motion.to, grid_size);
            self.pixel_pos = motion.tween.lerp(motion.from, target);
            if !done {
                return None;
            }
            let (kind, to) = (motion.kind, motion.to);
            self.motion = None;
            return Some(match kind {
                MotionKind::Step => BallCompletion::Step(to),
                MotionKind::Snap => BallCompletion::Snap(to),
            });
        }

        let effect = self.effect.as_mut()?;
        let done = effect.tween.advance(dt);
        let t = effect.tween.eased();
        match effect.kind {
            EffectKind::Collapse { .. } => {
                self.scale = 1.0 - t;
                self.opacity = 1.0 - t;
            }
            EffectKind::Blocked => {
                let dip = (t * std::f32::consts::PI).sin();
                self.scale = 1.0 - BLOCKED_SCALE_DIP * dip;
                self.opacity = 1.0 - BLOCKED_OPACITY_DIP * dip;
            }
        }
        if !done {
            return None;
        }
        let kind = effect.kind;
        self.effect = None;
        self.scale = 1.0;
        self.opacity = 1.0;
        Some(match kind {
            EffectKind::Collapse { destination } => BallCompletion::Collapsed(destination),
            EffectKind::Blocked => BallCompletion::BlockedDone,
        })
    }
}

/// All balls of the loaded level, ordered by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallRegistry {
    balls: Vec<Ball>,
}

impl BallRegistry {
    /// Create balls from level specs; ids follow document order starting at 1
    pub fn new(specs: &[BallSpec], grid_size: f32) -> Self {
        let balls = specs
            .iter()
            .zip(1u32..)
            .map(|(spec, id)| Ball::new(BallId(id), spec, grid_size))
            .collect();
        Self { balls }
    }

    pub fn get(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    pub fn all(&self) -> &[Ball] {
        &self.balls
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ball> {
        self.balls.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Move a ball's settled cell; callers validate the move first
    pub fn set_grid_position(&mut self, id: BallId, pos: IVec2) -> bool {
        match self.get_mut(id) {
            Some(ball) => {
                ball.grid_pos = pos;
                true
            }
            None => false,
        }
    }

    pub fn set_face(&mut self, id: BallId, face: Face) -> bool {
        match self.get_mut(id) {
            Some(ball) => {
                ball.face = face;
                true
            }
            None => false,
        }
    }

    /// Whether any ball other than `excluding` holds the cell
    pub fn occupied_by(&self, face: Face, pos: IVec2, excluding: Option<BallId>) -> bool {
        self.balls
            .iter()
            .filter(|b| Some(b.id) != excluding)
            .any(|b| b.claims(face, pos))
    }

    /// Ball settled on a cell, if any
    pub fn ball_at(&self, face: Face, pos: IVec2) -> Option<BallId> {
        self.balls
            .iter()
            .find(|b| b.face == face && b.grid_pos == pos)
            .map(|b| b.id)
    }

    /// Connected, unoccupied neighbors of `pos` for a ball
    pub fn legal_neighbors(&self, board: &Board, id: BallId, face: Face, pos: IVec2) -> Vec<IVec2> {
        board
            .neighbors(pos)
            .filter(|next| board.connected(id, face, pos, *next))
            .filter(|next| !self.occupied_by(face, *next, Some(id)))
            .collect()
    }

    /// Recompute every ball's links after any cell changes hands
    pub fn refresh_links(&mut self, board: &Board) {
        let links: Vec<Vec<IVec2>> = self
            .balls
            .iter()
            .map(|b| self.legal_neighbors(board, b.id, b.face, b.grid_pos))
            .collect();
        for (ball, links) in self.balls.iter_mut().zip(links) {
            ball.links = links;
        }
    }
}
