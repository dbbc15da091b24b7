//! Puzzle simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform concerns:
//! - Frame delta in, state and events out
//! - Stable iteration order (by ball id)
//! - Every grid mutation validated against the board graph first

pub mod anim;
pub mod ball;
pub mod board;
pub mod flip;
pub mod movement;
pub mod state;
pub mod tick;
pub mod transfer;
pub mod win;

pub use anim::{Easing, Tween};
pub use ball::{Ball, BallId, BallRegistry, SignedCoord};
pub use board::{Board, Decor, Face, FaceMismatch, Grid, Lane, NodeType, Orientation};
pub use flip::{FlipMachine, FlipState};
pub use movement::{DragSession, Resolution, pointer_down, pointer_move, pointer_up};
pub use state::{GameEvent, GameState};
pub use tick::{PointerEvent, TickInput, request_flip, tick};
pub use transfer::TransferOutcome;
pub use win::is_complete;
