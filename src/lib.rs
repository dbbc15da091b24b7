//! Flip Maze - a two-faced grid puzzle engine
//!
//! Core modules:
//! - `sim`: Board graph, ball registry, drag resolution, wells, flip and win logic
//! - `level`: Level document parsing and load-time validation
//! - `game`: Level lifecycle (load, reset, next, previous)
//! - `progress`: Completion notifications for the persistence layer
//! - `view`: Render snapshot for an external renderer
//! - `settings`: Data-driven tuning

pub mod game;
pub mod level;
pub mod progress;
pub mod settings;
pub mod sim;
pub mod view;

pub use game::Game;
pub use level::{Level, LevelError, LevelPack};
pub use progress::{CompletedLevels, LevelChange, ProgressSink};
pub use settings::{GoalPolicy, Settings, SettingsError};

use glam::{IVec2, Vec2};

/// Engine configuration defaults
pub mod consts {
    /// Pixel size of one grid cell
    pub const GRID_SIZE: f32 = 64.0;

    /// Pointer within `GRID_SIZE * DEAD_ZONE_FACTOR` of the settled node pins the ball
    pub const DEAD_ZONE_FACTOR: f32 = 0.25;
    /// Pointer must be further than `GRID_SIZE * HYSTERESIS_FACTOR` before a step starts
    pub const HYSTERESIS_FACTOR: f32 = 0.75;
    /// Pointer-down picks a ball within `GRID_SIZE * PICK_RADIUS_FACTOR`
    pub const PICK_RADIUS_FACTOR: f32 = 0.5;

    /// Animation durations (seconds)
    pub const STEP_DURATION: f32 = 0.08;
    pub const SNAP_DURATION: f32 = 0.1;
    pub const COLLAPSE_DURATION: f32 = 0.25;
    pub const BLOCKED_DURATION: f32 = 0.3;
    pub const FLIP_DURATION: f32 = 0.6;
    /// Fraction of the flip at which the visible face is swapped
    pub const FLIP_SWAP_FRACTION: f32 = 0.5;

    /// Deepest scale dip of the blocked-transfer animation
    pub const BLOCKED_SCALE_DIP: f32 = 0.25;
    /// Deepest opacity dip of the blocked-transfer animation
    pub const BLOCKED_OPACITY_DIP: f32 = 0.4;
}

/// Manhattan distance between two pixel positions
#[inline]
pub fn manhattan(a: Vec2, b: Vec2) -> f32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Pixel center of a grid cell
#[inline]
pub fn cell_center(pos: IVec2, grid_size: f32) -> Vec2 {
    (pos.as_vec2() + Vec2::splat(0.5)) * grid_size
}

/// Column a well transfers to on the opposite face
#[inline]
pub fn mirror_column(width: i32, x: i32) -> i32 {
    width - 1 - x
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cell_center() {
        let c = cell_center(IVec2::new(2, 1), 10.0);
        assert_eq!(c, Vec2::new(25.0, 15.0));
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(manhattan(Vec2::new(1.0, 2.0), Vec2::new(4.0, -2.0)), 7.0);
    }

    proptest! {
        #[test]
        fn mirror_is_an_involution(width in 1i32..64, x in 0i32..64) {
            prop_assume!(x < width);
            let once = mirror_column(width, x);
            prop_assert!(once >= 0 && once < width);
            prop_assert_eq!(mirror_column(width, once), x);
        }
    }
}
