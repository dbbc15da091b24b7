//! Frame-driven animation clock
//!
//! A `Tween` is scheduled with a duration, ticked by the simulation with the
//! frame delta, and reports completion exactly once. Callers read the eased
//! progress on every tick and act on the completion themselves.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Progress curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    /// Cubic ease-out (fast start, gentle arrival)
    EaseOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// A single scheduled animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    /// Advance by `dt`; returns true once the full duration has elapsed
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Raw progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    /// Eased progress in [0, 1]
    pub fn eased(&self) -> f32 {
        self.easing.apply(self.progress())
    }

    pub fn lerp(&self, from: Vec2, to: Vec2) -> Vec2 {
        from.lerp(to, self.eased())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tween_completes_once_duration_elapsed() {
        let mut tween = Tween::new(0.1, Easing::Linear);
        assert!(!tween.advance(0.05));
        assert!((tween.progress() - 0.5).abs() < 1e-5);
        assert!(tween.advance(0.2));
        assert_eq!(tween.progress(), 1.0);
    }

    #[test]
    fn test_zero_duration_finishes_on_first_tick() {
        let mut tween = Tween::new(0.0, Easing::EaseOut);
        assert_eq!(tween.progress(), 1.0);
        assert!(tween.advance(0.0));
    }

    #[test]
    fn test_ease_out_leads_linear() {
        assert!(Easing::EaseOut.apply(0.3) > 0.3);
        assert_eq!(Easing::EaseOut.apply(1.0), 1.0);
        assert_eq!(Easing::EaseOut.apply(0.0), 0.0);
    }

    #[test]
    fn test_lerp_reaches_target() {
        let mut tween = Tween::new(0.1, Easing::EaseOut);
        tween.advance(1.0);
        let end = tween.lerp(Vec2::ZERO, Vec2::new(64.0, 0.0));
        assert_eq!(end, Vec2::new(64.0, 0.0));
    }
}
