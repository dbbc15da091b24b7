//! Board flip state machine
//!
//! Two stable states (front or rear visible) and a transient flipping state.
//! The visible face swaps partway through the flip; interaction stays locked
//! until the flip has fully finished. A started flip always runs to the end.

use serde::{Deserialize, Serialize};

use super::anim::{Easing, Tween};
use super::board::Face;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlipState {
    Stable(Face),
    Flipping {
        from: Face,
        to: Face,
        tween: Tween,
        /// Visible face already swapped to `to`
        swapped: bool,
    },
}

/// Milestones reached during one `advance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlipStep {
    /// The visible face changed to this face
    pub swapped_to: Option<Face>,
    /// The flip finished on this face
    pub finished_on: Option<Face>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlipMachine {
    state: FlipState,
    duration: f32,
    swap_fraction: f32,
}

impl FlipMachine {
    /// Every level starts showing the front face
    pub fn new(duration: f32, swap_fraction: f32) -> Self {
        Self {
            state: FlipState::Stable(Face::Front),
            duration,
            swap_fraction: swap_fraction.clamp(0.0, 1.0),
        }
    }

    pub fn state(&self) -> FlipState {
        self.state
    }

    pub fn is_flipping(&self) -> bool {
        matches!(self.state, FlipState::Flipping { .. })
    }

    /// Face whose content is currently shown
    pub fn visible_face(&self) -> Face {
        match self.state {
            FlipState::Stable(face) => face,
            FlipState::Flipping {
                from, to, swapped, ..
            } => {
                if swapped {
                    to
                } else {
                    from
                }
            }
        }
    }

    /// Face shown once any running flip has finished
    pub fn target_face(&self) -> Face {
        match self.state {
            FlipState::Stable(face) => face,
            FlipState::Flipping { to, .. } => to,
        }
    }

    /// Rotation progress in [0, 1] while flipping, 0 when stable
    pub fn progress(&self) -> f32 {
        match self.state {
            FlipState::Stable(_) => 0.0,
            FlipState::Flipping { tween, .. } => tween.progress(),
        }
    }

    /// Start a flip; refused while flipping or without a rear face
    pub fn toggle(&mut self, has_rear: bool) -> bool {
        let FlipState::Stable(from) = self.state else {
            return false;
        };
        if !has_rear {
            return false;
        }
        self.state = FlipState::Flipping {
            from,
            to: from.opposite(),
            tween: Tween::new(self.duration, Easing::Linear),
            swapped: false,
        };
        true
    }

    /// Advance the running flip by `dt`
    pub fn advance(&mut self, dt: f32) -> FlipStep {
        let mut step = FlipStep::default();
        let FlipState::Flipping {
            to,
            ref mut tween,
            ref mut swapped,
            ..
        } = self.state
        else {
            return step;
        };

        let done = tween.advance(dt);
        if !*swapped && (done || tween.progress() >= self.swap_fraction) {
            *swapped = true;
            step.swapped_to = Some(to);
        }
        if done {
            self.state = FlipState::Stable(to);
            step.finished_on = Some(to);
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_requires_rear() {
        let mut flip = FlipMachine::new(0.6, 0.5);
        assert!(!flip.toggle(false));
        assert_eq!(flip.visible_face(), Face::Front);
        assert!(flip.toggle(true));
        assert!(flip.is_flipping());
    }

    #[test]
    fn test_toggle_refused_while_flipping() {
        let mut flip = FlipMachine::new(0.6, 0.5);
        assert!(flip.toggle(true));
        assert!(!flip.toggle(true));
    }

    #[test]
    fn test_target_face_follows_running_flip() {
        let mut flip = FlipMachine::new(0.6, 0.5);
        assert_eq!(flip.target_face(), Face::Front);
        flip.toggle(true);
        assert_eq!(flip.visible_face(), Face::Front);
        assert_eq!(flip.target_face(), Face::Rear);
        flip.advance(1.0);
        assert_eq!(flip.target_face(), Face::Rear);
    }

    #[test]
    fn test_content_swaps_at_fraction() {
        let mut flip = FlipMachine::new(1.0, 0.3);
        flip.toggle(true);

        let step = flip.advance(0.2);
        assert_eq!(step, FlipStep::default());
        assert_eq!(flip.visible_face(), Face::Front);

        let step = flip.advance(0.2);
        assert_eq!(step.swapped_to, Some(Face::Rear));
        assert_eq!(step.finished_on, None);
        assert_eq!(flip.visible_face(), Face::Rear);
        assert!(flip.is_flipping());

        let step = flip.advance(0.7);
        assert_eq!(step.swapped_to, None);
        assert_eq!(step.finished_on, Some(Face::Rear));
        assert_eq!(flip.state(), FlipState::Stable(Face::Rear));
    }

    #[test]
    fn test_long_frame_swaps_and_finishes_together() {
        let mut flip = FlipMachine::new(0.5, 0.5);
        flip.toggle(true);
        let step = flip.advance(2.0);
        assert_eq!(step.swapped_to, Some(Face::Rear));
        assert_eq!(step.finished_on, Some(Face::Rear));

        // And back again
        assert!(flip.toggle(true));
        let step = flip.advance(2.0);
        assert_eq!(step.finished_on, Some(Face::Front));
        assert_eq!(flip.progress(), 0.0);
    }
}
