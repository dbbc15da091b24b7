//! Level completion predicate

use super::ball::{Ball, BallRegistry};
use crate::settings::GoalPolicy;

/// Whether one ball rests on its goal, on the goal's face
pub fn ball_on_goal(ball: &Ball, policy: GoalPolicy) -> bool {
    let settled = ball.settled();
    match policy {
        GoalPolicy::Primary => ball.primary_goal() == Some(settled),
        GoalPolicy::AnyOf => ball.goals.contains(&settled),
    }
}

/// Complete iff every ball is on its goal; an empty level never completes
pub fn is_complete(balls: &BallRegistry, policy: GoalPolicy) -> bool {
    !balls.is_empty() && balls.all().iter().all(|b| ball_on_goal(b, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::BallSpec;
    use crate::sim::ball::{BallId, SignedCoord};
    use crate::sim::board::Face;
    use glam::IVec2;
    use proptest::prelude::*;

    fn registry(specs: Vec<BallSpec>) -> BallRegistry {
        BallRegistry::new(&specs, 64.0)
    }

    #[test]
    fn test_face_must_match() {
        let mut balls = registry(vec![BallSpec {
            color: 0,
            start: SignedCoord::front(1, 0),
            goals: vec![SignedCoord::rear(1, 0)],
        }]);
        assert!(!is_complete(&balls, GoalPolicy::Primary));
        balls.set_face(BallId(1), Face::Rear);
        assert!(is_complete(&balls, GoalPolicy::Primary));
    }

    #[test]
    fn test_all_balls_required() {
        let mut balls = registry(vec![
            BallSpec {
                color: 0,
                start: SignedCoord::front(0, 0),
                goals: vec![SignedCoord::front(0, 0)],
            },
            BallSpec {
                color: 1,
                start: SignedCoord::front(1, 0),
                goals: vec![SignedCoord::front(2, 0)],
            },
        ]);
        assert!(!is_complete(&balls, GoalPolicy::Primary));
        balls.set_grid_position(BallId(2), IVec2::new(2, 0));
        assert!(is_complete(&balls, GoalPolicy::Primary));
    }

    #[test]
    fn test_secondary_goal_only_counts_with_any_of() {
        let balls = registry(vec![BallSpec {
            color: 0,
            start: SignedCoord::front(3, 0),
            goals: vec![SignedCoord::front(0, 0), SignedCoord::front(3, 0)],
        }]);
        assert!(!is_complete(&balls, GoalPolicy::Primary));
        assert!(is_complete(&balls, GoalPolicy::AnyOf));
    }

    #[test]
    fn test_empty_level_is_not_complete() {
        assert!(!is_complete(&BallRegistry::default(), GoalPolicy::Primary));
    }

    proptest! {
        #[test]
        fn evaluation_is_stable(
            sx in 0i32..4, sy in 0i32..4, gx in 0i32..4, gy in 0i32..4,
            rear_start in any::<bool>(), rear_goal in any::<bool>(),
        ) {
            let face = |rear: bool| if rear { Face::Rear } else { Face::Front };
            let balls = registry(vec![BallSpec {
                color: 0,
                start: SignedCoord::new(face(rear_start), sx, sy),
                goals: vec![SignedCoord::new(face(rear_goal), gx, gy)],
            }]);
            let first = is_complete(&balls, GoalPolicy::Primary);
            prop_assert_eq!(first, is_complete(&balls, GoalPolicy::Primary));
            prop_assert_eq!(first, rear_start == rear_goal && sx == gx && sy == gy);
        }
    }
}
