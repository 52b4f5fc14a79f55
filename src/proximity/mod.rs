//! Proximity decision run on every position fix.
//!
//! Stateless: the same inputs always give the same report, and nothing is
//! remembered between fixes.

use crate::geo;
use crate::shared::*;

/// Outcome of one proximity pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityReport {
    /// Object that is close enough to be placed, if any.
    pub target: Option<PlaceableObject>,
    /// Ghost ranging for the UI, reported whether or not it is in range.
    pub distance_to_ghost: Option<f64>,
}

impl ProximityReport {
    pub const NONE: ProximityReport = ProximityReport {
        target: None,
        distance_to_ghost: None,
    };
}

/// Decides which object, if any, the player is standing close enough to.
///
/// The ghost is checked first and wins when both are in range.
pub fn evaluate(
    player: Coordinate,
    ghost: Option<&GhostDescriptor>,
    reward: Option<Coordinate>,
    ecto1_unlocked: bool,
    inventory_full: bool,
    capture_radius_m: f64,
) -> ProximityReport {
    let mut report = ProximityReport::NONE;

    if !inventory_full {
        if let Some(ghost) = ghost {
            let d = geo::distance(player, ghost.position);
            report.distance_to_ghost = Some(d);
            if d <= capture_radius_m {
                report.target = Some(PlaceableObject::Ghost);
                return report;
            }
        }
    }

    if ecto1_unlocked {
        if let Some(reward) = reward {
            if geo::distance(player, reward) <= capture_radius_m {
                report.target = Some(PlaceableObject::Ecto1);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const RADIUS: f64 = 15.0;

    // One meter of latitude in degrees.
    const METER: f64 = 1.0 / 111_195.0;

    fn player() -> Coordinate {
        Coordinate::new(40.0, -74.0)
    }

    fn ghost_north(meters: f64) -> GhostDescriptor {
        GhostDescriptor {
            position: player().offset(meters * METER, 0.0),
            kind: GhostKind::Common,
            reward_points: 10,
            capture_duration: Duration::from_millis(5000),
        }
    }

    fn reward_south(meters: f64) -> Coordinate {
        player().offset(-meters * METER, 0.0)
    }

    #[test]
    fn test_ghost_wins_over_closer_reward() {
        let ghost = ghost_north(10.0);
        let report = evaluate(player(), Some(&ghost), Some(reward_south(5.0)), true, false, RADIUS);
        assert_eq!(report.target, Some(PlaceableObject::Ghost));
    }

    #[test]
    fn test_out_of_range_ghost_still_reports_distance() {
        let ghost = ghost_north(42.0);
        let report = evaluate(player(), Some(&ghost), None, false, false, RADIUS);
        assert_eq!(report.target, None);
        let d = report.distance_to_ghost.unwrap();
        assert!((d - 42.0).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn test_reward_targeted_when_unlocked_and_ghost_far() {
        let ghost = ghost_north(100.0);
        let report = evaluate(player(), Some(&ghost), Some(reward_south(5.0)), true, false, RADIUS);
        assert_eq!(report.target, Some(PlaceableObject::Ecto1));
        assert!(report.distance_to_ghost.is_some());
    }

    #[test]
    fn test_reward_ignored_while_locked() {
        let report = evaluate(player(), None, Some(reward_south(1.0)), false, false, RADIUS);
        assert_eq!(report, ProximityReport::NONE);
    }

    #[test]
    fn test_full_inventory_skips_ghost() {
        let ghost = ghost_north(1.0);
        let report = evaluate(player(), Some(&ghost), None, false, true, RADIUS);
        assert_eq!(report.target, None);
        assert_eq!(report.distance_to_ghost, None);
    }

    #[test]
    fn test_full_inventory_still_allows_reward() {
        let ghost = ghost_north(1.0);
        let report = evaluate(player(), Some(&ghost), Some(reward_south(3.0)), true, true, RADIUS);
        assert_eq!(report.target, Some(PlaceableObject::Ecto1));
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let ghost = ghost_north(10.0);
        let d = geo::distance(player(), ghost.position);
        let report = evaluate(player(), Some(&ghost), None, false, false, d);
        assert_eq!(report.target, Some(PlaceableObject::Ghost));
    }
}
