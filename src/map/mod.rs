//! Map view model.
//!
//! Holds the markers the tile map should draw and the ranging text shown
//! under it. The map widget itself lives in the web shell and reads this
//! resource; nothing here draws.

use bevy::prelude::*;

use crate::geo;
use crate::hunt::GameStore;
use crate::proximity::ProximityReport;
use crate::shared::*;

pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MapView>().add_systems(
            Update,
            sync_markers.run_if(in_state(GamePhase::Hunting)),
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMarker {
    pub coord: Coordinate,
    pub accuracy_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GhostMarker {
    pub coord: Coordinate,
    pub kind: GhostKind,
}

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct MapView {
    pub center: Option<Coordinate>,
    pub player: Option<PlayerMarker>,
    pub ghost: Option<GhostMarker>,
    /// Only shown once the ECTO-1 is unlocked.
    pub reward: Option<Coordinate>,
    pub ghost_distance_m: Option<f64>,
    pub ghost_bearing_deg: Option<f64>,
    pub inventory_full: bool,
}

impl MapView {
    /// Records a new player fix together with the proximity pass it produced.
    pub fn apply_fix(
        &mut self,
        coord: Coordinate,
        accuracy_m: Option<f64>,
        report: &ProximityReport,
        ghost: Option<&GhostDescriptor>,
    ) {
        self.player = Some(PlayerMarker { coord, accuracy_m });
        self.ghost_distance_m = report.distance_to_ghost;
        self.ghost_bearing_deg = match (report.distance_to_ghost, ghost) {
            (Some(_), Some(ghost)) => Some(geo::bearing(coord, ghost.position)),
            _ => None,
        };
    }

    /// Mirrors the store's ghost and reward into markers.
    pub fn sync_with_store(&mut self, store: &GameStore) {
        self.center = store.selected_location().map(|l| l.center);
        let ghost = store.active_ghost().map(|g| GhostMarker {
            coord: g.position,
            kind: g.kind,
        });
        // Ranging belongs to the ghost it was measured against.
        if ghost.as_ref().map(|g| g.coord) != self.ghost.as_ref().map(|g| g.coord) {
            self.ghost_distance_m = None;
            self.ghost_bearing_deg = None;
        }
        self.ghost = ghost;
        self.reward = if store.stats().ecto1_unlocked {
            store.reward_position()
        } else {
            None
        };
        self.inventory_full = store.is_inventory_full();
    }

    /// Text for the ranging line, e.g. "Ghost: 42m NE".
    pub fn ranging_label(&self) -> String {
        if self.inventory_full {
            return String::from("Inventory full - deposit your ghosts");
        }
        match (self.ghost.as_ref(), self.ghost_distance_m) {
            (None, _) => String::from("No ghost nearby"),
            (Some(_), None) => String::from("Ghost: locating..."),
            (Some(_), Some(d)) => match self.ghost_bearing_deg {
                Some(b) => format!("Ghost: {:.0}m {}", d, geo::compass_point(b)),
                None => format!("Ghost: {:.0}m", d),
            },
        }
    }
}

fn sync_markers(store: Res<GameStore>, mut view: ResMut<MapView>) {
    if store.is_changed() {
        view.sync_with_store(&store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn ghost_at(coord: Coordinate) -> GhostDescriptor {
        GhostDescriptor {
            position: coord,
            kind: GhostKind::Strong,
            reward_points: 25,
            capture_duration: Duration::from_millis(8000),
        }
    }

    #[test]
    fn test_ranging_label_with_distance_and_bearing() {
        let mut view = MapView::default();
        let player = Coordinate::new(40.0, -74.0);
        let ghost = ghost_at(player.offset(0.0003, 0.0003));
        view.ghost = Some(GhostMarker {
            coord: ghost.position,
            kind: ghost.kind,
        });
        let report = ProximityReport {
            target: None,
            distance_to_ghost: Some(41.6),
        };
        view.apply_fix(player, Some(5.0), &report, Some(&ghost));
        assert_eq!(view.ranging_label(), "Ghost: 42m NE");
        assert_eq!(view.player.as_ref().unwrap().accuracy_m, Some(5.0));
    }

    #[test]
    fn test_ranging_label_states() {
        let mut view = MapView::default();
        assert_eq!(view.ranging_label(), "No ghost nearby");
        view.ghost = Some(GhostMarker {
            coord: Coordinate::new(0.0, 0.0),
            kind: GhostKind::Common,
        });
        assert_eq!(view.ranging_label(), "Ghost: locating...");
        view.inventory_full = true;
        assert!(view.ranging_label().starts_with("Inventory full"));
    }

    #[test]
    fn test_new_ghost_drops_stale_ranging() {
        let mut store = GameStore::default().with_locations(vec![Location {
            name: "Firehouse".into(),
            center: Coordinate::new(40.7197, -74.0066),
        }]);
        store.select_location("Firehouse");
        let mut rng = StdRng::seed_from_u64(5);
        let first = store.generate_ghost(&mut rng).unwrap();

        let mut view = MapView::default();
        view.sync_with_store(&store);
        let report = ProximityReport {
            target: Some(PlaceableObject::Ghost),
            distance_to_ghost: Some(0.0),
        };
        view.apply_fix(first.position, None, &report, Some(&first));

        // Same ghost: ranging survives a resync.
        view.sync_with_store(&store);
        assert_eq!(view.ghost_distance_m, Some(0.0));

        let mut second = store.generate_ghost(&mut rng).unwrap();
        while second.position == first.position {
            second = store.generate_ghost(&mut rng).unwrap();
        }
        view.sync_with_store(&store);
        assert_eq!(view.ghost.as_ref().map(|g| g.coord), Some(second.position));
        assert!(view.ghost_distance_m.is_none());
        assert!(view.ghost_bearing_deg.is_none());
        assert_eq!(view.ranging_label(), "Ghost: locating...");
    }

    #[test]
    fn test_reward_marker_hidden_until_unlocked() {
        let mut store = GameStore::default().with_locations(vec![Location {
            name: "Firehouse".into(),
            center: Coordinate::new(40.7197, -74.0066),
        }]);
        store.select_location("Firehouse");
        store.generate_ghost(&mut StdRng::seed_from_u64(5));

        let mut view = MapView::default();
        view.sync_with_store(&store);
        assert!(view.reward.is_none());
        assert!(view.ghost.is_some());

        for _ in 0..store.tuning().ecto1_unlock_count {
            store.record_capture(10);
        }
        view.sync_with_store(&store);
        assert_eq!(view.reward, store.reward_position());
    }
}
