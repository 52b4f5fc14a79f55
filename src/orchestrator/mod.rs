//! Orchestrator — wires the domains into one game loop.
//!
//! Owns the inputs that touch more than one domain: location selection,
//! save restores, the position stream and the AR session lifecycle.
//! Everything that runs while hunting is chained so a position fix, a gesture
//! and a placement observed in the same frame are applied in that order.

use bevy::prelude::*;

use crate::ar::{
    place_pending_objects, ArBackend, ArPlacementController, ArPlugin, PlacementEvent,
    PlacementOutcome,
};
use crate::capture::{
    advance_capture, cancel_capture, handle_capture_gestures, CapturePlugin, CaptureSession,
};
use crate::config::GameTuning;
use crate::data::DataPlugin;
use crate::deposit::{handle_deposit_scans, DepositPlugin};
use crate::hunt::{GameStore, GhostRng};
use crate::map::{MapPlugin, MapView};
use crate::notice::{NoticeBoard, NoticePlugin};
use crate::proximity;
use crate::save::{apply_loaded_state, Persistence, SavePlugin};
use crate::shared::*;

/// The whole game minus the host shell. Add `StatesPlugin` (or a plugin
/// group containing it) first.
pub struct GhostSquadPlugin {
    pub tuning: GameTuning,
    /// Fixed ghost seed. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GhostSquadPlugin {
    fn default() -> Self {
        Self {
            tuning: GameTuning::default(),
            seed: None,
        }
    }
}

impl Plugin for GhostSquadPlugin {
    fn build(&self, app: &mut App) {
        let rng = self.seed.map(GhostRng::seeded).unwrap_or_default();

        app.init_state::<GamePhase>()
            .insert_resource(GameStore::new(self.tuning.clone()))
            .insert_resource(rng)
            .init_resource::<PlayerPosition>()
            .init_resource::<GeoStatus>()
            .add_event::<PositionUpdateEvent>()
            .add_event::<PositionErrorEvent>()
            .add_event::<SelectLocationEvent>()
            .add_event::<ArSessionEvent>()
            .add_plugins((
                DataPlugin,
                NoticePlugin,
                ArPlugin,
                CapturePlugin,
                DepositPlugin,
                MapPlugin,
                SavePlugin,
            ))
            .add_systems(OnEnter(GamePhase::ChoosingLocation), sync_known_locations)
            .add_systems(
                Update,
                (
                    handle_position_errors,
                    handle_ar_session_events,
                    handle_location_selection.run_if(not(in_state(GamePhase::Loading))),
                    handle_saved_state_loads,
                )
                    .chain()
                    .in_set(SessionInputs),
            )
            .add_systems(
                Update,
                (
                    ingest_position_updates,
                    handle_capture_gestures,
                    advance_capture,
                    place_pending_objects,
                    handle_deposit_scans,
                )
                    .chain()
                    .after(SessionInputs)
                    .run_if(in_state(GamePhase::Hunting)),
            );
    }
}

/// Inputs that can reset the hunt. They run before the hunting chain.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionInputs;

fn sync_known_locations(registry: Res<LocationRegistry>, mut store: ResMut<GameStore>) {
    store.set_known_locations(registry.locations.clone());
    debug!("[Session] {} locations available", registry.locations.len());
}

/// Message pinned while the position stream is down.
pub fn gps_notice(reason: &str) -> String {
    format!("Location unavailable: {}. Enable GPS to keep hunting.", reason)
}

pub const AR_LOST_NOTICE: &str = "AR session lost. Restart the camera to keep hunting.";

fn handle_location_selection(
    mut selections: EventReader<SelectLocationEvent>,
    phase: Res<State<GamePhase>>,
    mut next_phase: ResMut<NextState<GamePhase>>,
    mut store: ResMut<GameStore>,
    mut rng: ResMut<GhostRng>,
    mut session: ResMut<CaptureSession>,
    mut placement: ResMut<ArPlacementController>,
    mut backend: ResMut<ArBackend>,
    mut map_view: ResMut<MapView>,
    mut cancelled_events: EventWriter<CaptureCancelledEvent>,
    mut notices: EventWriter<NoticeEvent>,
) {
    for selection in selections.read() {
        if !store.select_location(&selection.name) {
            warn!("[Session] Unknown location '{}'", selection.name);
            notices.send(NoticeEvent::transient(format!(
                "Unknown location: {}",
                selection.name
            )));
            continue;
        }

        if cancel_capture(&mut session, &mut placement) {
            cancelled_events.send(CaptureCancelledEvent);
        }
        placement.reset_placement_state(backend.anchors.as_mut());
        *map_view = MapView::default();

        match store.generate_ghost(&mut rng.0) {
            Some(ghost) => info!(
                "[Session] Hunting at {}: {} ghost spawned",
                selection.name,
                ghost.kind.label()
            ),
            None => info!(
                "[Session] Hunting at {}: inventory full, no ghost until deposit",
                selection.name
            ),
        }
        map_view.sync_with_store(&store);

        if *phase.get() != GamePhase::Hunting {
            next_phase.set(GamePhase::Hunting);
        }
    }
}

/// Restores the player's saved progress. When the restore replaces or drops
/// the active ghost, the old ghost's capture and anchor go with it.
fn handle_saved_state_loads(
    mut load_events: EventReader<LoadSavedStateEvent>,
    identity: Res<PlayerIdentity>,
    persistence: Res<Persistence>,
    mut store: ResMut<GameStore>,
    mut rng: ResMut<GhostRng>,
    mut session: ResMut<CaptureSession>,
    mut placement: ResMut<ArPlacementController>,
    mut backend: ResMut<ArBackend>,
    mut map_view: ResMut<MapView>,
    mut cancelled_events: EventWriter<CaptureCancelledEvent>,
) {
    for _ in load_events.read() {
        let saved = match persistence.0.load_state(&identity.uid) {
            Ok(Some(saved)) => saved,
            Ok(None) => {
                info!("[Save] No saved state for '{}'", identity.uid);
                continue;
            }
            Err(e) => {
                warn!("[Save] Load for '{}' FAILED: {}", identity.uid, e);
                continue;
            }
        };

        if apply_loaded_state(&mut store, saved, &mut rng.0) {
            if cancel_capture(&mut session, &mut placement) {
                cancelled_events.send(CaptureCancelledEvent);
            }
            placement.dispatch(
                PlacementEvent::Unplace(PlaceableObject::Ghost),
                backend.anchors.as_mut(),
            );
        }
        map_view.sync_with_store(&store);
        info!(
            "[Save] Restored '{}': {} points, {} captures",
            identity.uid,
            store.stats().points,
            store.stats().captures
        );
    }
}

fn handle_position_errors(
    mut errors: EventReader<PositionErrorEvent>,
    mut geo_status: ResMut<GeoStatus>,
    mut placement: ResMut<ArPlacementController>,
    mut backend: ResMut<ArBackend>,
    mut notices: EventWriter<NoticeEvent>,
) {
    let Some(error) = errors.read().last() else {
        return;
    };
    let status = GeoStatus::Unavailable {
        reason: error.reason.clone(),
    };
    if *geo_status == status {
        return;
    }
    warn!("[Geo] Position stream failed: {}", error.reason);
    *geo_status = status;
    // A stale target must not be placed while we cannot tell where the player is.
    placement.dispatch(PlacementEvent::TargetChanged(None), backend.anchors.as_mut());
    notices.send(NoticeEvent::persistent(gps_notice(&error.reason)));
}

fn ingest_position_updates(
    mut updates: EventReader<PositionUpdateEvent>,
    store: Res<GameStore>,
    mut player: ResMut<PlayerPosition>,
    mut geo_status: ResMut<GeoStatus>,
    mut placement: ResMut<ArPlacementController>,
    mut backend: ResMut<ArBackend>,
    mut map_view: ResMut<MapView>,
    mut board: ResMut<NoticeBoard>,
) {
    for update in updates.read() {
        if let GeoStatus::Unavailable { reason } = &*geo_status {
            info!("[Geo] Position stream recovered");
            board.dismiss_persistent(&gps_notice(reason));
        }
        *geo_status = GeoStatus::Tracking;
        player.coord = Some(update.coord);
        player.accuracy_m = update.accuracy_m;

        let report = proximity::evaluate(
            update.coord,
            store.active_ghost(),
            store.reward_position(),
            store.stats().ecto1_unlocked,
            store.is_inventory_full(),
            store.tuning().capture_radius_m,
        );

        if let PlacementOutcome::TargetSet(Some(object)) = placement.dispatch(
            PlacementEvent::TargetChanged(report.target),
            backend.anchors.as_mut(),
        ) {
            info!("[Proximity] {:?} in range, waiting for a surface", object);
        }

        map_view.apply_fix(update.coord, update.accuracy_m, &report, store.active_ghost());
    }
}

fn handle_ar_session_events(
    mut sessions: EventReader<ArSessionEvent>,
    mut session: ResMut<CaptureSession>,
    mut placement: ResMut<ArPlacementController>,
    mut backend: ResMut<ArBackend>,
    mut board: ResMut<NoticeBoard>,
    mut cancelled_events: EventWriter<CaptureCancelledEvent>,
    mut notices: EventWriter<NoticeEvent>,
) {
    for event in sessions.read() {
        if cancel_capture(&mut session, &mut placement) {
            cancelled_events.send(CaptureCancelledEvent);
        }
        placement.reset_placement_state(backend.anchors.as_mut());

        match event {
            ArSessionEvent::Started => {
                info!("[AR] Session started");
                board.dismiss_persistent(AR_LOST_NOTICE);
            }
            ArSessionEvent::Lost { reason } => {
                warn!("[AR] Session lost: {}", reason);
                notices.send(NoticeEvent::persistent(AR_LOST_NOTICE));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_notice_names_reason() {
        assert_eq!(
            gps_notice("permission denied"),
            "Location unavailable: permission denied. Enable GPS to keep hunting."
        );
    }
}
