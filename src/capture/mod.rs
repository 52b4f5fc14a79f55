//! Capture domain — the timed hold gesture and what happens when it lands.
//!
//! A hold only starts while the ghost is anchored in AR and the inventory has
//! room. Any release (pointer up, touch end, pointer leave) cancels. The hold
//! completes once the ghost's capture duration has elapsed on the real-time
//! clock, and the catch is then resolved against the store.

use bevy::prelude::*;

use crate::ar::{ArBackend, ArPlacementController};
use crate::hunt::{GameStore, GhostRng};
use crate::shared::*;

mod resolve;
mod session;

pub use resolve::resolve_capture;
pub use session::*;

pub struct CapturePlugin;

impl Plugin for CapturePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CaptureSession>()
            .add_event::<CaptureGestureEvent>()
            .add_event::<CaptureProgressEvent>()
            .add_event::<CaptureSucceededEvent>()
            .add_event::<CaptureCancelledEvent>()
            .add_event::<InventoryFullEvent>()
            .add_event::<Ecto1UnlockedEvent>();
    }
}

/// Turns hold/release gestures into capture starts and cancels.
pub fn handle_capture_gestures(
    mut gestures: EventReader<CaptureGestureEvent>,
    time: Res<Time<Real>>,
    store: Res<GameStore>,
    mut session: ResMut<CaptureSession>,
    mut placement: ResMut<ArPlacementController>,
    mut progress_events: EventWriter<CaptureProgressEvent>,
    mut cancelled_events: EventWriter<CaptureCancelledEvent>,
) {
    for gesture in gestures.read() {
        match *gesture {
            CaptureGestureEvent::Hold => {
                if session.is_capturing() {
                    continue;
                }
                if !placement.is_placed(PlaceableObject::Ghost) || store.is_inventory_full() {
                    debug!("[Capture] Hold ignored: no placed ghost or inventory full");
                    continue;
                }
                let Some(ghost) = store.active_ghost() else {
                    continue;
                };
                if session.start(time.elapsed(), ghost.capture_duration) {
                    placement.pause_idle();
                    progress_events.send(CaptureProgressEvent { progress: 0.0 });
                    info!(
                        "[Capture] Started on {} ghost ({} ms)",
                        ghost.kind.label(),
                        ghost.capture_duration.as_millis()
                    );
                }
            }
            CaptureGestureEvent::Release(cause) => {
                if cancel_capture(&mut session, &mut placement) {
                    progress_events.send(CaptureProgressEvent { progress: 0.0 });
                    cancelled_events.send(CaptureCancelledEvent);
                    info!("[Capture] Cancelled ({:?})", cause);
                }
            }
        }
    }
}

/// Cancels a running capture and resumes the ghost's idle animation.
/// Safe to call repeatedly; only the first call after a start has effects.
pub fn cancel_capture(
    session: &mut CaptureSession,
    placement: &mut ArPlacementController,
) -> bool {
    if !session.cancel() {
        return false;
    }
    placement.resume_idle();
    true
}

/// Samples the running capture against the clock and resolves it on completion.
pub fn advance_capture(
    time: Res<Time<Real>>,
    mut session: ResMut<CaptureSession>,
    mut placement: ResMut<ArPlacementController>,
    mut backend: ResMut<ArBackend>,
    mut store: ResMut<GameStore>,
    mut rng: ResMut<GhostRng>,
    mut progress_events: EventWriter<CaptureProgressEvent>,
    mut succeeded_events: EventWriter<CaptureSucceededEvent>,
    mut full_events: EventWriter<InventoryFullEvent>,
    mut unlocked_events: EventWriter<Ecto1UnlockedEvent>,
    mut persist_events: EventWriter<PersistRequestEvent>,
    mut notices: EventWriter<NoticeEvent>,
) {
    if !session.is_capturing() {
        return;
    }
    match session.dispatch(CaptureInput::Sample { now: time.elapsed() }) {
        CaptureOutcome::InProgress { progress } => {
            progress_events.send(CaptureProgressEvent { progress });
        }
        CaptureOutcome::Succeeded => {
            progress_events.send(CaptureProgressEvent { progress: 1.0 });
            resolve_capture(
                &mut placement,
                backend.anchors.as_mut(),
                &mut store,
                &mut rng.0,
                &mut succeeded_events,
                &mut full_events,
                &mut unlocked_events,
                &mut persist_events,
                &mut notices,
            );
        }
        _ => {}
    }
}
