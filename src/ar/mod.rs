//! AR domain — anchoring objects on detected surfaces.
//!
//! The engine side (camera, hit testing, meshes) is injected through
//! [`ArBackend`]. This module owns only the placement state machine and the
//! frame tick that drives it.

use bevy::prelude::*;

use crate::shared::*;

mod backend;
mod placement;

pub use backend::*;
pub use placement::*;

pub struct ArPlugin;

impl Plugin for ArPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArPlacementController>()
            .init_resource::<ArBackend>()
            .add_event::<ObjectPlacedEvent>();
    }
}

/// The AR frame tick. Polls the reticle and performs any pending placement.
pub fn place_pending_objects(
    mut controller: ResMut<ArPlacementController>,
    mut backend: ResMut<ArBackend>,
    mut placed_events: EventWriter<ObjectPlacedEvent>,
) {
    if controller.object_to_place().is_none() {
        return;
    }
    let backend = &mut *backend;
    let reticle = backend.hit_test.reticle_pose();
    if let PlacementOutcome::Placed(object) =
        controller.dispatch(PlacementEvent::FrameTick(reticle), backend.anchors.as_mut())
    {
        info!("[AR] Placed {:?} on detected surface", object);
        placed_events.send(ObjectPlacedEvent { object });
    }
}
