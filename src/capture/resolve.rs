//! Catch resolution.
//!
//! Called from within systems, not a system itself.

use bevy::prelude::*;
use rand::Rng;

use crate::ar::{ArPlacementController, EntityAnchorSink, PlacementEvent};
use crate::hunt::GameStore;
use crate::shared::*;

/// Applies a completed capture. Side effects happen in this order:
///
/// 1. the ghost leaves the AR scene and the pending target is cleared
/// 2. an inventory item is pushed for it
/// 3. the capture is credited to the player's stats
/// 4. "inventory full" and "ECTO-1 unlocked" are signalled when they apply
/// 5. the next ghost is rolled (refused while the inventory is full)
/// 6. a persistence write is requested
pub fn resolve_capture(
    placement: &mut ArPlacementController,
    anchors: &mut dyn EntityAnchorSink,
    store: &mut GameStore,
    rng: &mut impl Rng,
    succeeded_events: &mut EventWriter<CaptureSucceededEvent>,
    full_events: &mut EventWriter<InventoryFullEvent>,
    unlocked_events: &mut EventWriter<Ecto1UnlockedEvent>,
    persist_events: &mut EventWriter<PersistRequestEvent>,
    notices: &mut EventWriter<NoticeEvent>,
) {
    let Some(ghost) = store.take_active_ghost() else {
        warn!("[Capture] Capture completed with no active ghost; ignoring");
        placement.dispatch(PlacementEvent::Unplace(PlaceableObject::Ghost), anchors);
        return;
    };

    placement.dispatch(PlacementEvent::Unplace(PlaceableObject::Ghost), anchors);

    let item = store.next_item(&ghost);
    if !store.add_to_inventory(item.clone()) {
        warn!("[Capture] Inventory full at completion; ghost escaped");
        return;
    }

    let record = store.record_capture(ghost.reward_points);
    info!(
        "[Capture] {} ghost captured: +{} points ({} total, {} captures)",
        ghost.kind.label(),
        ghost.reward_points,
        record.stats.points,
        record.stats.captures
    );
    notices.send(NoticeEvent::transient(format!(
        "Ghost captured! +{} points",
        ghost.reward_points
    )));

    if store.is_inventory_full() {
        let limit = store.tuning().inventory_limit;
        info!("[Capture] Inventory full ({} items)", limit);
        full_events.send(InventoryFullEvent { limit });
        notices.send(NoticeEvent::transient(
            "Inventory full! Deposit your ghosts at the containment unit.",
        ));
    }

    if record.just_unlocked {
        info!("[Capture] ECTO-1 unlocked after {} captures", record.stats.captures);
        unlocked_events.send(Ecto1UnlockedEvent);
        notices.send(NoticeEvent::transient("ECTO-1 unlocked!"));
    }

    match store.generate_ghost(rng) {
        Some(next) => info!("[Capture] Next ghost: {}", next.kind.label()),
        None => debug!("[Capture] No new ghost until the inventory is emptied"),
    }

    persist_events.send(PersistRequestEvent { reason: "capture" });
    succeeded_events.send(CaptureSucceededEvent {
        item,
        stats: record.stats,
    });
}
