//! Deposit domain — emptying the trap inventory at the containment unit.
//!
//! The QR scanner reports whatever it decoded. Only an exact match with the
//! configured containment unit id empties the inventory; anything else is
//! reported to the player and changes nothing.

use bevy::prelude::*;
use rand::Rng;

use crate::hunt::{GameStore, GhostRng};
use crate::shared::*;

pub struct DepositPlugin;

impl Plugin for DepositPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<QrDecodedEvent>()
            .add_event::<DepositCompletedEvent>();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositOutcome {
    InvalidCode,
    Empty,
    Deposited { items: usize, points_value: u32 },
}

/// Applies one decoded payload to the store.
///
/// A successful deposit that frees space also rolls a new ghost when none is
/// active.
pub fn apply_deposit(store: &mut GameStore, payload: &str, rng: &mut impl Rng) -> DepositOutcome {
    if payload != store.tuning().containment_unit_id {
        return DepositOutcome::InvalidCode;
    }
    if store.inventory().is_empty() {
        return DepositOutcome::Empty;
    }

    let drained = store.clear_inventory();
    let points_value = drained.iter().map(|item| item.reward_points).sum();

    if store.active_ghost().is_none() {
        store.generate_ghost(rng);
    }

    DepositOutcome::Deposited {
        items: drained.len(),
        points_value,
    }
}

pub fn handle_deposit_scans(
    mut scans: EventReader<QrDecodedEvent>,
    mut store: ResMut<GameStore>,
    mut rng: ResMut<GhostRng>,
    mut completed_events: EventWriter<DepositCompletedEvent>,
    mut persist_events: EventWriter<PersistRequestEvent>,
    mut notices: EventWriter<NoticeEvent>,
) {
    for scan in scans.read() {
        match apply_deposit(&mut store, &scan.payload, &mut rng.0) {
            DepositOutcome::InvalidCode => {
                info!("[Deposit] Rejected code '{}'", scan.payload);
                notices.send(NoticeEvent::transient("Invalid code"));
            }
            DepositOutcome::Empty => {
                notices.send(NoticeEvent::transient("Nothing to deposit"));
            }
            DepositOutcome::Deposited {
                items,
                points_value,
            } => {
                info!(
                    "[Deposit] {} ghosts ({} points) moved to containment",
                    items, points_value
                );
                notices.send(NoticeEvent::transient(format!(
                    "{} ghosts deposited into containment",
                    items
                )));
                completed_events.send(DepositCompletedEvent {
                    items,
                    points_value,
                });
                persist_events.send(PersistRequestEvent { reason: "deposit" });
            }
        }
    }
}
