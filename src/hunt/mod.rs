//! Hunt domain — the session's single source of truth.
//!
//! [`GameStore`] owns the selected location, the active ghost, the inventory
//! and the player's stats. It performs no I/O; systems elsewhere decide when
//! to persist what it holds.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

mod store;

pub use store::*;

/// Random source for ghost generation. Tests seed it for repeatable spawns.
#[derive(Resource, Debug)]
pub struct GhostRng(pub StdRng);

impl GhostRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for GhostRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}
