//! Data layer — populates registries at game startup.
//!
//! This plugin runs in OnEnter(GamePhase::Loading), fills the
//! LocationRegistry from the hard-coded game-design data defined in
//! submodules, then transitions the game into GamePhase::ChoosingLocation.

mod locations;

use bevy::prelude::*;
use crate::shared::*;

pub use locations::populate_locations;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LocationRegistry>()
            .add_systems(OnEnter(GamePhase::Loading), load_all_data);
    }
}

fn load_all_data(
    mut location_registry: ResMut<LocationRegistry>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    info!("DataPlugin: populating registries…");

    populate_locations(&mut location_registry);
    info!("  Locations loaded: {}", location_registry.locations.len());

    info!("DataPlugin: all registries populated. Transitioning to ChoosingLocation.");
    next_state.set(GamePhase::ChoosingLocation);
}
