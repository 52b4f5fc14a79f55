use bevy::prelude::*;
use rand::Rng;

use crate::config::GameTuning;
use crate::shared::*;

/// Result of [`GameStore::record_capture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    pub stats: UserStats,
    /// True only on the capture that crossed the ECTO-1 threshold.
    pub just_unlocked: bool,
}

#[derive(Resource, Debug, Clone)]
pub struct GameStore {
    tuning: GameTuning,
    known_locations: Vec<Location>,
    selected: Option<Location>,
    reward_position: Option<Coordinate>,
    active_ghost: Option<GhostDescriptor>,
    inventory: Vec<InventoryItem>,
    stats: UserStats,
    next_item_id: u64,
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new(GameTuning::default())
    }
}

impl GameStore {
    pub fn new(tuning: GameTuning) -> Self {
        Self {
            tuning,
            known_locations: Vec::new(),
            selected: None,
            reward_position: None,
            active_ghost: None,
            inventory: Vec::new(),
            stats: UserStats::default(),
            next_item_id: 1,
        }
    }

    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.known_locations = locations;
        self
    }

    pub fn set_known_locations(&mut self, locations: Vec<Location>) {
        self.known_locations = locations;
    }

    pub fn tuning(&self) -> &GameTuning {
        &self.tuning
    }

    // ── Location ─────────────────────────────────────────────────────────

    /// Selects a known hunting area and derives the reward position from it.
    /// Unknown names leave the store untouched and return false.
    pub fn select_location(&mut self, name: &str) -> bool {
        let Some(location) = self.known_locations.iter().find(|l| l.name == name).cloned() else {
            return false;
        };
        self.reward_position = Some(
            location
                .center
                .offset(self.tuning.reward_offset_lat, self.tuning.reward_offset_lon),
        );
        self.selected = Some(location);
        self.active_ghost = None;
        true
    }

    pub fn selected_location(&self) -> Option<&Location> {
        self.selected.as_ref()
    }

    pub fn reward_position(&self) -> Option<Coordinate> {
        self.reward_position
    }

    // ── Ghost ────────────────────────────────────────────────────────────

    /// Rolls a new active ghost near the selected location.
    ///
    /// Returns `None` without touching any state while the inventory is full
    /// or before a location has been chosen.
    pub fn generate_ghost(&mut self, rng: &mut impl Rng) -> Option<GhostDescriptor> {
        if self.is_inventory_full() {
            return None;
        }
        let center = self.selected.as_ref()?.center;

        let jitter = self.tuning.ghost_jitter_deg;
        let (dlat, dlon) = if jitter > 0.0 {
            (rng.gen_range(-jitter..=jitter), rng.gen_range(-jitter..=jitter))
        } else {
            (0.0, 0.0)
        };
        let kind = if rng.gen_bool(self.tuning.strong_probability) {
            GhostKind::Strong
        } else {
            GhostKind::Common
        };

        let ghost = GhostDescriptor {
            position: center.offset(dlat, dlon),
            kind,
            reward_points: self.tuning.kind(kind).reward_points,
            capture_duration: self.tuning.capture_duration(kind),
        };
        self.active_ghost = Some(ghost.clone());
        Some(ghost)
    }

    pub fn active_ghost(&self) -> Option<&GhostDescriptor> {
        self.active_ghost.as_ref()
    }

    /// Removes the active ghost, e.g. once it has been captured.
    pub fn take_active_ghost(&mut self) -> Option<GhostDescriptor> {
        self.active_ghost.take()
    }

    // ── Inventory ────────────────────────────────────────────────────────

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    pub fn is_inventory_full(&self) -> bool {
        self.inventory.len() >= self.tuning.inventory_limit
    }

    /// Builds an inventory item for a captured ghost with a fresh id.
    pub fn next_item(&mut self, ghost: &GhostDescriptor) -> InventoryItem {
        let id = self.next_item_id;
        self.next_item_id += 1;
        InventoryItem {
            id,
            kind: ghost.kind,
            reward_points: ghost.reward_points,
        }
    }

    /// Appends the item unless the inventory is at its limit.
    pub fn add_to_inventory(&mut self, item: InventoryItem) -> bool {
        if self.is_inventory_full() {
            return false;
        }
        self.inventory.push(item);
        true
    }

    /// Empties the inventory and hands back what was in it.
    pub fn clear_inventory(&mut self) -> Vec<InventoryItem> {
        std::mem::take(&mut self.inventory)
    }

    // ── Stats ────────────────────────────────────────────────────────────

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    /// Credits one capture worth `points` and applies the ECTO-1 unlock edge.
    pub fn record_capture(&mut self, points: u32) -> CaptureRecord {
        self.stats.points = self.stats.points.saturating_add(points);
        self.stats.captures = self.stats.captures.saturating_add(1);
        self.stats.level = 1 + self.stats.points / self.tuning.points_per_level.max(1);

        let just_unlocked =
            !self.stats.ecto1_unlocked && self.stats.captures >= self.tuning.ecto1_unlock_count;
        if just_unlocked {
            self.stats.ecto1_unlocked = true;
        }

        CaptureRecord {
            stats: self.stats.clone(),
            just_unlocked,
        }
    }

    // ── Persistence payloads ─────────────────────────────────────────────

    pub fn snapshot(&self) -> SavedGameState {
        SavedGameState {
            points: self.stats.points,
            captures: self.stats.captures,
            level: self.stats.level,
            ecto1_unlocked: self.stats.ecto1_unlocked,
            inventory: self.inventory.clone(),
        }
    }

    /// Applies a previously saved state. Inventory beyond the limit is dropped
    /// from the tail so the cap holds.
    pub fn restore(&mut self, saved: SavedGameState) {
        self.stats = UserStats {
            points: saved.points,
            captures: saved.captures,
            level: saved.level.max(1),
            ecto1_unlocked: saved.ecto1_unlocked,
        };
        let mut inventory = saved.inventory;
        if inventory.len() > self.tuning.inventory_limit {
            warn!(
                "[Hunt] Saved inventory holds {} items, limit is {}. Dropping the excess.",
                inventory.len(),
                self.tuning.inventory_limit
            );
            inventory.truncate(self.tuning.inventory_limit);
        }
        let after_restored = inventory.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        self.next_item_id = self.next_item_id.max(after_restored);
        self.inventory = inventory;
        if self.is_inventory_full() {
            self.active_ghost = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn firehouse() -> Location {
        Location {
            name: "Firehouse".into(),
            center: Coordinate::new(40.7197, -74.0066),
        }
    }

    fn store() -> GameStore {
        let mut store = GameStore::default().with_locations(vec![firehouse()]);
        assert!(store.select_location("Firehouse"));
        store
    }

    fn item(id: u64) -> InventoryItem {
        InventoryItem {
            id,
            kind: GhostKind::Common,
            reward_points: 10,
        }
    }

    #[test]
    fn test_select_known_location_derives_reward_position() {
        let store = store();
        let reward = store.reward_position().unwrap();
        assert!((reward.lat - (40.7197 + 0.0005)).abs() < 1e-12);
        assert!((reward.lon - (-74.0066 - 0.0005)).abs() < 1e-12);
    }

    #[test]
    fn test_select_unknown_location_is_rejected() {
        let mut store = store();
        assert!(!store.select_location("Atlantis"));
        assert_eq!(store.selected_location().unwrap().name, "Firehouse");
    }

    #[test]
    fn test_inventory_never_exceeds_limit() {
        let mut store = store();
        let limit = store.tuning().inventory_limit;
        for id in 0..(limit as u64 + 3) {
            let before = store.inventory().to_vec();
            let added = store.add_to_inventory(item(id));
            if (id as usize) < limit {
                assert!(added);
            } else {
                assert!(!added);
                assert_eq!(store.inventory(), before.as_slice());
            }
            assert!(store.inventory().len() <= limit);
        }
    }

    #[test]
    fn test_clear_inventory_returns_items() {
        let mut store = store();
        store.add_to_inventory(item(1));
        store.add_to_inventory(item(2));
        let drained = store.clear_inventory();
        assert_eq!(drained.len(), 2);
        assert!(store.inventory().is_empty());
    }

    #[test]
    fn test_unlock_fires_exactly_on_fifth_capture() {
        let mut store = store();
        for n in 1..=8 {
            let record = store.record_capture(10);
            assert_eq!(record.just_unlocked, n == 5, "capture #{}", n);
            assert_eq!(record.stats.ecto1_unlocked, n >= 5, "capture #{}", n);
        }
    }

    #[test]
    fn test_points_and_captures_accumulate() {
        let mut store = store();
        store.record_capture(10);
        let record = store.record_capture(25);
        assert_eq!(record.stats.points, 35);
        assert_eq!(record.stats.captures, 2);
    }

    #[test]
    fn test_level_follows_points() {
        let mut store = store();
        assert_eq!(store.stats().level, 1);
        for _ in 0..4 {
            store.record_capture(25);
        }
        assert_eq!(store.stats().level, 2);
    }

    #[test]
    fn test_generate_ghost_refused_when_full() {
        let mut store = store();
        let mut rng = StdRng::seed_from_u64(7);
        for id in 0..store.tuning().inventory_limit as u64 {
            store.add_to_inventory(item(id));
        }
        store.take_active_ghost();
        assert!(store.generate_ghost(&mut rng).is_none());
        assert!(store.active_ghost().is_none());
    }

    #[test]
    fn test_generate_ghost_requires_location() {
        let mut store = GameStore::default();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(store.generate_ghost(&mut rng).is_none());
    }

    #[test]
    fn test_generated_ghosts_follow_tuning() {
        let mut store = store();
        let mut rng = StdRng::seed_from_u64(42);
        let center = firehouse().center;
        let mut strong = 0;
        for _ in 0..400 {
            let ghost = store.generate_ghost(&mut rng).unwrap();
            assert!((ghost.position.lat - center.lat).abs() <= 0.0001 + 1e-12);
            assert!((ghost.position.lon - center.lon).abs() <= 0.0001 + 1e-12);
            match ghost.kind {
                GhostKind::Common => {
                    assert_eq!(ghost.reward_points, 10);
                    assert_eq!(ghost.capture_duration.as_millis(), 5000);
                }
                GhostKind::Strong => {
                    strong += 1;
                    assert_eq!(ghost.reward_points, 25);
                    assert_eq!(ghost.capture_duration.as_millis(), 8000);
                }
            }
        }
        // 25% of 400 is 100; allow a generous band.
        assert!((60..=140).contains(&strong), "strong ghosts: {}", strong);
    }

    #[test]
    fn test_item_ids_are_unique() {
        let mut store = store();
        let mut rng = StdRng::seed_from_u64(1);
        let ghost = store.generate_ghost(&mut rng).unwrap();
        let a = store.next_item(&ghost);
        let b = store.next_item(&ghost);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_restore_round_trips_snapshot_and_continues_ids() {
        let mut store = store();
        store.add_to_inventory(item(9));
        store.record_capture(10);
        let saved = store.snapshot();

        let mut restored = GameStore::default();
        restored.restore(saved.clone());
        assert_eq!(restored.snapshot(), saved);

        let mut rng = StdRng::seed_from_u64(3);
        let mut restored = restored.with_locations(vec![firehouse()]);
        restored.select_location("Firehouse");
        let ghost = restored.generate_ghost(&mut rng).unwrap();
        assert_eq!(restored.next_item(&ghost).id, 10);
    }
}
