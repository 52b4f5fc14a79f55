use bevy::prelude::*;
use rand::Rng;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::hunt::GameStore;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SAVE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Storage(String),
}

/// Where stats and inventory are written. Keyed by the player's uid.
///
/// Called at most once per frame. Errors are logged by the caller and never
/// reach gameplay.
pub trait PersistenceSink: Send + Sync {
    fn save_state(&self, uid: &str, state: SavedGameState) -> Result<(), PersistError>;
    fn load_state(&self, uid: &str) -> Result<Option<SavedGameState>, PersistError>;
}

/// Injected persistence backend.
#[derive(Resource)]
pub struct Persistence(pub Box<dyn PersistenceSink>);

impl Persistence {
    pub fn new(sink: impl PersistenceSink + 'static) -> Self {
        Self(Box::new(sink))
    }
}

impl Default for Persistence {
    fn default() -> Self {
        Self::new(MemorySink::default())
    }
}

/// On-disk envelope around the saved state.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct SaveFile {
    version: u32,
    uid: String,
    state: SavedGameState,
}

fn encode(uid: &str, state: SavedGameState) -> Result<String, PersistError> {
    let file = SaveFile {
        version: SAVE_VERSION,
        uid: uid.to_string(),
        state,
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

fn decode(uid: &str, json: &str) -> Result<SavedGameState, PersistError> {
    let file: SaveFile = serde_json::from_str(json)?;
    // Version check — future versions can add migration here
    if file.version != SAVE_VERSION {
        warn!(
            "[Save] Save for '{}' has version {} but current version is {}. Attempting to load anyway.",
            uid, file.version, SAVE_VERSION
        );
    }
    Ok(file.state)
}

// ═══════════════════════════════════════════════════════════════════════
// SINKS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct MemoryRecord {
    states: HashMap<String, SavedGameState>,
    writes: usize,
    offline: bool,
}

/// In-process sink. Clones share storage, so tests can inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemorySink(Arc<Mutex<MemoryRecord>>);

impl MemorySink {
    /// A sink that refuses every write, for exercising failure handling.
    pub fn offline() -> Self {
        let sink = Self::default();
        sink.set_offline(true);
        sink
    }

    pub fn set_offline(&self, offline: bool) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).offline = offline;
    }

    pub fn saved(&self, uid: &str) -> Option<SavedGameState> {
        let record = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        record.states.get(uid).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).writes
    }

    pub fn seed(&self, uid: &str, state: SavedGameState) {
        let mut record = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        record.states.insert(uid.to_string(), state);
    }
}

impl PersistenceSink for MemorySink {
    fn save_state(&self, uid: &str, state: SavedGameState) -> Result<(), PersistError> {
        let mut record = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if record.offline {
            return Err(PersistError::Storage("database offline".into()));
        }
        record.states.insert(uid.to_string(), state);
        record.writes += 1;
        Ok(())
    }

    fn load_state(&self, uid: &str) -> Result<Option<SavedGameState>, PersistError> {
        Ok(self.saved(uid))
    }
}

/// One JSON file per player under `dir`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `saves/` next to the executable.
    pub fn beside_executable() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(exe_dir.join("saves"))
    }

    pub fn path_for(&self, uid: &str) -> PathBuf {
        let safe: String = uid
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_atomically(path: &Path, json: &str) -> Result<(), PersistError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
impl PersistenceSink for JsonFileSink {
    fn save_state(&self, uid: &str, state: SavedGameState) -> Result<(), PersistError> {
        let json = encode(uid, state)?;
        write_atomically(&self.path_for(uid), &json)
    }

    fn load_state(&self, uid: &str) -> Result<Option<SavedGameState>, PersistError> {
        let path = self.path_for(uid);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        decode(uid, &json).map(Some)
    }
}

/// Browser `localStorage`, one key per player.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageSink;

#[cfg(target_arch = "wasm32")]
impl LocalStorageSink {
    fn storage() -> Result<web_sys::Storage, PersistError> {
        web_sys::window()
            .ok_or_else(|| PersistError::Storage("no window".into()))?
            .local_storage()
            .map_err(|_| PersistError::Storage("localStorage access denied".into()))?
            .ok_or_else(|| PersistError::Storage("localStorage missing".into()))
    }

    fn key(uid: &str) -> String {
        format!("ghost_squad/{}", uid)
    }
}

#[cfg(target_arch = "wasm32")]
impl PersistenceSink for LocalStorageSink {
    fn save_state(&self, uid: &str, state: SavedGameState) -> Result<(), PersistError> {
        let json = encode(uid, state)?;
        Self::storage()?
            .set_item(&Self::key(uid), &json)
            .map_err(|_| PersistError::Storage("localStorage write rejected".into()))
    }

    fn load_state(&self, uid: &str) -> Result<Option<SavedGameState>, PersistError> {
        let json = Self::storage()?
            .get_item(&Self::key(uid))
            .map_err(|_| PersistError::Storage("localStorage read rejected".into()))?;
        json.map(|json| decode(uid, &json)).transpose()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Persistence>()
            .init_resource::<PlayerIdentity>()
            .add_event::<PersistRequestEvent>()
            .add_event::<LoadSavedStateEvent>()
            .add_systems(PostUpdate, flush_persist_requests);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Sends one snapshot per frame no matter how many mutations asked for it.
fn flush_persist_requests(
    mut requests: EventReader<PersistRequestEvent>,
    store: Res<GameStore>,
    identity: Res<PlayerIdentity>,
    persistence: Res<Persistence>,
) {
    let reasons: Vec<&'static str> = requests.read().map(|r| r.reason).collect();
    if reasons.is_empty() {
        return;
    }
    debug!("[Save] Persisting for '{}' ({:?})", identity.uid, reasons);
    if let Err(e) = persistence.0.save_state(&identity.uid, store.snapshot()) {
        warn!("[Save] Save for '{}' FAILED: {}", identity.uid, e);
    }
}

/// Restores a saved state mid-session, rolling a ghost if the restored
/// inventory leaves room and none is active.
///
/// Returns true when the active ghost is no longer the one from before the
/// restore, so anything anchored for the old ghost must be taken down.
pub fn apply_loaded_state(
    store: &mut GameStore,
    saved: SavedGameState,
    rng: &mut impl Rng,
) -> bool {
    let before = store.active_ghost().cloned();
    store.restore(saved);
    if store.active_ghost().is_none() && store.selected_location().is_some() {
        store.generate_ghost(rng);
    }
    store.active_ghost() != before.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn sample_state() -> SavedGameState {
        SavedGameState {
            points: 35,
            captures: 2,
            level: 1,
            ecto1_unlocked: false,
            inventory: vec![InventoryItem {
                id: 1,
                kind: GhostKind::Strong,
                reward_points: 25,
            }],
        }
    }

    #[test]
    fn test_memory_sink_round_trip() {
        let sink = MemorySink::default();
        sink.save_state("uid-1", sample_state()).unwrap();
        assert_eq!(sink.load_state("uid-1").unwrap(), Some(sample_state()));
        assert_eq!(sink.load_state("uid-2").unwrap(), None);
        assert_eq!(sink.write_count(), 1);
    }

    #[test]
    fn test_offline_sink_reports_error() {
        let sink = MemorySink::offline();
        assert!(matches!(
            sink.save_state("uid-1", sample_state()),
            Err(PersistError::Storage(_))
        ));
        assert_eq!(sink.write_count(), 0);
    }

    #[test]
    fn test_decode_accepts_older_payload_without_level() {
        let json = r#"{"version":0,"uid":"u","state":{"points":10,"captures":1,"ecto1_unlocked":false}}"#;
        let state = decode("u", json).unwrap();
        assert_eq!(state.level, 1);
        assert!(state.inventory.is_empty());
    }

    fn hunting_store() -> GameStore {
        let mut store = GameStore::default().with_locations(vec![Location {
            name: "Firehouse".into(),
            center: Coordinate::new(40.7197, -74.0066),
        }]);
        store.select_location("Firehouse");
        store
    }

    #[test]
    fn test_loading_with_room_keeps_the_active_ghost() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let mut store = hunting_store();
        let ghost = store.generate_ghost(&mut rng);

        assert!(!apply_loaded_state(&mut store, sample_state(), &mut rng));
        assert_eq!(store.active_ghost().cloned(), ghost);
        assert_eq!(store.stats().captures, 2);
    }

    #[test]
    fn test_loading_a_full_inventory_drops_the_active_ghost() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let mut store = hunting_store();
        store.generate_ghost(&mut rng);
        let full = SavedGameState {
            inventory: (1..=5)
                .map(|id| InventoryItem {
                    id,
                    kind: GhostKind::Common,
                    reward_points: 10,
                })
                .collect(),
            ..sample_state()
        };

        assert!(apply_loaded_state(&mut store, full, &mut rng));
        assert!(store.active_ghost().is_none());
        assert!(store.is_inventory_full());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode("u", "not json"), Err(PersistError::Serialize(_))));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_json_file_sink_writes_and_reads_back() {
        let dir = std::env::temp_dir().join(format!("ghost_squad_save_{}", std::process::id()));
        let sink = JsonFileSink::new(&dir);
        sink.save_state("player/1", sample_state()).unwrap();
        assert!(sink.path_for("player/1").ends_with("player_1.json"));
        assert_eq!(sink.load_state("player/1").unwrap(), Some(sample_state()));
        let _ = fs::remove_dir_all(&dir);
    }
}
