//! Shared components, resources, events, and states for Ghost Squad.
//!
//! This is the type contract. Every domain plugin imports from here.
//! Domains talk to each other through these events and resources only.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════
// GAME PHASE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GamePhase {
    #[default]
    Loading,
    ChoosingLocation,
    Hunting,
}

// ═══════════════════════════════════════════════════════════════════════
// GEOGRAPHY
// ═══════════════════════════════════════════════════════════════════════

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns a new coordinate shifted by the given degree deltas.
    pub fn offset(self, dlat: f64, dlon: f64) -> Self {
        Self {
            lat: self.lat + dlat,
            lon: self.lon + dlon,
        }
    }
}

/// A named hunting area players can pick at the start of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub center: Coordinate,
}

/// Known hunting areas, in display order. Populated by the data plugin.
#[derive(Resource, Debug, Clone, Default)]
pub struct LocationRegistry {
    pub locations: Vec<Location>,
}

impl LocationRegistry {
    pub fn get(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GHOSTS & INVENTORY
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhostKind {
    Common,
    Strong,
}

impl GhostKind {
    pub fn label(self) -> &'static str {
        match self {
            GhostKind::Common => "Common",
            GhostKind::Strong => "Strong",
        }
    }
}

/// The single active ghost of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostDescriptor {
    pub position: Coordinate,
    pub kind: GhostKind,
    pub reward_points: u32,
    pub capture_duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: u64,
    pub kind: GhostKind,
    pub reward_points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub points: u32,
    pub captures: u32,
    pub level: u32,
    pub ecto1_unlocked: bool,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            points: 0,
            captures: 0,
            level: 1,
            ecto1_unlocked: false,
        }
    }
}

/// What gets written to (and read back from) the persistence sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGameState {
    pub points: u32,
    pub captures: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    pub ecto1_unlocked: bool,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
}

fn default_level() -> u32 {
    1
}

/// Objects that can be anchored into the AR scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceableObject {
    Ghost,
    Ecto1,
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// Last known player fix from the position stream.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerPosition {
    pub coord: Option<Coordinate>,
    pub accuracy_m: Option<f64>,
}

/// Health of the position stream. Proximity is skipped while unavailable.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Default)]
pub enum GeoStatus {
    #[default]
    AwaitingFix,
    Tracking,
    Unavailable {
        reason: String,
    },
}

impl GeoStatus {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, GeoStatus::Unavailable { .. })
    }
}

/// Identity that persistence writes are keyed by. Supplied by the host shell.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub uid: String,
}

impl Default for PlayerIdentity {
    fn default() -> Self {
        Self {
            uid: String::from("anonymous"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — inputs from the host shell
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct PositionUpdateEvent {
    pub coord: Coordinate,
    pub accuracy_m: Option<f64>,
}

#[derive(Event, Debug, Clone)]
pub struct PositionErrorEvent {
    pub reason: String,
}

#[derive(Event, Debug, Clone)]
pub struct SelectLocationEvent {
    pub name: String,
}

/// Why a capture hold ended early. All three cancel the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseCause {
    PointerUp,
    TouchEnd,
    PointerLeave,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureGestureEvent {
    Hold,
    Release(ReleaseCause),
}

/// Lifecycle of the camera/WebXR session reported by the host shell.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum ArSessionEvent {
    Started,
    Lost { reason: String },
}

/// A string decoded by the QR scanner.
#[derive(Event, Debug, Clone)]
pub struct QrDecodedEvent {
    pub payload: String,
}

/// Asks the save domain to restore the player's stored state.
#[derive(Event, Debug, Clone)]
pub struct LoadSavedStateEvent;

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — outputs for the UI shell
// ═══════════════════════════════════════════════════════════════════════

/// Emitted every frame while a capture is in progress. `progress` is 0.0..=1.0.
#[derive(Event, Debug, Clone, Copy)]
pub struct CaptureProgressEvent {
    pub progress: f32,
}

#[derive(Event, Debug, Clone)]
pub struct CaptureSucceededEvent {
    pub item: InventoryItem,
    pub stats: UserStats,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct CaptureCancelledEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct InventoryFullEvent {
    pub limit: usize,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct Ecto1UnlockedEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct ObjectPlacedEvent {
    pub object: PlaceableObject,
}

#[derive(Event, Debug, Clone)]
pub struct DepositCompletedEvent {
    pub items: usize,
    pub points_value: u32,
}

/// Player-facing message. Persistent notices stay until replaced or cleared.
#[derive(Event, Debug, Clone)]
pub struct NoticeEvent {
    pub message: String,
    pub persistent: bool,
}

impl NoticeEvent {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            persistent: false,
        }
    }

    pub fn persistent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            persistent: true,
        }
    }
}

/// Requests a fire-and-forget write of the current stats and inventory.
#[derive(Event, Debug, Clone)]
pub struct PersistRequestEvent {
    pub reason: &'static str,
}
