//! Simulated collaborators for running the core without a phone.
//!
//! The headless demo binary and the tests use these in place of the WebXR
//! scene and the GPS watch. Every scene call is recorded in a [`SceneLog`]
//! that can be inspected from outside the app.

use bevy::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::ar::{AnimationHandle, EntityAnchorSink, HitTestSource, IdleTrack, Pose};
use crate::geo;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// SCENE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct SceneRecord {
    transforms: Vec<(PlaceableObject, Pose)>,
    visibility: HashMap<PlaceableObject, bool>,
    animation_calls: HashMap<IdleTrack, Vec<&'static str>>,
}

/// Shared, cloneable record of everything the core did to the scene.
#[derive(Debug, Clone, Default)]
pub struct SceneLog(Arc<Mutex<SceneRecord>>);

impl SceneLog {
    fn with<R>(&self, f: impl FnOnce(&mut SceneRecord) -> R) -> R {
        let mut record = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut record)
    }

    pub fn transform_count(&self, object: PlaceableObject) -> usize {
        self.with(|r| r.transforms.iter().filter(|(o, _)| *o == object).count())
    }

    pub fn last_transform(&self, object: PlaceableObject) -> Option<Pose> {
        self.with(|r| {
            r.transforms
                .iter()
                .rev()
                .find(|(o, _)| *o == object)
                .map(|(_, pose)| *pose)
        })
    }

    pub fn visible(&self, object: PlaceableObject) -> Option<bool> {
        self.with(|r| r.visibility.get(&object).copied())
    }

    pub fn animation_calls(&self, track: IdleTrack) -> Vec<&'static str> {
        self.with(|r| r.animation_calls.get(&track).cloned().unwrap_or_default())
    }

    pub fn count_calls(&self, track: IdleTrack, call: &str) -> usize {
        self.animation_calls(track).iter().filter(|c| **c == call).count()
    }
}

/// Scene with a fixed set of registered entities.
pub struct SimScene {
    log: SceneLog,
    registered: Vec<PlaceableObject>,
}

impl SimScene {
    pub fn new(log: SceneLog, registered: Vec<PlaceableObject>) -> Self {
        Self { log, registered }
    }

    pub fn with_all_entities(log: SceneLog) -> Self {
        Self::new(log, vec![PlaceableObject::Ghost, PlaceableObject::Ecto1])
    }
}

impl EntityAnchorSink for SimScene {
    fn has_entity(&self, object: PlaceableObject) -> bool {
        self.registered.contains(&object)
    }

    fn set_transform(&mut self, object: PlaceableObject, pose: Pose) {
        debug!("[Sim] {:?} anchored at {:?}", object, pose.translation);
        self.log.with(|r| r.transforms.push((object, pose)));
    }

    fn set_visible(&mut self, object: PlaceableObject, visible: bool) {
        self.log.with(|r| {
            r.visibility.insert(object, visible);
        });
    }

    fn idle_animation(
        &mut self,
        object: PlaceableObject,
        track: IdleTrack,
    ) -> Option<Box<dyn AnimationHandle>> {
        if !self.has_entity(object) {
            return None;
        }
        Some(Box::new(SimAnimation {
            track,
            log: self.log.clone(),
        }))
    }
}

struct SimAnimation {
    track: IdleTrack,
    log: SceneLog,
}

impl SimAnimation {
    fn record(&self, call: &'static str) {
        self.log
            .with(|r| r.animation_calls.entry(self.track).or_default().push(call));
    }
}

impl AnimationHandle for SimAnimation {
    fn play(&mut self) {
        self.record("play");
    }

    fn pause(&mut self) {
        self.record("pause");
    }

    fn reset(&mut self) {
        self.record("reset");
    }
}

// ═══════════════════════════════════════════════════════════════════════
// HIT TEST
// ═══════════════════════════════════════════════════════════════════════

/// Reticle whose pose can be changed from outside the app.
#[derive(Debug, Clone, Default)]
pub struct SimReticle(Arc<Mutex<Option<Pose>>>);

impl SimReticle {
    pub fn showing(pose: Pose) -> Self {
        let reticle = Self::default();
        reticle.set(Some(pose));
        reticle
    }

    pub fn set(&self, pose: Option<Pose>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = pose;
    }
}

impl HitTestSource for SimReticle {
    fn reticle_pose(&mut self) -> Option<Pose> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// WALKING
// ═══════════════════════════════════════════════════════════════════════

/// Moves `from` up to `meters` along the straight line towards `to`.
/// Lands exactly on `to` when it is closer than one step.
pub fn step_towards(from: Coordinate, to: Coordinate, meters: f64) -> Coordinate {
    let remaining = geo::distance(from, to);
    if remaining <= meters || remaining == 0.0 {
        return to;
    }
    let t = meters / remaining;
    Coordinate::new(
        from.lat + (to.lat - from.lat) * t,
        from.lon + (to.lon - from.lon) * t,
    )
}
