//! Seams to the AR engine.
//!
//! The web shell implements these traits on top of its WebXR scene. The core
//! only ever sees poses, object kinds and opaque animation handles.

use bevy::prelude::*;

use crate::shared::PlaceableObject;

/// World-space pose of the hit-test reticle.
pub type Pose = Transform;

/// Per-frame hit-test result. `None` means no surface under the crosshair.
pub trait HitTestSource: Send + Sync {
    fn reticle_pose(&mut self) -> Option<Pose>;
}

/// The two ambient tracks a placed ghost plays while idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdleTrack {
    Rotate,
    Bob,
}

impl IdleTrack {
    pub const ALL: [IdleTrack; 2] = [IdleTrack::Rotate, IdleTrack::Bob];
}

/// A running animation the engine handed back to us.
pub trait AnimationHandle: Send + Sync {
    fn play(&mut self);
    fn pause(&mut self);
    /// Rewinds to t = 0 without changing play/pause state.
    fn reset(&mut self);
}

/// Scene entities the core anchors and shows.
pub trait EntityAnchorSink: Send + Sync {
    fn has_entity(&self, object: PlaceableObject) -> bool;
    fn set_transform(&mut self, object: PlaceableObject, pose: Pose);
    fn set_visible(&mut self, object: PlaceableObject, visible: bool);
    fn idle_animation(
        &mut self,
        object: PlaceableObject,
        track: IdleTrack,
    ) -> Option<Box<dyn AnimationHandle>>;
}

/// Injected AR collaborators.
#[derive(Resource)]
pub struct ArBackend {
    pub hit_test: Box<dyn HitTestSource>,
    pub anchors: Box<dyn EntityAnchorSink>,
}

impl ArBackend {
    pub fn new(
        hit_test: impl HitTestSource + 'static,
        anchors: impl EntityAnchorSink + 'static,
    ) -> Self {
        Self {
            hit_test: Box::new(hit_test),
            anchors: Box::new(anchors),
        }
    }
}

impl Default for ArBackend {
    /// No camera and no scene: nothing is ever placed.
    fn default() -> Self {
        Self::new(NoSurface, NoScene)
    }
}

pub struct NoSurface;

impl HitTestSource for NoSurface {
    fn reticle_pose(&mut self) -> Option<Pose> {
        None
    }
}

pub struct NoScene;

impl EntityAnchorSink for NoScene {
    fn has_entity(&self, _object: PlaceableObject) -> bool {
        false
    }

    fn set_transform(&mut self, _object: PlaceableObject, _pose: Pose) {}

    fn set_visible(&mut self, _object: PlaceableObject, _visible: bool) {}

    fn idle_animation(
        &mut self,
        _object: PlaceableObject,
        _track: IdleTrack,
    ) -> Option<Box<dyn AnimationHandle>> {
        None
    }
}
