//! One-shot anchoring of ghosts and the ECTO-1 onto real-world surfaces.
//!
//! Each object runs its own two-state machine:
//!
//! ```text
//!   Unplaced ──(target == object && reticle visible)──▶ Placed
//!      ▲                                                  │
//!      └──────────────── Unplace / Reset ◀────────────────┘
//! ```
//!
//! Proximity sets the pending target; the frame tick performs the placement.
//! A placed ghost starts its rotate and bob tracks from t = 0 and the handles
//! are kept so a capture can pause and resume them.

use bevy::prelude::*;
use std::fmt;

use super::backend::{AnimationHandle, EntityAnchorSink, IdleTrack, Pose};
use crate::shared::PlaceableObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementPhase {
    #[default]
    Unplaced,
    Placed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementEvent {
    /// Latest proximity decision.
    TargetChanged(Option<PlaceableObject>),
    /// One rendered frame with this frame's hit-test result.
    FrameTick(Option<Pose>),
    /// Take a placed object out of the scene (e.g. the ghost was captured).
    Unplace(PlaceableObject),
    /// New location or new AR session.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    Unchanged,
    TargetSet(Option<PlaceableObject>),
    Placed(PlaceableObject),
    Unplaced(PlaceableObject),
    Reset,
}

#[derive(Resource, Default)]
pub struct ArPlacementController {
    ghost: PlacementPhase,
    ecto1: PlacementPhase,
    object_to_place: Option<PlaceableObject>,
    ghost_animations: Vec<Box<dyn AnimationHandle>>,
    idle_paused: bool,
}

impl fmt::Debug for ArPlacementController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArPlacementController")
            .field("ghost", &self.ghost)
            .field("ecto1", &self.ecto1)
            .field("object_to_place", &self.object_to_place)
            .field("ghost_animations", &self.ghost_animations.len())
            .field("idle_paused", &self.idle_paused)
            .finish()
    }
}

impl ArPlacementController {
    pub fn phase(&self, object: PlaceableObject) -> PlacementPhase {
        match object {
            PlaceableObject::Ghost => self.ghost,
            PlaceableObject::Ecto1 => self.ecto1,
        }
    }

    pub fn is_placed(&self, object: PlaceableObject) -> bool {
        self.phase(object) == PlacementPhase::Placed
    }

    pub fn object_to_place(&self) -> Option<PlaceableObject> {
        self.object_to_place
    }

    pub fn idle_paused(&self) -> bool {
        self.idle_paused
    }

    fn set_phase(&mut self, object: PlaceableObject, phase: PlacementPhase) {
        match object {
            PlaceableObject::Ghost => self.ghost = phase,
            PlaceableObject::Ecto1 => self.ecto1 = phase,
        }
    }

    pub fn dispatch(
        &mut self,
        event: PlacementEvent,
        sink: &mut dyn EntityAnchorSink,
    ) -> PlacementOutcome {
        match event {
            PlacementEvent::TargetChanged(target) => {
                // Already-placed objects are never re-targeted.
                let target = target.filter(|object| !self.is_placed(*object));
                if target == self.object_to_place {
                    return PlacementOutcome::Unchanged;
                }
                self.object_to_place = target;
                PlacementOutcome::TargetSet(target)
            }
            PlacementEvent::FrameTick(reticle) => {
                let Some(object) = self.object_to_place else {
                    return PlacementOutcome::Unchanged;
                };
                if self.is_placed(object) {
                    self.object_to_place = None;
                    return PlacementOutcome::Unchanged;
                }
                // No surface under the crosshair: retry next frame.
                let Some(pose) = reticle else {
                    return PlacementOutcome::Unchanged;
                };
                if !sink.has_entity(object) {
                    debug!("[AR] No entity registered for {:?}; skipping placement", object);
                    return PlacementOutcome::Unchanged;
                }
                self.place(object, pose, sink);
                PlacementOutcome::Placed(object)
            }
            PlacementEvent::Unplace(object) => {
                if self.object_to_place == Some(object) {
                    self.object_to_place = None;
                }
                if !self.is_placed(object) {
                    return PlacementOutcome::Unchanged;
                }
                self.set_phase(object, PlacementPhase::Unplaced);
                if object == PlaceableObject::Ghost {
                    self.ghost_animations.clear();
                    self.idle_paused = false;
                }
                sink.set_visible(object, false);
                PlacementOutcome::Unplaced(object)
            }
            PlacementEvent::Reset => {
                for object in [PlaceableObject::Ghost, PlaceableObject::Ecto1] {
                    if self.is_placed(object) {
                        sink.set_visible(object, false);
                    }
                }
                self.ghost = PlacementPhase::Unplaced;
                self.ecto1 = PlacementPhase::Unplaced;
                self.object_to_place = None;
                self.ghost_animations.clear();
                self.idle_paused = false;
                PlacementOutcome::Reset
            }
        }
    }

    pub fn reset_placement_state(&mut self, sink: &mut dyn EntityAnchorSink) {
        self.dispatch(PlacementEvent::Reset, sink);
    }

    fn place(&mut self, object: PlaceableObject, pose: Pose, sink: &mut dyn EntityAnchorSink) {
        sink.set_transform(object, pose);
        sink.set_visible(object, true);

        if object == PlaceableObject::Ghost {
            self.ghost_animations.clear();
            for track in IdleTrack::ALL {
                if let Some(mut handle) = sink.idle_animation(object, track) {
                    // Restart, never resume a stale animation.
                    handle.pause();
                    handle.reset();
                    handle.play();
                    self.ghost_animations.push(handle);
                }
            }
            self.idle_paused = false;
        }

        self.set_phase(object, PlacementPhase::Placed);
        self.object_to_place = None;
    }

    /// Freezes the ghost's idle tracks. Returns false if already paused.
    pub fn pause_idle(&mut self) -> bool {
        if self.idle_paused {
            return false;
        }
        for handle in &mut self.ghost_animations {
            handle.pause();
        }
        self.idle_paused = true;
        true
    }

    /// Restarts playback of paused idle tracks. Returns false if not paused.
    pub fn resume_idle(&mut self) -> bool {
        if !self.idle_paused {
            return false;
        }
        for handle in &mut self.ghost_animations {
            handle.play();
        }
        self.idle_paused = false;
        true
    }
}
