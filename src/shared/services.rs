//! Trait seams toward the host engine.
//!
//! Rendering, physics resolution, audio mixing, animation playback and scene
//! fades are external collaborators. The core only fires opaque triggers at
//! them and never awaits completion.

use crate::shared::math::Vec2;

/// One-shot sound categories. The host picks/mixes the actual clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundKind {
    P1Note0,
    P1Note1,
    P1Note2,
    P1Note3,
    P2Note0,
    P2Note1,
    P2Note2,
    P2Note3,
    P1BadEffect,
    P2BadEffect,
    ToggleMode,
    ButtonClick,
    DoubleJump,
    Collectible,
    Boxed,
    Gravity,
    Flatten,
}

/// Particle / reaction effect categories spawned at an anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VfxKind {
    Sparkle,
    Sweat,
    Angry,
    CooldownOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionLayer {
    Ground,
}

pub trait AudioService {
    fn play_sound(&mut self, kind: SoundKind);
}

pub trait VfxService {
    fn spawn_effect(&mut self, kind: VfxKind, anchor: Vec2, lifetime: f32);
}

pub trait AnimationService {
    /// Sets a boolean parameter on the named object's animator.
    fn set_flag(&mut self, owner: &str, name: &str, value: bool);
    /// Sets an integer parameter (button state machines).
    fn set_state(&mut self, owner: &str, name: &str, value: i32);
    /// Plays a named clip immediately.
    fn play_clip(&mut self, owner: &str, clip: &str);
}

pub trait SceneService {
    fn transition_next(&mut self);
    fn transition_to(&mut self, name: &str);
}

/// Activation state of named stage objects (doors, indicators, previews).
pub trait WorldService {
    fn set_active(&mut self, name: &str, active: bool);
}

/// Shape-overlap probe into the host's collision world.
pub trait PhysicsService {
    fn overlap_box(&self, center: Vec2, size: Vec2, layer: CollisionLayer) -> bool;
}

/// Bundle handed down through the update tree.
pub struct Services {
    pub audio: Box<dyn AudioService>,
    pub vfx: Box<dyn VfxService>,
    pub anim: Box<dyn AnimationService>,
    pub scene: Box<dyn SceneService>,
    pub world: Box<dyn WorldService>,
    pub physics: Box<dyn PhysicsService>,
}

impl Services {
    /// Logging-only services for headless runs.
    pub fn null() -> Self {
        Self {
            audio: Box::new(NullServices),
            vfx: Box::new(NullServices),
            anim: Box::new(NullServices),
            scene: Box::new(NullServices),
            world: Box::new(NullServices),
            physics: Box::new(NullServices),
        }
    }
}

/// Headless implementation: logs every call, reports no collisions.
pub struct NullServices;

impl AudioService for NullServices {
    fn play_sound(&mut self, kind: SoundKind) {
        log::debug!("AUDIO: play {:?}", kind);
    }
}

impl VfxService for NullServices {
    fn spawn_effect(&mut self, kind: VfxKind, anchor: Vec2, lifetime: f32) {
        log::debug!(
            "VFX: spawn {:?} at ({:.2}, {:.2}) for {:.2}s",
            kind,
            anchor.x,
            anchor.y,
            lifetime
        );
    }
}

impl AnimationService for NullServices {
    fn set_flag(&mut self, owner: &str, name: &str, value: bool) {
        log::debug!("ANIM: {} {} = {}", owner, name, value);
    }

    fn set_state(&mut self, owner: &str, name: &str, value: i32) {
        log::debug!("ANIM: {} {} = {}", owner, name, value);
    }

    fn play_clip(&mut self, owner: &str, clip: &str) {
        log::debug!("ANIM: {} play {}", owner, clip);
    }
}

impl SceneService for NullServices {
    fn transition_next(&mut self) {
        log::info!("SCENE: transition to next");
    }

    fn transition_to(&mut self, name: &str) {
        log::info!("SCENE: transition to {}", name);
    }
}

impl WorldService for NullServices {
    fn set_active(&mut self, name: &str, active: bool) {
        log::debug!("WORLD: {} active = {}", name, active);
    }
}

impl PhysicsService for NullServices {
    fn overlap_box(&self, _center: Vec2, _size: Vec2, _layer: CollisionLayer) -> bool {
        false
    }
}
