//! Plain player-side data: identity, tuning, kinematic body, visual state.

use crate::shared::math::Vec2;
use serde::Deserialize;

/// Fixed at configuration time; selects input bindings and per-player sound
/// variants. Never reassigned at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub fn partner(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    /// Animator / log identifier.
    pub fn label(self) -> &'static str {
        match self {
            PlayerId::One => "player1",
            PlayerId::Two => "player2",
        }
    }
}

/// Movement tuning, loaded from the game config.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub move_speed: f32,
    pub jump_force: f32,
    pub sequence_timeout: f64,
    pub ground_check_size: (f32, f32),
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 10.0,
            sequence_timeout: 2.0,
            ground_check_size: (0.6, 0.1),
        }
    }
}

/// Kinematic state the core mutates; integration and collision resolution
/// happen on the host side.
#[derive(Clone, Debug)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Offset from position to the ground probe center.
    pub ground_check_offset: Vec2,
    /// Sign-flipped by the gravity effect; the host scales gravity by this.
    pub gravity_scale: f32,
}

impl Body {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            ground_check_offset: Vec2::new(0.0, -0.5),
            gravity_scale: 1.0,
        }
    }

    /// Mirrors vertically with the gravity sign, so a gravity-flipped player
    /// probes toward the ceiling it rests on.
    pub fn ground_check_center(&self) -> Vec2 {
        Vec2::new(
            self.position.x + self.ground_check_offset.x,
            self.position.y + self.ground_check_offset.y * self.gravity_scale.signum(),
        )
    }
}

/// Local visual root the effect routines mutate and revert. The host mirrors
/// this onto the sprite hierarchy.
#[derive(Clone, Debug)]
pub struct VisualTransform {
    /// Z euler degrees (spins, backflip).
    pub rotation_z: f32,
    /// Y euler degrees (the turn-around flip).
    pub rotation_y: f32,
    /// X euler degrees (the 75° flatten tilt).
    pub tilt_x: f32,
    /// Local y offset (backflip arc).
    pub y_offset: f32,
    /// Horizontal facing: -1.0 or 1.0.
    pub facing: f32,
    /// Vertical scale sign, flipped while gravity is inverted.
    pub scale_y: f32,
    /// Sprite material glitch flag (debuff).
    pub material_glitch: bool,
}

impl Default for VisualTransform {
    fn default() -> Self {
        Self {
            rotation_z: 0.0,
            rotation_y: 0.0,
            tilt_x: 0.0,
            y_offset: 0.0,
            facing: 1.0,
            scale_y: 1.0,
            material_glitch: false,
        }
    }
}
