//! Frame-stepped visual routines.
//!
//! Each routine is a small record with an elapsed clock, advanced by the
//! owner's tick. Completion and cancellation both restore the start values
//! exactly, so no partial mutation can linger.

use crate::models::player::VisualTransform;
use crate::shared::math::lerp;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenKind {
    /// Double-jump spin: z rotation 0 → -360 over the duration.
    SpinZ,
    /// Turn-around flip: +360 on the y rotation, relative to the start.
    SpinY,
    /// Backflip: +360 z rotation plus a parabolic y-offset arc.
    BackflipArc { height: f32 },
}

#[derive(Clone, Debug)]
pub struct Tween {
    kind: TweenKind,
    duration: f32,
    elapsed: f32,
    start_rotation_y: f32,
    start_y_offset: f32,
}

impl Tween {
    pub fn double_jump_spin(visual: &VisualTransform) -> Self {
        Self::new(TweenKind::SpinZ, 0.5, visual)
    }

    pub fn turn_around(visual: &VisualTransform) -> Self {
        Self::new(TweenKind::SpinY, 0.5, visual)
    }

    pub fn backflip(visual: &VisualTransform) -> Self {
        Self::new(TweenKind::BackflipArc { height: 0.5 }, 0.75, visual)
    }

    fn new(kind: TweenKind, duration: f32, visual: &VisualTransform) -> Self {
        Self {
            kind,
            duration,
            elapsed: 0.0,
            start_rotation_y: visual.rotation_y,
            start_y_offset: visual.y_offset,
        }
    }

    /// Steps the tween and mutates the visual root. Returns true when done
    /// (start values restored).
    fn update(&mut self, visual: &mut VisualTransform, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.restore(visual);
            return true;
        }

        let t = self.elapsed / self.duration;
        match self.kind {
            TweenKind::SpinZ => {
                visual.rotation_z = lerp(0.0, -360.0, t);
            }
            TweenKind::SpinY => {
                visual.rotation_y = self.start_rotation_y + lerp(0.0, 360.0, t);
            }
            TweenKind::BackflipArc { height } => {
                visual.rotation_z = lerp(0.0, 360.0, t);
                visual.y_offset = self.start_y_offset + 4.0 * height * t * (1.0 - t);
            }
        }
        false
    }

    fn restore(&self, visual: &mut VisualTransform) {
        match self.kind {
            TweenKind::SpinZ | TweenKind::BackflipArc { .. } => {
                visual.rotation_z = 0.0;
                visual.y_offset = self.start_y_offset;
            }
            TweenKind::SpinY => {
                visual.rotation_y = self.start_rotation_y;
            }
        }
    }
}

/// The live routines of one owner. Dropping the owner's set mid-flight must
/// not leave half-applied rotations, hence `cancel_all`.
#[derive(Clone, Debug, Default)]
pub struct TweenSet {
    tweens: Vec<Tween>,
}

impl TweenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, tween: Tween) {
        self.tweens.push(tween);
    }

    pub fn update(&mut self, visual: &mut VisualTransform, dt: f32) {
        self.tweens.retain_mut(|t| !t.update(visual, dt));
    }

    pub fn cancel_all(&mut self, visual: &mut VisualTransform) {
        for tween in self.tweens.drain(..) {
            tween.restore(visual);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }
}
