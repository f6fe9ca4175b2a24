//! Per-frame player controller: movement, jumping, music mode, note entry,
//! and the application/revert of timed effects.

use crate::core::input::bindings::KeyBindings;
use crate::core::input::{InputState, actions::PlayerAction};
use crate::logic::resolver::{Resolution, SequenceTracker};
use crate::logic::routines::{Tween, TweenSet};
use crate::models::effects::{EffectKind, EffectSlot, PenaltyKind, SlotEvent};
use crate::models::player::{Body, PlayerId, PlayerTuning, VisualTransform};
use crate::models::sequence::PatternTable;
use crate::models::unlocks::{MUSIC_MODE_P1, MUSIC_MODE_P2, UnlockStore};
use crate::shared::math::Vec2;
use crate::shared::services::{CollisionLayer, PhysicsService, Services, SoundKind, VfxKind};

const REACTION_PS_LIFETIME: f32 = 2.5;
const MUSIC_MODE_PS_OFFSET: f32 = 0.45;

/// Cross-object requests produced during one controller update. The level
/// context routes them, so controllers never hold references to each other.
#[derive(Clone, Debug, PartialEq)]
pub enum Dispatch {
    /// Matched sequence: apply the named effect to the partner.
    Buff { to: PlayerId, effect: String },
    /// Failed sequence: random penalty on the partner.
    Penalty { to: PlayerId },
    /// Boxed state flipped; button triggers care about this.
    BoxStateChanged { player: PlayerId, boxed: bool },
}

pub struct PlayerController {
    pub id: PlayerId,
    tuning: PlayerTuning,
    bindings: KeyBindings,

    pub body: Body,
    pub visual: VisualTransform,
    tweens: TweenSet,
    tracker: SequenceTracker,

    grounded: bool,
    music_mode: bool,
    /// Menu-level gate; nothing runs while false.
    controls_enabled: bool,
    /// Dropped by the Boxed effect; inhibits all input handling.
    input_enabled: bool,
    pub is_box: bool,
    invert_controls: bool,
    can_double_jump: bool,
    has_used_double_jump: bool,

    buff_slot: EffectSlot<EffectKind>,
    penalty_slot: EffectSlot<PenaltyKind>,
}

impl PlayerController {
    pub fn new(id: PlayerId, tuning: PlayerTuning, spawn: Vec2) -> Self {
        let timeout = tuning.sequence_timeout;
        Self {
            id,
            tuning,
            bindings: KeyBindings::for_player(id),
            body: Body::at(spawn),
            visual: VisualTransform::default(),
            tweens: TweenSet::new(),
            tracker: SequenceTracker::new(id.label(), timeout),
            grounded: false,
            music_mode: false,
            controls_enabled: true,
            input_enabled: true,
            is_box: false,
            invert_controls: false,
            can_double_jump: false,
            has_used_double_jump: false,
            buff_slot: EffectSlot::new(),
            penalty_slot: EffectSlot::new(),
        }
    }

    /// One scheduling tick of input and effect bookkeeping.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        input: &InputState,
        table: &PatternTable,
        unlocks: &UnlockStore,
        services: &mut Services,
        now: f64,
        dt: f32,
        out: &mut Vec<Dispatch>,
    ) {
        if self.controls_enabled && self.input_enabled {
            self.handle_movement(input, services);
            self.handle_jump(input, services);
            self.handle_mode_toggle(input, unlocks, services);
            self.handle_music_actions(input, table, unlocks, services, now, out);
        } else {
            self.body.velocity.x = 0.0;
            services.anim.set_flag(self.id.label(), "IsMoving", false);
        }

        self.update_slots(services, now, out);
        self.tracker.update(now, dt);
        self.tweens.update(&mut self.visual, dt);
    }

    /// Fixed-rate physics tick: one overlap probe, edge-triggered landing.
    pub fn fixed_update(&mut self, physics: &dyn PhysicsService) {
        let was_grounded = self.grounded;
        let (w, h) = self.tuning.ground_check_size;
        self.grounded = physics.overlap_box(
            self.body.ground_check_center(),
            Vec2::new(w, h),
            CollisionLayer::Ground,
        );

        if self.grounded && !was_grounded {
            self.has_used_double_jump = false;
        }
    }

    fn handle_movement(&mut self, input: &InputState, services: &mut Services) {
        if self.music_mode {
            services.anim.set_flag(self.id.label(), "IsMoving", false);
            self.body.velocity.x = 0.0;
            return;
        }

        let mut dir = 0.0f32;
        if self.action_held(input, PlayerAction::MoveLeft) {
            dir = -1.0;
        }
        if self.action_held(input, PlayerAction::MoveRight) {
            dir = 1.0;
        }
        if self.invert_controls {
            dir = -dir;
        }

        self.body.velocity.x = dir * self.tuning.move_speed;

        services
            .anim
            .set_flag(self.id.label(), "IsMoving", dir != 0.0 && self.grounded);

        // Art faces left at rest; flip against the movement direction.
        if dir != 0.0 {
            self.visual.facing = -dir.signum();
        }
    }

    fn handle_jump(&mut self, input: &InputState, services: &mut Services) {
        if self.music_mode || !self.action_pressed(input, PlayerAction::Jump) {
            return;
        }

        if self.grounded {
            self.body.velocity.y = self.tuning.jump_force * self.body.gravity_scale;
            return;
        }

        if self.can_double_jump && !self.has_used_double_jump {
            self.body.velocity.y = self.tuning.jump_force * self.body.gravity_scale;
            self.tweens.start(Tween::double_jump_spin(&self.visual));
            self.has_used_double_jump = true;
            services.audio.play_sound(SoundKind::DoubleJump);
        }
    }

    fn handle_mode_toggle(&mut self, input: &InputState, unlocks: &UnlockStore, services: &mut Services) {
        let unlock_key = match self.id {
            PlayerId::One => MUSIC_MODE_P1,
            PlayerId::Two => MUSIC_MODE_P2,
        };
        if !unlocks.is_unlocked(unlock_key) || !self.action_pressed(input, PlayerAction::ToggleMode) {
            return;
        }

        self.music_mode = !self.music_mode;
        services
            .anim
            .set_flag(self.id.label(), "MusicMode", self.music_mode);
        services.audio.play_sound(SoundKind::ToggleMode);
    }

    fn handle_music_actions(
        &mut self,
        input: &InputState,
        table: &PatternTable,
        unlocks: &UnlockStore,
        services: &mut Services,
        now: f64,
        out: &mut Vec<Dispatch>,
    ) {
        if !self.music_mode {
            return;
        }

        for note in 0..4u8 {
            let key = self.bindings.note_key(note);
            if !input.just_pressed(key) {
                continue;
            }

            services
                .anim
                .play_clip(self.id.label(), &format!("Note{}", note));
            services.audio.play_sound(note_sound(self.id, note));

            match self.tracker.record_note(note, now, table, unlocks, services) {
                Some(Resolution::Matched(name)) => {
                    self.spawn_reaction(services, VfxKind::Sparkle);
                    out.push(Dispatch::Buff {
                        to: self.id.partner(),
                        effect: name,
                    });
                }
                Some(Resolution::Missed) => {
                    self.spawn_reaction(services, VfxKind::Sweat);
                    out.push(Dispatch::Penalty {
                        to: self.id.partner(),
                    });
                }
                None => {}
            }
        }
    }

    fn update_slots(&mut self, services: &mut Services, now: f64, out: &mut Vec<Dispatch>) {
        if let Some(event) = self.buff_slot.update(now) {
            match event {
                SlotEvent::Expired(kind) => self.revert_effect(kind, services, out),
                SlotEvent::CooldownOver => self.spawn_reaction(services, VfxKind::CooldownOver),
            }
        }
        if let Some(event) = self.penalty_slot.update(now) {
            match event {
                SlotEvent::Expired(kind) => self.revert_penalty(kind),
                SlotEvent::CooldownOver => self.spawn_reaction(services, VfxKind::CooldownOver),
            }
        }
    }

    /// Buff dispatch from the partner. Dropped silently unless the slot is
    /// Idle, so re-entrant or repeated dispatches never double-apply.
    pub fn apply_effect(&mut self, name: &str, now: f64, services: &mut Services, out: &mut Vec<Dispatch>) {
        let Some(kind) = EffectKind::from_name(name) else {
            log::warn!("EFFECT: unknown effect name '{}'", name);
            return;
        };

        if !self
            .buff_slot
            .try_activate(kind, now, kind.active_secs(), kind.cooldown_secs())
        {
            log::debug!("EFFECT: {} busy, dropped {:?}", self.id.label(), kind);
            return;
        }

        self.spawn_reaction(services, VfxKind::Sparkle);

        match kind {
            EffectKind::Jump => {
                self.can_double_jump = true;
                self.has_used_double_jump = false;
            }
            EffectKind::Flatten => {
                self.visual.tilt_x = 75.0;
                services.audio.play_sound(SoundKind::Flatten);
            }
            EffectKind::GravityFlip => {
                self.body.gravity_scale = -1.0;
                self.visual.scale_y = -1.0;
                services.audio.play_sound(SoundKind::Gravity);
            }
            EffectKind::Boxed => {
                self.input_enabled = false;
                self.is_box = true;
                services.anim.set_flag(self.id.label(), "IsBox", true);
                services.audio.play_sound(SoundKind::Boxed);
                out.push(Dispatch::BoxStateChanged {
                    player: self.id,
                    boxed: true,
                });
            }
        }
        log::info!("EFFECT: {} activated {:?}", self.id.label(), kind);
    }

    fn revert_effect(&mut self, kind: EffectKind, services: &mut Services, out: &mut Vec<Dispatch>) {
        match kind {
            EffectKind::Jump => {
                self.can_double_jump = false;
            }
            EffectKind::Flatten => {
                self.visual.tilt_x = 0.0;
            }
            EffectKind::GravityFlip => {
                self.body.gravity_scale = 1.0;
                self.visual.scale_y = 1.0;
            }
            EffectKind::Boxed => {
                self.input_enabled = true;
                self.is_box = false;
                services.anim.set_flag(self.id.label(), "IsBox", false);
                out.push(Dispatch::BoxStateChanged {
                    player: self.id,
                    boxed: false,
                });
            }
        }
        log::info!("EFFECT: {} expired {:?}", self.id.label(), kind);
    }

    /// Penalty dispatch from a failed partner sequence.
    pub fn apply_penalty(&mut self, kind: PenaltyKind, now: f64, services: &mut Services) {
        if !self
            .penalty_slot
            .try_activate(kind, now, kind.active_secs(), kind.cooldown_secs())
        {
            log::debug!("EFFECT: {} busy, dropped {:?}", self.id.label(), kind);
            return;
        }

        self.spawn_reaction(services, VfxKind::Angry);

        match kind {
            PenaltyKind::Backflip => {
                self.tweens.start(Tween::backflip(&self.visual));
            }
            PenaltyKind::InvertControls => {
                self.invert_controls = true;
                self.tweens.start(Tween::turn_around(&self.visual));
                services.audio.play_sound(bad_effect_sound(self.id));
            }
            PenaltyKind::SpinAround => {
                self.tweens.start(Tween::turn_around(&self.visual));
            }
            PenaltyKind::MaterialGlitch => {
                self.visual.material_glitch = true;
                services.audio.play_sound(bad_effect_sound(self.id));
            }
        }
        log::info!("EFFECT: {} hit by {:?}", self.id.label(), kind);
    }

    fn revert_penalty(&mut self, kind: PenaltyKind) {
        match kind {
            PenaltyKind::InvertControls => self.invert_controls = false,
            PenaltyKind::MaterialGlitch => self.visual.material_glitch = false,
            // Tween-only penalties restore themselves.
            PenaltyKind::Backflip | PenaltyKind::SpinAround => {}
        }
    }

    /// Menu gate. Disabling cancels every outstanding routine immediately.
    pub fn set_controls_enabled(&mut self, enabled: bool, services: &mut Services, out: &mut Vec<Dispatch>) {
        self.controls_enabled = enabled;
        if !enabled {
            self.cancel_routines(services, out);
        }
    }

    /// Hard teardown of all timed state: tweens restored, active effects
    /// reverted, in-flight resolution forgotten.
    pub fn cancel_routines(&mut self, services: &mut Services, out: &mut Vec<Dispatch>) {
        self.tweens.cancel_all(&mut self.visual);
        if let Some(kind) = self.buff_slot.reset() {
            self.revert_effect(kind, services, out);
        }
        if let Some(kind) = self.penalty_slot.reset() {
            self.revert_penalty(kind);
        }
        self.tracker.reset();
    }

    fn spawn_reaction(&self, services: &mut Services, kind: VfxKind) {
        let mut anchor = self.body.position;
        if self.music_mode {
            anchor.y += MUSIC_MODE_PS_OFFSET;
        }
        services.vfx.spawn_effect(kind, anchor, REACTION_PS_LIFETIME);
    }

    fn action_held(&self, input: &InputState, action: PlayerAction) -> bool {
        self.bindings
            .key_for(action)
            .is_some_and(|key| input.is_held(key))
    }

    fn action_pressed(&self, input: &InputState, action: PlayerAction) -> bool {
        self.bindings
            .key_for(action)
            .is_some_and(|key| input.just_pressed(key))
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_music_mode(&self) -> bool {
        self.music_mode
    }

    pub fn controls_inverted(&self) -> bool {
        self.invert_controls
    }

    pub fn can_double_jump(&self) -> bool {
        self.can_double_jump
    }

    pub fn tracker(&self) -> &SequenceTracker {
        &self.tracker
    }

    pub fn tweens_running(&self) -> bool {
        !self.tweens.is_empty()
    }
}

fn note_sound(id: PlayerId, note: u8) -> SoundKind {
    match (id, note) {
        (PlayerId::One, 0) => SoundKind::P1Note0,
        (PlayerId::One, 1) => SoundKind::P1Note1,
        (PlayerId::One, 2) => SoundKind::P1Note2,
        (PlayerId::One, _) => SoundKind::P1Note3,
        (PlayerId::Two, 0) => SoundKind::P2Note0,
        (PlayerId::Two, 1) => SoundKind::P2Note1,
        (PlayerId::Two, 2) => SoundKind::P2Note2,
        (PlayerId::Two, _) => SoundKind::P2Note3,
    }
}

fn bad_effect_sound(id: PlayerId) -> SoundKind {
    match id {
        PlayerId::One => SoundKind::P1BadEffect,
        PlayerId::Two => SoundKind::P2BadEffect,
    }
}
