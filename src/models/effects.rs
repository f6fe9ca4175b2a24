//! Timed status effects and the per-category cooldown state machine.

/// Beneficial effects, dispatched to the partner on a matched sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectKind {
    /// Grants a one-shot double jump.
    Jump,
    /// Tilts the player flat (75° on the x axis).
    Flatten,
    /// Flips gravity sign and vertical scale.
    GravityFlip,
    /// Turns the player into a box; all input disabled.
    Boxed,
}

impl EffectKind {
    pub fn from_name(name: &str) -> Option<EffectKind> {
        match name {
            "Jump" => Some(EffectKind::Jump),
            "Flatten" => Some(EffectKind::Flatten),
            "Gravity" => Some(EffectKind::GravityFlip),
            "Box" => Some(EffectKind::Boxed),
            _ => None,
        }
    }

    /// Seconds the effect stays applied.
    pub fn active_secs(self) -> f64 {
        5.95
    }

    /// Cooldown window after expiry before the slot reopens.
    pub fn cooldown_secs(self) -> f64 {
        0.05
    }
}

/// Detrimental effects, one picked uniformly at random per failed sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PenaltyKind {
    /// Visual backflip arc; no control change.
    Backflip,
    /// Horizontal input sign inverted.
    InvertControls,
    /// Visual turn-around spin.
    SpinAround,
    /// Sprite material swapped to the glitch variant.
    MaterialGlitch,
}

pub const ALL_PENALTIES: [PenaltyKind; 4] = [
    PenaltyKind::Backflip,
    PenaltyKind::InvertControls,
    PenaltyKind::SpinAround,
    PenaltyKind::MaterialGlitch,
];

impl PenaltyKind {
    pub fn active_secs(self) -> f64 {
        match self {
            PenaltyKind::Backflip => 0.75,
            PenaltyKind::InvertControls => 5.0,
            PenaltyKind::SpinAround => 0.5,
            PenaltyKind::MaterialGlitch => 5.0,
        }
    }

    pub fn cooldown_secs(self) -> f64 {
        match self {
            PenaltyKind::Backflip => 0.25,
            PenaltyKind::InvertControls => 0.05,
            PenaltyKind::SpinAround => 0.25,
            PenaltyKind::MaterialGlitch => 0.05,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Active,
    Cooldown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotEvent<K> {
    /// Active period ended; the side effect must be reverted.
    Expired(K),
    /// Slot reopened; cue the cooldown-over particle.
    CooldownOver,
}

/// Idle → Active → Cooldown → Idle, driven by game time.
///
/// Activation is only accepted from Idle; anything else is a silent drop, so
/// re-entrant dispatches inside one call chain can never double-apply.
#[derive(Clone, Debug)]
pub struct EffectSlot<K: Copy> {
    phase: Phase,
    kind: Option<K>,
    active_until: f64,
    cooldown_until: f64,
}

impl<K: Copy> Default for EffectSlot<K> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            kind: None,
            active_until: 0.0,
            cooldown_until: 0.0,
        }
    }
}

impl<K: Copy> EffectSlot<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the activation was accepted.
    pub fn try_activate(&mut self, kind: K, now: f64, active_secs: f64, cooldown_secs: f64) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::Active;
        self.kind = Some(kind);
        self.active_until = now + active_secs;
        self.cooldown_until = self.active_until + cooldown_secs;
        true
    }

    /// Advances the machine; at most one transition per call.
    pub fn update(&mut self, now: f64) -> Option<SlotEvent<K>> {
        match self.phase {
            Phase::Active if now >= self.active_until => {
                self.phase = Phase::Cooldown;
                let kind = self.kind.take();
                kind.map(SlotEvent::Expired)
            }
            Phase::Cooldown if now >= self.cooldown_until => {
                self.phase = Phase::Idle;
                Some(SlotEvent::CooldownOver)
            }
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn active_kind(&self) -> Option<K> {
        if self.phase == Phase::Active { self.kind } else { None }
    }

    /// Teardown: drops any running effect without waiting out the timers.
    pub fn reset(&mut self) -> Option<K> {
        let kind = if self.phase == Phase::Active { self.kind } else { None };
        *self = Self::default();
        kind
    }
}
