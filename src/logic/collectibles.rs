//! Pickups that mutate the unlock store, and the tune preview zones that
//! demonstrate a melody near its collectible.

use crate::models::player::PlayerId;
use crate::models::unlocks::{MUSIC_MODE_P1, MUSIC_MODE_P2, UnlockStore};
use crate::shared::services::{Services, SoundKind};

const DESPAWN_DELAY: f64 = 1.5;

/// Instrument pickup: unlocks music mode per player, once each.
pub struct InstrumentCollectible {
    name: String,
    unlocked_p1: bool,
    unlocked_p2: bool,
    despawn_at: Option<f64>,
    despawned: bool,
}

impl InstrumentCollectible {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            unlocked_p1: false,
            unlocked_p2: false,
            despawn_at: None,
            despawned: false,
        }
    }

    /// Restart: back to the uncollected, visible state.
    pub fn reset(&mut self, services: &mut Services) {
        self.unlocked_p1 = false;
        self.unlocked_p2 = false;
        self.despawn_at = None;
        self.despawned = false;
        services.world.set_active(&self.name, true);
    }

    pub fn on_enter(&mut self, player: PlayerId, now: f64, unlocks: &mut UnlockStore, services: &mut Services) {
        if self.despawned {
            return;
        }
        let (flag, key) = match player {
            PlayerId::One => (&mut self.unlocked_p1, MUSIC_MODE_P1),
            PlayerId::Two => (&mut self.unlocked_p2, MUSIC_MODE_P2),
        };
        if *flag {
            return;
        }
        *flag = true;
        unlocks.unlock(key);
        services.anim.play_clip(&self.name, "CollectibleCollected");
        services.audio.play_sound(SoundKind::Collectible);
        self.despawn_at.get_or_insert(now + DESPAWN_DELAY);
    }

    pub fn update(&mut self, now: f64, services: &mut Services) {
        if self.despawned {
            return;
        }
        if let Some(at) = self.despawn_at
            && now >= at
        {
            self.despawned = true;
            services.world.set_active(&self.name, false);
        }
    }

    pub fn is_despawned(&self) -> bool {
        self.despawned
    }
}

/// One-shot pickup unlocking a named effect pattern, then revealing its tune
/// preview objects.
pub struct EffectCollectible {
    name: String,
    unlock_key: String,
    tune_previews: Vec<String>,
    collected: bool,
    despawn_at: Option<f64>,
}

impl EffectCollectible {
    pub fn new(name: &str, unlock_key: &str, tune_previews: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            unlock_key: unlock_key.to_string(),
            tune_previews,
            collected: false,
            despawn_at: None,
        }
    }

    /// Previews start hidden until the collectible is gone. Also used on
    /// restart, where the collectible itself reappears.
    pub fn reset(&mut self, services: &mut Services) {
        self.collected = false;
        self.despawn_at = None;
        services.world.set_active(&self.name, true);
        for preview in &self.tune_previews {
            services.world.set_active(preview, false);
        }
    }

    pub fn on_enter(&mut self, _player: PlayerId, now: f64, unlocks: &mut UnlockStore, services: &mut Services) {
        if self.collected {
            return;
        }
        self.collected = true;
        unlocks.unlock(&self.unlock_key);
        services.anim.play_clip(&self.name, "CollectibleCollected");
        services.audio.play_sound(SoundKind::Collectible);
        self.despawn_at = Some(now + DESPAWN_DELAY);
    }

    pub fn update(&mut self, now: f64, services: &mut Services) {
        if let Some(at) = self.despawn_at
            && now >= at
        {
            self.despawn_at = None;
            for preview in &self.tune_previews {
                services.world.set_active(preview, true);
            }
            services.world.set_active(&self.name, false);
        }
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }
}

/// Plays a 4-note demo when a player wanders close; refuses to restart while
/// still playing.
pub struct TunePreview {
    name: String,
    notes: [SoundKind; 4],
    playing: bool,
    step: usize,
    next_at: f64,
}

impl TunePreview {
    pub fn new(name: &str, notes: [SoundKind; 4]) -> Self {
        Self {
            name: name.to_string(),
            notes,
            playing: false,
            step: 0,
            next_at: 0.0,
        }
    }

    pub fn on_enter(&mut self, _player: PlayerId, now: f64) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.step = 0;
        self.next_at = now + 0.5;
    }

    pub fn update(&mut self, now: f64, services: &mut Services) {
        if !self.playing || now < self.next_at {
            return;
        }

        if self.step < 4 {
            services.anim.play_clip(&self.name, "TunePulse");
            services.audio.play_sound(self.notes[self.step]);
            self.step += 1;
            self.next_at += if self.step < 4 { 1.0 } else { 0.5 };
        } else {
            self.playing = false;
        }
    }

    /// Teardown cancels the demo outright.
    pub fn disable(&mut self) {
        self.playing = false;
        self.step = 0;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_unlocks_each_player_once() {
        let mut services = Services::null();
        let mut unlocks = UnlockStore::in_memory();
        let mut item = InstrumentCollectible::new("instrument0");

        item.on_enter(PlayerId::One, 0.0, &mut unlocks, &mut services);
        assert!(unlocks.is_unlocked(MUSIC_MODE_P1));
        assert!(!unlocks.is_unlocked(MUSIC_MODE_P2));

        item.on_enter(PlayerId::Two, 0.5, &mut unlocks, &mut services);
        assert!(unlocks.is_unlocked(MUSIC_MODE_P2));

        // Despawns on the first pickup's clock.
        item.update(1.4, &mut services);
        assert!(!item.is_despawned());
        item.update(1.5, &mut services);
        assert!(item.is_despawned());
    }

    #[test]
    fn test_effect_collectible_is_one_shot_and_reveals_previews() {
        let mut services = Services::null();
        let mut unlocks = UnlockStore::in_memory();
        let mut item =
            EffectCollectible::new("gravity_pickup", "Effect1Unlocked", vec!["preview0".into()]);
        item.reset(&mut services);

        item.on_enter(PlayerId::Two, 2.0, &mut unlocks, &mut services);
        assert!(item.is_collected());
        assert!(unlocks.is_unlocked("Effect1Unlocked"));

        item.on_enter(PlayerId::One, 2.1, &mut unlocks, &mut services);
        item.update(3.5, &mut services);
        item.update(4.0, &mut services);
        assert!(item.is_collected());
    }

    #[test]
    fn test_tune_preview_plays_through_then_rearms() {
        let mut services = Services::null();
        let mut preview = TunePreview::new(
            "preview0",
            [
                SoundKind::P1Note0,
                SoundKind::P1Note1,
                SoundKind::P1Note2,
                SoundKind::P1Note3,
            ],
        );

        preview.on_enter(PlayerId::One, 0.0);
        assert!(preview.is_playing());

        // Re-entry while playing is ignored.
        preview.on_enter(PlayerId::Two, 0.1);

        // Notes land at 0.5, 1.5, 2.5, 3.5; done at 4.0.
        for t in [0.5, 1.5, 2.5, 3.5] {
            preview.update(t, &mut services);
            assert!(preview.is_playing());
        }
        preview.update(4.0, &mut services);
        assert!(!preview.is_playing());

        preview.on_enter(PlayerId::One, 5.0);
        assert!(preview.is_playing());
    }
}
