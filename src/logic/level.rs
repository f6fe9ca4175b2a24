//! The level context: owns both player controllers, the trigger and
//! collectible population, and the shared clock. Controllers never reference
//! each other; cross-player effect dispatches are routed here.

use crate::config::GameConfig;
use crate::core::input::InputState;
use crate::logic::collectibles::{EffectCollectible, InstrumentCollectible, TunePreview};
use crate::logic::player::{Dispatch, PlayerController};
use crate::logic::resolver::pick_penalty;
use crate::logic::triggers::{ButtonTrigger, EndTrigger, EndingTrigger, Respawner};
use crate::models::player::PlayerId;
use crate::models::sequence::PatternTable;
use crate::models::unlocks::UnlockStore;
use crate::shared::math::Vec2;
use crate::shared::services::Services;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Physics probe rate, decoupled from the render frame rate.
const FIXED_DT: f64 = 0.02;

pub struct Level {
    time: f64,
    fixed_acc: f64,

    pub input: InputState,
    pub services: Services,
    pub unlocks: UnlockStore,
    tables: [PatternTable; 2],
    players: [PlayerController; 2],

    pub buttons: Vec<ButtonTrigger>,
    pub end_trigger: Option<EndTrigger>,
    pub ending_trigger: Option<EndingTrigger>,
    pub respawners: Vec<Respawner>,
    pub instruments: Vec<InstrumentCollectible>,
    pub effect_items: Vec<EffectCollectible>,
    pub tune_previews: Vec<TunePreview>,

    pub camera: Vec2,
    rng: StdRng,
}

impl Level {
    pub fn new(config: &GameConfig, services: Services, unlocks: UnlockStore) -> Self {
        let p1 = PlayerController::new(
            PlayerId::One,
            config.player_one.tuning.clone(),
            Vec2::new(config.player_one.spawn.0, config.player_one.spawn.1),
        );
        let p2 = PlayerController::new(
            PlayerId::Two,
            config.player_two.tuning.clone(),
            Vec2::new(config.player_two.spawn.0, config.player_two.spawn.1),
        );

        log::info!("LEVEL: pair constructed");
        Self {
            time: 0.0,
            fixed_acc: 0.0,
            input: InputState::new(),
            services,
            unlocks,
            tables: [config.table_for_one(), config.table_for_two()],
            players: [p1, p2],
            buttons: Vec::new(),
            end_trigger: None,
            ending_trigger: None,
            respawners: Vec::new(),
            instruments: Vec::new(),
            effect_items: Vec::new(),
            tune_previews: Vec::new(),
            camera: Vec2::ZERO,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic penalty selection, for tests and replays.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn now(&self) -> f64 {
        self.time
    }

    pub fn player(&self, id: PlayerId) -> &PlayerController {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut PlayerController {
        &mut self.players[id.index()]
    }

    /// One frame of the whole level. Game-time based throughout, so the
    /// behavior is frame-rate independent.
    pub fn update(&mut self, dt: f64) {
        self.time += dt;
        let now = self.time;

        // Fixed-rate ground probing, accumulator style.
        self.fixed_acc += dt;
        while self.fixed_acc >= FIXED_DT {
            self.fixed_acc -= FIXED_DT;
            for player in &mut self.players {
                player.fixed_update(self.services.physics.as_ref());
            }
        }

        let mut queue: VecDeque<Dispatch> = VecDeque::new();
        let mut out = Vec::new();
        for i in 0..self.players.len() {
            self.players[i].update(
                &self.input,
                &self.tables[i],
                &self.unlocks,
                &mut self.services,
                now,
                dt as f32,
                &mut out,
            );
            queue.extend(out.drain(..));
        }
        self.route_dispatches(queue, now);

        for item in &mut self.instruments {
            item.update(now, &mut self.services);
        }
        for item in &mut self.effect_items {
            item.update(now, &mut self.services);
        }
        for preview in &mut self.tune_previews {
            preview.update(now, &mut self.services);
        }
        if let Some(ending) = &mut self.ending_trigger {
            ending.update(&mut self.camera, &self.input, now, &mut self.services);
        }

        self.input.end_frame();
    }

    /// Applies cross-object dispatches. Dispatches raised while applying
    /// (box-state changes, re-entrant effects) go through the same queue; the
    /// slot gate keeps re-entrancy from double-applying anything.
    fn route_dispatches(&mut self, mut queue: VecDeque<Dispatch>, now: f64) {
        while let Some(dispatch) = queue.pop_front() {
            let mut raised = Vec::new();
            match dispatch {
                Dispatch::Buff { to, effect } => {
                    self.players[to.index()].apply_effect(
                        &effect,
                        now,
                        &mut self.services,
                        &mut raised,
                    );
                }
                Dispatch::Penalty { to } => {
                    let kind = pick_penalty(&mut self.rng);
                    self.players[to.index()].apply_penalty(kind, now, &mut self.services);
                }
                Dispatch::BoxStateChanged { player, boxed } => {
                    // Buttons only track the first player's box form.
                    if player == PlayerId::One {
                        for button in &mut self.buttons {
                            button.on_box_state_changed(boxed, &mut self.services);
                        }
                    }
                }
            }
            queue.extend(raised);
        }
    }

    // --- collision event routing, fed by the host ---

    pub fn button_entered(&mut self, index: usize, player: PlayerId) {
        let boxed = self.players[player.index()].is_box;
        if let Some(button) = self.buttons.get_mut(index) {
            button.on_enter(player, boxed, &mut self.services);
        }
    }

    pub fn button_exited(&mut self, index: usize, player: PlayerId) {
        if let Some(button) = self.buttons.get_mut(index) {
            button.on_exit(player, &mut self.services);
        }
    }

    pub fn end_trigger_entered(&mut self, player: PlayerId) {
        if let Some(end) = &mut self.end_trigger {
            end.on_enter(player, &mut self.services);
        }
    }

    pub fn end_trigger_exited(&mut self, player: PlayerId) {
        if let Some(end) = &mut self.end_trigger {
            end.on_exit(player, &mut self.services);
        }
    }

    pub fn ending_entered(&mut self, player: PlayerId) {
        let now = self.time;
        if let Some(ending) = &mut self.ending_trigger {
            ending.on_enter(player, now, &mut self.services);
        }
    }

    pub fn ending_exited(&mut self, player: PlayerId) {
        if let Some(ending) = &mut self.ending_trigger {
            ending.on_exit(player, &mut self.services);
        }
    }

    pub fn respawner_entered(&mut self, index: usize, player: PlayerId) {
        if let Some(respawner) = self.respawners.get(index) {
            let point = respawner.respawn_point(player);
            self.players[player.index()].body.position = point;
            self.players[player.index()].body.velocity = Vec2::ZERO;
        }
    }

    pub fn instrument_entered(&mut self, index: usize, player: PlayerId) {
        let now = self.time;
        if let Some(item) = self.instruments.get_mut(index) {
            item.on_enter(player, now, &mut self.unlocks, &mut self.services);
        }
    }

    pub fn effect_item_entered(&mut self, index: usize, player: PlayerId) {
        let now = self.time;
        if let Some(item) = self.effect_items.get_mut(index) {
            item.on_enter(player, now, &mut self.unlocks, &mut self.services);
        }
    }

    pub fn tune_preview_entered(&mut self, index: usize, player: PlayerId) {
        let now = self.time;
        if let Some(preview) = self.tune_previews.get_mut(index) {
            preview.on_enter(player, now);
        }
    }

    // --- session control ---

    /// Menu gate for both controllers.
    pub fn set_controls_enabled(&mut self, enabled: bool) {
        let mut raised = Vec::new();
        for player in &mut self.players {
            player.set_controls_enabled(enabled, &mut self.services, &mut raised);
        }
        self.route_dispatches(raised.into(), self.time);
    }

    /// Full game restart: unlocks wiped, collectibles respawned, every timed
    /// routine cancelled.
    pub fn restart(&mut self) {
        log::info!("LEVEL: restart, resetting unlocks");
        self.unlocks.reset_all();
        for item in &mut self.instruments {
            item.reset(&mut self.services);
        }
        for item in &mut self.effect_items {
            item.reset(&mut self.services);
        }
        self.teardown();
    }

    /// Cancels all outstanding timed routines, hard. Nothing may linger.
    pub fn teardown(&mut self) {
        let mut raised = Vec::new();
        for player in &mut self.players {
            player.cancel_routines(&mut self.services, &mut raised);
        }
        self.route_dispatches(raised.into(), self.time);

        for preview in &mut self.tune_previews {
            preview.disable();
        }
        if let Some(ending) = &mut self.ending_trigger {
            ending.disable();
        }
    }

    /// Random penalty on a player, outside of sequence resolution. Used by
    /// scripted sequences and tests.
    pub fn inflict_random_penalty(&mut self, target: PlayerId) {
        let kind = pick_penalty(&mut self.rng);
        let now = self.time;
        self.players[target.index()].apply_penalty(kind, now, &mut self.services);
    }
}
