//! Application entry point. Builds the level pair from the on-disk config
//! and runs a short scripted session against the null services, which is
//! enough to exercise the whole melody pipeline headlessly.

mod config;
mod core;
mod logic;
mod models;
mod shared;

use crate::config::GameConfig;
use crate::core::input::Key;
use crate::logic::level::Level;
use crate::models::player::PlayerId;
use crate::models::unlocks::{MUSIC_MODE_P1, UnlockStore};
use crate::shared::services::Services;
use std::path::PathBuf;

const FRAME_DT: f64 = 1.0 / 60.0;

fn main() {
    unsafe {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    log::info!("MAIN: Booting duonote...");

    let config_path = PathBuf::from("duonote.toml");
    let config = GameConfig::load_or_default(&config_path);

    let unlocks = UnlockStore::load(PathBuf::from("unlocks.json"));
    let mut level = Level::new(&config, Services::null(), unlocks);

    // Scripted demo session: pick up the instrument, switch player one into
    // music mode, play the Jump melody and let the partner buff run out.
    level.instruments.push(logic::collectibles::InstrumentCollectible::new("instrument0"));
    level.instrument_entered(0, PlayerId::One);

    if !level.unlocks.is_unlocked(MUSIC_MODE_P1) {
        log::warn!("MAIN: instrument pickup did not unlock music mode");
    }

    tap(&mut level, Key::ShiftLeft);
    for key in [Key::W, Key::A, Key::S, Key::D] {
        tap(&mut level, key);
    }

    if level.player(PlayerId::Two).can_double_jump() {
        log::info!("MAIN: partner buff landed");
    }

    // Run the buff through its full active window and cooldown.
    let frames = (7.0 / FRAME_DT) as usize;
    for _ in 0..frames {
        level.update(FRAME_DT);
    }
    log::info!(
        "MAIN: p1 grounded = {}, p2 grounded = {}",
        level.player(PlayerId::One).is_grounded(),
        level.player(PlayerId::Two).is_grounded()
    );

    // A stray penalty, torn down while it may still be running.
    level.inflict_random_penalty(PlayerId::One);
    for _ in 0..30 {
        level.update(FRAME_DT);
    }

    level.teardown();
    log::info!("MAIN: session over at t={:.2}s", level.now());
}

fn tap(level: &mut Level, key: Key) {
    level.input.key_down(key);
    level.update(FRAME_DT);
    level.input.key_up(key);
    level.update(FRAME_DT);
}
