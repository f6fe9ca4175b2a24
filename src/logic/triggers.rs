//! Level trigger state machines: pressure button, level end, ending cutscene,
//! respawn zones.
//!
//! The host's collision layer reports enter/exit events; everything else is
//! bookkeeping on this side.

use crate::core::input::{InputState, Key};
use crate::models::player::PlayerId;
use crate::shared::math::Vec2;
use crate::shared::services::{Services, SoundKind};

/// One stage object driven by a button, with its polarity.
#[derive(Clone, Debug)]
pub struct ButtonTarget {
    pub name: String,
    pub enable_on_press: bool,
}

/// Pressure plate. Pressed while player two stands on it, or while player one
/// occupies it in boxed form (a boxed occupant forces the press).
pub struct ButtonTrigger {
    name: String,
    indicators: Vec<String>,
    targets: Vec<ButtonTarget>,

    pressed: bool,
    p1_occupying: bool,
    p1_boxed: bool,
    p2_on_button: bool,
}

impl ButtonTrigger {
    pub fn new(name: &str, indicators: Vec<String>, targets: Vec<ButtonTarget>) -> Self {
        Self {
            name: name.to_string(),
            indicators,
            targets,
            pressed: false,
            p1_occupying: false,
            p1_boxed: false,
            p2_on_button: false,
        }
    }

    /// Initial/reset state: unpressed, everything off.
    pub fn reset(&mut self, services: &mut Services) {
        self.pressed = false;
        self.p1_occupying = false;
        self.p1_boxed = false;
        self.p2_on_button = false;
        self.toggle_objects(false, services);
        self.set_indicators(false, services);
        services.anim.set_state(&self.name, "ButtonState", 0);
    }

    pub fn on_enter(&mut self, player: PlayerId, player_boxed: bool, services: &mut Services) {
        match player {
            PlayerId::One => {
                self.p1_occupying = true;
                self.p1_boxed = player_boxed;
                if player_boxed {
                    self.press(services, true);
                } else if !self.pressed {
                    services.anim.set_state(&self.name, "ButtonState", 1);
                }
            }
            PlayerId::Two => {
                self.p2_on_button = true;
                self.force_press(services);
            }
        }
    }

    pub fn on_exit(&mut self, player: PlayerId, services: &mut Services) {
        match player {
            PlayerId::One => {
                if !self.p1_occupying {
                    return;
                }
                self.p1_occupying = false;
                self.p1_boxed = false;
                if !self.p2_on_button {
                    self.release(0, services);
                }
            }
            PlayerId::Two => {
                self.p2_on_button = false;
                if self.p1_occupying {
                    if self.p1_boxed {
                        self.press(services, true);
                    } else {
                        self.release(1, services);
                    }
                } else {
                    self.release(0, services);
                }
            }
        }
    }

    /// Box state of the occupying player one changed under the button.
    pub fn on_box_state_changed(&mut self, boxed: bool, services: &mut Services) {
        if !self.p1_occupying {
            return;
        }
        self.p1_boxed = boxed;

        if self.p2_on_button {
            return;
        }

        if boxed && !self.pressed {
            self.press(services, false);
        } else if !boxed && self.pressed {
            self.release(1, services);
        } else if !boxed {
            services.anim.set_state(&self.name, "ButtonState", 1);
        }
    }

    fn press(&mut self, services: &mut Services, silent_repeat: bool) {
        if self.pressed && silent_repeat {
            services.anim.set_state(&self.name, "ButtonState", 2);
            return;
        }
        self.pressed = true;
        self.toggle_objects(true, services);
        services.audio.play_sound(SoundKind::ButtonClick);
        services.anim.set_state(&self.name, "ButtonState", 2);
        self.set_indicators(true, services);
    }

    fn force_press(&mut self, services: &mut Services) {
        self.pressed = true;
        self.toggle_objects(true, services);
        services.anim.set_state(&self.name, "ButtonState", 2);
        self.set_indicators(true, services);
    }

    fn release(&mut self, state: i32, services: &mut Services) {
        self.pressed = false;
        self.toggle_objects(false, services);
        services.anim.set_state(&self.name, "ButtonState", state);
        self.set_indicators(false, services);
    }

    fn toggle_objects(&self, pressed: bool, services: &mut Services) {
        for target in &self.targets {
            services
                .world
                .set_active(&target.name, pressed == target.enable_on_press);
        }
    }

    fn set_indicators(&self, on: bool, services: &mut Services) {
        for indicator in &self.indicators {
            services.world.set_active(indicator, on);
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

/// Two-of-two presence detector that fires the next-scene transition once.
pub struct EndTrigger {
    p1_indicator: String,
    p2_indicator: String,
    p1_in: bool,
    p2_in: bool,
    fired: bool,
}

impl EndTrigger {
    pub fn new(p1_indicator: &str, p2_indicator: &str) -> Self {
        Self {
            p1_indicator: p1_indicator.to_string(),
            p2_indicator: p2_indicator.to_string(),
            p1_in: false,
            p2_in: false,
            fired: false,
        }
    }

    pub fn on_enter(&mut self, player: PlayerId, services: &mut Services) {
        if self.fired {
            return;
        }
        self.set_presence(player, true, services);

        if self.p1_in && self.p2_in {
            self.fired = true;
            log::info!("TRIGGER: level complete, transitioning");
            services.scene.transition_next();
        }
    }

    pub fn on_exit(&mut self, player: PlayerId, services: &mut Services) {
        if self.fired {
            return;
        }
        self.set_presence(player, false, services);
    }

    fn set_presence(&mut self, player: PlayerId, present: bool, services: &mut Services) {
        let indicator = match player {
            PlayerId::One => {
                self.p1_in = present;
                &self.p1_indicator
            }
            PlayerId::Two => {
                self.p2_in = present;
                &self.p2_indicator
            }
        };
        services.world.set_active(indicator, present);
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

const ENDING_CAMERA_TARGET: Vec2 = Vec2 { x: 0.0, y: 82.0 };
const CAMERA_PAN_SECS: f64 = 60.0;

/// Ending cutscene: once both players stand in the zone the one-shot sequence
/// starts (pause, slow camera pan, ending screen, wait for input) and the
/// trigger goes inert to presence changes.
pub struct EndingTrigger {
    p1_indicator: String,
    p2_indicator: String,
    p1_in: bool,
    p2_in: bool,

    triggered_at: Option<f64>,
    screen_shown: bool,
    done: bool,
}

impl EndingTrigger {
    pub fn new(p1_indicator: &str, p2_indicator: &str) -> Self {
        Self {
            p1_indicator: p1_indicator.to_string(),
            p2_indicator: p2_indicator.to_string(),
            p1_in: false,
            p2_in: false,
            triggered_at: None,
            screen_shown: false,
            done: false,
        }
    }

    pub fn on_enter(&mut self, player: PlayerId, now: f64, services: &mut Services) {
        if self.triggered_at.is_some() {
            return;
        }
        self.set_presence(player, true, services);

        if self.p1_in && self.p2_in {
            self.triggered_at = Some(now);
            log::info!("TRIGGER: ending sequence started");
        }
    }

    pub fn on_exit(&mut self, player: PlayerId, services: &mut Services) {
        if self.triggered_at.is_some() {
            return;
        }
        self.set_presence(player, false, services);
    }

    /// Advances the cutscene. The camera pan lerps from the current position
    /// every tick, so the drift eases out on its own.
    pub fn update(&mut self, camera: &mut Vec2, input: &InputState, now: f64, services: &mut Services) {
        let Some(t0) = self.triggered_at else { return };
        if self.done {
            return;
        }
        let elapsed = now - t0;

        if elapsed >= 1.0 && elapsed < 1.0 + CAMERA_PAN_SECS {
            let t = ((elapsed - 1.0) / CAMERA_PAN_SECS) as f32;
            *camera = camera.lerp(ENDING_CAMERA_TARGET, t);
        }

        if !self.screen_shown && elapsed >= 4.0 {
            self.screen_shown = true;
            services.anim.play_clip("ending", "ShowEndingScreen");
        }

        if self.screen_shown && elapsed >= 7.0 && input.just_pressed(Key::MouseLeft) {
            self.done = true;
            services.scene.transition_to("IntroScene");
        }
    }

    /// Teardown: drop the cutscene outright and re-arm the trigger.
    pub fn disable(&mut self) {
        self.triggered_at = None;
        self.screen_shown = false;
        self.done = false;
        self.p1_in = false;
        self.p2_in = false;
    }

    fn set_presence(&mut self, player: PlayerId, present: bool, services: &mut Services) {
        let indicator = match player {
            PlayerId::One => {
                self.p1_in = present;
                &self.p1_indicator
            }
            PlayerId::Two => {
                self.p2_in = present;
                &self.p2_indicator
            }
        };
        services.world.set_active(indicator, present);
    }

    pub fn has_triggered(&self) -> bool {
        self.triggered_at.is_some()
    }
}

/// Kill zone: entering players snap back to their respawn point.
pub struct Respawner {
    pub p1_point: Vec2,
    pub p2_point: Vec2,
}

impl Respawner {
    pub fn respawn_point(&self, player: PlayerId) -> Vec2 {
        match player {
            PlayerId::One => self.p1_point,
            PlayerId::Two => self.p2_point,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::services::SceneService;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingScene {
        next: Rc<Cell<usize>>,
        named: Rc<Cell<usize>>,
    }

    impl SceneService for CountingScene {
        fn transition_next(&mut self) {
            self.next.set(self.next.get() + 1);
        }

        fn transition_to(&mut self, _name: &str) {
            self.named.set(self.named.get() + 1);
        }
    }

    fn counting_services() -> (Services, Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let next = Rc::new(Cell::new(0));
        let named = Rc::new(Cell::new(0));
        let mut services = Services::null();
        services.scene = Box::new(CountingScene {
            next: next.clone(),
            named: named.clone(),
        });
        (services, next, named)
    }

    fn button() -> ButtonTrigger {
        ButtonTrigger::new(
            "button0",
            vec!["indicator0".into()],
            vec![
                ButtonTarget {
                    name: "door".into(),
                    enable_on_press: true,
                },
                ButtonTarget {
                    name: "spikes".into(),
                    enable_on_press: false,
                },
            ],
        )
    }

    #[test]
    fn test_p2_presses_and_releases_button() {
        let mut services = Services::null();
        let mut b = button();
        b.reset(&mut services);
        assert!(!b.is_pressed());

        b.on_enter(PlayerId::Two, false, &mut services);
        assert!(b.is_pressed());

        b.on_exit(PlayerId::Two, &mut services);
        assert!(!b.is_pressed());
    }

    #[test]
    fn test_unboxed_p1_occupies_without_pressing() {
        let mut services = Services::null();
        let mut b = button();
        b.reset(&mut services);

        b.on_enter(PlayerId::One, false, &mut services);
        assert!(!b.is_pressed());

        b.on_exit(PlayerId::One, &mut services);
        assert!(!b.is_pressed());
    }

    #[test]
    fn test_boxed_occupant_forces_press_regardless_of_p2() {
        let mut services = Services::null();
        let mut b = button();
        b.reset(&mut services);

        b.on_enter(PlayerId::One, true, &mut services);
        assert!(b.is_pressed());

        // P2 walking on and off does not release while the box remains.
        b.on_enter(PlayerId::Two, false, &mut services);
        b.on_exit(PlayerId::Two, &mut services);
        assert!(b.is_pressed());

        // Un-boxing under the button releases it.
        b.on_box_state_changed(false, &mut services);
        assert!(!b.is_pressed());
    }

    #[test]
    fn test_box_state_change_ignored_while_p2_holds_button() {
        let mut services = Services::null();
        let mut b = button();
        b.reset(&mut services);

        b.on_enter(PlayerId::One, true, &mut services);
        b.on_enter(PlayerId::Two, false, &mut services);

        b.on_box_state_changed(false, &mut services);
        assert!(b.is_pressed());

        // P2 steps off; the now-unboxed occupant can't hold it down.
        b.on_exit(PlayerId::Two, &mut services);
        assert!(!b.is_pressed());
    }

    #[test]
    fn test_end_trigger_fires_once_with_both_present() {
        let (mut services, next, _) = counting_services();
        let mut end = EndTrigger::new("p1ind", "p2ind");

        end.on_enter(PlayerId::One, &mut services);
        assert_eq!(next.get(), 0);

        end.on_exit(PlayerId::One, &mut services);
        end.on_enter(PlayerId::Two, &mut services);
        assert_eq!(next.get(), 0);

        end.on_enter(PlayerId::One, &mut services);
        assert_eq!(next.get(), 1);
        assert!(end.has_fired());

        // Inert afterwards.
        end.on_exit(PlayerId::One, &mut services);
        end.on_enter(PlayerId::One, &mut services);
        assert_eq!(next.get(), 1);
    }

    #[test]
    fn test_ending_trigger_one_shot_cutscene() {
        let (mut services, _, named) = counting_services();
        let mut ending = EndingTrigger::new("p1ind", "p2ind");
        let mut camera = Vec2::new(0.0, 0.0);
        let mut input = InputState::new();

        ending.on_enter(PlayerId::One, 10.0, &mut services);
        ending.on_enter(PlayerId::Two, 10.0, &mut services);
        assert!(ending.has_triggered());

        // Presence changes after the fact are ignored.
        ending.on_exit(PlayerId::One, &mut services);
        assert!(ending.has_triggered());

        // Camera holds during the initial delay, then drifts upward.
        ending.update(&mut camera, &input, 10.5, &mut services);
        assert_eq!(camera.y, 0.0);
        ending.update(&mut camera, &input, 13.0, &mut services);
        assert!(camera.y > 0.0);

        // Input before the screen reveal does nothing.
        input.key_down(Key::MouseLeft);
        ending.update(&mut camera, &input, 14.5, &mut services);
        assert_eq!(named.get(), 0);
        input.end_frame();
        input.key_up(Key::MouseLeft);
        input.end_frame();

        input.key_down(Key::MouseLeft);
        ending.update(&mut camera, &input, 17.5, &mut services);
        assert_eq!(named.get(), 1);

        // Further clicks cannot re-fire.
        ending.update(&mut camera, &input, 18.0, &mut services);
        assert_eq!(named.get(), 1);
    }

    #[test]
    fn test_disable_rearms_finished_cutscene() {
        let (mut services, _, named) = counting_services();
        let mut ending = EndingTrigger::new("p1ind", "p2ind");
        let mut camera = Vec2::ZERO;
        let mut input = InputState::new();

        // Run the cutscene through to the final transition.
        ending.on_enter(PlayerId::One, 0.0, &mut services);
        ending.on_enter(PlayerId::Two, 0.0, &mut services);
        ending.update(&mut camera, &input, 4.0, &mut services);
        input.key_down(Key::MouseLeft);
        ending.update(&mut camera, &input, 7.0, &mut services);
        assert_eq!(named.get(), 1);
        input.end_frame();
        input.key_up(Key::MouseLeft);
        input.end_frame();

        ending.disable();
        assert!(!ending.has_triggered());

        // A fresh both-present moment plays the whole sequence again.
        ending.on_enter(PlayerId::One, 20.0, &mut services);
        ending.on_enter(PlayerId::Two, 20.0, &mut services);
        assert!(ending.has_triggered());
        ending.update(&mut camera, &input, 24.0, &mut services);
        input.key_down(Key::MouseLeft);
        ending.update(&mut camera, &input, 27.5, &mut services);
        assert_eq!(named.get(), 2);
    }
}
