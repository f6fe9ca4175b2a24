//! Keyboard snapshot with explicit edge detection.
//!
//! No engine input layer is assumed: the host feeds raw press/release events,
//! and "pressed this frame" is a previous/current snapshot comparison promoted
//! at each frame boundary.

pub mod actions;
pub mod bindings;

use std::collections::HashSet;

/// Physical keys the game cares about. Identity-neutral; bindings give them
/// per-player meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ShiftLeft,
    ShiftRight,
    MouseLeft,
}

#[derive(Clone, Default)]
pub struct InputState {
    current: HashSet<Key>,
    previous: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        self.current.insert(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.current.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.current.contains(&key)
    }

    /// Edge detection: held now, not held on the previous frame.
    pub fn just_pressed(&self, key: Key) -> bool {
        self.current.contains(&key) && !self.previous.contains(&key)
    }

    /// Promotes current → previous. Call once per frame, after all reads.
    pub fn end_frame(&mut self) {
        self.previous = self.current.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_just_pressed_is_one_frame_only() {
        let mut input = InputState::new();
        input.key_down(Key::W);
        assert!(input.just_pressed(Key::W));
        assert!(input.is_held(Key::W));

        input.end_frame();
        assert!(!input.just_pressed(Key::W));
        assert!(input.is_held(Key::W));
    }

    #[test]
    fn test_release_and_repress_retriggers_edge() {
        let mut input = InputState::new();
        input.key_down(Key::ArrowUp);
        input.end_frame();
        input.key_up(Key::ArrowUp);
        input.end_frame();
        input.key_down(Key::ArrowUp);
        assert!(input.just_pressed(Key::ArrowUp));
    }
}
