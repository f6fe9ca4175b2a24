use super::Key;
use super::actions::PlayerAction;
use crate::models::player::PlayerId;
use std::collections::HashMap;

/// Key→action map for one player identity.
///
/// In music mode W/A/S/D (resp. the arrows) double as the four notes, so the
/// movement keys stay bound and the controller decides which meaning applies.
#[derive(Clone)]
pub struct KeyBindings {
    binds: HashMap<Key, PlayerAction>,
    note_keys: [Key; 4],
}

impl KeyBindings {
    pub fn for_player(id: PlayerId) -> Self {
        match id {
            PlayerId::One => Self::player_one(),
            PlayerId::Two => Self::player_two(),
        }
    }

    fn player_one() -> Self {
        let mut binds = HashMap::new();
        binds.insert(Key::A, PlayerAction::MoveLeft);
        binds.insert(Key::D, PlayerAction::MoveRight);
        binds.insert(Key::W, PlayerAction::Jump);
        binds.insert(Key::ShiftLeft, PlayerAction::ToggleMode);

        Self {
            binds,
            note_keys: [Key::W, Key::A, Key::S, Key::D],
        }
    }

    fn player_two() -> Self {
        let mut binds = HashMap::new();
        binds.insert(Key::ArrowLeft, PlayerAction::MoveLeft);
        binds.insert(Key::ArrowRight, PlayerAction::MoveRight);
        binds.insert(Key::ArrowUp, PlayerAction::Jump);
        binds.insert(Key::ShiftRight, PlayerAction::ToggleMode);

        Self {
            binds,
            note_keys: [Key::ArrowUp, Key::ArrowLeft, Key::ArrowDown, Key::ArrowRight],
        }
    }

    /// The key bound to note index 0..=3.
    pub fn note_key(&self, note: u8) -> Key {
        self.note_keys[note as usize & 3]
    }

    pub fn key_for(&self, action: PlayerAction) -> Option<Key> {
        self.binds
            .iter()
            .find(|(_, a)| **a == action)
            .map(|(k, _)| *k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_players_do_not_share_keys() {
        let p1 = KeyBindings::for_player(PlayerId::One);
        let p2 = KeyBindings::for_player(PlayerId::Two);

        assert_eq!(p1.key_for(PlayerAction::MoveLeft), Some(Key::A));
        assert_eq!(p2.key_for(PlayerAction::MoveLeft), Some(Key::ArrowLeft));
        assert_eq!(p1.key_for(PlayerAction::Jump), Some(Key::W));
        assert_eq!(p2.key_for(PlayerAction::Jump), Some(Key::ArrowUp));
        assert_eq!(p1.key_for(PlayerAction::ToggleMode), Some(Key::ShiftLeft));
        assert_eq!(p2.key_for(PlayerAction::ToggleMode), Some(Key::ShiftRight));
    }

    #[test]
    fn test_movement_keys_double_as_notes() {
        let p1 = KeyBindings::for_player(PlayerId::One);
        assert_eq!(p1.note_key(0), Key::W);
        assert_eq!(p1.note_key(1), Key::A);
        assert_eq!(p1.note_key(2), Key::S);
        assert_eq!(p1.note_key(3), Key::D);

        let p2 = KeyBindings::for_player(PlayerId::Two);
        assert_eq!(p2.note_key(0), Key::ArrowUp);
        assert_eq!(p2.note_key(2), Key::ArrowDown);
    }
}
