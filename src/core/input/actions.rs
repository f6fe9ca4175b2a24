//! Canonical action enums shared between input layers.

/// Per-player gameplay actions resolved from raw keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    MoveLeft,
    MoveRight,
    Jump,
    ToggleMode,
}
