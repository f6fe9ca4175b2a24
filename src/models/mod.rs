pub mod effects;
pub mod player;
pub mod sequence;
pub mod unlocks;
