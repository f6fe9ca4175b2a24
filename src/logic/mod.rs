pub mod bubbles;
pub mod collectibles;
pub mod level;
pub mod player;
pub mod resolver;
pub mod routines;
pub mod triggers;
