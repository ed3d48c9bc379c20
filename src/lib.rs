//! Beatshot - a top-down shooter played to a looping soundtrack
//!
//! Core modules:
//! - `clock`: Virtual playback clock
//! - `audio`: Base/tone scheduling on beat boundaries
//! - `pattern`: Pattern tiers (spawn table, fire shape, tint)
//! - `sim`: Deterministic simulation (actors, collisions, spawning)
//! - `game`: Scene tying audio and simulation together
//! - `render`: Draw-command surface
//! - `platform`: Browser and headless collaborators
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod clock;
pub mod game;
pub mod pattern;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use audio::{AudioTable, PhaseScheduler, Track};
pub use game::{Game, GameConfig};
pub use pattern::Pattern;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Play-field size used when the host does not provide one
    pub const FIELD_WIDTH: f32 = 320.0;
    pub const FIELD_HEIGHT: f32 = 240.0;
    /// Nominal frame interval of the host loop, in milliseconds
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
}
