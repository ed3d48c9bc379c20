//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per frame, no wall-clock reads
//! - Seeded RNG only
//! - Stable iteration order (insertion order in the registry)
//! - No audio, rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod rect;
pub mod registry;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Response, resolve, response};
pub use entity::{Actor, EntityId, Kind, Tag, TurnRule, UpdateCtx};
pub use rect::{Rect, fenced_move};
pub use registry::Registry;
pub use spawner::{Archetype, Launch, Spawner, launch, perimeter_point, pick_archetype};
pub use state::{BULLET_BOUNDS, GameEvent, GameState};
pub use tick::{TickInput, tick};
