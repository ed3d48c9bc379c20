//! Game state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entity::{Actor, EntityId, Kind};
use super::rect::Rect;
use super::registry::Registry;
use super::spawner::Archetype;
use crate::pattern::{Pattern, PatternState};
use crate::render::Resources;
use crate::tuning::Tuning;

/// Outbound notifications, drained by the scene once per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// The player touched a changer
    PatternPicked { pattern: Pattern },
    /// An enemy was shot down
    EnemyKilled { archetype: Archetype, pos: Vec2 },
}

/// Bullet collision box, relative to the bullet position
pub const BULLET_BOUNDS: Rect = Rect::new(-1.0, -4.0, 2.0, 8.0);

/// Complete simulation state (deterministic for a given seed and input)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Play-field rectangle; fences the player and frames projectiles
    pub field: Rect,
    pub registry: Registry,
    pub player: EntityId,
    pub pattern: PatternState,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub tuning: Tuning,
    pub resources: Resources,
    pub(crate) rng: Pcg32,
    pub(crate) spawn_meter: f32,
    pub(crate) changer_meter: f32,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh run with the player in the middle of `field`
    pub fn new(seed: u64, field: Rect, tuning: Tuning, resources: Resources) -> Self {
        let mut registry = Registry::new();
        let player = registry.add(
            Actor::new(Kind::Player, field.center())
                .with_collider(resources.sprite_bounds())
                .with_fences(vec![field]),
        );

        Self {
            seed,
            field,
            registry,
            player,
            pattern: PatternState::new(tuning.flash_ticks),
            score: 0,
            time_ticks: 0,
            tuning,
            resources,
            rng: Pcg32::seed_from_u64(seed),
            spawn_meter: 0.0,
            changer_meter: 0.0,
            events: Vec::new(),
        }
    }

    pub fn player_pos(&self) -> Vec2 {
        self.registry
            .get(self.player)
            .map(|p| p.pos)
            .unwrap_or_else(|| self.field.center())
    }

    /// Switch the gameplay pattern now (spawn table and fire shape)
    pub fn set_pattern(&mut self, pattern: Pattern, flash: bool) {
        self.pattern.set(pattern, flash);
    }

    /// Fire the current pattern's bullet fan from the player
    pub fn fire(&mut self) {
        let origin = self.player_pos();
        let speed = self.tuning.bullet_speed;
        for &(dx, dy) in self.pattern.current().fire_shape() {
            let movement = Vec2::new(dx, dy).normalize_or_zero() * speed;
            self.registry.add(
                Actor::new(Kind::Bullet, origin)
                    .with_movement(movement)
                    .with_collider(BULLET_BOUNDS)
                    .with_frame(self.field),
            );
        }
    }

    /// Events raised since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
