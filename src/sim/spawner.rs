//! Procedural enemy and pickup generation
//!
//! Spawning has two layers of randomness:
//! - the scene decides when a new spawner appears and which archetype it uses
//! - each spawner rolls its own budget and period, then emits one enemy every
//!   `period` ticks until the budget is spent

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Actor, Kind, TurnRule, UpdateCtx};
use super::rect::Rect;
use crate::pattern::Pattern;
use crate::tuning::{Span, Tuning};

/// Enemy families, each with its own entry and turn rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Enters from the top or bottom edge and crosses straight over
    Diver,
    /// Enters from a side edge and crosses horizontally
    Sweeper,
    /// Dives toward a random interior line, then turns back
    Hooker,
    /// Enters anywhere on the perimeter and ricochets off the edges
    Bouncer,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Diver,
        Archetype::Sweeper,
        Archetype::Hooker,
        Archetype::Bouncer,
    ];

    /// Sprite sheet row
    pub fn sprite_row(self) -> u8 {
        match self {
            Archetype::Diver => 1,
            Archetype::Sweeper => 2,
            Archetype::Hooker => 3,
            Archetype::Bouncer => 4,
        }
    }

    /// Score for shooting one down
    pub fn points(self) -> u64 {
        match self {
            Archetype::Diver => 1,
            Archetype::Sweeper => 2,
            Archetype::Hooker => 3,
            Archetype::Bouncer => 5,
        }
    }
}

/// Headless task emitting `budget` enemies, one every `period` ticks
#[derive(Debug, Clone, PartialEq)]
pub struct Spawner {
    pub archetype: Archetype,
    pub period: u32,
    pub budget: u32,
    counter: u32,
    emitted: u32,
}

impl Spawner {
    pub fn new(archetype: Archetype, period: u32, budget: u32) -> Self {
        Self {
            archetype,
            period: period.max(1),
            budget,
            counter: 0,
            emitted: 0,
        }
    }

    /// Spawner with budget and period rolled from the tuning ranges
    pub fn roll(archetype: Archetype, tuning: &Tuning, rng: &mut Pcg32) -> Self {
        let period = roll_span(tuning.spawner_period, rng);
        let budget = roll_span(tuning.spawner_budget, rng);
        Self::new(archetype, period, budget)
    }

    /// Advance one tick; true when an enemy should be emitted now
    pub fn step(&mut self) -> bool {
        let emit = self.counter % self.period == 0 && self.emitted < self.budget;
        if emit {
            self.emitted += 1;
        }
        self.counter += 1;
        emit
    }

    pub fn exhausted(&self) -> bool {
        self.emitted >= self.budget
    }

    pub fn emitted(&self) -> u32 {
        self.emitted
    }
}

fn roll_span(span: Span, rng: &mut Pcg32) -> u32 {
    let lo = span.min.min(span.max);
    let hi = span.min.max(span.max);
    rng.random_range(lo..=hi)
}

fn random_sign(rng: &mut Pcg32) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

/// Initial state of a freshly spawned enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub pos: Vec2,
    pub movement: Vec2,
    pub turn: TurnRule,
    /// Set for enemies that never leave the field on their own
    pub lifetime: Option<u32>,
}

/// Point on the perimeter, each edge weighted by its length
pub fn perimeter_point(field: &Rect, rng: &mut Pcg32) -> Vec2 {
    let (w, h) = (field.width, field.height);
    let mut t = rng.random::<f32>() * 2.0 * (w + h);
    if t < w {
        return Vec2::new(field.x + t, field.y);
    }
    t -= w;
    if t < h {
        return Vec2::new(field.right(), field.y + t);
    }
    t -= h;
    if t < w {
        return Vec2::new(field.right() - t, field.bottom());
    }
    t -= w;
    Vec2::new(field.x, field.bottom() - t.min(h))
}

/// Roll entry position, velocity and turn rule for an archetype
pub fn launch(archetype: Archetype, field: &Rect, tuning: &Tuning, rng: &mut Pcg32) -> Launch {
    let speed = tuning.enemy_speed;
    match archetype {
        Archetype::Diver => {
            let down = rng.random_bool(0.5);
            let x = field.x + rng.random::<f32>() * field.width;
            let (y, dy) = if down {
                (field.y, speed)
            } else {
                (field.bottom(), -speed)
            };
            Launch {
                pos: Vec2::new(x, y),
                movement: Vec2::new(0.0, dy),
                turn: TurnRule::Straight,
                lifetime: None,
            }
        }
        Archetype::Sweeper => {
            let right = rng.random_bool(0.5);
            // Upper two thirds, away from the player's start
            let y = field.y + rng.random::<f32>() * field.height * 2.0 / 3.0;
            let (x, dx) = if right {
                (field.x, speed)
            } else {
                (field.right(), -speed)
            };
            Launch {
                pos: Vec2::new(x, y),
                movement: Vec2::new(dx, 0.0),
                turn: TurnRule::Straight,
                lifetime: None,
            }
        }
        Archetype::Hooker => {
            let x = field.x + rng.random::<f32>() * field.width;
            let line = field.y + field.height * (0.3 + rng.random::<f32>() * 0.4);
            // Drift toward the middle so the hook stays on screen
            let drift = if x < field.center().x {
                speed / 2.0
            } else {
                -speed / 2.0
            };
            Launch {
                pos: Vec2::new(x, field.y),
                movement: Vec2::new(drift, speed),
                turn: TurnRule::Line {
                    at: line,
                    vertical: false,
                },
                lifetime: None,
            }
        }
        Archetype::Bouncer => {
            let axis = speed * std::f32::consts::FRAC_1_SQRT_2;
            Launch {
                pos: perimeter_point(field, rng),
                movement: Vec2::new(random_sign(rng) * axis, random_sign(rng) * axis),
                turn: TurnRule::Bounce,
                lifetime: Some(tuning.bouncer_lifetime),
            }
        }
    }
}

/// Build an enemy of `archetype` at a rolled entry point
pub fn spawn_enemy(archetype: Archetype, ctx: &mut UpdateCtx<'_>) -> Actor {
    let launch = launch(archetype, &ctx.field, ctx.tuning, ctx.rng);
    let enemy = Actor::new(
        Kind::Enemy {
            archetype,
            turn: launch.turn,
        },
        launch.pos,
    )
    .with_movement(launch.movement)
    .with_collider(ctx.resources.sprite_bounds());

    match launch.lifetime {
        Some(ticks) => enemy.with_lifetime(ticks),
        None => enemy.with_frame(ctx.field),
    }
}

/// Weighted pick from a pattern's spawn table
pub fn pick_archetype(table: &[(Archetype, u32)], rng: &mut Pcg32) -> Option<Archetype> {
    let total: u32 = table.iter().map(|(_, weight)| weight).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for &(archetype, weight) in table {
        if roll < weight {
            return Some(archetype);
        }
        roll -= weight;
    }
    None
}

/// Pickup drifting in from a random edge, carrying a random active pattern
pub fn spawn_changer(field: &Rect, collider: Rect, rng: &mut Pcg32) -> Actor {
    let (pos, dir) = match rng.random_range(0..4) {
        0 => (
            Vec2::new(field.x + rng.random::<f32>() * field.width, field.y),
            Vec2::Y,
        ),
        1 => (
            Vec2::new(field.x, field.y + rng.random::<f32>() * field.height),
            Vec2::X,
        ),
        2 => (
            Vec2::new(field.x + rng.random::<f32>() * field.width, field.bottom()),
            Vec2::NEG_Y,
        ),
        _ => (
            Vec2::new(field.right(), field.y + rng.random::<f32>() * field.height),
            Vec2::NEG_X,
        ),
    };
    let speed = 1.0 + rng.random_range(0..2) as f32;
    let pattern = Pattern::new(rng.random_range(1..=Pattern::MAX)).unwrap_or_default();

    Actor::new(Kind::Changer { pattern }, pos)
        .with_movement(dir * speed)
        .with_collider(collider)
        .with_frame(*field)
}
