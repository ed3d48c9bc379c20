//! Simulated objects
//!
//! Every live object is an [`Actor`]: an entity with a collider, or a headless
//! task (spawners) that only takes part in the update pass. What an actor is
//! lives in the closed [`Kind`] enum; collision behaviour is looked up by
//! [`Tag`] pair in [`super::collision`].

use glam::Vec2;
use rand_pcg::Pcg32;

use super::rect::{Rect, fenced_move};
use super::spawner::{Archetype, Spawner, spawn_enemy};
use crate::pattern::Pattern;
use crate::render::{Appearance, Resources, Rgb, SpriteRef};
use crate::tuning::Tuning;

/// Registry-assigned identifier, unique for the lifetime of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Collision classification of a [`Kind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Player,
    Bullet,
    Changer,
    Enemy,
    Explosion,
    Spawner,
}

/// How an enemy changes course after launch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnRule {
    /// Keep going until it leaves the field
    Straight,
    /// Turn back when crossing an interior line; `vertical` lines reflect x
    Line { at: f32, vertical: bool },
    /// Reflect off the field edges
    Bounce,
}

impl TurnRule {
    /// Adjust `movement` after a step from `old` to `new`
    fn apply(&self, old: Vec2, new: Vec2, movement: &mut Vec2, field: &Rect) {
        match *self {
            TurnRule::Straight => {}
            TurnRule::Line { at, vertical: true } => {
                if (old.x - at) * (new.x - at) <= 0.0 && old.x != new.x {
                    movement.x = -movement.x;
                }
            }
            TurnRule::Line {
                at,
                vertical: false,
            } => {
                if (old.y - at) * (new.y - at) <= 0.0 && old.y != new.y {
                    movement.y = -movement.y;
                }
            }
            TurnRule::Bounce => {
                if (new.x <= field.x && movement.x < 0.0)
                    || (new.x >= field.right() && movement.x > 0.0)
                {
                    movement.x = -movement.x;
                }
                if (new.y <= field.y && movement.y < 0.0)
                    || (new.y >= field.bottom() && movement.y > 0.0)
                {
                    movement.y = -movement.y;
                }
            }
        }
    }
}

/// What an actor is, with its kind-specific payload
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Player,
    Bullet,
    /// Pickup carrying the pattern it switches to
    Changer { pattern: Pattern },
    Enemy { archetype: Archetype, turn: TurnRule },
    /// Transient effect left behind by a destroyed enemy
    Explosion,
    /// Headless task emitting enemies
    Spawner(Spawner),
}

impl Kind {
    pub fn tag(&self) -> Tag {
        match self {
            Kind::Player => Tag::Player,
            Kind::Bullet => Tag::Bullet,
            Kind::Changer { .. } => Tag::Changer,
            Kind::Enemy { .. } => Tag::Enemy,
            Kind::Explosion => Tag::Explosion,
            Kind::Spawner(_) => Tag::Spawner,
        }
    }
}

/// A simulated object owned by the registry
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: EntityId,
    pub kind: Kind,
    pub pos: Vec2,
    /// Displacement applied each tick
    pub movement: Vec2,
    /// Collision box relative to `pos`; `None` for tasks and effects
    pub collider: Option<Rect>,
    /// Stop once the collider no longer overlaps this rectangle
    pub frame: Option<Rect>,
    /// Rectangles the collider must stay inside while moving
    pub fences: Vec<Rect>,
    /// Ticks left before stopping on its own
    pub lifetime: Option<u32>,
    /// Follow-up created when this actor is purged
    pub chain: Option<Box<Actor>>,
    stopped: bool,
}

impl Actor {
    /// Unregistered actor at `pos`; the registry assigns the id
    pub fn new(kind: Kind, pos: Vec2) -> Self {
        Self {
            id: EntityId(0),
            kind,
            pos,
            movement: Vec2::ZERO,
            collider: None,
            frame: None,
            fences: Vec::new(),
            lifetime: None,
            chain: None,
            stopped: false,
        }
    }

    pub fn with_movement(mut self, movement: Vec2) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_collider(mut self, collider: Rect) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn with_fences(mut self, fences: Vec<Rect>) -> Self {
        self.fences = fences;
        self
    }

    pub fn with_lifetime(mut self, ticks: u32) -> Self {
        self.lifetime = Some(ticks);
        self
    }

    /// Short-lived effect with no collider
    pub fn explosion(pos: Vec2, ticks: u32) -> Self {
        Self::new(Kind::Explosion, pos).with_lifetime(ticks)
    }

    pub fn tag(&self) -> Tag {
        self.kind.tag()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Flag for removal at the end of this tick
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Flag for removal and leave `next` behind in its place
    pub fn stop_with(&mut self, next: Actor) {
        self.chain = Some(Box::new(next));
        self.stopped = true;
    }

    /// Collider in world coordinates
    pub fn bounds(&self) -> Option<Rect> {
        self.collider.map(|c| c.translate(self.pos))
    }

    /// Move by `v` as far as the fences allow
    pub fn move_if_possible(&mut self, v: Vec2) {
        let v = match self.bounds() {
            Some(range) => fenced_move(&range, v, &self.fences),
            None => v,
        };
        self.pos += v;
    }

    pub fn update(&mut self, ctx: &mut UpdateCtx<'_>) {
        if self.stopped {
            return;
        }

        if self.kind == Kind::Player {
            let v = self.movement;
            self.move_if_possible(v);
        }

        match &mut self.kind {
            Kind::Player | Kind::Explosion => {}
            Kind::Bullet | Kind::Changer { .. } => {
                self.pos += self.movement;
            }
            Kind::Enemy { turn, .. } => {
                let old = self.pos;
                self.pos += self.movement;
                turn.apply(old, self.pos, &mut self.movement, &ctx.field);
            }
            Kind::Spawner(spawner) => {
                if spawner.step() {
                    let enemy = spawn_enemy(spawner.archetype, ctx);
                    ctx.spawn(enemy);
                }
                if spawner.exhausted() {
                    self.stopped = true;
                }
            }
        }

        if let Some(ticks) = self.lifetime.as_mut() {
            *ticks = ticks.saturating_sub(1);
            if *ticks == 0 {
                self.stopped = true;
            }
        }

        if let (Some(frame), Some(bounds)) = (self.frame, self.bounds()) {
            if !frame.overlaps(&bounds) {
                self.stopped = true;
            }
        }
    }

    /// How the renderer should draw this actor
    pub fn appearance(&self) -> Appearance {
        match &self.kind {
            Kind::Player => Appearance::Sprite(SpriteRef::new(0, 0)),
            Kind::Bullet => match self.collider {
                Some(rect) => Appearance::Fill(rect, Rgb::WHITE),
                None => Appearance::Hidden,
            },
            Kind::Changer { pattern } => Appearance::Sprite(SpriteRef::new(pattern.id(), 1)),
            Kind::Enemy { archetype, .. } => {
                Appearance::Sprite(SpriteRef::new(archetype.sprite_row(), 2))
            }
            Kind::Explosion => Appearance::Sprite(SpriteRef::new(0, 3)),
            Kind::Spawner(_) => Appearance::Hidden,
        }
    }
}

/// Everything an actor may touch while updating
pub struct UpdateCtx<'a> {
    pub rng: &'a mut Pcg32,
    pub field: Rect,
    pub tuning: &'a Tuning,
    pub resources: &'a Resources,
    pub(crate) spawned: &'a mut Vec<Actor>,
}

impl UpdateCtx<'_> {
    /// Queue a new actor; it joins the registry on the next tick
    pub fn spawn(&mut self, actor: Actor) {
        self.spawned.push(actor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn field() -> Rect {
        Rect::new(0.0, 0.0, 320.0, 240.0)
    }

    fn run(actor: &mut Actor, ticks: usize) -> Vec<Actor> {
        let mut rng = Pcg32::seed_from_u64(1);
        let tuning = Tuning::default();
        let resources = Resources::default();
        let mut spawned = Vec::new();
        let mut ctx = UpdateCtx {
            rng: &mut rng,
            field: field(),
            tuning: &tuning,
            resources: &resources,
            spawned: &mut spawned,
        };
        for _ in 0..ticks {
            actor.update(&mut ctx);
        }
        spawned
    }

    #[test]
    fn test_player_is_fenced_per_axis() {
        let mut player = Actor::new(Kind::Player, Vec2::new(300.0, 120.0))
            .with_collider(Rect::new(-8.0, -8.0, 16.0, 16.0))
            .with_fences(vec![field()])
            .with_movement(Vec2::new(4.0, 4.0));
        run(&mut player, 10);
        assert_eq!(player.pos, Vec2::new(312.0, 160.0));
    }

    #[test]
    fn test_projectile_stops_outside_frame() {
        let mut bullet = Actor::new(Kind::Bullet, Vec2::new(100.0, 10.0))
            .with_collider(Rect::new(-1.0, -4.0, 2.0, 8.0))
            .with_frame(field())
            .with_movement(Vec2::new(0.0, -8.0));
        run(&mut bullet, 1);
        assert!(!bullet.is_stopped());
        run(&mut bullet, 1);
        assert!(bullet.is_stopped());
    }

    #[test]
    fn test_lifetime_expires() {
        let mut boom = Actor::explosion(Vec2::ZERO, 3);
        run(&mut boom, 2);
        assert!(!boom.is_stopped());
        run(&mut boom, 1);
        assert!(boom.is_stopped());
    }

    #[test]
    fn test_line_turn_reflects() {
        let mut enemy = Actor::new(
            Kind::Enemy {
                archetype: Archetype::Hooker,
                turn: TurnRule::Line {
                    at: 10.0,
                    vertical: false,
                },
            },
            Vec2::new(50.0, 0.0),
        )
        .with_movement(Vec2::new(0.0, 4.0));
        run(&mut enemy, 3);
        assert!(enemy.movement.y < 0.0);
    }

    #[test]
    fn test_bounce_stays_in_field() {
        let mut enemy = Actor::new(
            Kind::Enemy {
                archetype: Archetype::Bouncer,
                turn: TurnRule::Bounce,
            },
            Vec2::new(5.0, 5.0),
        )
        .with_movement(Vec2::new(-3.0, -3.0));
        run(&mut enemy, 200);
        let slack = field().inflate(3.0, 3.0);
        assert!(slack.contains(enemy.pos));
    }

    #[test]
    fn test_spawner_task_emits_and_stops() {
        let mut task = Actor::new(Kind::Spawner(Spawner::new(Archetype::Diver, 2, 3)), Vec2::ZERO);
        let spawned = run(&mut task, 5);
        assert_eq!(spawned.len(), 3);
        assert!(task.is_stopped());
    }
}
