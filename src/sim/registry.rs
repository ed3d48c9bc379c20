//! Owner of every live actor
//!
//! One frame is three passes in a fixed order:
//! 1. update every member in insertion order
//! 2. resolve collisions between overlapping colliders
//! 3. purge stopped members, leaving their chained follow-ups behind
//!
//! Actors added during a frame (spawns, bullets, chained effects) are admitted
//! at the start of the next frame, never part-way through a pass.

use rand_pcg::Pcg32;

use super::collision::resolve;
use super::entity::{Actor, EntityId, UpdateCtx};
use super::rect::Rect;
use super::state::GameEvent;
use crate::render::Resources;
use crate::tuning::Tuning;

#[derive(Debug, Clone)]
pub struct Registry {
    members: Vec<Actor>,
    incoming: Vec<Actor>,
    next_id: u32,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            incoming: Vec::new(),
            next_id: 1,
        }
    }

    /// Register an actor; it takes part from the next frame on
    pub fn add(&mut self, mut actor: Actor) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        actor.id = id;
        self.incoming.push(actor);
        id
    }

    /// Look up a member, including ones waiting to be admitted
    pub fn get(&self, id: EntityId) -> Option<&Actor> {
        self.members
            .iter()
            .chain(self.incoming.iter())
            .find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.members
            .iter_mut()
            .chain(self.incoming.iter_mut())
            .find(|a| a.id == id)
    }

    /// Admitted members in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Actors waiting for the next frame
    pub fn incoming(&self) -> &[Actor] {
        &self.incoming
    }

    /// Update pass: admit last frame's arrivals, then update in order
    pub fn update(
        &mut self,
        rng: &mut Pcg32,
        field: Rect,
        tuning: &Tuning,
        resources: &Resources,
    ) {
        self.members.append(&mut self.incoming);

        let mut spawned = Vec::new();
        let mut ctx = UpdateCtx {
            rng,
            field,
            tuning,
            resources,
            spawned: &mut spawned,
        };
        for member in &mut self.members {
            member.update(&mut ctx);
        }
        for actor in spawned {
            self.add(actor);
        }
    }

    /// Collision pass over every pair of live colliders
    pub fn collide(&mut self, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        let n = self.members.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (left, right) = self.members.split_at_mut(j);
                let (a, b) = (&mut left[i], &mut right[0]);
                if a.is_stopped() || b.is_stopped() {
                    continue;
                }
                let (Some(ra), Some(rb)) = (a.bounds(), b.bounds()) else {
                    continue;
                };
                if !ra.overlaps(&rb) {
                    continue;
                }
                resolve(a, b, tuning, events);
                resolve(b, a, tuning, events);
            }
        }
    }

    /// Drop stopped members; chained follow-ups join next frame
    pub fn purge(&mut self) -> usize {
        let before = self.members.len();
        let mut chained = Vec::new();
        self.members.retain_mut(|member| {
            if !member.is_stopped() {
                return true;
            }
            if let Some(next) = member.chain.take() {
                chained.push(*next);
            }
            false
        });
        for actor in chained {
            self.add(actor);
        }
        before - self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Kind, Tag, TurnRule};
    use crate::sim::{Archetype, Spawner};
    use glam::Vec2;
    use rand::SeedableRng;

    struct World {
        registry: Registry,
        rng: Pcg32,
        tuning: Tuning,
        resources: Resources,
        events: Vec<GameEvent>,
    }

    impl World {
        fn new() -> Self {
            Self {
                registry: Registry::new(),
                rng: Pcg32::seed_from_u64(42),
                tuning: Tuning::default(),
                resources: Resources::default(),
                events: Vec::new(),
            }
        }

        fn frame(&mut self) {
            let field = Rect::new(0.0, 0.0, 320.0, 240.0);
            self.registry
                .update(&mut self.rng, field, &self.tuning, &self.resources);
            self.registry.collide(&self.tuning, &mut self.events);
            self.registry.purge();
        }
    }

    fn enemy(pos: Vec2) -> Actor {
        Actor::new(
            Kind::Enemy {
                archetype: Archetype::Diver,
                turn: TurnRule::Straight,
            },
            pos,
        )
        .with_collider(Rect::new(-8.0, -8.0, 16.0, 16.0))
    }

    fn bullet(pos: Vec2) -> Actor {
        Actor::new(Kind::Bullet, pos).with_collider(Rect::new(-1.0, -4.0, 2.0, 8.0))
    }

    #[test]
    fn test_new_members_join_next_frame() {
        let mut world = World::new();
        let id = world.registry.add(enemy(Vec2::new(50.0, 50.0)));
        assert!(world.registry.is_empty());
        assert!(world.registry.get(id).is_some());
        world.frame();
        assert_eq!(world.registry.len(), 1);
    }

    #[test]
    fn test_kill_leaves_explosion_next_frame() {
        let mut world = World::new();
        let target = world.registry.add(enemy(Vec2::new(50.0, 50.0)));
        world.registry.add(bullet(Vec2::new(50.0, 52.0)));

        // Frame n: hit, both stopped and purged, explosion queued
        world.frame();
        assert!(world.registry.iter().all(|a| a.id != target));
        assert!(world.registry.iter().all(|a| a.tag() != Tag::Bullet));
        assert_eq!(world.registry.incoming().len(), 1);
        assert_eq!(world.events.len(), 1);

        // Frame n+1: the explosion is a member
        world.frame();
        assert!(world.registry.iter().any(|a| a.tag() == Tag::Explosion));
    }

    #[test]
    fn test_bullet_only_hits_once() {
        let mut world = World::new();
        world.registry.add(enemy(Vec2::new(50.0, 50.0)));
        world.registry.add(enemy(Vec2::new(52.0, 50.0)));
        world.registry.add(bullet(Vec2::new(51.0, 50.0)));
        world.frame();
        assert_eq!(world.events.len(), 1);
        assert_eq!(
            world
                .registry
                .iter()
                .filter(|a| a.tag() == Tag::Enemy)
                .count(),
            1
        );
    }

    #[test]
    fn test_spawner_output_admitted_next_frame() {
        let mut world = World::new();
        world.registry.add(Actor::new(
            Kind::Spawner(Spawner::new(Archetype::Sweeper, 4, 9)),
            Vec2::ZERO,
        ));
        world.frame();
        assert_eq!(world.registry.len(), 1);
        assert_eq!(world.registry.incoming().len(), 1);
        world.frame();
        assert!(world.registry.iter().any(|a| a.tag() == Tag::Enemy));
    }

    #[test]
    fn test_spawner_budget_and_stop() {
        let mut world = World::new();
        let task = world.registry.add(Actor::new(
            Kind::Spawner(Spawner::new(Archetype::Diver, 4, 9)),
            Vec2::ZERO,
        ));
        let mut enemies = 0;
        for tick in 0..=36 {
            world.frame();
            enemies += world
                .registry
                .incoming()
                .iter()
                .filter(|a| a.tag() == Tag::Enemy)
                .count();
            let alive = world.registry.get(task).is_some();
            assert_eq!(alive, tick < 32, "tick {tick}");
        }
        assert_eq!(enemies, 9);
    }
}
