//! Collision responses
//!
//! Who reacts to whom is a fixed table keyed by the `(self, other)` tag pair.
//! Both sides of an overlapping pair are resolved. A response only reads the
//! other side's kind and position, which no response changes, so the order
//! within a pair does not matter.

use super::entity::{Actor, Kind, Tag};
use super::state::GameEvent;
use crate::tuning::Tuning;

/// Reaction of one actor to touching another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ignore,
    /// Player takes the changer's pattern
    Collect,
    /// Changer is used up by the player
    Consumed,
    /// Enemy is shot down and leaves an explosion behind
    Destroyed,
    /// Bullet is used up by the enemy it hit
    Spent,
}

/// Dispatch table for collision responses
pub fn response(this: Tag, other: Tag) -> Response {
    match (this, other) {
        (Tag::Player, Tag::Changer) => Response::Collect,
        (Tag::Changer, Tag::Player) => Response::Consumed,
        (Tag::Enemy, Tag::Bullet) => Response::Destroyed,
        (Tag::Bullet, Tag::Enemy) => Response::Spent,
        _ => Response::Ignore,
    }
}

/// Apply `this`'s reaction to touching `other`
pub fn resolve(this: &mut Actor, other: &Actor, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    match response(this.tag(), other.tag()) {
        Response::Ignore => {}
        Response::Collect => {
            if let Kind::Changer { pattern } = other.kind {
                events.push(GameEvent::PatternPicked { pattern });
            }
        }
        Response::Consumed | Response::Spent => this.stop(),
        Response::Destroyed => {
            if let Kind::Enemy { archetype, .. } = this.kind {
                events.push(GameEvent::EnemyKilled {
                    archetype,
                    pos: this.pos,
                });
            }
            let boom = Actor::explosion(this.pos, tuning.explosion_ticks);
            this.stop_with(boom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::sim::Archetype;
    use crate::sim::entity::TurnRule;
    use glam::Vec2;

    #[test]
    fn test_table_is_pairwise() {
        assert_eq!(response(Tag::Player, Tag::Changer), Response::Collect);
        assert_eq!(response(Tag::Changer, Tag::Player), Response::Consumed);
        assert_eq!(response(Tag::Enemy, Tag::Bullet), Response::Destroyed);
        assert_eq!(response(Tag::Bullet, Tag::Enemy), Response::Spent);
        assert_eq!(response(Tag::Bullet, Tag::Changer), Response::Ignore);
        assert_eq!(response(Tag::Player, Tag::Enemy), Response::Ignore);
    }

    #[test]
    fn test_enemy_destroyed_chains_explosion() {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        let mut enemy = Actor::new(
            Kind::Enemy {
                archetype: Archetype::Sweeper,
                turn: TurnRule::Straight,
            },
            Vec2::new(10.0, 20.0),
        );
        let bullet = Actor::new(Kind::Bullet, Vec2::new(10.0, 24.0));

        resolve(&mut enemy, &bullet, &tuning, &mut events);
        assert!(enemy.is_stopped());
        let chain = enemy.chain.as_ref().unwrap();
        assert_eq!(chain.kind, Kind::Explosion);
        assert_eq!(chain.pos, Vec2::new(10.0, 20.0));
        assert_eq!(
            events,
            vec![GameEvent::EnemyKilled {
                archetype: Archetype::Sweeper,
                pos: Vec2::new(10.0, 20.0)
            }]
        );
    }

    #[test]
    fn test_player_collects_changer() {
        let tuning = Tuning::default();
        let mut events = Vec::new();
        let pattern = Pattern::new(3).unwrap();
        let mut player = Actor::new(Kind::Player, Vec2::ZERO);
        let mut changer = Actor::new(Kind::Changer { pattern }, Vec2::ZERO);

        let before = changer.clone();
        resolve(&mut player, &before, &tuning, &mut events);
        resolve(&mut changer, &player, &tuning, &mut events);
        assert!(!player.is_stopped());
        assert!(changer.is_stopped());
        assert_eq!(events, vec![GameEvent::PatternPicked { pattern }]);
    }
}
