//! Fixed-step simulation tick
//!
//! One tick is one frame: player intent, scene-level spawning rolls, then the
//! registry's update, collision and purge passes in that order.

use glam::Vec2;
use rand::Rng;

use super::entity::{Actor, Kind};
use super::spawner::{Spawner, pick_archetype, spawn_changer};
use super::state::{GameEvent, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Stick direction, each axis in [-1, 1]
    pub direction: Vec2,
    /// Fire the pattern's bullet fan this tick (set on beats while held)
    pub fire: bool,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;
    state.pattern.tick();

    let speed = state.tuning.player_speed;
    if let Some(player) = state.registry.get_mut(state.player) {
        player.movement = input.direction.clamp_length_max(1.0) * speed;
    }
    if input.fire {
        state.fire();
    }

    roll_changer(state);
    roll_spawner(state);

    state
        .registry
        .update(&mut state.rng, state.field, &state.tuning, &state.resources);

    let first = state.events.len();
    state.registry.collide(&state.tuning, &mut state.events);
    for event in &state.events[first..] {
        if let GameEvent::EnemyKilled { archetype, .. } = event {
            state.score += archetype.points();
        }
    }

    state.registry.purge();
}

/// Changers drift in at random regardless of pattern
fn roll_changer(state: &mut GameState) {
    state.changer_meter += state.rng.random::<f32>() * state.tuning.changer_rate;
    if state.changer_meter >= 1.0 {
        state.changer_meter -= 1.0;
        let changer = spawn_changer(
            &state.field,
            state.resources.sprite_bounds(),
            &mut state.rng,
        );
        state.registry.add(changer);
    }
}

/// New spawners only appear while an active pattern is in play
fn roll_spawner(state: &mut GameState) {
    let table = state.pattern.current().spawn_table();
    if table.is_empty() {
        state.spawn_meter = 0.0;
        return;
    }
    state.spawn_meter += state.rng.random::<f32>() * state.tuning.spawn_rate;
    if state.spawn_meter < 1.0 {
        return;
    }
    state.spawn_meter -= 1.0;
    if let Some(archetype) = pick_archetype(table, &mut state.rng) {
        let spawner = Spawner::roll(archetype, &state.tuning, &mut state.rng);
        log::debug!(
            "Spawner {:?}: {} enemies every {} ticks",
            archetype,
            spawner.budget,
            spawner.period
        );
        state
            .registry
            .add(Actor::new(Kind::Spawner(spawner), state.field.center()));
    }
}
