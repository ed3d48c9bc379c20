//! The game scene
//!
//! Owns the simulation and the audio scheduler and runs one frame in a fixed
//! order: clock poll and audio boundaries, audio notifications, simulation
//! tick, simulation notifications. Nothing that happens in the simulation
//! reaches playback in the same frame; it is queued for the next boundary.

use glam::Vec2;

use crate::audio::{AudioEvent, AudioTable, KeyRequest, PhaseScheduler, PollReport};
use crate::consts;
use crate::pattern::Pattern;
use crate::render::{Appearance, Resources, Rgb, Surface};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, Rect, TickInput, tick};
use crate::tuning::Tuning;

/// Everything the scene needs at startup
pub struct GameConfig {
    pub seed: u64,
    /// Play-field in scene coordinates
    pub field: Rect,
    pub tuning: Tuning,
    pub settings: Settings,
    pub resources: Resources,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            field: Rect::new(0.0, 0.0, consts::FIELD_WIDTH, consts::FIELD_HEIGHT),
            tuning: Tuning::default(),
            settings: Settings::default(),
            resources: Resources::default(),
        }
    }
}

pub struct Game {
    state: GameState,
    audio: PhaseScheduler,
    settings: Settings,
    firing: bool,
    direction: Vec2,
    suspended: bool,
    last_report: PollReport,
}

impl Game {
    pub fn new(config: GameConfig, audio: AudioTable) -> Self {
        let GameConfig {
            seed,
            field,
            tuning,
            settings,
            resources,
        } = config;

        // Separate stream so audio draws never shift the simulation
        let mut audio = PhaseScheduler::new(audio, &tuning, seed ^ 0x9e37_79b9_7f4a_7c15);
        audio.set_volumes(settings.music_gain(), settings.sfx_gain());

        log::info!("New game (seed {seed})");
        Self {
            state: GameState::new(seed, field, tuning, resources),
            audio,
            settings,
            firing: false,
            direction: Vec2::ZERO,
            suspended: false,
            last_report: PollReport::default(),
        }
    }

    /// Run one frame at wall-clock time `now_ms`
    pub fn update(&mut self, now_ms: f64) {
        if self.suspended {
            return;
        }

        self.audio.set_leap(self.leap());
        self.last_report = self.audio.update(now_ms);
        let mut fire = false;
        for event in self.audio.drain_events() {
            match event {
                AudioEvent::Beat { .. } => fire |= self.firing,
                AudioEvent::BaseChanged { pattern } => {
                    log::info!("Now playing pattern {}", pattern.id());
                }
                AudioEvent::KeyChanged { .. } => {}
            }
        }

        let input = TickInput {
            direction: self.direction,
            fire,
        };
        tick(&mut self.state, &input);

        if fire {
            self.audio.request_key(KeyRequest::Adaptive);
        }
        for event in self.state.drain_events() {
            match event {
                GameEvent::PatternPicked { pattern } => self.set_pattern(pattern),
                GameEvent::EnemyKilled { archetype, .. } => {
                    log::debug!("{archetype:?} down, score {}", self.state.score);
                    self.audio.request_key(KeyRequest::Adaptive);
                }
            }
        }
    }

    /// Gameplay switches now; the music follows on the next base boundary
    pub fn set_pattern(&mut self, pattern: Pattern) {
        log::info!("Pattern {} picked up", pattern.id());
        self.audio.set_next_pattern(pattern);
        self.state
            .set_pattern(pattern, self.settings.effective_flash());
    }

    /// Key choice leans toward random leaps the further right the player is
    fn leap(&self) -> f32 {
        let field = self.state.field;
        if field.width > 0.0 {
            ((self.state.player_pos().x - field.x) / field.width).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    // === Input router ===

    pub fn on_button_pressed(&mut self) {
        self.firing = true;
    }

    pub fn on_button_released(&mut self) {
        self.firing = false;
    }

    pub fn on_direction_changed(&mut self, direction: Vec2) {
        self.direction = direction;
    }

    // === Focus ===

    /// Freeze the simulation and pause playback
    pub fn suspend(&mut self) {
        self.suspended = true;
        self.audio.suspend();
    }

    /// Resume with a fresh clock anchor
    pub fn resume(&mut self) {
        self.suspended = false;
        self.audio.resume();
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        self.audio
            .set_volumes(settings.music_gain(), settings.sfx_gain());
        self.settings = settings;
    }

    // === Queries ===

    pub fn score(&self) -> u64 {
        self.state.score
    }

    /// Pattern driving gameplay
    pub fn pattern(&self) -> Pattern {
        self.state.pattern.current()
    }

    /// Pattern whose music is playing
    pub fn audible_pattern(&self) -> Pattern {
        self.audio.audible_pattern()
    }

    pub fn background(&self) -> Rgb {
        self.state.pattern.background()
    }

    pub fn last_report(&self) -> PollReport {
        self.last_report
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn audio(&self) -> &PhaseScheduler {
        &self.audio
    }

    /// Draw the field, every admitted actor and the score
    pub fn render(&self, surface: &mut dyn Surface, origin: Vec2) {
        let field = self.state.field;
        surface.fill_rect(field.translate(origin), self.background());

        for actor in self.state.registry.iter() {
            let at = origin + actor.pos;
            match actor.appearance() {
                Appearance::Sprite(sprite) => surface.draw_sprite(sprite, at),
                Appearance::Fill(rect, color) => surface.fill_rect(rect.translate(at), color),
                Appearance::Hidden => {}
            }
        }

        let text_at = origin + Vec2::new(field.x, field.y) + self.state.resources.text_inset;
        surface.draw_text(&format!("SCORE: {}", self.state.score), text_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::{
        DrawCall, RecordingSurface, TrackLog, recording_table,
    };
    use crate::sim::{Actor, Archetype, EntityId, Kind, Tag, TurnRule};
    use std::collections::HashSet;

    /// Time unit = one tick: 48-tick base loop, 6-tick tone boundary
    fn tick_config() -> GameConfig {
        GameConfig {
            seed: 3,
            tuning: Tuning {
                beat_ms: 6.0,
                base_beats: 8,
                key_span_beats: 1,
                lead_in_secs: 0.0,
                changer_rate: 0.0,
                spawn_rate: 0.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn run(game: &mut Game, from: u32, to: u32) {
        for t in from..to {
            game.update(f64::from(t));
        }
    }

    fn tone_key_plays(log: &TrackLog) -> usize {
        (1..=Pattern::MAX)
            .filter_map(Pattern::new)
            .map(|p| log.plays(&AudioTable::tone_name(p)))
            .sum()
    }

    #[test]
    fn test_music_follows_on_next_measure() {
        let log = TrackLog::default();
        let mut game = Game::new(tick_config(), recording_table(&log));
        let p2 = Pattern::new(2).unwrap();

        run(&mut game, 0, 10);
        game.set_pattern(p2);
        // Gameplay switches at once
        assert_eq!(game.pattern(), p2);
        assert_ne!(game.background(), Rgb::new(0, 0, 0));

        run(&mut game, 10, 48);
        assert_eq!(game.audible_pattern(), Pattern::NEUTRAL);
        assert_eq!(log.plays("base2"), 0);

        run(&mut game, 48, 49);
        assert_eq!(game.audible_pattern(), p2);
        assert_eq!(log.plays("base2"), 1);
    }

    #[test]
    fn test_kill_scores_now_and_plays_key_on_next_beat() {
        let log = TrackLog::default();
        let mut game = Game::new(tick_config(), recording_table(&log));
        // Queued before the first poll, so the tone bank is live from tick 0
        game.set_pattern(Pattern::new(1).unwrap());

        let state = game.state_mut();
        let target = Vec2::new(160.0, 40.0);
        state.registry.add(
            Actor::new(
                Kind::Enemy {
                    archetype: Archetype::Diver,
                    turn: TurnRule::Straight,
                },
                target,
            )
            .with_collider(Rect::new(-8.0, -8.0, 16.0, 16.0)),
        );
        run(&mut game, 0, 5);
        assert_eq!(game.score(), 0);

        // Bullet right under the enemy; admitted and hit on tick 5
        game.state_mut().registry.add(
            Actor::new(Kind::Bullet, target + Vec2::new(0.0, 14.0))
                .with_movement(Vec2::new(0.0, -8.0))
                .with_collider(Rect::new(-1.0, -4.0, 2.0, 8.0)),
        );
        run(&mut game, 5, 6);
        assert_eq!(game.score(), 1);
        assert_eq!(tone_key_plays(&log), 0);
        assert!(game.audio().has_key_request());

        run(&mut game, 6, 7);
        assert_eq!(log.plays("tone1"), 1);
        assert!(game.last_report().key.is_some());
    }

    /// Ticks in `from..to` on which bullets not seen before join the field
    fn new_bullet_ticks(
        game: &mut Game,
        from: u32,
        to: u32,
        seen: &mut HashSet<EntityId>,
    ) -> Vec<u32> {
        let mut ticks = Vec::new();
        for t in from..to {
            game.update(f64::from(t));
            let mut fresh = false;
            for bullet in game.state().registry.iter().filter(|a| a.tag() == Tag::Bullet) {
                fresh |= seen.insert(bullet.id);
            }
            if fresh {
                ticks.push(t);
            }
        }
        ticks
    }

    #[test]
    fn test_fire_is_locked_to_beats() {
        let log = TrackLog::default();
        let mut game = Game::new(tick_config(), recording_table(&log));
        let mut seen = HashSet::new();

        game.on_button_pressed();
        assert_eq!(new_bullet_ticks(&mut game, 0, 13, &mut seen), vec![0, 6, 12]);

        game.on_button_released();
        assert!(new_bullet_ticks(&mut game, 13, 30, &mut seen).is_empty());
    }

    #[test]
    fn test_pickup_changes_pattern() {
        let log = TrackLog::default();
        let mut game = Game::new(tick_config(), recording_table(&log));
        let player_pos = game.state().player_pos();
        let p3 = Pattern::new(3).unwrap();
        let bounds = game.state().resources.sprite_bounds();
        game.state_mut()
            .registry
            .add(Actor::new(Kind::Changer { pattern: p3 }, player_pos).with_collider(bounds));

        run(&mut game, 0, 2);
        assert_eq!(game.pattern(), p3);
        assert!(
            game.state()
                .registry
                .iter()
                .all(|a| a.tag() != Tag::Changer)
        );
        assert_eq!(game.audio().pending().map(|s| s.pattern), Some(p3));
    }

    #[test]
    fn test_suspend_freezes_everything() {
        let log = TrackLog::default();
        let mut game = Game::new(tick_config(), recording_table(&log));
        game.on_direction_changed(Vec2::new(1.0, 0.0));
        run(&mut game, 0, 5);
        let ticks = game.state().time_ticks;
        let pos = game.state().player_pos();

        game.suspend();
        game.suspend();
        assert!(game.is_suspended());
        run(&mut game, 5, 500);
        assert_eq!(game.state().time_ticks, ticks);
        assert_eq!(game.state().player_pos(), pos);

        game.resume();
        assert!(!game.is_suspended());
        game.update(10_000.0);
        assert!(game.last_report().base_boundary);
        assert_eq!(game.last_report().elapsed, 0.0);
    }

    #[test]
    fn test_render_draws_background_actors_and_score() {
        let log = TrackLog::default();
        let mut game = Game::new(tick_config(), recording_table(&log));
        game.update(0.0);

        let mut surface = RecordingSurface::default();
        let origin = Vec2::new(10.0, 20.0);
        game.render(&mut surface, origin);

        assert_eq!(
            surface.calls.first(),
            Some(&DrawCall::Fill(
                Rect::new(10.0, 20.0, 320.0, 240.0),
                Rgb::new(0, 0, 0)
            ))
        );
        assert!(surface.calls.iter().any(|c| matches!(
            c,
            DrawCall::Sprite(s, at) if s.row == 0 && s.variant == 0 && *at == Vec2::new(170.0, 140.0)
        )));
        assert_eq!(
            surface.calls.last(),
            Some(&DrawCall::Text("SCORE: 0".to_string(), Vec2::new(18.0, 28.0)))
        );
    }

    #[test]
    fn test_reduced_motion_skips_flash() {
        let log = TrackLog::default();
        let mut config = tick_config();
        config.settings.reduced_motion = true;
        let mut game = Game::new(config, recording_table(&log));
        game.set_pattern(Pattern::new(4).unwrap());
        assert_eq!(game.background(), Rgb::new(0, 0, 0));
    }
}
