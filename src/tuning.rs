//! Data-driven game balance
//!
//! Every timing and balance constant the simulation and the audio scheduler
//! read lives here, so a level designer can swap them from JSON without
//! touching code.

use serde::{Deserialize, Serialize};

/// Inclusive integer range rolled per spawner instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub min: u32,
    pub max: u32,
}

impl Span {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Balance and timing constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Music timing ===
    /// Length of one beat (one tone boundary) in milliseconds
    pub beat_ms: f64,
    /// Base loop length in beats
    pub base_beats: u32,
    /// Length of one key slot inside the tone bank, in beats
    pub key_span_beats: u32,
    /// Number of addressable keys in a tone bank
    pub key_count: u32,
    /// Encoder padding skipped when a track (re)starts, in seconds
    pub lead_in_secs: f64,

    // === Pattern feedback ===
    /// Ticks the background tint takes to fade back to neutral
    pub flash_ticks: u32,

    // === Player ===
    /// Pixels per tick at full stick deflection
    pub player_speed: f32,
    /// Bullet speed in pixels per tick
    pub bullet_speed: f32,

    // === Spawning ===
    /// Largest meter gain per tick for changer pickups (meter fires at 1.0)
    pub changer_rate: f32,
    /// Largest meter gain per tick for new enemy spawners
    pub spawn_rate: f32,
    /// Enemies emitted by one spawner
    pub spawner_budget: Span,
    /// Ticks between emissions of one spawner
    pub spawner_period: Span,
    /// Enemy speed in pixels per tick
    pub enemy_speed: f32,
    /// Ticks a bouncer lives before it leaves on its own
    pub bouncer_lifetime: u32,
    /// Ticks an explosion stays on screen
    pub explosion_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            beat_ms: 500.0 / 3.0,
            base_beats: 32,
            key_span_beats: 4,
            key_count: 10,
            lead_in_secs: 0.025,

            flash_ticks: 30,

            player_speed: 4.0,
            bullet_speed: 8.0,

            changer_rate: 0.004,
            spawn_rate: 0.03,
            spawner_budget: Span::new(3, 8),
            spawner_period: Span::new(4, 12),
            enemy_speed: 2.0,
            bouncer_lifetime: 600,
            explosion_ticks: 12,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Base loop duration in milliseconds
    pub fn base_duration(&self) -> f64 {
        self.beat_ms * f64::from(self.base_beats)
    }

    /// Tone boundary interval in milliseconds
    pub fn tone_duration(&self) -> f64 {
        self.beat_ms
    }

    /// Length of one key slot in the tone bank, in milliseconds
    pub fn key_span(&self) -> f64 {
        self.beat_ms * f64::from(self.key_span_beats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "base_beats": 48, "spawner_period": { "min": 2, "max": 3 } }"#)
            .unwrap();
        assert_eq!(tuning.base_beats, 48);
        assert_eq!(tuning.spawner_period, Span::new(2, 3));
        assert_eq!(tuning.key_count, 10);
        assert!((tuning.base_duration() - 48.0 * 500.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Tuning::from_json("{ base_beats: }").is_err());
    }
}
