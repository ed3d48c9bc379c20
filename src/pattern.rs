//! Pattern tiers
//!
//! A pattern is the tier picked up from a changer. It selects the music pair,
//! the background tint, the enemy spawn table and the player's bullet fan.
//! Gameplay switches immediately on pickup; the music follows on the next
//! base boundary (see [`crate::audio::PhaseScheduler`]).

use serde::{Deserialize, Serialize};

use crate::render::Rgb;
use crate::sim::Archetype;

/// Background colour when no flash is showing
pub const NEUTRAL_BACKGROUND: Rgb = Rgb::new(0, 0, 0);

/// Difficulty / track tier, 0 (neutral, no enemies) through [`Pattern::MAX`]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Pattern(u8);

impl Pattern {
    pub const NEUTRAL: Pattern = Pattern(0);
    /// Highest active tier
    pub const MAX: u8 = 4;
    /// Number of tiers including neutral
    pub const COUNT: usize = Self::MAX as usize + 1;

    /// `None` for ids above [`Pattern::MAX`]
    pub fn new(id: u8) -> Option<Self> {
        (id <= Self::MAX).then_some(Self(id))
    }

    pub fn id(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_neutral(self) -> bool {
        self.0 == 0
    }

    /// All tiers a changer can carry
    pub fn active() -> impl Iterator<Item = Pattern> {
        (1..=Self::MAX).map(Pattern)
    }

    /// Tint flashed on the background when this pattern is picked up
    pub fn tint(self) -> Rgb {
        match self.0 {
            1 => Rgb::new(0, 32, 128),
            2 => Rgb::new(0, 112, 48),
            3 => Rgb::new(128, 0, 96),
            4 => Rgb::new(144, 96, 0),
            _ => NEUTRAL_BACKGROUND,
        }
    }

    /// Bullet directions fired on each beat (normalized by the caller)
    pub fn fire_shape(self) -> &'static [(f32, f32)] {
        match self.0 {
            0 | 1 => &[(0.0, -1.0)],
            2 => &[(-0.12, -1.0), (0.12, -1.0)],
            3 => &[(-0.25, -1.0), (0.0, -1.0), (0.25, -1.0)],
            _ => &[(-0.4, -1.0), (-0.13, -1.0), (0.13, -1.0), (0.4, -1.0)],
        }
    }

    /// Weighted archetype table for new spawners; empty for neutral
    pub fn spawn_table(self) -> &'static [(Archetype, u32)] {
        match self.0 {
            0 => &[],
            1 => &[(Archetype::Diver, 1)],
            2 => &[(Archetype::Diver, 2), (Archetype::Sweeper, 1)],
            3 => &[
                (Archetype::Diver, 2),
                (Archetype::Sweeper, 2),
                (Archetype::Hooker, 1),
            ],
            _ => &[
                (Archetype::Diver, 1),
                (Archetype::Sweeper, 2),
                (Archetype::Hooker, 2),
                (Archetype::Bouncer, 1),
            ],
        }
    }
}

/// The gameplay-visible pattern plus its fading background flash
#[derive(Debug, Clone)]
pub struct PatternState {
    current: Pattern,
    tint: Rgb,
    flash: u32,
    flash_len: u32,
}

impl PatternState {
    pub fn new(flash_len: u32) -> Self {
        Self {
            current: Pattern::NEUTRAL,
            tint: NEUTRAL_BACKGROUND,
            flash: 0,
            flash_len,
        }
    }

    pub fn current(&self) -> Pattern {
        self.current
    }

    /// Switch tier now; `flash` starts the tint countdown
    pub fn set(&mut self, pattern: Pattern, flash: bool) {
        self.current = pattern;
        if flash && self.flash_len > 0 {
            self.tint = pattern.tint();
            self.flash = self.flash_len;
        }
    }

    /// Advance the flash countdown by one tick
    pub fn tick(&mut self) {
        self.flash = self.flash.saturating_sub(1);
    }

    pub fn flash_remaining(&self) -> u32 {
        self.flash
    }

    /// Current background colour
    pub fn background(&self) -> Rgb {
        if self.flash == 0 {
            return NEUTRAL_BACKGROUND;
        }
        let t = 1.0 - self.flash as f32 / self.flash_len as f32;
        self.tint.lerp(NEUTRAL_BACKGROUND, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_range() {
        assert_eq!(Pattern::new(4).map(Pattern::id), Some(4));
        assert!(Pattern::new(5).is_none());
        assert_eq!(Pattern::active().count(), 4);
        assert!(Pattern::NEUTRAL.spawn_table().is_empty());
    }

    #[test]
    fn test_flash_fades_but_pattern_stays() {
        let mut state = PatternState::new(4);
        let p2 = Pattern::new(2).unwrap();
        state.set(p2, true);
        assert_eq!(state.background(), p2.tint());

        for _ in 0..4 {
            state.tick();
        }
        assert_eq!(state.background(), NEUTRAL_BACKGROUND);
        assert_eq!(state.current(), p2);
    }

    #[test]
    fn test_no_flash_when_suppressed() {
        let mut state = PatternState::new(10);
        state.set(Pattern::new(3).unwrap(), false);
        assert_eq!(state.flash_remaining(), 0);
        assert_eq!(state.background(), NEUTRAL_BACKGROUND);
    }

    #[test]
    fn test_higher_tiers_fire_wider() {
        let widths: Vec<usize> = (0..=Pattern::MAX)
            .filter_map(Pattern::new)
            .map(|p| p.fire_shape().len())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] <= w[1]));
    }
}
