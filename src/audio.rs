//! Beat-locked audio scheduling
//!
//! Two loops play at once: a long base loop (the rhythm bed) and a short tone
//! bank holding the key sounds. Both are restarted on fixed boundaries of a
//! virtual clock rather than left to free-run, so the music stays in phase
//! with the simulation no matter how the playback device drifts.
//!
//! Pattern changes and key requests never touch playback directly. They are
//! parked here and take effect on the next boundary:
//! - a pattern swap activates on the next base boundary
//! - its tone bank activates on the tone boundary of that same poll
//! - a key request is consumed on the next tone boundary

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::clock::VirtualClock;
use crate::pattern::Pattern;
use crate::tuning::Tuning;

/// Playback handle owned by the scheduler
///
/// Commands are fire-and-forget; nothing waits for them to complete.
pub trait Track {
    fn play(&mut self);
    fn pause(&mut self);
    /// Move the playhead, in seconds
    fn seek(&mut self, secs: f64);
    fn set_volume(&mut self, _volume: f32) {}
}

/// Symbolic track names resolved once at startup
///
/// Missing names are valid and mean silence for that slot.
#[derive(Default)]
pub struct AudioTable {
    tracks: HashMap<String, Box<dyn Track>>,
}

impl AudioTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, track: Box<dyn Track>) {
        self.tracks.insert(name.into(), track);
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Name of the base loop for a pattern (`base0`..)
    pub fn base_name(pattern: Pattern) -> String {
        format!("base{}", pattern.id())
    }

    /// Name of the tone bank for a pattern (`tone1`..)
    pub fn tone_name(pattern: Pattern) -> String {
        format!("tone{}", pattern.id())
    }

    fn take(&mut self, name: &str) -> Option<Box<dyn Track>> {
        self.tracks.remove(name)
    }
}

/// Index into the scheduler's track list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackId(usize);

/// A track plus how to address it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loop {
    pub track: TrackId,
    /// Length of one addressable slot in milliseconds (whole loop for a base)
    pub span: f64,
    /// Encoder padding skipped on every (re)start, in seconds
    pub lead_in: f64,
}

impl Loop {
    /// Playhead in seconds for the given key slot
    pub fn offset_for_key(&self, key: u32) -> f64 {
        self.span * f64::from(key) / 1000.0 + self.lead_in
    }
}

/// Audio for one pattern; either half may be absent
#[derive(Debug, Clone, Copy, Default)]
struct PatternLoops {
    base: Option<Loop>,
    tone: Option<Loop>,
}

/// Audio queued by a pattern change, waiting for the next base boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSwap {
    pub pattern: Pattern,
    pub base: Option<Loop>,
    pub tone: Option<Loop>,
}

/// Deferred key choice, evaluated when the next tone boundary consumes it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyRequest {
    /// This key exactly; negative indices play nothing
    Key(i32),
    /// Any key, uniformly
    Random,
    /// Random walk of at most one step from the previous key, or a uniform
    /// key with the leap chance current when the request resolves
    Adaptive,
}

/// Notifications drained by the owning scene once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    /// A pending swap went live on a base boundary
    BaseChanged { pattern: Pattern },
    /// A tone boundary was crossed
    Beat { index: u64 },
    /// A key sound started
    KeyChanged { key: u32 },
}

/// What a single poll did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PollReport {
    pub elapsed: f64,
    pub base_boundary: bool,
    pub tone_boundary: bool,
    /// The pending tone bank went live during this poll
    pub tone_swapped: bool,
    /// Key played during this poll
    pub key: Option<u32>,
}

/// Keeps base and tone playback phase-aligned to the virtual clock
pub struct PhaseScheduler {
    clock: VirtualClock,
    tracks: Vec<Box<dyn Track>>,
    loops: [PatternLoops; Pattern::COUNT],

    base_duration: f64,
    tone_duration: f64,
    key_count: u32,

    last_base: Option<f64>,
    last_tone: Option<f64>,

    cur_base: Option<Loop>,
    cur_tone: Option<Loop>,
    pending: Option<PendingSwap>,
    /// Tone bank released by the last base swap, waiting for a tone boundary
    armed_tone: Option<Option<Loop>>,
    audible: Pattern,

    key_request: Option<KeyRequest>,
    last_key: u32,
    /// Chance an adaptive request jumps to a uniform key, kept current by the owner
    leap: f32,
    rng: Pcg32,

    events: Vec<AudioEvent>,
    suspended: bool,
}

fn crossed(last: Option<f64>, duration: f64, elapsed: f64) -> bool {
    match last {
        None => true,
        Some(boundary) => boundary + duration <= elapsed,
    }
}

fn boundary_of(elapsed: f64, duration: f64) -> f64 {
    (elapsed / duration).floor() * duration
}

impl PhaseScheduler {
    /// Resolve `base0..` and `tone1..` from the table; the neutral base plays first
    pub fn new(mut table: AudioTable, tuning: &Tuning, seed: u64) -> Self {
        let mut tracks: Vec<Box<dyn Track>> = Vec::new();
        let mut loops = [PatternLoops::default(); Pattern::COUNT];

        for (index, slot) in loops.iter_mut().enumerate() {
            let Some(pattern) = Pattern::new(index as u8) else {
                continue;
            };
            if let Some(track) = table.take(&AudioTable::base_name(pattern)) {
                slot.base = Some(Loop {
                    track: TrackId(tracks.len()),
                    span: tuning.base_duration(),
                    lead_in: tuning.lead_in_secs,
                });
                tracks.push(track);
            }
            if let Some(track) = table.take(&AudioTable::tone_name(pattern)) {
                slot.tone = Some(Loop {
                    track: TrackId(tracks.len()),
                    span: tuning.key_span(),
                    lead_in: tuning.lead_in_secs,
                });
                tracks.push(track);
            }
        }

        if !table.is_empty() {
            log::warn!("{} unrecognised audio track(s) ignored", table.len());
        }
        log::info!("Audio scheduler ready with {} track(s)", tracks.len());

        Self {
            clock: VirtualClock::new(),
            tracks,
            base_duration: tuning.base_duration(),
            tone_duration: tuning.tone_duration(),
            key_count: tuning.key_count,
            last_base: None,
            last_tone: None,
            cur_base: loops[0].base,
            cur_tone: None,
            pending: None,
            armed_tone: None,
            audible: Pattern::NEUTRAL,
            key_request: None,
            last_key: 0,
            leap: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            suspended: false,
            loops,
        }
    }

    /// Poll the clock and restart whichever loops crossed a boundary
    pub fn update(&mut self, now_ms: f64) -> PollReport {
        if self.suspended {
            return PollReport::default();
        }
        let elapsed = self.clock.poll(now_ms);
        let mut report = PollReport {
            elapsed,
            ..Default::default()
        };

        if crossed(self.last_base, self.base_duration, elapsed) {
            self.last_base = Some(boundary_of(elapsed, self.base_duration));
            self.cross_base();
            report.base_boundary = true;
        }

        if crossed(self.last_tone, self.tone_duration, elapsed) {
            let boundary = boundary_of(elapsed, self.tone_duration);
            self.last_tone = Some(boundary);
            report.tone_swapped = self.cross_tone(report.base_boundary);
            report.tone_boundary = true;

            let index = (boundary / self.tone_duration).round() as u64;
            self.events.push(AudioEvent::Beat { index });

            if let Some(request) = self.key_request.take() {
                report.key = self.play_key(request);
            }
        }

        report
    }

    fn cross_base(&mut self) {
        if let Some(base) = self.cur_base {
            self.tracks[base.track.0].pause();
        }
        if let Some(swap) = self.pending.take() {
            self.cur_base = swap.base;
            self.armed_tone = Some(swap.tone);
            self.audible = swap.pattern;
            log::info!("Base track changed to pattern {}", swap.pattern.id());
            self.events.push(AudioEvent::BaseChanged {
                pattern: swap.pattern,
            });
        }
        if let Some(base) = self.cur_base {
            let track = &mut self.tracks[base.track.0];
            track.seek(base.lead_in);
            track.play();
        }
    }

    /// Returns true when the armed tone bank went live
    fn cross_tone(&mut self, base_changed: bool) -> bool {
        if let Some(tone) = self.cur_tone {
            self.tracks[tone.track.0].pause();
        }
        // Tone banks only switch together with their base loop
        if !base_changed {
            return false;
        }
        match self.armed_tone.take() {
            Some(tone) => {
                self.cur_tone = tone;
                true
            }
            None => false,
        }
    }

    fn play_key(&mut self, request: KeyRequest) -> Option<u32> {
        let key = self.resolve_key(request)?;
        let Some(tone) = self.cur_tone else {
            log::debug!("Key {key} dropped: no tone bank active");
            return None;
        };
        let track = &mut self.tracks[tone.track.0];
        track.seek(tone.offset_for_key(key));
        track.play();
        self.last_key = key;
        log::debug!("Key {key} played");
        self.events.push(AudioEvent::KeyChanged { key });
        Some(key)
    }

    fn resolve_key(&mut self, request: KeyRequest) -> Option<u32> {
        if self.key_count == 0 {
            return None;
        }
        let top = self.key_count - 1;
        match request {
            KeyRequest::Key(key) if key < 0 => None,
            KeyRequest::Key(key) => {
                let key = key as u32;
                if key > top {
                    log::debug!("Key {key} out of range, ignored");
                    return None;
                }
                Some(key)
            }
            KeyRequest::Random => Some(self.rng.random_range(0..=top)),
            KeyRequest::Adaptive => {
                if self.rng.random::<f32>() < self.leap {
                    Some(self.rng.random_range(0..=top))
                } else {
                    let step: i64 = self.rng.random_range(-1..=1);
                    Some((i64::from(self.last_key) + step).clamp(0, i64::from(top)) as u32)
                }
            }
        }
    }

    /// Queue the audio for `pattern`; replaces any swap not yet activated
    pub fn set_next_pattern(&mut self, pattern: Pattern) {
        let loops = self.loops[pattern.index()];
        log::debug!("Pattern {} queued for next base boundary", pattern.id());
        self.pending = Some(PendingSwap {
            pattern,
            base: loops.base,
            tone: loops.tone,
        });
    }

    /// Ask for a key on the next tone boundary; replaces an unconsumed request
    pub fn request_key(&mut self, request: KeyRequest) {
        self.key_request = Some(request);
    }

    /// Set the leap chance read by adaptive requests when they resolve
    pub fn set_leap(&mut self, leap: f32) {
        self.leap = leap.clamp(0.0, 1.0);
    }

    /// Pause playback, keeping the schedule
    pub fn suspend(&mut self) {
        if self.suspended {
            return;
        }
        self.suspended = true;
        for current in [self.cur_base, self.cur_tone].into_iter().flatten() {
            self.tracks[current.track.0].pause();
        }
        log::info!("Audio suspended");
    }

    /// Restart the base loop and re-anchor the clock; prior phase is forfeited
    pub fn resume(&mut self) {
        if !self.suspended {
            return;
        }
        self.suspended = false;
        self.clock.reset();
        self.last_base = None;
        self.last_tone = None;
        if let Some(base) = self.cur_base {
            self.tracks[base.track.0].play();
        }
        log::info!("Audio resumed");
    }

    /// Apply volumes to every base loop and tone bank
    pub fn set_volumes(&mut self, music: f32, sfx: f32) {
        for loops in self.loops {
            if let Some(base) = loops.base {
                self.tracks[base.track.0].set_volume(music);
            }
            if let Some(tone) = loops.tone {
                self.tracks[tone.track.0].set_volume(sfx);
            }
        }
    }

    /// Take every notification raised since the last drain
    pub fn drain_events(&mut self) -> Vec<AudioEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pattern whose music is currently playing
    pub fn audible_pattern(&self) -> Pattern {
        self.audible
    }

    pub fn pending(&self) -> Option<&PendingSwap> {
        self.pending.as_ref()
    }

    pub fn has_key_request(&self) -> bool {
        self.key_request.is_some()
    }

    pub fn last_key(&self) -> u32 {
        self.last_key
    }

    pub fn current_base(&self) -> Option<Loop> {
        self.cur_base
    }

    pub fn current_tone(&self) -> Option<Loop> {
        self.cur_tone
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }
}
