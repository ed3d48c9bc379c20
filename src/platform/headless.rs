//! In-memory playback and drawing for the native build and tests
//!
//! Nothing is audible: every command sent to a [`RecordingTrack`] is appended
//! to a shared [`TrackLog`] so callers can inspect what would have played.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::audio::{AudioTable, Track};
use crate::pattern::Pattern;
use crate::render::{Rgb, SpriteRef, Surface};
use crate::sim::Rect;

/// A command received by a track
#[derive(Debug, Clone, PartialEq)]
pub enum TrackCall {
    Play,
    Pause,
    Seek(f64),
    Volume(f32),
}

/// Shared, ordered record of track commands tagged with the track name
#[derive(Debug, Clone, Default)]
pub struct TrackLog(Rc<RefCell<Vec<(String, TrackCall)>>>);

impl TrackLog {
    pub fn calls(&self) -> Vec<(String, TrackCall)> {
        self.0.borrow().clone()
    }

    /// Number of `Play` commands sent to `name`
    pub fn plays(&self, name: &str) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|(n, call)| n == name && *call == TrackCall::Play)
            .count()
    }

    /// Most recent seek position sent to `name`
    pub fn last_seek(&self, name: &str) -> Option<f64> {
        self.0.borrow().iter().rev().find_map(|(n, call)| match call {
            TrackCall::Seek(secs) if n == name => Some(*secs),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, name: &str, call: TrackCall) {
        self.0.borrow_mut().push((name.to_string(), call));
    }
}

/// Track that records instead of playing
#[derive(Debug, Clone)]
pub struct RecordingTrack {
    name: String,
    log: TrackLog,
}

impl RecordingTrack {
    pub fn new(name: impl Into<String>, log: &TrackLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
        }
    }
}

impl Track for RecordingTrack {
    fn play(&mut self) {
        self.log.push(&self.name, TrackCall::Play);
    }

    fn pause(&mut self) {
        self.log.push(&self.name, TrackCall::Pause);
    }

    fn seek(&mut self, secs: f64) {
        self.log.push(&self.name, TrackCall::Seek(secs));
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.push(&self.name, TrackCall::Volume(volume));
    }
}

/// Audio table with a recording track for every base and tone name
pub fn recording_table(log: &TrackLog) -> AudioTable {
    let mut table = AudioTable::new();
    for pattern in (0..=Pattern::MAX).filter_map(Pattern::new) {
        let base = AudioTable::base_name(pattern);
        table.insert(base.clone(), Box::new(RecordingTrack::new(base, log)));
        if !pattern.is_neutral() {
            let tone = AudioTable::tone_name(pattern);
            table.insert(tone.clone(), Box::new(RecordingTrack::new(tone, log)));
        }
    }
    table
}

/// A single draw command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Fill(Rect, Rgb),
    Sprite(SpriteRef, Vec2),
    Text(String, Vec2),
}

/// Surface that keeps the draw commands of the last frame
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.calls.push(DrawCall::Fill(rect, color));
    }

    fn draw_sprite(&mut self, sprite: SpriteRef, center: Vec2) {
        self.calls.push(DrawCall::Sprite(sprite, center));
    }

    fn draw_text(&mut self, text: &str, at: Vec2) {
        self.calls.push(DrawCall::Text(text.to_string(), at));
    }
}
