//! Virtual clock anchored on first poll
//!
//! The caller supplies wall-clock readings in milliseconds; the clock only
//! remembers where it was anchored. Resetting forgets the anchor so the next
//! poll starts again from zero and time spent suspended is never counted.

/// Monotonic elapsed-time tracker
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    start: Option<f64>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self { start: None }
    }

    /// Elapsed milliseconds since the anchor; anchors on the first call
    pub fn poll(&mut self, now_ms: f64) -> f64 {
        let start = *self.start.get_or_insert(now_ms);
        (now_ms - start).max(0.0)
    }

    /// Drop the anchor; the next poll re-anchors and returns 0
    pub fn reset(&mut self) {
        self.start = None;
    }

    pub fn is_anchored(&self) -> bool {
        self.start.is_some()
    }
}
