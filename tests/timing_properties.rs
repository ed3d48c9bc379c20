//! Boundary timing of the audio scheduler under arbitrary poll sequences

use beatshot::audio::{AudioEvent, KeyRequest, PhaseScheduler};
use beatshot::platform::headless::{TrackLog, recording_table};
use beatshot::{Pattern, Tuning};
use proptest::prelude::*;

const BASE: f64 = 48.0;
const TONE: f64 = 6.0;

fn scheduler(log: &TrackLog) -> PhaseScheduler {
    let tuning = Tuning {
        beat_ms: TONE,
        base_beats: 8,
        key_span_beats: 1,
        key_count: 4,
        lead_in_secs: 0.0,
        ..Default::default()
    };
    PhaseScheduler::new(recording_table(log), &tuning, 11)
}

/// Monotonic poll times built from frame gaps
fn poll_times(gaps: &[u8]) -> Vec<f64> {
    let mut now = 1000.0;
    gaps.iter()
        .map(|gap| {
            now += f64::from(*gap);
            now
        })
        .collect()
}

proptest! {
    #[test]
    fn base_boundary_once_per_interval(gaps in prop::collection::vec(0u8..40, 1..300)) {
        let log = TrackLog::default();
        let mut audio = scheduler(&log);
        let mut last_interval = None;
        for now in poll_times(&gaps) {
            let report = audio.update(now);
            let interval = (report.elapsed / BASE).floor() as i64;
            let expected = last_interval != Some(interval);
            prop_assert_eq!(report.base_boundary, expected);
            last_interval = Some(interval);
        }
    }

    #[test]
    fn tone_bank_only_swaps_with_base(
        steps in prop::collection::vec((0u8..20, prop::option::of(1u8..=4)), 1..300)
    ) {
        let log = TrackLog::default();
        let mut audio = scheduler(&log);
        let mut now = 0.0;
        for (gap, pick) in steps {
            now += f64::from(gap);
            if let Some(id) = pick.and_then(Pattern::new) {
                audio.set_next_pattern(id);
            }
            let report = audio.update(now);
            if report.tone_swapped {
                prop_assert!(report.base_boundary);
                prop_assert!(report.tone_boundary);
            }
            if report.base_boundary {
                prop_assert!(audio.pending().is_none());
            }
        }
    }

    #[test]
    fn key_consumed_once_on_next_tone_boundary(
        gaps in prop::collection::vec(1u8..10, 1..100),
        key in 0i32..4,
    ) {
        let log = TrackLog::default();
        let mut audio = scheduler(&log);
        audio.update(0.0);
        audio.set_next_pattern(Pattern::new(2).unwrap());
        audio.update(BASE);
        audio.drain_events();

        let mut now = BASE + 1.0;
        audio.update(now);
        audio.request_key(KeyRequest::Key(key));

        let mut played = 0;
        for gap in gaps {
            now += f64::from(gap);
            let before = audio.has_key_request();
            let report = audio.update(now);
            if report.tone_boundary && before {
                prop_assert_eq!(report.key, Some(key as u32));
            } else {
                prop_assert_eq!(report.key, None);
            }
            if report.tone_boundary {
                prop_assert!(!audio.has_key_request());
            }
            played += audio
                .drain_events()
                .iter()
                .filter(|e| matches!(e, AudioEvent::KeyChanged { .. }))
                .count();
        }
        let elapsed = now;
        let reached_boundary = (elapsed / TONE).floor() > ((BASE + 1.0) / TONE).floor();
        prop_assert_eq!(played, usize::from(reached_boundary));
    }
}
