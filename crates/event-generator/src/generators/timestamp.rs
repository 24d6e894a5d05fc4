//! Timestamp sampler.

use crate::config::TimeWindow;
use chrono::{Duration, NaiveDateTime};
use rand::Rng;

/// Draws timestamps uniformly, with one-second resolution, from a window.
///
/// Both ends of the window can be produced. Calls are independent, so the
/// sampled sequence is neither ordered nor free of duplicates.
#[derive(Debug, Clone, Copy)]
pub struct TimestampSampler {
    window: TimeWindow,
}

impl TimestampSampler {
    pub fn new(window: TimeWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> NaiveDateTime {
        let span = self.window.duration_seconds();
        if span <= 0 {
            return self.window.start;
        }
        let offset = rng.gen_range(0..=span);
        self.window.start + Duration::seconds(offset)
    }
}
