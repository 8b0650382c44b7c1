#![forbid(unsafe_code)]

//! Time-driven cosmetic transitions.
//!
//! Animations are advanced explicitly with [`Animation::tick`] so hosts keep
//! control of the clock. Nothing here touches board state.
//!
//! # Invariants
//!
//! 1. `value()` is a pure function of elapsed time.
//! 2. Elapsed time never exceeds the duration; extra time is discarded.
//! 3. A zero duration is clamped to 1ns (immediately complete on first tick).

use web_time::Duration;

/// A time-driven value.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    fn is_complete(&self) -> bool;

    /// Current output value.
    fn value(&self) -> f32;

    /// Rewind to the start.
    fn reset(&mut self);
}

/// Default drop-confirmation duration.
pub const DROP_PULSE_DURATION: Duration = Duration::from_millis(300);

/// Default peak scale reached halfway through the pulse.
pub const DROP_PULSE_PEAK: f32 = 1.3;

/// Scale pulse played on a token when it is released: 1.0 → peak → 1.0.
///
/// Each half uses a smoothstep ease, so the value leaves and re-enters 1.0
/// with zero slope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropPulse {
    duration: Duration,
    elapsed: Duration,
    peak: f32,
}

impl DropPulse {
    #[must_use]
    pub fn new(duration: Duration, peak: f32) -> Self {
        Self {
            duration: duration.max(Duration::from_nanos(1)),
            elapsed: Duration::ZERO,
            peak,
        }
    }

    /// Fraction of the pulse played, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0) as f32
    }

    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for DropPulse {
    fn default() -> Self {
        Self::new(DROP_PULSE_DURATION, DROP_PULSE_PEAK)
    }
}

impl Animation for DropPulse {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        let t = self.progress();
        let half = if t < 0.5 { t * 2.0 } else { (1.0 - t) * 2.0 };
        let eased = half * half * (3.0 - 2.0 * half);
        1.0 + (self.peak - 1.0) * eased
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}
