#![forbid(unsafe_code)]

//! Feedback coordinator: haptics and drop-confirmation transitions.
//!
//! The coordinator is not told whether a drop succeeded. Haptics follow the
//! session lifetime and the confirmation pulse plays on every gesture end.

use std::sync::Arc;

use ahash::AHashMap;
use web_time::Duration;

use crate::animation::{Animation, DROP_PULSE_DURATION, DROP_PULSE_PEAK, DropPulse};
use crate::board::TokenId;
use crate::haptics::{HapticDriver, HapticLoop, HapticPattern, NoHaptics};

/// Owns the haptic driver and the per-token drop pulses.
pub struct FeedbackCoordinator {
    driver: Arc<dyn HapticDriver>,
    pattern: HapticPattern,
    pulse_duration: Duration,
    pulse_peak: f32,
    pulses: AHashMap<TokenId, DropPulse>,
}

impl std::fmt::Debug for FeedbackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackCoordinator")
            .field("haptics", &self.driver.is_available())
            .field("pattern", &self.pattern)
            .field("active_pulses", &self.pulses.len())
            .finish()
    }
}

impl Default for FeedbackCoordinator {
    fn default() -> Self {
        Self::new(Arc::new(NoHaptics))
    }
}

impl FeedbackCoordinator {
    /// Coordinator with default timings.
    pub fn new(driver: Arc<dyn HapticDriver>) -> Self {
        Self {
            driver,
            pattern: HapticPattern::default(),
            pulse_duration: DROP_PULSE_DURATION,
            pulse_peak: DROP_PULSE_PEAK,
            pulses: AHashMap::new(),
        }
    }

    /// Override the haptic timings.
    #[must_use]
    pub fn with_pattern(mut self, pattern: HapticPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Override the drop pulse duration and peak scale.
    #[must_use]
    pub fn with_drop_pulse(mut self, duration: Duration, peak: f32) -> Self {
        self.pulse_duration = duration;
        self.pulse_peak = peak;
        self
    }

    pub fn haptics_available(&self) -> bool {
        self.driver.is_available()
    }

    /// Begin the pulse loop for a lifted token.
    pub fn start_haptics(&self, token: TokenId) -> HapticLoop {
        tracing::trace!(token = token.0, "haptic loop start");
        HapticLoop::start(Arc::clone(&self.driver), &self.pattern)
    }

    /// Cancel the loop and play the drop burst.
    pub fn stop_haptics(&self, token: TokenId, haptics: HapticLoop) {
        let pulses = haptics.stop();
        tracing::trace!(token = token.0, pulses, "haptic loop stop");
    }

    /// Start (or restart) the confirmation pulse on `token`.
    pub fn confirm_drop(&mut self, token: TokenId) {
        match self.pulses.get_mut(&token) {
            Some(pulse) => pulse.reset(),
            None => {
                self.pulses
                    .insert(token, DropPulse::new(self.pulse_duration, self.pulse_peak));
            }
        }
    }

    /// Advance every pulse, discarding completed ones.
    pub fn tick(&mut self, dt: Duration) {
        self.pulses.retain(|_, pulse| {
            pulse.tick(dt);
            !pulse.is_complete()
        });
    }

    /// Current render scale for `token` (1.0 at rest).
    pub fn scale_of(&self, token: TokenId) -> f32 {
        self.pulses.get(&token).map_or(1.0, Animation::value)
    }

    pub fn is_pulsing(&self, token: TokenId) -> bool {
        self.pulses.contains_key(&token)
    }

    pub fn active_pulses(&self) -> usize {
        self.pulses.len()
    }

    /// Drop any pulse on a token that no longer exists.
    pub fn forget(&mut self, token: TokenId) {
        self.pulses.remove(&token);
    }

    /// Drop every pulse.
    pub fn clear(&mut self) {
        self.pulses.clear();
    }
}
