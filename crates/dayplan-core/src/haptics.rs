#![forbid(unsafe_code)]

//! Haptic feedback for drag sessions.
//!
//! While a token is lifted a [`HapticLoop`] pulses the device at a fixed
//! interval. Stopping the loop silences the pulses first and only then plays
//! the drop burst, so no loop pulse can land after the burst.
//!
//! Pulses come from one of two clocks ([`PulseClock`]):
//! - `Thread`: a background [`RepeatingTimer`]. If the platform cannot spawn
//!   threads the loop falls back to the host clock.
//! - `Host`: the embedder calls [`HapticLoop::advance`] from its frame loop.
//!   At most one pulse fires per call; a stalled host does not replay a
//!   backlog of pulses.
//!
//! Devices without a vibration motor use [`NoHaptics`]; every operation is
//! then a no-op and no timer thread is spawned.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::timer::RepeatingTimer;

/// Default interval between loop pulses.
pub const DEFAULT_PULSE_INTERVAL: Duration = Duration::from_millis(150);

/// Default length of one loop pulse.
pub const DEFAULT_PULSE_LENGTH: Duration = Duration::from_millis(10);

/// Default drop burst: vibrate/pause alternating, in the `navigator.vibrate`
/// pattern convention.
pub const DEFAULT_DROP_BURST: [Duration; 5] = [Duration::from_millis(10); 5];

/// A vibration motor.
///
/// Implementations may be called from the pulse timer thread and must not
/// block for longer than the pattern they play.
pub trait HapticDriver: Send + Sync {
    /// Whether the device can vibrate. Must not panic.
    fn is_available(&self) -> bool {
        true
    }

    /// Play a pattern: odd entries vibrate, even entries pause.
    fn vibrate(&self, pattern: &[Duration]);
}

/// Driver for devices without haptics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl HapticDriver for NoHaptics {
    fn is_available(&self) -> bool {
        false
    }

    fn vibrate(&self, _pattern: &[Duration]) {}
}

/// Source of loop pulse timing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum PulseClock {
    /// Background timer thread.
    #[default]
    Thread,
    /// Host frame clock, through [`HapticLoop::advance`].
    Host,
}

/// Timing of the loop pulse and the drop burst.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HapticPattern {
    pub interval: Duration,
    pub pulse: Duration,
    pub burst: Vec<Duration>,
    pub clock: PulseClock,
}

impl Default for HapticPattern {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PULSE_INTERVAL,
            pulse: DEFAULT_PULSE_LENGTH,
            burst: DEFAULT_DROP_BURST.to_vec(),
            clock: PulseClock::Thread,
        }
    }
}

enum Pulser {
    Timer(RepeatingTimer),
    Host { interval: Duration, elapsed: Duration },
    Off,
}

impl Pulser {
    fn host(interval: Duration) -> Self {
        Self::Host {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    fn silence(self) {
        if let Self::Timer(timer) = self {
            timer.cancel();
        }
    }
}

/// Recurring pulse tied to one drag session.
pub struct HapticLoop {
    pulser: Pulser,
    driver: Arc<dyn HapticDriver>,
    pulse: Duration,
    burst: Vec<Duration>,
    pulses: Arc<AtomicU64>,
}

impl std::fmt::Debug for HapticLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clock = match self.pulser {
            Pulser::Timer(_) => "thread",
            Pulser::Host { .. } => "host",
            Pulser::Off => "off",
        };
        f.debug_struct("HapticLoop")
            .field("clock", &clock)
            .field("pulses", &self.pulses())
            .finish()
    }
}

impl HapticLoop {
    /// Start pulsing `driver` per `pattern`.
    pub fn start(driver: Arc<dyn HapticDriver>, pattern: &HapticPattern) -> Self {
        let pulses = Arc::new(AtomicU64::new(0));
        let pulser = if !driver.is_available() {
            Pulser::Off
        } else {
            match pattern.clock {
                PulseClock::Host => Pulser::host(pattern.interval),
                PulseClock::Thread => {
                    let pulse_driver = Arc::clone(&driver);
                    let counter = Arc::clone(&pulses);
                    let pulse = [pattern.pulse];
                    let spawned =
                        RepeatingTimer::spawn("dayplan-haptics", pattern.interval, move || {
                            pulse_driver.vibrate(&pulse);
                            let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
                            tracing::trace!(pulse = n, "haptic pulse");
                        });
                    match spawned {
                        Ok(timer) => Pulser::Timer(timer),
                        Err(error) => {
                            tracing::debug!(%error, "no pulse thread; using the host clock");
                            Pulser::host(pattern.interval)
                        }
                    }
                }
            }
        };
        Self {
            pulser,
            driver,
            pulse: pattern.pulse,
            burst: pattern.burst.clone(),
            pulses,
        }
    }

    /// Loop pulses fired so far.
    pub fn pulses(&self) -> u64 {
        self.pulses.load(Ordering::Relaxed)
    }

    /// Whether pulses can still fire.
    pub fn is_running(&self) -> bool {
        match &self.pulser {
            Pulser::Timer(timer) => timer.is_running(),
            Pulser::Host { .. } => true,
            Pulser::Off => false,
        }
    }

    /// Whether pulses wait on [`advance`](Self::advance).
    pub fn is_host_clocked(&self) -> bool {
        matches!(self.pulser, Pulser::Host { .. })
    }

    /// Feed host time to a host-clocked loop. No-op for other clocks.
    pub fn advance(&mut self, dt: Duration) {
        let Pulser::Host { interval, elapsed } = &mut self.pulser else {
            return;
        };
        if interval.is_zero() {
            return;
        }
        *elapsed = elapsed.saturating_add(dt);
        if *elapsed < *interval {
            return;
        }
        let carry = elapsed.as_nanos() % interval.as_nanos();
        *elapsed = Duration::from_nanos(u64::try_from(carry).unwrap_or(0));

        self.driver.vibrate(&[self.pulse]);
        let n = self.pulses.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(pulse = n, "haptic pulse");
    }

    /// Silence the loop and play the drop burst. Returns the loop pulse count.
    pub fn stop(self) -> u64 {
        let Self {
            pulser,
            driver,
            burst,
            pulses,
            ..
        } = self;
        let available = !matches!(pulser, Pulser::Off);
        pulser.silence();
        if available && !burst.is_empty() {
            driver.vibrate(&burst);
        }
        pulses.load(Ordering::Relaxed)
    }

    /// Silence the loop without the drop burst.
    pub fn cancel(self) -> u64 {
        self.pulser.silence();
        self.pulses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        patterns: Mutex<Vec<Vec<Duration>>>,
    }

    impl HapticDriver for Recorder {
        fn vibrate(&self, pattern: &[Duration]) {
            self.patterns
                .lock()
                .expect("recorder lock")
                .push(pattern.to_vec());
        }
    }

    fn fast_pattern() -> HapticPattern {
        HapticPattern {
            interval: Duration::from_millis(2),
            ..HapticPattern::default()
        }
    }

    #[test]
    fn stop_plays_burst_last() {
        let recorder = Arc::new(Recorder::default());
        let haptics = HapticLoop::start(recorder.clone(), &fast_pattern());
        std::thread::sleep(Duration::from_millis(30));
        let pulses = haptics.stop();
        assert!(pulses > 0);

        std::thread::sleep(Duration::from_millis(20));
        let patterns = recorder.patterns.lock().expect("recorder lock");
        assert_eq!(patterns.len() as u64, pulses + 1);
        assert_eq!(patterns.last().cloned(), Some(DEFAULT_DROP_BURST.to_vec()));
        assert!(
            patterns[..patterns.len() - 1]
                .iter()
                .all(|p| p == &[DEFAULT_PULSE_LENGTH])
        );
    }

    #[test]
    fn cancel_skips_burst() {
        let recorder = Arc::new(Recorder::default());
        let haptics = HapticLoop::start(
            recorder.clone(),
            &HapticPattern {
                interval: Duration::from_secs(60),
                ..HapticPattern::default()
            },
        );
        assert_eq!(haptics.cancel(), 0);
        assert!(recorder.patterns.lock().expect("recorder lock").is_empty());
    }

    #[test]
    fn missing_capability_is_a_noop() {
        let haptics = HapticLoop::start(Arc::new(NoHaptics), &fast_pattern());
        assert!(!haptics.is_running());
        assert_eq!(haptics.stop(), 0);
    }

    fn host_pattern() -> HapticPattern {
        HapticPattern {
            clock: PulseClock::Host,
            ..HapticPattern::default()
        }
    }

    #[test]
    fn host_clock_pulses_once_per_interval() {
        let recorder = Arc::new(Recorder::default());
        let mut haptics = HapticLoop::start(recorder.clone(), &host_pattern());
        assert!(haptics.is_host_clocked());
        assert!(haptics.is_running());

        haptics.advance(Duration::from_millis(100));
        assert_eq!(haptics.pulses(), 0);
        haptics.advance(Duration::from_millis(60));
        assert_eq!(haptics.pulses(), 1);
        // 10ms carried over: the next pulse is due after 140ms more.
        haptics.advance(Duration::from_millis(139));
        assert_eq!(haptics.pulses(), 1);
        haptics.advance(Duration::from_millis(1));
        assert_eq!(haptics.pulses(), 2);
    }

    #[test]
    fn host_clock_skips_backlog_after_stall() {
        let recorder = Arc::new(Recorder::default());
        let mut haptics = HapticLoop::start(recorder.clone(), &host_pattern());
        haptics.advance(Duration::from_secs(2));
        assert_eq!(haptics.pulses(), 1);

        assert_eq!(haptics.stop(), 1);
        let patterns = recorder.patterns.lock().expect("recorder lock");
        assert_eq!(
            *patterns,
            vec![vec![DEFAULT_PULSE_LENGTH], DEFAULT_DROP_BURST.to_vec()]
        );
    }

    #[test]
    fn advance_is_ignored_by_thread_and_missing_clocks() {
        let mut off = HapticLoop::start(Arc::new(NoHaptics), &host_pattern());
        assert!(!off.is_host_clocked());
        off.advance(Duration::from_secs(1));
        assert_eq!(off.pulses(), 0);

        let recorder = Arc::new(Recorder::default());
        let mut threaded = HapticLoop::start(
            recorder.clone(),
            &HapticPattern {
                interval: Duration::from_secs(60),
                ..HapticPattern::default()
            },
        );
        threaded.advance(Duration::from_secs(120));
        assert_eq!(threaded.cancel(), 0);
        assert!(recorder.patterns.lock().expect("recorder lock").is_empty());
    }
}
