#![forbid(unsafe_code)]

//! Tunable timings for the placement engine.
//!
//! [`PlannerConfig`] groups every feedback and recognition parameter. With the
//! `config` feature it loads from TOML or JSON; missing keys keep their
//! defaults.
//!
//! ```toml
//! [haptics]
//! interval_ms = 150
//! pulse_ms = 10
//! burst_ms = [10, 10, 10, 10, 10]
//! clock = "thread"   # or "host": pulses follow the embedder's tick
//!
//! [drop_pulse]
//! duration_ms = 300
//! peak_scale = 1.3
//!
//! [taps]
//! window_ms = 300
//! tolerance_px = 24
//! ```
//!
//! `PlannerConfig::default()` matches the built-in constants exactly.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::animation::{DROP_PULSE_DURATION, DROP_PULSE_PEAK};
use crate::haptics::{
    DEFAULT_DROP_BURST, DEFAULT_PULSE_INTERVAL, DEFAULT_PULSE_LENGTH, HapticPattern, PulseClock,
};
use crate::tap::{DEFAULT_DOUBLE_TAP_WINDOW, DEFAULT_TAP_TOLERANCE, TapDetector};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PlannerConfig {
    pub haptics: HapticsConfig,
    pub drop_pulse: DropPulseConfig,
    pub taps: TapConfig,
}

/// Haptic loop and drop burst timings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct HapticsConfig {
    pub interval_ms: u64,
    pub pulse_ms: u64,
    /// Vibrate/pause alternating.
    pub burst_ms: Vec<u64>,
    pub clock: PulseClock,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            interval_ms: millis(DEFAULT_PULSE_INTERVAL),
            pulse_ms: millis(DEFAULT_PULSE_LENGTH),
            burst_ms: DEFAULT_DROP_BURST.iter().copied().map(millis).collect(),
            clock: PulseClock::Thread,
        }
    }
}

/// Drop-confirmation scale pulse.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DropPulseConfig {
    pub duration_ms: u64,
    pub peak_scale: f32,
}

impl Default for DropPulseConfig {
    fn default() -> Self {
        Self {
            duration_ms: millis(DROP_PULSE_DURATION),
            peak_scale: DROP_PULSE_PEAK,
        }
    }
}

/// Double-tap recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TapConfig {
    pub window_ms: u64,
    pub tolerance_px: u32,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            window_ms: millis(DEFAULT_DOUBLE_TAP_WINDOW),
            tolerance_px: DEFAULT_TAP_TOLERANCE,
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl PlannerConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.haptics.interval_ms == 0 {
            errors.push("haptics.interval_ms must be > 0".into());
        }
        if self.haptics.pulse_ms > self.haptics.interval_ms {
            errors.push(format!(
                "haptics.pulse_ms ({}) must not exceed haptics.interval_ms ({})",
                self.haptics.pulse_ms, self.haptics.interval_ms
            ));
        }
        if self.drop_pulse.duration_ms == 0 {
            errors.push("drop_pulse.duration_ms must be > 0".into());
        }
        if !self.drop_pulse.peak_scale.is_finite() || self.drop_pulse.peak_scale <= 0.0 {
            errors.push(format!(
                "drop_pulse.peak_scale must be finite and > 0, got {}",
                self.drop_pulse.peak_scale
            ));
        }
        if self.taps.window_ms == 0 {
            errors.push("taps.window_ms must be > 0".into());
        }

        errors
    }

    /// Validate, turning problems into a [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Haptic timings for the feedback coordinator.
    pub fn haptic_pattern(&self) -> HapticPattern {
        HapticPattern {
            interval: Duration::from_millis(self.haptics.interval_ms),
            pulse: Duration::from_millis(self.haptics.pulse_ms),
            burst: self
                .haptics
                .burst_ms
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
            clock: self.haptics.clock,
        }
    }

    pub fn drop_pulse_duration(&self) -> Duration {
        Duration::from_millis(self.drop_pulse.duration_ms)
    }

    pub fn tap_detector(&self) -> TapDetector {
        TapDetector::new(
            Duration::from_millis(self.taps.window_ms),
            self.taps.tolerance_px,
        )
    }
}

/// Errors that can occur when loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
