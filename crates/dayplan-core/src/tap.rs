#![forbid(unsafe_code)]

//! Double-tap recognition from raw taps.
//!
//! Two taps on the same token, within the multi-tap window and the position
//! tolerance, form a double tap. The pair is consumed: a third tap starts a
//! new sequence rather than producing a second double tap.

use web_time::{Duration, Instant};

use crate::board::TokenId;
use crate::geometry::Point;

/// Default time window between the two taps.
pub const DEFAULT_DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);

/// Default positional tolerance (manhattan distance, pixels).
pub const DEFAULT_TAP_TOLERANCE: u32 = 24;

#[derive(Debug, Clone, Copy)]
struct LastTap {
    token: TokenId,
    pos: Point,
    time: Instant,
}

/// Stateful double-tap detector.
#[derive(Debug, Clone)]
pub struct TapDetector {
    window: Duration,
    tolerance: u32,
    last: Option<LastTap>,
}

impl Default for TapDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_TAP_WINDOW, DEFAULT_TAP_TOLERANCE)
    }
}

impl TapDetector {
    #[must_use]
    pub const fn new(window: Duration, tolerance: u32) -> Self {
        Self {
            window,
            tolerance,
            last: None,
        }
    }

    /// Feed one tap. Returns `true` when it completes a double tap.
    pub fn on_tap(&mut self, token: TokenId, pos: Point, now: Instant) -> bool {
        if let Some(last) = self.last.take()
            && last.token == token
            && now.saturating_duration_since(last.time) <= self.window
            && last.pos.manhattan(pos) <= self.tolerance
        {
            return true;
        }
        self.last = Some(LastTap {
            token,
            pos,
            time: now,
        });
        false
    }

    /// Forget any pending first tap.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
