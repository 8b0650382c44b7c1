#![forbid(unsafe_code)]

//! Haptic driver that queues `navigator.vibrate` patterns for the JS host.
//!
//! The haptic loop runs on its own timer, so patterns are buffered here and
//! drained by the host on its next frame.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use dayplan_core::haptics::HapticDriver;
use web_time::Duration;

/// Patterns held before the oldest is dropped.
const MAX_PENDING: usize = 64;

/// Queue of vibration patterns in milliseconds.
#[derive(Debug, Default)]
pub struct VibrationQueue {
    available: AtomicBool,
    pending: Mutex<VecDeque<Vec<u32>>>,
}

impl VibrationQueue {
    /// `available` mirrors `'vibrate' in navigator` on the host.
    #[must_use]
    pub fn new(available: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Update availability (e.g. after a permission change).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    /// Take every queued pattern, oldest first.
    pub fn drain(&self) -> Vec<Vec<u32>> {
        match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().map_or(0, |p| p.len())
    }
}

fn to_millis(d: &Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

impl HapticDriver for VibrationQueue {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    fn vibrate(&self, pattern: &[Duration]) {
        let Ok(mut pending) = self.pending.lock() else {
            tracing::warn!("vibration queue poisoned; pattern dropped");
            return;
        };
        if pending.len() == MAX_PENDING {
            pending.pop_front();
        }
        pending.push_back(pattern.iter().map(to_millis).collect());
    }
}
