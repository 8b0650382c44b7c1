#![forbid(unsafe_code)]

//! Cancellable repeating timer.
//!
//! [`RepeatingTimer`] runs a callback on a background thread at a fixed
//! interval until cancelled. Cancellation wakes the thread immediately and
//! joins it, so once [`RepeatingTimer::cancel`] returns the callback can no
//! longer run. Dropping the timer cancels it the same way.
//!
//! Platforms without threads (wasm32 in the browser) make
//! [`RepeatingTimer::spawn`] fail; callers then drive their work from the
//! host clock instead.

use std::io;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use web_time::Duration;

/// Stop flag shared between the owner and the timer thread.
#[derive(Default)]
struct StopFlag {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopFlag {
    fn stop(&self) {
        let mut stopped = self.stopped.lock().unwrap_or_else(|e| e.into_inner());
        *stopped = true;
        self.wake.notify_all();
    }

    /// Sleep for `interval` unless stopped first. Returns `true` if stopped.
    fn wait(&self, interval: Duration) -> bool {
        let stopped = self.stopped.lock().unwrap_or_else(|e| e.into_inner());
        let (stopped, _) = self
            .wake
            .wait_timeout_while(stopped, interval, |stopped| !*stopped)
            .unwrap_or_else(|e| e.into_inner());
        *stopped
    }
}

/// Handle to a running repeating timer.
pub struct RepeatingTimer {
    flag: Arc<StopFlag>,
    thread: Option<thread::JoinHandle<()>>,
}

impl std::fmt::Debug for RepeatingTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepeatingTimer")
            .field("running", &self.is_running())
            .finish()
    }
}

impl RepeatingTimer {
    /// Run `task` every `interval` on a named background thread.
    ///
    /// The first call happens one full interval after spawning.
    pub fn spawn<F>(name: &str, interval: Duration, mut task: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let flag = Arc::new(StopFlag::default());
        let thread_flag = Arc::clone(&flag);
        let handle = thread::Builder::new().name(name.to_owned()).spawn(move || {
            while !thread_flag.wait(interval) {
                task();
            }
        })?;
        Ok(Self {
            flag,
            thread: Some(handle),
        })
    }

    /// Whether a timer thread is attached and not yet cancelled.
    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Stop the timer and wait for its thread to exit.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.flag.stop();
        if let Some(handle) = self.thread.take() {
            let name = handle.thread().name().unwrap_or("timer").to_owned();
            if handle.join().is_err() {
                tracing::warn!(timer = %name, "timer task panicked");
            }
        }
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
