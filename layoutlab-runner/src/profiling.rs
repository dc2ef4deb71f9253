//! Timing instrumentation for pipeline phases.
//!
//! Two ways to time a piece of work:
//! - [`ProfileScope`]: a guard that logs its lifetime on drop
//! - [`profile`]: run a closure and get its result plus duration
//!
//! Both emit `debug!` events on the `layoutlab_runner::profiling` target, so
//! `RUST_LOG=layoutlab_runner::profiling=debug` shows every timed phase.
//!
//! # Usage
//!
//! ```
//! use layoutlab_runner::profiling::ProfileScope;
//!
//! fn expensive_operation() {
//!     let _scope = ProfileScope::new("expensive_operation");
//!     // Work happens here...
//!     // Timing logged on drop
//! }
//! ```

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

/// A profiling scope that measures execution time.
///
/// On drop, logs the duration at debug level.
pub struct ProfileScope {
    name: &'static str,
    start: Instant,
}

impl ProfileScope {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Get elapsed time without dropping the scope.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        debug!(scope = self.name, elapsed_ms = millis(self.start.elapsed()), "scope finished");
    }
}

/// Profile a closure and return its result along with duration.
///
/// ```
/// use layoutlab_runner::profiling::profile;
///
/// let (result, duration) = profile("expensive_calc", || 42);
/// assert_eq!(result, 42);
/// let _ = duration;
/// ```
pub fn profile<F, R>(name: &'static str, f: F) -> (R, Duration)
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let result = f();
    let duration = start.elapsed();
    debug!(scope = name, elapsed_ms = millis(duration), "profiled");
    (result, duration)
}

/// Duration as fractional milliseconds.
#[inline]
pub fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Aggregate of repeated runs of the same phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Timing {
    pub runs: usize,
    pub best_ms: f64,
    pub mean_ms: f64,
}

impl Timing {
    /// Summarize a set of durations. Empty input gives a zeroed timing.
    pub fn from_durations(durations: &[Duration]) -> Self {
        if durations.is_empty() {
            return Self::default();
        }
        let ms: Vec<f64> = durations.iter().copied().map(millis).collect();
        let best_ms = ms.iter().copied().fold(f64::INFINITY, f64::min);
        let mean_ms = ms.iter().sum::<f64>() / ms.len() as f64;
        Self {
            runs: ms.len(),
            best_ms,
            mean_ms,
        }
    }
}
