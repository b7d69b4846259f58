//! Step timing helpers.
//!
//! `ProfilerScope` measures a region with RAII and reports it at trace level
//! when dropped; `FrameTimer` keeps the last and smoothed step times.

use std::time::Instant;
use tracing::trace;

/// A profiling scope that measures elapsed time using RAII.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Starts timing a named region.
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        trace!("{} took {:.3} ms", self.name, self.elapsed_ms());
    }
}

/// Smoothing factor for the moving average
const SMOOTHING: f64 = 0.1;

/// Frame timer for tracking step cost.
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    last_frame_time_ms: f64,
    average_frame_time_ms: f64,
    samples: u64,
}

impl FrameTimer {
    /// Creates an empty timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame time in milliseconds.
    pub fn record(&mut self, time_ms: f64) {
        self.last_frame_time_ms = time_ms;
        self.average_frame_time_ms = if self.samples == 0 {
            time_ms
        } else {
            self.average_frame_time_ms + SMOOTHING * (time_ms - self.average_frame_time_ms)
        };
        self.samples += 1;
    }

    /// Last recorded frame time.
    pub fn last_frame_time_ms(&self) -> f64 {
        self.last_frame_time_ms
    }

    /// Exponential moving average of recorded frame times.
    pub fn average_frame_time_ms(&self) -> f64 {
        self.average_frame_time_ms
    }

    /// Number of frames recorded.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}
