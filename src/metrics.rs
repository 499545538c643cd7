// src/metrics.rs

//! Rolling frame statistics sampled once per present.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Snapshot of the performance counters, as returned by `DisplaySurface::get_metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayMetrics {
    /// Presents since init or the last reset.
    pub frame_count: u64,
    /// Frames per second over the sliding window.
    pub fps: f32,
    /// Time between the two most recent presents.
    pub frame_time_ms: f32,
    /// Time spent in drawing primitives since the last present.
    pub render_time_ms: f32,
    /// Pixel storage plus bookkeeping.
    pub memory_usage_bytes: u64,
}

/// Tracks present timestamps in a fixed-size ring.
///
/// Timestamps are passed in rather than read from the clock so the statistics
/// can be driven deterministically.
#[derive(Debug, Clone)]
pub struct MetricsTracker {
    window: VecDeque<Instant>,
    window_size: usize,
    frame_count: u64,
    frame_time: Duration,
    render_time: Duration,
}

impl MetricsTracker {
    pub const MIN_WINDOW: usize = 2;

    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(Self::MIN_WINDOW);
        Self {
            window: VecDeque::with_capacity(window_size),
            window_size,
            frame_count: 0,
            frame_time: Duration::ZERO,
            render_time: Duration::ZERO,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Adds wall-clock time spent inside a drawing primitive.
    pub fn add_render_time(&mut self, elapsed: Duration) {
        self.render_time += elapsed;
    }

    /// Samples one present at `now`. Returns the new frame count.
    pub fn record_present(&mut self, now: Instant) -> u64 {
        self.frame_time = match self.window.back() {
            Some(&prev) => now.saturating_duration_since(prev),
            None => Duration::ZERO,
        };
        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(now);

        self.render_time = Duration::ZERO;
        self.frame_count += 1;
        self.frame_count
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second across the window: intervals observed over the time they span.
    pub fn fps(&self) -> f32 {
        let (Some(first), Some(last)) = (self.window.front(), self.window.back()) else {
            return 0.0;
        };
        let span = last.saturating_duration_since(*first).as_secs_f64();
        if self.window.len() < 2 || span <= 0.0 {
            return 0.0;
        }
        ((self.window.len() - 1) as f64 / span) as f32
    }

    /// Bytes held by the tracker itself.
    pub fn footprint_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.window.capacity() * std::mem::size_of::<Instant>()
    }

    pub fn snapshot(&self, buffer_bytes: usize) -> DisplayMetrics {
        DisplayMetrics {
            frame_count: self.frame_count,
            fps: self.fps(),
            frame_time_ms: duration_ms(self.frame_time),
            render_time_ms: duration_ms(self.render_time),
            memory_usage_bytes: (buffer_bytes + self.footprint_bytes()) as u64,
        }
    }

    /// Zeroes counters and clears the window. Drawing state is not touched.
    pub fn reset(&mut self) {
        self.window.clear();
        self.frame_count = 0;
        self.frame_time = Duration::ZERO;
        self.render_time = Duration::ZERO;
    }
}

fn duration_ms(d: Duration) -> f32 {
    (d.as_secs_f64() * 1000.0) as f32
}
