// src/display/vsync.rs
//! Present pacing.
//!
//! With vsync enabled a present may not complete sooner than one refresh
//! interval after the previous one; the caller's thread sleeps for the
//! remainder. The first present after enabling never waits.
//!
//! TODO: Let backends with a real vblank signal (DRM, CVDisplayLink) drive the
//! wait instead of `thread::sleep`.

use log::{debug, trace};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct VsyncPacer {
    enabled: bool,
    interval: Duration,
    last_release: Option<Instant>,
}

impl VsyncPacer {
    /// `refresh_rate` must be non-zero; `DisplayConfig::validate` guarantees it.
    pub fn new(refresh_rate: u32, enabled: bool) -> Self {
        let interval = Duration::from_secs_f64(1.0 / refresh_rate.max(1) as f64);
        debug!(
            "VsyncPacer: {} Hz ({:.2}ms interval), enabled={}",
            refresh_rate,
            interval.as_secs_f64() * 1000.0,
            enabled
        );
        Self {
            enabled,
            interval,
            last_release: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.last_release = None;
        }
        self.enabled = enabled;
    }

    /// Earliest instant the next present may return, if pacing applies.
    pub fn deadline(&self) -> Option<Instant> {
        if !self.enabled {
            return None;
        }
        self.last_release.map(|t| t + self.interval)
    }

    /// Blocks until the refresh interval since the previous present has elapsed.
    /// Returns how long the call slept.
    pub fn wait(&mut self) -> Duration {
        if !self.enabled {
            return Duration::ZERO;
        }
        let mut slept = Duration::ZERO;
        if let Some(deadline) = self.deadline() {
            let now = Instant::now();
            if deadline > now {
                slept = deadline - now;
                trace!("VsyncPacer: sleeping {:?}", slept);
                thread::sleep(slept);
            }
        }
        self.last_release = Some(Instant::now());
        slept
    }
}
