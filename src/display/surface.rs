// src/display/surface.rs
//! DisplaySurface - the stateful framebuffer engine.
//!
//! Owns the configuration, the active `PixelBuffer`, orientation, brightness,
//! vsync pacing and metrics, and talks to the backend only through
//! `DisplayDriver::handle_request`.
//!
//! ## States
//! `Uninitialized → Initialized → ShuttingDown → Uninitialized`. Re-running
//! `init` while initialized reconfigures in place. Every drawing, metrics and
//! present call made outside `Initialized` fails with `NotInitialized` and has
//! no side effects.

use crate::color::Color;
use crate::config::{DisplayConfig, MetricsConfig, PixelFormat, Rotation};
use crate::display::driver::DisplayDriver;
use crate::display::drivers::{HeadlessDisplayDriver, HeadlessProbe};
use crate::display::events::{EventGate, EventSender};
use crate::display::messages::{DisplayEvent, DriverError, DriverRequest, DriverResponse, Frame};
use crate::display::vsync::VsyncPacer;
use crate::error::{DisplayError, Result};
use crate::geometry::Rect;
use crate::metrics::{DisplayMetrics, MetricsTracker};
use crate::pixel_buffer::PixelBuffer;
use crate::primitives;
use log::{debug, info, trace, warn};
use std::path::Path;
use std::time::Instant;

/// Returned by `get_backend_info` before the first successful `init`.
pub const NO_BACKEND: &str = "uninitialized";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    Initialized,
    ShuttingDown,
}

/// Static description of the active display.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayInfo {
    /// Logical width, after rotation.
    pub width: u32,
    /// Logical height, after rotation.
    pub height: u32,
    pub density: f32,
    pub refresh_rate: f32,
    /// Bits per pixel of the active format.
    pub color_depth: u32,
    pub hdr_supported: bool,
}

#[derive(Debug, Clone)]
struct BackendDetails {
    name: String,
    density: f32,
    hdr_supported: bool,
}

/// Everything that only exists between `init` and `shutdown`.
struct Active {
    /// Width and height here are physical, unrotated.
    config: DisplayConfig,
    /// Logical orientation. `None` only while a frame is out with the driver.
    buffer: Option<PixelBuffer>,
    rotation: Rotation,
    brightness: f32,
    debug_overlay: bool,
    pacer: VsyncPacer,
    metrics: MetricsTracker,
    backend: BackendDetails,
}

impl Active {
    fn buffer(&self) -> Result<&PixelBuffer> {
        self.buffer.as_ref().ok_or(DisplayError::NotInitialized)
    }

    fn logical_size(&self) -> (u32, u32) {
        oriented(self.config.width, self.config.height, self.rotation)
    }
}

/// Logical size of a physical `width` x `height` display under `rotation`.
fn oriented(width: u32, height: u32, rotation: Rotation) -> (u32, u32) {
    if rotation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    }
}

pub struct DisplaySurface {
    driver: Box<dyn DisplayDriver>,
    state: SurfaceState,
    active: Option<Active>,
    gate: EventGate,
    metrics_config: MetricsConfig,
}

impl DisplaySurface {
    /// Wraps a backend. The surface starts uninitialized.
    pub fn new(driver: Box<dyn DisplayDriver>) -> Self {
        Self::with_metrics_config(driver, MetricsConfig::default())
    }

    pub fn with_metrics_config(driver: Box<dyn DisplayDriver>, metrics_config: MetricsConfig) -> Self {
        Self {
            driver,
            state: SurfaceState::Uninitialized,
            active: None,
            gate: EventGate::new(),
            metrics_config,
        }
    }

    /// A surface over the headless backend, plus the probe that scripts it.
    pub fn headless() -> (Self, HeadlessProbe) {
        let driver = HeadlessDisplayDriver::new();
        let probe = driver.probe();
        (Self::new(Box::new(driver)), probe)
    }

    fn active(&self) -> Result<&Active> {
        self.active.as_ref().ok_or(DisplayError::NotInitialized)
    }

    fn active_mut(&mut self) -> Result<&mut Active> {
        self.active.as_mut().ok_or(DisplayError::NotInitialized)
    }

    fn ensure_initialized(&self) -> Result<()> {
        self.active().map(|_| ())
    }

    // --- Lifecycle ---

    /// Initializes, or reconfigures an initialized surface.
    ///
    /// The configuration is validated and the new buffer allocated before the
    /// old state is released, so a failed call leaves the surface as it was.
    pub fn init(&mut self, config: DisplayConfig) -> Result<()> {
        config.validate()?;
        if self.active.is_some() {
            info!(
                "DisplaySurface: reconfiguring to {}x{} {:?}",
                config.width, config.height, config.pixel_format
            );
        } else {
            info!(
                "DisplaySurface: initializing {}x{} {:?} @ {}Hz",
                config.width, config.height, config.pixel_format, config.refresh_rate
            );
        }

        let response = self
            .driver
            .handle_request(DriverRequest::Init(config.clone()))
            .map_err(|e| e.kind)?;
        let (config, backend) = match response {
            DriverResponse::InitComplete {
                width_px,
                height_px,
                density,
                hdr_supported,
                backend,
            } => {
                if width_px == 0 || height_px == 0 {
                    return Err(DisplayError::InitFailed(format!(
                        "backend reported a {}x{} window",
                        width_px, height_px
                    )));
                }
                let details = BackendDetails {
                    name: backend,
                    density,
                    hdr_supported,
                };
                (
                    DisplayConfig {
                        width: width_px,
                        height: height_px,
                        ..config
                    },
                    details,
                )
            }
            other => {
                return Err(DisplayError::InitFailed(format!(
                    "expected InitComplete, got {:?}",
                    other
                )))
            }
        };

        let buffer = PixelBuffer::new(config.width, config.height, config.pixel_format)?;
        let pacer = VsyncPacer::new(config.refresh_rate, config.vsync);
        info!(
            "DisplaySurface: initialized on {} backend, {} byte framebuffer (pitch {})",
            backend.name,
            buffer.len_bytes(),
            buffer.pitch()
        );

        self.active = Some(Active {
            config,
            buffer: Some(buffer),
            rotation: Rotation::Deg0,
            brightness: 1.0,
            debug_overlay: false,
            pacer,
            metrics: MetricsTracker::new(self.metrics_config.window_size),
            backend,
        });
        self.gate.reset();
        self.state = SurfaceState::Initialized;
        Ok(())
    }

    /// Releases the framebuffer and returns to `Uninitialized`. A second call is a no-op.
    pub fn shutdown(&mut self) {
        if self.active.is_none() {
            debug!("DisplaySurface: shutdown while uninitialized, nothing to do");
            return;
        }
        self.state = SurfaceState::ShuttingDown;
        info!("DisplaySurface: shutting down");
        match self.driver.handle_request(DriverRequest::Release) {
            Ok(_) => {}
            Err(e) => warn!("DisplaySurface: backend release failed: {}", e),
        }
        self.active = None;
        self.gate.reset();
        self.state = SurfaceState::Uninitialized;
    }

    pub fn is_initialized(&self) -> bool {
        self.state == SurfaceState::Initialized
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    // --- Queries ---

    /// Logical dimensions: width and height trade places at 90 and 270 degrees.
    pub fn get_dimensions(&self) -> Result<(u32, u32)> {
        Ok(self.active()?.logical_size())
    }

    pub fn get_info(&self) -> Result<DisplayInfo> {
        let active = self.active()?;
        let (width, height) = active.logical_size();
        Ok(DisplayInfo {
            width,
            height,
            density: active.backend.density,
            refresh_rate: active.config.refresh_rate as f32,
            color_depth: active.config.pixel_format.bits_per_pixel(),
            hdr_supported: active.backend.hdr_supported,
        })
    }

    /// The configuration in effect, with the physical size the backend settled on.
    pub fn config(&self) -> Result<&DisplayConfig> {
        Ok(&self.active()?.config)
    }

    pub fn get_backend_info(&self) -> &str {
        match &self.active {
            Some(active) => &active.backend.name,
            None => NO_BACKEND,
        }
    }

    /// Raw framebuffer bytes for zero-copy handoff. The slice length is `pitch * height`.
    pub fn framebuffer(&self) -> Result<&[u8]> {
        Ok(self.active()?.buffer()?.as_bytes())
    }

    pub fn framebuffer_mut(&mut self) -> Result<&mut [u8]> {
        let buffer = self
            .active_mut()?
            .buffer
            .as_mut()
            .ok_or(DisplayError::NotInitialized)?;
        Ok(buffer.as_bytes_mut())
    }

    pub fn pitch(&self) -> Result<u32> {
        Ok(self.active()?.buffer()?.pitch())
    }

    pub fn pixel_format(&self) -> Result<PixelFormat> {
        Ok(self.active()?.buffer()?.format())
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Color> {
        Ok(self.active()?.buffer()?.get_pixel(x, y))
    }

    // --- Drawing ---

    /// Runs a primitive against the buffer and charges its wall time to the frame.
    fn draw<R>(&mut self, f: impl FnOnce(&mut PixelBuffer) -> R) -> Result<R> {
        let active = self.active_mut()?;
        let buffer = active.buffer.as_mut().ok_or(DisplayError::NotInitialized)?;
        let start = Instant::now();
        let out = f(buffer);
        active.metrics.add_render_time(start.elapsed());
        Ok(out)
    }

    pub fn clear(&mut self, color: Color) -> Result<()> {
        self.draw(|buf| primitives::clear(buf, color))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> Result<()> {
        self.draw(|buf| primitives::set_pixel(buf, x, y, color))
    }

    pub fn fill_rect(&mut self, rect: &Rect, color: Color) -> Result<()> {
        self.draw(|buf| primitives::fill_rect(buf, rect, color))
    }

    pub fn draw_line(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Color) -> Result<()> {
        self.draw(|buf| primitives::draw_line(buf, x0, y0, x1, y1, color))
    }

    /// Copies RGBA8888 `data` with row stride `pitch` to `(x, y)`, clipping at the edges.
    pub fn blit(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        data: &[u8],
        pitch: u32,
    ) -> Result<()> {
        self.draw(|buf| primitives::blit(buf, x, y, width, height, data, pitch))?
    }

    // --- Presentation ---

    /// Lends the buffer to the driver inside a `Frame` and takes it back.
    ///
    /// If the driver fails without returning the frame, a cleared buffer of the
    /// same geometry takes its place so the surface stays usable.
    fn exchange_frame(
        &mut self,
        frame_number: u64,
        overlay: Option<DisplayMetrics>,
        request: impl FnOnce(Frame) -> DriverRequest,
    ) -> Result<()> {
        let active = self.active.as_mut().ok_or(DisplayError::NotInitialized)?;
        let buffer = active.buffer.take().ok_or(DisplayError::NotInitialized)?;
        let (width, height, format) = (buffer.width(), buffer.height(), buffer.format());
        let frame = Frame {
            buffer,
            frame_number,
            rotation: active.rotation,
            brightness: active.brightness,
            overlay,
        };

        let (returned, outcome) = match self.driver.handle_request(request(frame)) {
            Ok(DriverResponse::PresentComplete(frame)) | Ok(DriverResponse::ScreenshotSaved(frame)) => {
                (Some(frame), Ok(()))
            }
            Ok(other) => (
                None,
                Err(DisplayError::DeviceNotAvailable(format!(
                    "unexpected driver response {:?}",
                    other
                ))),
            ),
            Err(DriverError { kind, frame }) => (frame, Err(kind)),
        };

        active.buffer = match returned {
            Some(frame) => Some(frame.buffer),
            None => {
                warn!("DisplaySurface: driver kept the framebuffer, reallocating");
                Some(PixelBuffer::new(width, height, format)?)
            }
        };
        outcome
    }

    /// Publishes the current framebuffer.
    ///
    /// Samples metrics, hands the buffer to the backend, then, with vsync on,
    /// blocks until one refresh interval has passed since the previous present.
    /// Pixel content is never modified.
    pub fn present(&mut self) -> Result<()> {
        let interval = self.metrics_config.overlay_log_interval.max(1);
        let active = self.active_mut()?;
        let frame_number = active.metrics.record_present(Instant::now());
        let overlay = if active.debug_overlay {
            let bytes = active.buffer()?.len_bytes();
            let snapshot = active.metrics.snapshot(bytes);
            if frame_number % interval == 0 {
                debug!(
                    "frame {}: {:.1} fps, {:.2}ms frame, {:.2}ms render, {} bytes",
                    snapshot.frame_count,
                    snapshot.fps,
                    snapshot.frame_time_ms,
                    snapshot.render_time_ms,
                    snapshot.memory_usage_bytes
                );
            }
            Some(snapshot)
        } else {
            None
        };
        trace!("DisplaySurface: present #{}", frame_number);

        self.exchange_frame(frame_number, overlay, DriverRequest::Present)?;

        if let Some(active) = self.active.as_mut() {
            active.pacer.wait();
        }
        Ok(())
    }

    /// Hands the current frame to the backend to encode at `path`.
    pub fn screenshot(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let frame_number = self.active()?.metrics.frame_count();
        info!("DisplaySurface: screenshot to {}", path.display());
        self.exchange_frame(frame_number, None, |frame| DriverRequest::Screenshot {
            path,
            frame,
        })
    }

    // --- Events ---

    /// Polls the backend once and absorbs the result. Returns `false` once a
    /// close has been requested. A pending resize reallocates the buffer here.
    pub fn handle_events(&mut self) -> Result<bool> {
        self.ensure_initialized()?;
        let events = match self
            .driver
            .handle_request(DriverRequest::PollEvents)
            .map_err(|e| e.kind)?
        {
            DriverResponse::Events(events) => events,
            other => {
                warn!("DisplaySurface: expected Events, got {:?}", other);
                Vec::new()
            }
        };
        self.gate.absorb(events);
        let posted = self.gate.drain_posted();
        self.gate.absorb(posted);

        if let Some((width, height)) = self.gate.take_resize() {
            self.apply_resize(width, height)?;
        }
        Ok(!self.gate.should_close())
    }

    fn apply_resize(&mut self, width: u32, height: u32) -> Result<()> {
        let active = self.active_mut()?;
        if (active.config.width, active.config.height) == (width, height) {
            return Ok(());
        }
        let (lw, lh) = oriented(width, height, active.rotation);
        let resized = active.buffer()?.resized(lw, lh)?;
        debug!(
            "DisplaySurface: resize {}x{} -> {}x{} (logical {}x{})",
            active.config.width, active.config.height, width, height, lw, lh
        );
        active.config.width = width;
        active.config.height = height;
        active.buffer = Some(resized);
        Ok(())
    }

    /// The latched close flag. Does not poll.
    pub fn should_close(&self) -> bool {
        self.gate.should_close()
    }

    /// Input events observed by `handle_events` since the last call.
    pub fn take_events(&mut self) -> Vec<DisplayEvent> {
        self.gate.take_events()
    }

    /// A handle other threads can use to feed events into `handle_events`.
    pub fn event_sender(&self) -> EventSender {
        self.gate.sender()
    }

    // --- Metrics ---

    pub fn get_metrics(&self) -> Result<DisplayMetrics> {
        let active = self.active()?;
        Ok(active.metrics.snapshot(active.buffer()?.len_bytes()))
    }

    pub fn reset_metrics(&mut self) -> Result<()> {
        debug!("DisplaySurface: metrics reset");
        self.active_mut()?.metrics.reset();
        Ok(())
    }

    // --- Configuration ---

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.ensure_initialized()?;
        self.driver
            .handle_request(DriverRequest::SetTitle(title.to_string()))
            .map_err(|e| e.kind)?;
        self.active_mut()?.config.title = title.to_string();
        Ok(())
    }

    /// Stores brightness clamped to `[0.0, 1.0]`. NaN is rejected.
    pub fn set_brightness(&mut self, brightness: f32) -> Result<()> {
        let active = self.active_mut()?;
        if brightness.is_nan() {
            return Err(DisplayError::InvalidParameter(
                "brightness must be a number".to_string(),
            ));
        }
        active.brightness = brightness.clamp(0.0, 1.0);
        debug!("DisplaySurface: brightness {:.2}", active.brightness);
        Ok(())
    }

    pub fn get_brightness(&self) -> Result<f32> {
        Ok(self.active()?.brightness)
    }

    /// Sets the orientation. Only 0, 90, 180 and 270 are accepted.
    ///
    /// The buffer is re-mapped so the image on the physical display stays put;
    /// at 90 and 270 the logical width and height swap.
    pub fn set_rotation(&mut self, degrees: i32) -> Result<()> {
        let active = self.active_mut()?;
        let rotation = Rotation::from_degrees(degrees)?;
        if rotation == active.rotation {
            return Ok(());
        }
        let turns = (active.rotation.quarter_turns() + 4 - rotation.quarter_turns()) % 4;
        let remapped = active.buffer()?.rotated_clockwise(turns)?;
        debug!(
            "DisplaySurface: rotation {} -> {} degrees, logical {}x{}",
            active.rotation.degrees(),
            rotation.degrees(),
            remapped.width(),
            remapped.height()
        );
        active.buffer = Some(remapped);
        active.rotation = rotation;
        Ok(())
    }

    pub fn get_rotation(&self) -> Result<i32> {
        Ok(self.active()?.rotation.degrees())
    }

    pub fn set_vsync(&mut self, enabled: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.driver
            .handle_request(DriverRequest::SetVsync(enabled))
            .map_err(|e| e.kind)?;
        self.active_mut()?.pacer.set_enabled(enabled);
        debug!("DisplaySurface: vsync {}", enabled);
        Ok(())
    }

    /// Current vsync flag, which may differ from the config after `set_vsync`.
    pub fn vsync(&self) -> Result<bool> {
        Ok(self.active()?.pacer.enabled())
    }

    pub fn set_debug_overlay(&mut self, enabled: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.driver
            .handle_request(DriverRequest::SetDebugOverlay(enabled))
            .map_err(|e| e.kind)?;
        self.active_mut()?.debug_overlay = enabled;
        Ok(())
    }

    pub fn debug_overlay(&self) -> Result<bool> {
        Ok(self.active()?.debug_overlay)
    }
}

impl Drop for DisplaySurface {
    fn drop(&mut self) {
        if self.active.is_some() {
            debug!("DisplaySurface dropped while initialized");
            self.shutdown();
        }
    }
}
