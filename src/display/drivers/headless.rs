//! Headless display driver.
//!
//! Accepts every request without a window. Events are scripted through a
//! `HeadlessProbe`, which also exposes what the driver was asked to do, so the
//! same driver serves the demo binary and the test suites.

use crate::color::Color;
use crate::config::{DisplayConfig, PixelFormat, Rotation};
use crate::display::driver::DisplayDriver;
use crate::display::messages::{DisplayEvent, DriverError, DriverRequest, DriverResponse, Frame};
use crate::error::DisplayError;
use crate::metrics::DisplayMetrics;
use crate::pixel_buffer::codec;
use log::{debug, info, trace};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

pub const BACKEND_NAME: &str = "Headless";

/// Copy of the most recently presented frame.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub frame_number: u64,
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub format: PixelFormat,
    pub rotation: Rotation,
    pub brightness: f32,
    pub overlay: Option<DisplayMetrics>,
    /// Pixel bytes, only when frame capture is enabled on the probe.
    pub pixels: Option<Vec<u8>>,
    /// Row-major colors as a screen would show them, brightness applied.
    /// Only when frame capture is enabled on the probe.
    pub scanout: Option<Vec<Color>>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    config: Option<DisplayConfig>,
    pending_events: VecDeque<DisplayEvent>,
    presents: u64,
    last_frame: Option<CapturedFrame>,
    capture_pixels: bool,
    vsync: bool,
    debug_overlay: bool,
    screenshots: Vec<PathBuf>,
    fail_next: Option<DisplayError>,
    drop_frame_on_failure: bool,
    releases: u64,
}

fn lock(state: &Mutex<HeadlessState>) -> Result<MutexGuard<'_, HeadlessState>, DisplayError> {
    state
        .lock()
        .map_err(|_| DisplayError::DeviceNotAvailable("headless state poisoned".to_string()))
}

pub struct HeadlessDisplayDriver {
    state: Arc<Mutex<HeadlessState>>,
    density: f32,
}

impl Default for HeadlessDisplayDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDisplayDriver {
    pub fn new() -> Self {
        info!("HeadlessDisplayDriver::new()");
        Self {
            state: Arc::new(Mutex::new(HeadlessState::default())),
            density: 1.0,
        }
    }

    /// A handle for scripting events and inspecting driver activity.
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: Arc::clone(&self.state),
        }
    }

    fn fail(state: &mut HeadlessState, frame: Option<Frame>, kind: DisplayError) -> DriverError {
        match frame {
            Some(frame) if !state.drop_frame_on_failure => DriverError::with_frame(kind, frame),
            _ => DriverError::from(kind),
        }
    }
}

impl DisplayDriver for HeadlessDisplayDriver {
    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DriverError> {
        let mut state = lock(&self.state)?;

        if let Some(kind) = state.fail_next.take() {
            debug!("HeadlessDisplayDriver: injected failure {:?}", kind);
            let frame = match request {
                DriverRequest::Present(frame) => Some(frame),
                DriverRequest::Screenshot { frame, .. } => Some(frame),
                _ => None,
            };
            return Err(Self::fail(&mut state, frame, kind));
        }

        match request {
            DriverRequest::Init(config) => {
                info!(
                    "HeadlessDisplayDriver: Init {}x{} @ {}Hz '{}'",
                    config.width, config.height, config.refresh_rate, config.title
                );
                let response = DriverResponse::InitComplete {
                    width_px: config.width,
                    height_px: config.height,
                    density: self.density,
                    hdr_supported: false,
                    backend: BACKEND_NAME.to_string(),
                };
                state.vsync = config.vsync;
                state.config = Some(config);
                Ok(response)
            }
            DriverRequest::PollEvents => Ok(DriverResponse::Events(
                state.pending_events.drain(..).collect(),
            )),
            DriverRequest::Present(frame) => {
                trace!("HeadlessDisplayDriver: Present #{}", frame.frame_number);
                state.presents += 1;
                let capture = state.capture_pixels;
                let buffer = &frame.buffer;
                state.last_frame = Some(CapturedFrame {
                    frame_number: frame.frame_number,
                    width: buffer.width(),
                    height: buffer.height(),
                    pitch: buffer.pitch(),
                    format: buffer.format(),
                    rotation: frame.rotation,
                    brightness: frame.brightness,
                    overlay: frame.overlay,
                    pixels: capture.then(|| buffer.as_bytes().to_vec()),
                    scanout: capture.then(|| scanout(&frame)),
                });
                Ok(DriverResponse::PresentComplete(frame))
            }
            DriverRequest::SetTitle(title) => {
                info!("HeadlessDisplayDriver: SetTitle '{}'", title);
                if let Some(config) = state.config.as_mut() {
                    config.title = title;
                }
                Ok(DriverResponse::TitleSet)
            }
            DriverRequest::SetVsync(enabled) => {
                debug!("HeadlessDisplayDriver: SetVsync {}", enabled);
                state.vsync = enabled;
                Ok(DriverResponse::VsyncSet)
            }
            DriverRequest::SetDebugOverlay(enabled) => {
                debug!("HeadlessDisplayDriver: SetDebugOverlay {}", enabled);
                state.debug_overlay = enabled;
                Ok(DriverResponse::DebugOverlaySet)
            }
            DriverRequest::Screenshot { path, frame } => {
                info!("HeadlessDisplayDriver: Screenshot -> {}", path.display());
                match write_ppm(&path, &frame) {
                    Ok(()) => {
                        state.screenshots.push(path);
                        Ok(DriverResponse::ScreenshotSaved(frame))
                    }
                    Err(e) => {
                        let kind = DisplayError::ScreenshotFailed(format!(
                            "{}: {}",
                            path.display(),
                            e
                        ));
                        Err(Self::fail(&mut state, Some(frame), kind))
                    }
                }
            }
            DriverRequest::Release => {
                info!("HeadlessDisplayDriver: Release");
                state.config = None;
                state.pending_events.clear();
                state.releases += 1;
                Ok(DriverResponse::Released)
            }
        }
    }
}

/// Decodes every pixel and dims it by the frame's brightness. The buffer is not modified.
fn scanout(frame: &Frame) -> Vec<Color> {
    let buffer = &frame.buffer;
    let bpp = buffer.bytes_per_pixel();
    let mut colors = Vec::with_capacity(buffer.width() as usize * buffer.height() as usize);
    for y in 0..buffer.height() {
        let Some(row) = buffer.row(y) else { continue };
        colors.extend(
            row.chunks_exact(bpp)
                .map(|px| codec::decode(buffer.format(), px).scaled(frame.brightness)),
        );
    }
    colors
}

/// Writes the frame as binary PPM (P6). Alpha is dropped; brightness and
/// rotation are not applied, so the file holds exactly what was drawn.
fn write_ppm(path: &Path, frame: &Frame) -> std::io::Result<()> {
    let buffer = &frame.buffer;
    let bpp = buffer.bytes_per_pixel();
    let mut out = BufWriter::new(File::create(path)?);

    write!(out, "P6\n{} {}\n255\n", buffer.width(), buffer.height())?;
    let mut rgb = Vec::with_capacity(buffer.width() as usize * 3);
    for y in 0..buffer.height() {
        let Some(row) = buffer.row(y) else { continue };
        rgb.clear();
        for px in row.chunks_exact(bpp) {
            let c = codec::decode(buffer.format(), px);
            rgb.extend_from_slice(&[c.r, c.g, c.b]);
        }
        out.write_all(&rgb)?;
    }
    out.flush()
}

/// Shared view into a `HeadlessDisplayDriver`.
#[derive(Clone)]
pub struct HeadlessProbe {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessProbe {
    fn with<R>(&self, f: impl FnOnce(&mut HeadlessState) -> R) -> R {
        // The state holds plain counters and queues, still consistent after a poisoning panic.
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Queues an event for the next `PollEvents`.
    pub fn push_event(&self, event: DisplayEvent) {
        self.with(|s| s.pending_events.push_back(event));
    }

    /// Makes the next request of any kind fail with `kind`.
    pub fn fail_next(&self, kind: DisplayError) {
        self.with(|s| s.fail_next = Some(kind));
    }

    /// When set, injected failures drop the frame instead of returning it.
    pub fn drop_frame_on_failure(&self, drop: bool) {
        self.with(|s| s.drop_frame_on_failure = drop);
    }

    /// Copy pixel bytes and the brightness-applied scanout into `last_frame` on every present.
    pub fn capture_pixels(&self, capture: bool) {
        self.with(|s| s.capture_pixels = capture);
    }

    pub fn presents(&self) -> u64 {
        self.with(|s| s.presents)
    }

    pub fn last_frame(&self) -> Option<CapturedFrame> {
        self.with(|s| s.last_frame.clone())
    }

    /// The configuration of the current window, `None` while released.
    pub fn config(&self) -> Option<DisplayConfig> {
        self.with(|s| s.config.clone())
    }

    pub fn vsync(&self) -> bool {
        self.with(|s| s.vsync)
    }

    pub fn debug_overlay(&self) -> bool {
        self.with(|s| s.debug_overlay)
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.with(|s| s.screenshots.clone())
    }

    pub fn releases(&self) -> u64 {
        self.with(|s| s.releases)
    }
}
