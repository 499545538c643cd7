// src/display/messages.rs
//! Message types for communication between DisplaySurface and DisplayDriver.
//!
//! Pixel storage moves by ownership transfer: the surface hands its buffer to
//! the driver inside a `Frame` and the driver hands it back in the response.
//! Nothing is shared and nothing is copied.

use crate::config::{DisplayConfig, Rotation};
use crate::error::DisplayError;
use crate::keys::{KeySymbol, Modifiers};
use crate::metrics::DisplayMetrics;
use crate::pixel_buffer::PixelBuffer;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// One frame's worth of pixels plus the presentation state a backend needs.
///
/// `buffer` is in logical orientation. Backends rotate by `rotation` and scale
/// by `brightness` when mapping to the physical display; the pixel bytes
/// themselves are never modified on the way.
#[derive(Debug)]
pub struct Frame {
    pub buffer: PixelBuffer,
    pub frame_number: u64,
    pub rotation: Rotation,
    pub brightness: f32,
    /// Metrics to draw on top of the frame, when the debug overlay is on.
    pub overlay: Option<DisplayMetrics>,
}

/// Requests sent from DisplaySurface to DisplayDriver.
#[derive(Debug)]
pub enum DriverRequest {
    /// Create or reconfigure the window. Driver responds with InitComplete.
    Init(DisplayConfig),

    /// Request pending native events. Driver responds with Events.
    PollEvents,

    /// Display the frame. Driver responds with PresentComplete, returning the frame.
    Present(Frame),

    /// Set the window title.
    SetTitle(String),

    /// Tell the backend whether presents are being paced to the refresh rate.
    SetVsync(bool),

    /// Show or hide the backend's diagnostics overlay.
    SetDebugOverlay(bool),

    /// Encode the frame to `path`. Driver responds with ScreenshotSaved, returning the frame.
    Screenshot { path: PathBuf, frame: Frame },

    /// Tear down the window. The driver may receive Init again afterwards.
    Release,
}

/// Responses sent from DisplayDriver to DisplaySurface.
#[derive(Debug)]
pub enum DriverResponse {
    /// Initialization complete with the physical size the backend settled on.
    InitComplete {
        width_px: u32,
        height_px: u32,
        density: f32,
        hdr_supported: bool,
        backend: String,
    },

    /// Native events that occurred since the last poll.
    Events(Vec<DisplayEvent>),

    /// Presentation complete, frame ownership returned for reuse.
    PresentComplete(Frame),

    TitleSet,

    VsyncSet,

    DebugOverlaySet,

    /// Screenshot written, frame ownership returned.
    ScreenshotSaved(Frame),

    Released,
}

/// A failed driver request.
///
/// When the request carried a `Frame`, the driver should hand it back here so
/// the surface keeps its pixel storage.
#[derive(Error, Debug)]
#[error("{kind}")]
pub struct DriverError {
    pub kind: DisplayError,
    pub frame: Option<Frame>,
}

impl DriverError {
    pub fn with_frame(kind: DisplayError, frame: Frame) -> Self {
        Self {
            kind,
            frame: Some(frame),
        }
    }
}

impl From<DisplayError> for DriverError {
    fn from(kind: DisplayError) -> Self {
        Self { kind, frame: None }
    }
}

/// Platform-agnostic display events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DisplayEvent {
    /// Key press event.
    Key {
        symbol: KeySymbol,
        modifiers: Modifiers,
        text: Option<String>,
    },

    /// Window resize, in physical pixels of the unrotated display.
    Resize { width_px: u32, height_px: u32 },

    /// User requested window close.
    CloseRequested,

    /// Window gained focus.
    FocusGained,

    /// Window lost focus.
    FocusLost,

    /// Mouse button press.
    MouseButtonPress {
        button: u8,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },

    /// Mouse button release.
    MouseButtonRelease {
        button: u8,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },

    /// Mouse movement.
    MouseMove {
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },
}
