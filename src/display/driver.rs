// src/display/driver.rs
//! DisplayDriver trait - minimal interface to a platform display backend.
//!
//! The driver owns everything platform specific: window creation, the native
//! event queue, and the blit to screen. All engine logic (buffer management,
//! rotation, metrics, pacing) lives in DisplaySurface.
//!
//! ## Lifecycle
//! 1. Construction - driver-specific, no window yet
//! 2. `handle_request(Init)` - create the window, report its size
//! 3. Request/response loop - all operations via messages
//! 4. `handle_request(Release)` - close the window; Init may follow again
//! 5. `Drop` - final cleanup

use crate::display::messages::{DriverError, DriverRequest, DriverResponse};

/// Platform-specific display driver interface.
pub trait DisplayDriver: Send {
    /// Handle a request from DisplaySurface, returning a response.
    ///
    /// ## Request/Response Pairs
    /// - `Init(config)` → `InitComplete`
    /// - `PollEvents` → `Events`
    /// - `Present(frame)` → `PresentComplete(frame)`
    /// - `SetTitle(s)` → `TitleSet`
    /// - `SetVsync(b)` → `VsyncSet`
    /// - `SetDebugOverlay(b)` → `DebugOverlaySet`
    /// - `Screenshot { path, frame }` → `ScreenshotSaved(frame)`
    /// - `Release` → `Released`
    ///
    /// ## Error Handling
    /// Returns `DriverError` so a failed `Present` or `Screenshot` can return the
    /// frame it was given. Dropping the frame forces the surface to reallocate.
    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DriverError>;
}
