// src/display/mod.rs
//! Message-based display engine.
//!
//! - DisplaySurface: framebuffer state, presentation, orientation, metrics
//! - DisplayDriver: platform backend primitives (headless, or a real window)
//! - EventGate: absorbs backend and posted events once per frame
//! - Messages: request/response protocol between surface and driver

pub mod driver;
pub mod drivers;
pub mod events;
pub mod messages;
pub mod surface;
pub mod vsync;

#[cfg(test)]
mod tests;

pub use driver::DisplayDriver;
pub use drivers::{HeadlessDisplayDriver, HeadlessProbe};
pub use events::{EventGate, EventSender};
pub use messages::{DisplayEvent, DriverError, DriverRequest, DriverResponse, Frame};
pub use surface::{DisplayInfo, DisplaySurface, SurfaceState};
pub use vsync::VsyncPacer;
