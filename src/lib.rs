//! softfb library crate.
//!
//! A software framebuffer: a CPU-side pixel buffer in one of four formats,
//! clipped drawing primitives over it, and a `DisplaySurface` that presents
//! frames through a pluggable `DisplayDriver`.

pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod metrics;
pub mod pixel_buffer;
pub mod primitives;

pub use color::{Color, NamedColor};
pub use config::{Config, DisplayConfig, MetricsConfig, PixelFormat, Rotation};
pub use display::{DisplayDriver, DisplayEvent, DisplayInfo, DisplaySurface, HeadlessDisplayDriver};
pub use error::{DisplayError, Result};
pub use geometry::{rect_contains, rect_intersect, Rect};
pub use metrics::DisplayMetrics;
pub use pixel_buffer::PixelBuffer;
