// src/config.rs

//! Configuration for the display engine.
//!
//! `DisplayConfig` is the value handed to `DisplaySurface::init`. The root
//! `Config` groups it with metrics and logging settings so the whole thing
//! can be deserialized from a JSON file by the application. The library
//! itself never touches the filesystem for configuration.

use crate::error::{DisplayError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

// --- Pixel Format ---

/// Memory layout of a single pixel in a `PixelBuffer`.
///
/// Names describe the byte order in memory, first byte first. `Rgb565` is a
/// little-endian `u16` with red in the high five bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    #[default]
    #[serde(rename = "RGBA8888")]
    Rgba8888,
    #[serde(rename = "RGB888")]
    Rgb888,
    #[serde(rename = "RGB565")]
    Rgb565,
    #[serde(rename = "ARGB8888")]
    Argb8888,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Rgba8888 | PixelFormat::Argb8888 => 4,
            PixelFormat::Rgb888 => 3,
            PixelFormat::Rgb565 => 2,
        }
    }

    /// Color depth reported in `DisplayInfo`.
    pub const fn bits_per_pixel(self) -> u32 {
        self.bytes_per_pixel() * 8
    }

    /// Maps the numeric format codes of the C header (0..=3).
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(PixelFormat::Rgba8888),
            1 => Ok(PixelFormat::Rgb888),
            2 => Ok(PixelFormat::Rgb565),
            3 => Ok(PixelFormat::Argb8888),
            other => Err(DisplayError::UnsupportedFormat(format!(
                "unknown pixel format code {}",
                other
            ))),
        }
    }

    pub const fn code(self) -> u32 {
        match self {
            PixelFormat::Rgba8888 => 0,
            PixelFormat::Rgb888 => 1,
            PixelFormat::Rgb565 => 2,
            PixelFormat::Argb8888 => 3,
        }
    }
}

// --- Rotation ---

/// Display orientation. Only the four quarter turns are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(DisplayError::InvalidParameter(format!(
                "rotation must be 0, 90, 180 or 270 degrees, got {}",
                other
            ))),
        }
    }

    pub const fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Number of clockwise quarter turns from the unrotated orientation.
    pub const fn quarter_turns(self) -> u32 {
        (self.degrees() / 90) as u32
    }

    /// True for 90 and 270, where logical width and height trade places.
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

// --- Display Configuration ---

/// Parameters for one `init` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Width in pixels of the unrotated surface.
    pub width: u32,
    /// Height in pixels of the unrotated surface.
    pub height: u32,
    /// Refresh rate in Hz. Also the vsync pacing rate.
    pub refresh_rate: u32,
    pub pixel_format: PixelFormat,
    pub vsync: bool,
    pub fullscreen: bool,
    pub resizable: bool,
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            width: 800,
            height: 600,
            refresh_rate: 60,
            pixel_format: PixelFormat::Rgba8888,
            vsync: true,
            fullscreen: false,
            resizable: true,
            title: "softfb".to_string(),
        }
    }
}

impl DisplayConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_refresh_rate(mut self, refresh_rate: u32) -> Self {
        self.refresh_rate = refresh_rate;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Checks the invariants `init` relies on.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DisplayError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.refresh_rate == 0 {
            return Err(DisplayError::InvalidParameter(
                "refresh rate must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// --- Metrics Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Number of present timestamps kept for the fps window. Values below 2 are raised to 2.
    pub window_size: usize,
    /// With the debug overlay on, metrics are logged every this many frames.
    pub overlay_log_interval: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            window_size: 60,
            overlay_log_interval: 60,
        }
    }
}

// --- Top-Level Configuration ---

/// Application-level configuration, deserialized from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub metrics: MetricsConfig,
    /// `env_logger` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            display: DisplayConfig::default(),
            metrics: MetricsConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Config =
            serde_json::from_str(json).context("Failed to parse display configuration")?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&text)
    }
}
