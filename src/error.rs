// src/error.rs

//! Error taxonomy shared by every fallible display operation.

use thiserror::Error;

/// Errors surfaced by the display engine and its backends.
///
/// Out-of-bounds drawing coordinates are never reported here; primitives clip
/// them silently. Everything else fails fast and leaves the surface unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    #[error("display initialization failed: {0}")]
    InitFailed(String),
    #[error("window creation failed: {0}")]
    WindowCreationFailed(String),
    #[error("renderer creation failed: {0}")]
    RendererCreationFailed(String),
    #[error("texture creation failed: {0}")]
    TextureCreationFailed(String),
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("out of memory allocating {bytes} bytes")]
    OutOfMemory { bytes: usize },
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),
    #[error("display device not available: {0}")]
    DeviceNotAvailable(String),
    #[error("display is not initialized")]
    NotInitialized,
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("screenshot failed: {0}")]
    ScreenshotFailed(String),
}

impl DisplayError {
    /// Stable numeric code matching the C display header.
    pub fn code(&self) -> i32 {
        match self {
            DisplayError::InitFailed(_) => -1,
            DisplayError::WindowCreationFailed(_) => -2,
            DisplayError::RendererCreationFailed(_) => -3,
            DisplayError::TextureCreationFailed(_) => -4,
            DisplayError::InvalidDimensions { .. } => -5,
            DisplayError::OutOfMemory { .. } => -6,
            DisplayError::UnsupportedFormat(_) => -7,
            DisplayError::DeviceNotAvailable(_) => -8,
            DisplayError::NotInitialized => -9,
            DisplayError::InvalidParameter(_) => -10,
            DisplayError::ScreenshotFailed(_) => -11,
        }
    }
}

pub type Result<T> = std::result::Result<T, DisplayError>;
