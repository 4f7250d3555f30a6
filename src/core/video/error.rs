use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("Invalid pixel buffer: {0}")]
    InvalidBuffer(String),
    #[error("Region ({x}, {y}, {width}x{height}) outside {bound_width}x{bound_height} buffer")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        bound_width: u32,
        bound_height: u32,
    },
    #[error("Recognition failed: {0}")]
    Recognition(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
