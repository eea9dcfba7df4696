//! Error types for Blastfield.

use thiserror::Error;

/// Top-level error type for Blastfield operations.
#[derive(Debug, Error)]
pub enum BlastError {
    /// Invalid explosion configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Snapshot could not be used or acquired
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Image encoding/decoding errors
    #[error("Image error: {0}")]
    Image(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Explosion configuration rejected at session creation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Duration must be positive
    #[error("Duration must be greater than zero")]
    ZeroDuration,

    /// Grid side length must be positive
    #[error("Particle grid side length must be greater than zero")]
    EmptyGrid,

    /// Grid side length above the supported maximum
    #[error("Particle grid side length {0} exceeds the maximum of 256")]
    GridTooLarge(u32),

    /// Fade-out start outside `[0, 1]`
    #[error("Fade-out start {0} is outside [0, 1]")]
    FadeOutStart(f32),

    /// Shake intensity outside `[0, 1]`
    #[error("Shake intensity {0} is outside [0, 1]")]
    ShakeIntensity(f32),

    /// Interpolator factor must be positive and finite
    #[error("Interpolator factor {0} must be positive")]
    InterpolatorFactor(f32),
}

/// Snapshot validation and acquisition errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// Snapshot has zero area
    #[error("Snapshot is empty ({width}x{height})")]
    Empty {
        /// Snapshot width
        width: u32,
        /// Snapshot height
        height: u32,
    },

    /// Pixel buffer does not match the declared size
    #[error("Snapshot buffer has {actual} bytes, expected {expected}")]
    BufferSize {
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        actual: usize,
    },

    /// Capture ran out of memory
    #[error("Out of memory while capturing snapshot")]
    OutOfMemory,

    /// Source could not provide a snapshot
    #[error("Snapshot unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for Blastfield operations.
pub type BlastResult<T> = Result<T, BlastError>;
