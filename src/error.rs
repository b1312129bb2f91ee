// Error types for the drawing surface.
// Missing surfaces and degenerate pointer events are not errors at all (they are
// silent no-ops), so only the fallible edges of the crate show up here: export,
// background decoding and configuration loading.

use thiserror::Error;

/// Failure channel of the export future.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The image codec rejected the pixels
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// A custom encoder reported a failure
    #[error("encoder failed: {0}")]
    Encoder(String),

    /// The encoder panicked while running on the blocking pool
    #[error("encoder aborted: {0}")]
    Worker(String),

    /// The surface was being mutated when the snapshot was due
    #[error("surface is busy")]
    Busy,
}

/// Errors raised while turning an image into a background source.
#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("could not decode background image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("background image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A color string that is neither `#rrggbb[aa]` nor a known name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised color: {0:?}")]
pub struct ParseColorError(pub String);

pub type ExportResult<T> = Result<T, ExportError>;
