//! Error types for the LED matrix core library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, decoding or driving a panel.
#[derive(Error, Debug)]
pub enum Error {
    /// Animation was authored for a panel of a different size.
    #[error("animation side length {actual} does not match panel side length {expected}")]
    SideLengthMismatch { expected: u16, actual: u16 },

    /// Animation header is missing or unreadable.
    #[error("malformed animation header: {0}")]
    MalformedHeader(String),

    /// A frame line could not be parsed.
    #[error("malformed frame {frame}: {reason}")]
    MalformedFrame { frame: u32, reason: String },

    /// Frame or overlay dimensions do not match.
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Rotation outside of 0-3 quarter turns.
    #[error("invalid rotation: {0} (must be 0-3 quarter turns)")]
    InvalidRotation(u8),

    /// Unknown animation content kind.
    #[error("invalid animation type: {0}")]
    InvalidKind(String),

    /// Unparseable color value.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Frame rate that is not a positive, finite number.
    #[error("invalid frame rate: {0}")]
    InvalidFps(String),

    /// Itinerary does not cover the day exactly.
    #[error("invalid itinerary: {0}")]
    Itinerary(String),

    /// A frame source ran dry before its declared length.
    #[error("frame source ended after {produced} of {declared} frames")]
    SourceExhausted { declared: u32, produced: u32 },

    /// Strip controller not present.
    #[error("LED strip not found at {0}")]
    StripNotFound(String),

    /// Serial port communication error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// File or stream I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
