//! Error types for the design-studio canvas.
//!
//! Resource errors (oversized upload, undecodable image) are rejected at
//! the canvas boundary and leave the canvas unchanged; print failures are
//! blocking, since a customized line must never reach the cart without a
//! print file.

use thiserror::Error;

/// Canvas and print-export errors.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// A locally uploaded file exceeds the size bound.
    #[error("Image is too large: {size} bytes (maximum {max})")]
    ImageTooLarge { size: usize, max: usize },

    /// The image bytes could not be decoded.
    #[error("Image could not be decoded: {0}")]
    ImageDecode(String),

    /// A remote image could not be fetched.
    #[error("Image could not be loaded: {url}")]
    ImageUnavailable { url: String },

    /// The data URL is not in the expected `data:<mime>;base64,<...>` shape.
    #[error("Malformed data URL")]
    InvalidDataUrl,

    /// Font bytes could not be parsed.
    #[error("Font could not be loaded: {0}")]
    FontLoad(String),

    /// Preview encoding failed.
    #[error("Preview could not be encoded: {0}")]
    PreviewEncode(String),

    /// Print-file generation failed. Blocking: the add-to-cart action for
    /// a customized product must not proceed without a print file.
    #[error("Print file generation failed: {0}")]
    PrintFailed(String),
}

/// Convenience type alias for Results with CanvasError.
pub type CanvasResult<T> = Result<T, CanvasError>;
