//! # Image Asset Decoding
//!
//! Decodes image sources for the canvas, enforcing the upload size bound.
//!
//! Decoding happens *before* an element is inserted: a rejected upload or
//! an unreachable remote asset leaves the canvas unchanged, and an element
//! only becomes visible once its pixels are actually available.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::RgbaImage;
use tracing::debug;

use sumi_core::ImageSource;

use crate::error::{CanvasError, CanvasResult};
use crate::MAX_UPLOAD_BYTES;

/// Decodes an image source into RGBA pixels.
///
/// For [`ImageSource::Remote`], the caller performs the fetch (that is the
/// async boundary) and passes the raw bytes in; `None` means the fetch
/// failed and the add is rejected.
pub fn decode_source(source: &ImageSource, remote_bytes: Option<&[u8]>) -> CanvasResult<RgbaImage> {
    match source {
        ImageSource::DataUrl { url } => {
            let bytes = decode_data_url(url)?;
            if bytes.len() > MAX_UPLOAD_BYTES {
                return Err(CanvasError::ImageTooLarge {
                    size: bytes.len(),
                    max: MAX_UPLOAD_BYTES,
                });
            }
            decode_bytes(&bytes)
        }
        ImageSource::Remote { url } => {
            let bytes = remote_bytes.ok_or_else(|| CanvasError::ImageUnavailable {
                url: url.clone(),
            })?;
            decode_bytes(bytes)
        }
    }
}

/// Extracts the payload bytes of a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(url: &str) -> CanvasResult<Vec<u8>> {
    let rest = url.strip_prefix("data:").ok_or(CanvasError::InvalidDataUrl)?;
    let (meta, payload) = rest.split_once(',').ok_or(CanvasError::InvalidDataUrl)?;
    if !meta.ends_with(";base64") {
        return Err(CanvasError::InvalidDataUrl);
    }
    BASE64
        .decode(payload.trim())
        .map_err(|_| CanvasError::InvalidDataUrl)
}

/// Decodes encoded image bytes (PNG/JPEG/...) into RGBA.
pub fn decode_bytes(bytes: &[u8]) -> CanvasResult<RgbaImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CanvasError::ImageDecode(e.to_string()))?
        .to_rgba8();
    debug!(width = decoded.width(), height = decoded.height(), "decoded image asset");
    Ok(decoded)
}
