//! # Print-File Contract
//!
//! The seam between the design studio and print production.
//!
//! The canvas supplies the *fully rendered* surface for the active side,
//! the product's physical print dimensions (or the 30×40 cm default), and
//! a fixed 300 DPI. The generator returns a [`PrintArtifact`] that is
//! attached to the cart line's customization payload. Each export covers
//! one side; printing both sides of a product takes two add-to-cart
//! actions, one per side.

use image::codecs::png::PngEncoder;
use image::{imageops, ImageEncoder, RgbaImage};
use tracing::info;
use uuid::Uuid;

use sumi_core::PrintArtifact;

use crate::error::{CanvasError, CanvasResult};
use crate::{DEFAULT_PRINT_HEIGHT_CM, DEFAULT_PRINT_WIDTH_CM, PRINT_DPI};

const CM_PER_INCH: f64 = 2.54;

// =============================================================================
// Print Spec
// =============================================================================

/// Physical parameters for one print export.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintSpec {
    pub width_cm: f64,
    pub height_cm: f64,
    pub dpi: u32,
    /// Human-readable label carried onto the artifact ("sticker-front").
    pub label: String,
}

impl PrintSpec {
    /// Spec for a product's configured dimensions, at the fixed print DPI.
    pub fn for_product(width_cm: f64, height_cm: f64, label: impl Into<String>) -> Self {
        PrintSpec {
            width_cm,
            height_cm,
            dpi: PRINT_DPI,
            label: label.into(),
        }
    }

    /// Pixel dimensions implied by the physical size and resolution.
    pub fn pixel_dimensions(&self) -> (u32, u32) {
        (
            (self.width_cm / CM_PER_INCH * self.dpi as f64).round() as u32,
            (self.height_cm / CM_PER_INCH * self.dpi as f64).round() as u32,
        )
    }
}

/// Products without configured print dimensions fall back to 30×40 cm.
impl Default for PrintSpec {
    fn default() -> Self {
        PrintSpec {
            width_cm: DEFAULT_PRINT_WIDTH_CM,
            height_cm: DEFAULT_PRINT_HEIGHT_CM,
            dpi: PRINT_DPI,
            label: "print".to_string(),
        }
    }
}

// =============================================================================
// Generator Contract
// =============================================================================

/// Produces a print-ready artifact from a rendered canvas surface.
///
/// Failure is propagated to the caller and never retried; a customized
/// add-to-cart must not silently proceed without a print file.
pub trait PrintFileGenerator {
    fn generate(&self, surface: &RgbaImage, spec: &PrintSpec) -> CanvasResult<PrintArtifact>;
}

/// The default generator: resamples the logical surface to the pixel
/// dimensions implied by cm × dpi and encodes a PNG.
#[derive(Debug, Default)]
pub struct RasterPrintGenerator;

impl PrintFileGenerator for RasterPrintGenerator {
    fn generate(&self, surface: &RgbaImage, spec: &PrintSpec) -> CanvasResult<PrintArtifact> {
        if spec.width_cm <= 0.0 || spec.height_cm <= 0.0 || spec.dpi == 0 {
            return Err(CanvasError::PrintFailed(format!(
                "invalid print spec: {}x{} cm at {} dpi",
                spec.width_cm, spec.height_cm, spec.dpi
            )));
        }

        let (px_w, px_h) = spec.pixel_dimensions();
        let print_raster = imageops::resize(surface, px_w, px_h, imageops::FilterType::Lanczos3);

        let mut data = Vec::new();
        PngEncoder::new(&mut data)
            .write_image(print_raster.as_raw(), px_w, px_h, image::ColorType::Rgba8)
            .map_err(|e| CanvasError::PrintFailed(e.to_string()))?;

        let artifact = PrintArtifact {
            id: Uuid::new_v4().to_string(),
            label: spec.label.clone(),
            width_cm: spec.width_cm,
            height_cm: spec.height_cm,
            dpi: spec.dpi,
            data,
        };
        info!(
            id = %artifact.id,
            label = %artifact.label,
            px_w,
            px_h,
            "generated print artifact"
        );
        Ok(artifact)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_default_spec_is_30x40_at_300dpi() {
        let spec = PrintSpec::default();
        assert_eq!(spec.width_cm, 30.0);
        assert_eq!(spec.height_cm, 40.0);
        assert_eq!(spec.dpi, 300);
    }

    #[test]
    fn test_pixel_dimensions() {
        // One inch square at 100 dpi is exactly 100×100 px.
        let spec = PrintSpec {
            width_cm: 2.54,
            height_cm: 2.54,
            dpi: 100,
            label: "t".to_string(),
        };
        assert_eq!(spec.pixel_dimensions(), (100, 100));

        // The default sticker: 30 cm at 300 dpi ≈ 3543 px.
        assert_eq!(PrintSpec::default().pixel_dimensions(), (3543, 4724));
    }

    #[test]
    fn test_generate_produces_png_with_metadata() {
        let surface = RgbaImage::from_pixel(60, 60, Rgba([200, 10, 10, 255]));
        let spec = PrintSpec {
            width_cm: 2.54,
            height_cm: 2.54,
            dpi: 50,
            label: "sticker-front".to_string(),
        };

        let artifact = RasterPrintGenerator.generate(&surface, &spec).unwrap();
        assert_eq!(artifact.label, "sticker-front");
        assert_eq!(artifact.dpi, 50);
        assert_eq!(artifact.width_cm, 2.54);
        assert!(!artifact.id.is_empty());
        assert_eq!(&artifact.data[..4], b"\x89PNG");
    }

    #[test]
    fn test_generate_rejects_degenerate_spec() {
        let surface = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let spec = PrintSpec {
            width_cm: 0.0,
            height_cm: 40.0,
            dpi: 300,
            label: "bad".to_string(),
        };
        assert!(matches!(
            RasterPrintGenerator.generate(&surface, &spec),
            Err(CanvasError::PrintFailed(_))
        ));
    }
}
