//! # sumi-canvas: Design-Studio Canvas for the Sumi Storefront
//!
//! The custom-product design studio: place text, uploaded images, and
//! recolorable icons on the two faces of a product, render the result,
//! and derive a dimensionally accurate print file.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Design Studio Flow                               │
//! │                                                                         │
//! │  DesignCanvas ──render──► 600×600 RGBA surface                         │
//! │       │                        │                                        │
//! │       │                        ├──► encode_preview() ──► data URL      │
//! │       │                        │                                        │
//! │       │                        └──► PrintFileGenerator ──► artifact    │
//! │       │                                                    │            │
//! │       └──serialize(preview, artifact)──► CustomizationPayload          │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                    CartLine.customization               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`canvas`] - the editing state machine (add/select/drag/patch/remove)
//! - [`render`] - full clear-and-redraw rasterization, preview encoding
//! - [`print`] - the print-file contract and default generator
//! - [`assets`] - upload decoding with the size bound
//! - [`error`] - canvas error taxonomy

pub mod assets;
pub mod canvas;
pub mod error;
pub mod print;
pub mod render;

pub use canvas::{DesignCanvas, ElementPatch, FixedAdvanceMeasure, IconDef, TextMeasure};
pub use error::{CanvasError, CanvasResult};
pub use print::{PrintFileGenerator, PrintSpec, RasterPrintGenerator};
pub use render::{encode_preview, CanvasRenderer};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Logical canvas size in pixels. The studio edits and renders at this
/// fixed size; physical print dimensions only matter at export time.
pub const CANVAS_SIZE: u32 = 600;

/// Default anchor where new elements land, in logical canvas units.
pub const DEFAULT_ANCHOR: (f32, f32) = (250.0, 250.0);

/// Positional delta between icons in one batch add, so a batch does not
/// land perfectly overlapped.
pub const ICON_BATCH_OFFSET: f32 = 18.0;

/// Logical placement box for images and icons before scaling.
pub const ELEMENT_BOX: f32 = 100.0;

/// Size bound for locally uploaded files (10 MB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Print-safe-area guide: 50% width × 60% height, centered.
pub const SAFE_AREA_WIDTH_RATIO: f32 = 0.5;
pub const SAFE_AREA_HEIGHT_RATIO: f32 = 0.6;

/// Caption drawn under the safe-area guide.
pub const PRINT_GUIDE_CAPTION: &str = "Print area";

/// Fallback physical print dimensions for products without configured
/// ones, and the fixed production resolution.
pub const DEFAULT_PRINT_WIDTH_CM: f64 = 30.0;
pub const DEFAULT_PRINT_HEIGHT_CM: f64 = 40.0;
pub const PRINT_DPI: u32 = 300;
