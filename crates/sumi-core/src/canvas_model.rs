//! # Canvas Element Data Model
//!
//! Pure data types for the design-studio canvas. The editing state machine
//! and the renderer live in `sumi-canvas`; this module only defines what a
//! placed element *is*, so the cart and order-submission layers can carry
//! customization payloads without depending on rasterization code.
//!
//! ## Element Union
//! The storefront originally distinguished element kinds by a string field
//! and branched on it at every use site. Here the union is a tagged enum,
//! so rendering and mutation sites match exhaustively and an unhandled
//! kind cannot slip through.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Side
// =============================================================================

/// Which face of the product an element belongs to.
///
/// The two faces are independently addressable: editing, hit-testing, and
/// rendering only ever consider elements of the active side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Front,
    Back,
}

impl Default for Side {
    fn default() -> Self {
        Side::Front
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Front => write!(f, "front"),
            Side::Back => write!(f, "back"),
        }
    }
}

// =============================================================================
// Element Identity
// =============================================================================

/// Identifier of a canvas element, unique within one editing session.
///
/// Ids come from a monotonic per-canvas counter. The storefront previously
/// used timestamp ids, which collided on rapid batch-adds of icons; a
/// counter cannot collide.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

// =============================================================================
// Image Source
// =============================================================================

/// Where an image element's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    /// A locally uploaded file, embedded as a `data:` URL.
    /// Subject to the upload size bound at add time.
    DataUrl { url: String },
    /// A remote asset URL. Fetched by the caller; an unreachable or
    /// undecodable asset is rejected at add time.
    Remote { url: String },
}

impl ImageSource {
    /// The URL string, whichever kind this is.
    pub fn url(&self) -> &str {
        match self {
            ImageSource::DataUrl { url } | ImageSource::Remote { url } => url,
        }
    }
}

// =============================================================================
// Canvas Element
// =============================================================================

/// A placeable element on the design canvas.
///
/// ## Invariants
/// - Every element belongs to exactly one [`Side`].
/// - `id` is unique within the canvas for the editing session.
/// - `(x, y)` is the element's anchor in logical canvas units
///   (top-left for images/icons, text-box origin for text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanvasElement {
    Text {
        id: ElementId,
        content: String,
        /// Hex color string ("#1a1a1a").
        color: String,
        font_family: String,
        /// Font size in logical canvas units.
        font_size: f32,
        x: f32,
        y: f32,
        side: Side,
    },
    Image {
        id: ElementId,
        source: ImageSource,
        x: f32,
        y: f32,
        /// Uniform scale applied to the 100×100 logical placement box.
        scale: f32,
        side: Side,
    },
    Icon {
        id: ElementId,
        /// SVG markup whose fills carry [`ICON_COLOR_TOKEN`]; the token is
        /// substituted with `color` before rasterization.
        markup: String,
        color: String,
        x: f32,
        y: f32,
        scale: f32,
        side: Side,
    },
}

/// The recolorable placeholder token inside icon SVG markup.
pub const ICON_COLOR_TOKEN: &str = "__COLOR__";

impl CanvasElement {
    /// The element's id.
    pub fn id(&self) -> ElementId {
        match self {
            CanvasElement::Text { id, .. }
            | CanvasElement::Image { id, .. }
            | CanvasElement::Icon { id, .. } => *id,
        }
    }

    /// The side this element belongs to.
    pub fn side(&self) -> Side {
        match self {
            CanvasElement::Text { side, .. }
            | CanvasElement::Image { side, .. }
            | CanvasElement::Icon { side, .. } => *side,
        }
    }

    /// The element's anchor position.
    pub fn position(&self) -> (f32, f32) {
        match self {
            CanvasElement::Text { x, y, .. }
            | CanvasElement::Image { x, y, .. }
            | CanvasElement::Icon { x, y, .. } => (*x, *y),
        }
    }

    /// Moves the element's anchor by a delta.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            CanvasElement::Text { x, y, .. }
            | CanvasElement::Image { x, y, .. }
            | CanvasElement::Icon { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
        }
    }
}

// =============================================================================
// Print Artifact & Customization Payload
// =============================================================================

/// A print-ready artifact produced by the print-file generator.
///
/// The pixel data is opaque to everything outside the generator; the cart
/// and order layers only forward it, together with its declared physical
/// size and resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PrintArtifact {
    /// Artifact identifier (UUID v4), assigned by the generator.
    pub id: String,
    /// Human-readable label ("sticker-front", ...).
    pub label: String,
    /// Physical width in centimeters.
    pub width_cm: f64,
    /// Physical height in centimeters.
    pub height_cm: f64,
    /// Render resolution in dots per inch.
    pub dpi: u32,
    /// Encoded artifact bytes (PNG).
    #[serde(default)]
    pub data: Vec<u8>,
}

/// Everything the design studio hands to the cart for one customized line.
///
/// Immutable once attached to a cart line; changing the design requires
/// re-entering the studio and producing a fresh payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationPayload {
    /// Encoded preview raster (PNG data URL) of the last-edited side.
    pub preview_image: String,
    /// The placed elements, in insertion (z) order, both sides.
    pub elements: Vec<CanvasElement>,
    /// The print-ready artifact for the last-edited side.
    pub print_file: PrintArtifact,
    /// The side that was active when the payload was serialized.
    pub side: Side,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_accessors() {
        let mut el = CanvasElement::Text {
            id: ElementId(7),
            content: "hello".to_string(),
            color: "#000000".to_string(),
            font_family: "Noto Sans JP".to_string(),
            font_size: 24.0,
            x: 100.0,
            y: 120.0,
            side: Side::Front,
        };

        assert_eq!(el.id(), ElementId(7));
        assert_eq!(el.side(), Side::Front);
        assert_eq!(el.position(), (100.0, 120.0));

        el.translate(5.0, -10.0);
        assert_eq!(el.position(), (105.0, 110.0));
    }

    #[test]
    fn test_element_serde_tagging() {
        let el = CanvasElement::Icon {
            id: ElementId(1),
            markup: format!(
                r##"<svg viewBox="0 0 100 100"><rect x="10" y="10" width="80" height="80" fill="{}"/></svg>"##,
                ICON_COLOR_TOKEN
            ),
            color: "#ff0000".to_string(),
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            side: Side::Back,
        };
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["kind"], "icon");
        assert_eq!(json["side"], "back");

        let back: CanvasElement = serde_json::from_value(json).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Front.to_string(), "front");
        assert_eq!(Side::Back.to_string(), "back");
    }
}
