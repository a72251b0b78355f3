//! # Design Canvas State
//!
//! The editing state machine of the design studio.
//!
//! ## Canvas Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Canvas State Operations                              │
//! │                                                                         │
//! │  Studio Action            Operation                State Change         │
//! │  ─────────────            ─────────                ────────────         │
//! │                                                                         │
//! │  Type text ──────────────► add_text() ───────────► elements.push       │
//! │                                                                         │
//! │  Upload / pick image ────► add_image() ──────────► decode, then push   │
//! │                                                                         │
//! │  Pick icons ─────────────► add_icons() ──────────► push N, offset each │
//! │                                                                         │
//! │  Click on canvas ────────► select_at() ──────────► selected = Some/None│
//! │                                                                         │
//! │  Pointer down/move/up ───► begin/update/end_drag ► element.translate   │
//! │                                                                         │
//! │  Property panel ─────────► set_property() ───────► color/size/scale    │
//! │                                                                         │
//! │  Delete key ─────────────► remove() ─────────────► elements.retain     │
//! │                                                                         │
//! │  Front/Back tab ─────────► set_side() ───────────► current_side = s    │
//! │                                                                         │
//! │  EVERY mutation is followed by a full clear-and-redraw: the renderer   │
//! │  never patches the previous frame, so stale selection outlines cannot  │
//! │  survive a state change.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sides
//! The product has two independently addressable faces. Hit-testing,
//! dragging, and rendering only consider elements of the active side;
//! elements on the other side keep their state but are inert.

use std::collections::HashMap;

use image::RgbaImage;
use tracing::debug;

use sumi_core::{
    CanvasElement, CustomizationPayload, ElementId, ImageSource, PrintArtifact, Side,
};

use crate::assets;
use crate::error::CanvasResult;
use crate::{DEFAULT_ANCHOR, ELEMENT_BOX, ICON_BATCH_OFFSET};

// =============================================================================
// Text Measurement Seam
// =============================================================================

/// Measures rendered text width, used for hit-testing text elements.
///
/// The renderer implements this with real glyph metrics; tests use
/// [`FixedAdvanceMeasure`] so hit-testing stays deterministic without
/// font files.
pub trait TextMeasure {
    /// Width, in logical canvas units, of `content` at `font_size`.
    fn text_width(&self, content: &str, font_family: &str, font_size: f32) -> f32;
}

/// A fixed-advance measurer: every character is `advance × font_size` wide.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMeasure {
    pub advance: f32,
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        FixedAdvanceMeasure { advance: 0.6 }
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn text_width(&self, content: &str, _font_family: &str, font_size: f32) -> f32 {
        content.chars().count() as f32 * self.advance * font_size
    }
}

// =============================================================================
// Property Patch
// =============================================================================

/// A partial update to one element, from the studio's property panel.
///
/// Fields that do not apply to the element's kind are ignored: `font_size`
/// only affects text, `scale` only affects images and icons, `color`
/// affects text and icons (images are never recolored).
#[derive(Debug, Clone, Default)]
pub struct ElementPatch {
    pub color: Option<String>,
    pub font_size: Option<f32>,
    pub scale: Option<f32>,
}

/// One icon in a batch add.
#[derive(Debug, Clone)]
pub struct IconDef {
    /// SVG markup whose fills are parameterized with
    /// [`sumi_core::ICON_COLOR_TOKEN`].
    pub markup: String,
    /// Hex color substituted for the token at render time.
    pub color: String,
}

// =============================================================================
// Design Canvas
// =============================================================================

/// The design-studio canvas: an ordered collection of placeable elements
/// on two faces of a product.
///
/// Insertion order is z-order: later elements draw on top and win
/// hit-testing ties. The canvas has no terminal state; it is edited until
/// the caller serializes it into a [`CustomizationPayload`].
#[derive(Debug, Default)]
pub struct DesignCanvas {
    elements: Vec<CanvasElement>,
    current_side: Side,
    selected: Option<ElementId>,
    /// Monotonic id source; never reused within a session.
    next_id: u64,
    /// The element being dragged, if a drag is active.
    drag: Option<ElementId>,
    /// Decoded pixels for image elements, keyed by element id.
    /// Not serialized; rebuilt when a payload is re-opened in the studio.
    rasters: HashMap<ElementId, RgbaImage>,
}

impl DesignCanvas {
    /// Creates an empty canvas with the front side active.
    pub fn new() -> Self {
        DesignCanvas::default()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// All elements, both sides, in insertion (z) order.
    pub fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    /// The currently active side.
    pub fn current_side(&self) -> Side {
        self.current_side
    }

    /// The currently selected element id, if any.
    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    /// Looks up an element by id.
    pub fn element(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id() == id)
    }

    /// Decoded pixels for an image element, if present.
    pub fn raster(&self, id: ElementId) -> Option<&RgbaImage> {
        self.rasters.get(&id)
    }

    fn allocate_id(&mut self) -> ElementId {
        self.next_id += 1;
        ElementId(self.next_id)
    }

    // -------------------------------------------------------------------------
    // Adding Elements
    // -------------------------------------------------------------------------

    /// Adds a text element at the default anchor on the active side.
    ///
    /// Returns `None` without touching the canvas when `content` is empty
    /// or whitespace-only.
    pub fn add_text(
        &mut self,
        content: &str,
        color: &str,
        font_family: &str,
        font_size: f32,
    ) -> Option<ElementId> {
        if content.trim().is_empty() {
            return None;
        }

        let id = self.allocate_id();
        let (x, y) = DEFAULT_ANCHOR;
        self.elements.push(CanvasElement::Text {
            id,
            content: content.to_string(),
            color: color.to_string(),
            font_family: font_family.to_string(),
            font_size,
            x,
            y,
            side: self.current_side,
        });
        debug!(%id, side = %self.current_side, "added text element");
        Some(id)
    }

    /// Adds an image element at the default anchor with `scale = 1`.
    ///
    /// Decoding happens before insertion: an oversized upload, a malformed
    /// data URL, or an unreachable/undecodable remote asset is rejected
    /// and the canvas stays unchanged. For remote sources the caller
    /// supplies the fetched bytes (`None` marks a failed fetch).
    pub fn add_image(
        &mut self,
        source: ImageSource,
        remote_bytes: Option<&[u8]>,
    ) -> CanvasResult<ElementId> {
        let raster = assets::decode_source(&source, remote_bytes)?;

        let id = self.allocate_id();
        let (x, y) = DEFAULT_ANCHOR;
        self.elements.push(CanvasElement::Image {
            id,
            source,
            x,
            y,
            scale: 1.0,
            side: self.current_side,
        });
        self.rasters.insert(id, raster);
        debug!(%id, side = %self.current_side, "added image element");
        Ok(id)
    }

    /// Adds one icon element at the default anchor.
    pub fn add_icon(&mut self, markup: &str, color: &str) -> ElementId {
        self.add_icons(&[IconDef {
            markup: markup.to_string(),
            color: color.to_string(),
        }])[0]
    }

    /// Adds a batch of pre-selected icons in one call.
    ///
    /// Each icon is offset from the previous by a small positional delta
    /// so a batch does not land in a perfectly overlapping stack.
    pub fn add_icons(&mut self, icons: &[IconDef]) -> Vec<ElementId> {
        let (ax, ay) = DEFAULT_ANCHOR;
        let mut ids = Vec::with_capacity(icons.len());

        for (i, icon) in icons.iter().enumerate() {
            let id = self.allocate_id();
            let offset = i as f32 * ICON_BATCH_OFFSET;
            self.elements.push(CanvasElement::Icon {
                id,
                markup: icon.markup.clone(),
                color: icon.color.clone(),
                x: ax + offset,
                y: ay + offset,
                scale: 1.0,
                side: self.current_side,
            });
            ids.push(id);
        }

        debug!(count = ids.len(), side = %self.current_side, "added icon batch");
        ids
    }

    // -------------------------------------------------------------------------
    // Selection & Hit-Testing
    // -------------------------------------------------------------------------

    /// Hit-tests the active side at `(x, y)` and updates the selection.
    ///
    /// Elements are tested in reverse insertion order, so the topmost
    /// element wins on overlap. A miss clears any existing selection.
    ///
    /// Bounding boxes: text is measured width × font-size height;
    /// images and icons are a fixed 100×100 logical box times `scale`.
    pub fn select_at(&mut self, x: f32, y: f32, measure: &impl TextMeasure) -> Option<ElementId> {
        let hit = self
            .elements
            .iter()
            .rev()
            .filter(|e| e.side() == self.current_side)
            .find(|e| {
                let (ex, ey, w, h) = element_bounds(e, measure);
                x >= ex && x <= ex + w && y >= ey && y <= ey + h
            })
            .map(|e| e.id());

        self.selected = hit;
        hit
    }

    // -------------------------------------------------------------------------
    // Dragging
    // -------------------------------------------------------------------------

    /// Starts dragging an element. Only one element drags at a time, and
    /// only if it exists on the *active* side; a selection held over from
    /// the other side is locked out of drag interaction.
    pub fn begin_drag(&mut self, id: ElementId) {
        let draggable = self
            .element(id)
            .map(|e| e.side() == self.current_side)
            .unwrap_or(false);

        self.drag = draggable.then_some(id);
    }

    /// Moves the dragged element by the pointer delta. No-op when no drag
    /// is active. Other elements and the other side are untouched.
    pub fn update_drag(&mut self, dx: f32, dy: f32) {
        let Some(id) = self.drag else { return };
        if let Some(el) = self.elements.iter_mut().find(|e| e.id() == id) {
            el.translate(dx, dy);
        }
    }

    /// Ends the active drag.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Applies a property patch to the element matching `id`.
    /// No-op if the id is unknown.
    pub fn set_property(&mut self, id: ElementId, patch: ElementPatch) {
        let Some(el) = self.elements.iter_mut().find(|e| e.id() == id) else {
            return;
        };

        match el {
            CanvasElement::Text {
                color, font_size, ..
            } => {
                if let Some(c) = patch.color {
                    *color = c;
                }
                if let Some(s) = patch.font_size {
                    *font_size = s;
                }
            }
            CanvasElement::Image { scale, .. } => {
                if let Some(s) = patch.scale {
                    *scale = s;
                }
            }
            CanvasElement::Icon { color, scale, .. } => {
                if let Some(c) = patch.color {
                    *color = c;
                }
                if let Some(s) = patch.scale {
                    *scale = s;
                }
            }
        }
    }

    /// Removes an element. Clears the selection if it pointed at the
    /// removed element. No-op (returns false) on an unknown id.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id() != id);

        if self.elements.len() == before {
            return false;
        }

        self.rasters.remove(&id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.drag == Some(id) {
            self.drag = None;
        }
        debug!(%id, "removed element");
        true
    }

    /// Switches the active side.
    ///
    /// The selection is intentionally NOT cleared: this mirrors the
    /// storefront's shipped behavior, where a selection made on one side
    /// survives a side switch but is excluded from dragging and from the
    /// selection outline until its side is active again.
    pub fn set_side(&mut self, side: Side) {
        if self.current_side != side {
            debug!(from = %self.current_side, to = %side, "switched side");
        }
        self.current_side = side;
        // An in-flight drag cannot continue across a side switch.
        self.drag = None;
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// Packages the canvas into the payload attached to a cart line.
    ///
    /// The preview and print file cover the currently active side; the
    /// payload records that side as the last-edited one. Exporting both
    /// sides means serializing twice, once per side.
    pub fn serialize(&self, preview_image: String, print_file: PrintArtifact) -> CustomizationPayload {
        CustomizationPayload {
            preview_image,
            elements: self.elements.clone(),
            print_file,
            side: self.current_side,
        }
    }
}

/// The bounding box `(x, y, w, h)` used for hit-testing and the selection
/// outline.
pub fn element_bounds(element: &CanvasElement, measure: &impl TextMeasure) -> (f32, f32, f32, f32) {
    match element {
        CanvasElement::Text {
            content,
            font_family,
            font_size,
            x,
            y,
            ..
        } => {
            let w = measure.text_width(content, font_family, *font_size);
            (*x, *y, w, *font_size)
        }
        CanvasElement::Image { x, y, scale, .. } | CanvasElement::Icon { x, y, scale, .. } => {
            (*x, *y, ELEMENT_BOX * scale, ELEMENT_BOX * scale)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sumi_core::ICON_COLOR_TOKEN;

    fn measure() -> FixedAdvanceMeasure {
        FixedAdvanceMeasure::default()
    }

    fn icon_markup() -> String {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><rect x="10" y="10" width="80" height="80" fill="{}"/></svg>"##,
            ICON_COLOR_TOKEN
        )
    }

    #[test]
    fn add_text_returns_fresh_ids() {
        let mut canvas = DesignCanvas::new();
        let a = canvas.add_text("hello", "#000000", "Noto Sans JP", 24.0).unwrap();
        let b = canvas.add_text("world", "#000000", "Noto Sans JP", 24.0).unwrap();

        assert_ne!(a, b);
        assert_eq!(canvas.elements().len(), 2);
    }

    #[test]
    fn add_whitespace_text_is_a_no_op() {
        let mut canvas = DesignCanvas::new();
        assert!(canvas.add_text("   ", "#000000", "Noto Sans JP", 24.0).is_none());
        assert!(canvas.add_text("", "#000000", "Noto Sans JP", 24.0).is_none());
        assert!(canvas.elements().is_empty());
    }

    #[test]
    fn batch_icons_are_offset_not_stacked() {
        let mut canvas = DesignCanvas::new();
        let def = IconDef {
            markup: icon_markup(),
            color: "#ff0000".to_string(),
        };
        let ids = canvas.add_icons(&[def.clone(), def.clone(), def]);

        assert_eq!(ids.len(), 3);
        let positions: Vec<_> = canvas.elements().iter().map(|e| e.position()).collect();
        assert_ne!(positions[0], positions[1]);
        assert_ne!(positions[1], positions[2]);
        assert_eq!(
            positions[1],
            (positions[0].0 + ICON_BATCH_OFFSET, positions[0].1 + ICON_BATCH_OFFSET)
        );
    }

    #[test]
    fn select_at_topmost_wins_on_overlap() {
        let mut canvas = DesignCanvas::new();
        // All icons share the 100×100 box around the default anchor region,
        // overlapping near the later anchors.
        let def = IconDef {
            markup: icon_markup(),
            color: "#ff0000".to_string(),
        };
        let ids = canvas.add_icons(&[def.clone(), def.clone(), def]);

        // The last-added element's anchor point is inside all three boxes;
        // reverse-order testing must return the last id.
        let (lx, ly) = canvas.element(ids[2]).unwrap().position();
        assert_eq!(canvas.select_at(lx + 1.0, ly + 1.0, &measure()), Some(ids[2]));
        assert_eq!(canvas.selected(), Some(ids[2]));
    }

    #[test]
    fn select_miss_clears_selection() {
        let mut canvas = DesignCanvas::new();
        let id = canvas.add_icon(&icon_markup(), "#ff0000");
        let (x, y) = canvas.element(id).unwrap().position();
        canvas.select_at(x + 1.0, y + 1.0, &measure());
        assert_eq!(canvas.selected(), Some(id));

        canvas.select_at(-50.0, -50.0, &measure());
        assert_eq!(canvas.selected(), None);
    }

    #[test]
    fn text_hit_box_uses_measured_width() {
        let mut canvas = DesignCanvas::new();
        let id = canvas.add_text("wide text", "#000000", "Noto Sans JP", 20.0).unwrap();
        let (x, y) = canvas.element(id).unwrap().position();
        let width = measure().text_width("wide text", "Noto Sans JP", 20.0);

        assert_eq!(canvas.select_at(x + width - 1.0, y + 10.0, &measure()), Some(id));
        assert_eq!(canvas.select_at(x + width + 5.0, y + 10.0, &measure()), None);
        // Height is the font size.
        assert_eq!(canvas.select_at(x + 1.0, y + 25.0, &measure()), None);
    }

    #[test]
    fn drag_moves_only_the_dragged_element() {
        let mut canvas = DesignCanvas::new();
        let a = canvas.add_icon(&icon_markup(), "#ff0000");
        let b = canvas.add_icon(&icon_markup(), "#00ff00");
        let before_b = canvas.element(b).unwrap().position();

        let (ax, ay) = canvas.element(a).unwrap().position();
        canvas.begin_drag(a);
        canvas.update_drag(10.0, -5.0);
        canvas.update_drag(2.0, 2.0);
        canvas.end_drag();

        assert_eq!(canvas.element(a).unwrap().position(), (ax + 12.0, ay - 3.0));
        assert_eq!(canvas.element(b).unwrap().position(), before_b);

        // No active drag: further deltas do nothing.
        canvas.update_drag(100.0, 100.0);
        assert_eq!(canvas.element(a).unwrap().position(), (ax + 12.0, ay - 3.0));
    }

    #[test]
    fn drag_is_refused_for_elements_on_the_inactive_side() {
        let mut canvas = DesignCanvas::new();
        let front_id = canvas.add_icon(&icon_markup(), "#ff0000");
        let (x, y) = canvas.element(front_id).unwrap().position();

        canvas.set_side(Side::Back);
        canvas.begin_drag(front_id);
        canvas.update_drag(50.0, 50.0);

        assert_eq!(canvas.element(front_id).unwrap().position(), (x, y));
    }

    #[test]
    fn set_property_patches_per_kind() {
        let mut canvas = DesignCanvas::new();
        let text = canvas.add_text("hi", "#000000", "Noto Sans JP", 16.0).unwrap();
        let icon = canvas.add_icon(&icon_markup(), "#ff0000");

        canvas.set_property(
            text,
            ElementPatch {
                color: Some("#123456".to_string()),
                font_size: Some(32.0),
                scale: Some(9.0), // ignored for text
            },
        );
        canvas.set_property(
            icon,
            ElementPatch {
                scale: Some(1.5),
                ..Default::default()
            },
        );

        match canvas.element(text).unwrap() {
            CanvasElement::Text {
                color, font_size, ..
            } => {
                assert_eq!(color, "#123456");
                assert_eq!(*font_size, 32.0);
            }
            _ => panic!("expected text"),
        }
        match canvas.element(icon).unwrap() {
            CanvasElement::Icon { scale, .. } => assert_eq!(*scale, 1.5),
            _ => panic!("expected icon"),
        }

        // Unknown id: no-op, no panic.
        canvas.set_property(ElementId(9999), ElementPatch::default());
    }

    #[test]
    fn remove_selected_clears_selection() {
        let mut canvas = DesignCanvas::new();
        let id = canvas.add_icon(&icon_markup(), "#ff0000");
        let (x, y) = canvas.element(id).unwrap().position();
        canvas.select_at(x + 1.0, y + 1.0, &measure());

        assert!(canvas.remove(id));
        assert_eq!(canvas.selected(), None);
        assert!(canvas.elements().is_empty());
    }

    #[test]
    fn remove_unknown_id_is_a_no_op() {
        let mut canvas = DesignCanvas::new();
        canvas.add_icon(&icon_markup(), "#ff0000");
        assert!(!canvas.remove(ElementId(777)));
        assert_eq!(canvas.elements().len(), 1);
    }

    #[test]
    fn side_switch_keeps_selection_but_hides_other_side() {
        let mut canvas = DesignCanvas::new();
        let front_id = canvas.add_icon(&icon_markup(), "#ff0000");
        let (x, y) = canvas.element(front_id).unwrap().position();
        canvas.select_at(x + 1.0, y + 1.0, &measure());

        canvas.set_side(Side::Back);
        // Shipped behavior: the selection survives the switch.
        assert_eq!(canvas.selected(), Some(front_id));
        // But the front element is not hittable from the back side.
        assert_eq!(canvas.select_at(x + 1.0, y + 1.0, &measure()), None);
    }

    #[test]
    fn elements_added_per_side_stay_on_their_side() {
        let mut canvas = DesignCanvas::new();
        canvas.add_text("front text", "#000000", "Noto Sans JP", 20.0);
        canvas.set_side(Side::Back);
        canvas.add_text("back text", "#000000", "Noto Sans JP", 20.0);

        let front: Vec<_> = canvas
            .elements()
            .iter()
            .filter(|e| e.side() == Side::Front)
            .collect();
        let back: Vec<_> = canvas
            .elements()
            .iter()
            .filter(|e| e.side() == Side::Back)
            .collect();
        assert_eq!(front.len(), 1);
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn serialize_records_last_edited_side() {
        let mut canvas = DesignCanvas::new();
        canvas.add_text("hello", "#000000", "Noto Sans JP", 20.0);
        canvas.set_side(Side::Back);

        let payload = canvas.serialize(
            "data:image/png;base64,AAAA".to_string(),
            PrintArtifact {
                id: "artifact-1".to_string(),
                label: "sticker-back".to_string(),
                width_cm: 30.0,
                height_cm: 40.0,
                dpi: 300,
                data: vec![],
            },
        );

        assert_eq!(payload.side, Side::Back);
        assert_eq!(payload.elements.len(), 1);
    }
}
