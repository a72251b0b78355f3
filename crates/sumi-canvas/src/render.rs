//! # Canvas Renderer
//!
//! Full clear-and-redraw rasterization of the design canvas onto a fixed
//! 600×600 RGBA surface.
//!
//! ## Draw Order
//! ```text
//! 1. White clear                    (no incremental redraw, ever)
//! 2. Product background image       (front or back variant, scaled to fit)
//! 3. Dashed print-safe-area guide   (50% × 60%, centered, with caption)
//! 4. Elements of the active side    (insertion order = z order)
//! 5. Dashed selection outline       (only if the selection is on this side)
//! ```
//!
//! Redrawing from scratch on every mutation is what makes stale selection
//! outlines impossible: the previous frame is never patched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::png::PngEncoder;
use image::{imageops, ImageEncoder, Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};
use rusttype::{point, Font, Scale};
use tracing::{debug, warn};

use sumi_core::{CanvasElement, ICON_COLOR_TOKEN};

use crate::canvas::{element_bounds, DesignCanvas, TextMeasure};
use crate::error::{CanvasError, CanvasResult};
use crate::{CANVAS_SIZE, ELEMENT_BOX, PRINT_GUIDE_CAPTION, SAFE_AREA_HEIGHT_RATIO, SAFE_AREA_WIDTH_RATIO};

/// Dash pattern for guides and selection outlines: pixels on, pixels off.
const DASH_ON: u32 = 6;
const DASH_OFF: u32 = 4;

/// Guide stroke color (mid gray) and selection stroke color (accent blue).
const GUIDE_COLOR: Rgba<u8> = Rgba([140, 140, 140, 255]);
const SELECTION_COLOR: Rgba<u8> = Rgba([51, 122, 255, 255]);

/// Padding between an element's bounds and its selection outline.
const SELECTION_PADDING: f32 = 4.0;

/// Caption font size for the safe-area guide.
const CAPTION_SIZE: f32 = 14.0;

// =============================================================================
// Renderer
// =============================================================================

/// Rasterizes a [`DesignCanvas`] onto an RGBA surface.
///
/// Fonts are registered per family. When a text element references an
/// unregistered family the renderer falls back to the first registered
/// font; with no fonts at all, text elements are skipped with a warning
/// (measurement then falls back to a fixed advance so hit-testing stays
/// usable).
pub struct CanvasRenderer {
    fonts: HashMap<String, Font<'static>>,
    fallback_order: Vec<String>,
    /// Set after the first frame rendered with an empty font registry, so
    /// the missing-caption warning fires once instead of every frame.
    warned_no_fonts: AtomicBool,
}

impl CanvasRenderer {
    /// Creates a renderer with an empty font registry.
    pub fn new() -> Self {
        CanvasRenderer {
            fonts: HashMap::new(),
            fallback_order: Vec::new(),
            warned_no_fonts: AtomicBool::new(false),
        }
    }

    /// Whether any font family has been registered.
    pub fn has_fonts(&self) -> bool {
        !self.fonts.is_empty()
    }

    /// Registers a font family from raw TTF/OTF bytes.
    pub fn register_font(&mut self, family: impl Into<String>, data: Vec<u8>) -> CanvasResult<()> {
        let family = family.into();
        let font = Font::try_from_vec(data)
            .ok_or_else(|| CanvasError::FontLoad(format!("unparseable font data for '{}'", family)))?;
        if !self.fonts.contains_key(&family) {
            self.fallback_order.push(family.clone());
        }
        self.fonts.insert(family, font);
        Ok(())
    }

    fn font_for(&self, family: &str) -> Option<&Font<'static>> {
        self.fonts.get(family).or_else(|| {
            self.fallback_order
                .first()
                .and_then(|first| self.fonts.get(first))
        })
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Renders the active side of the canvas.
    ///
    /// `background` is the product photo for the active side (front or
    /// back variant); pass `None` for a plain white surface.
    pub fn render(&self, canvas: &DesignCanvas, background: Option<&RgbaImage>) -> RgbaImage {
        if self.fonts.is_empty() && !self.warned_no_fonts.swap(true, Ordering::Relaxed) {
            warn!("no fonts registered; text elements and the safe-area caption will be skipped");
        }

        let mut surface = RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Rgba([255, 255, 255, 255]));

        if let Some(bg) = background {
            draw_background_fit(&mut surface, bg);
        }

        self.draw_safe_area_guide(&mut surface);

        let side = canvas.current_side();
        for element in canvas.elements().iter().filter(|e| e.side() == side) {
            self.draw_element(&mut surface, canvas, element);
        }

        if let Some(selected) = canvas.selected() {
            if let Some(element) = canvas.element(selected) {
                // A selection held over from the inactive side draws no
                // outline; it is inert until its side is active again.
                if element.side() == side {
                    let (x, y, w, h) = element_bounds(element, self);
                    dashed_rect(
                        &mut surface,
                        x - SELECTION_PADDING,
                        y - SELECTION_PADDING,
                        w + 2.0 * SELECTION_PADDING,
                        h + 2.0 * SELECTION_PADDING,
                        SELECTION_COLOR,
                    );
                }
            }
        }

        debug!(side = %side, elements = canvas.elements().len(), "rendered canvas frame");
        surface
    }

    fn draw_safe_area_guide(&self, surface: &mut RgbaImage) {
        let (gx, gy, gw, gh) = safe_area_rect(surface.width(), surface.height());
        dashed_rect(surface, gx as f32, gy as f32, gw as f32, gh as f32, GUIDE_COLOR);

        // Caption sits just below the guide's bottom edge.
        if let Some(font) = self.fallback_order.first().and_then(|f| self.fonts.get(f)) {
            let caption_w = text_width(font, CAPTION_SIZE, PRINT_GUIDE_CAPTION);
            let cx = gx as f32 + (gw as f32 - caption_w) / 2.0;
            let cy = (gy + gh) as f32 + 4.0;
            draw_text(surface, font, CAPTION_SIZE, cx, cy, GUIDE_COLOR, PRINT_GUIDE_CAPTION);
        }
    }

    fn draw_element(&self, surface: &mut RgbaImage, canvas: &DesignCanvas, element: &CanvasElement) {
        match element {
            CanvasElement::Text {
                content,
                color,
                font_family,
                font_size,
                x,
                y,
                ..
            } => match self.font_for(font_family) {
                Some(font) => {
                    let color = parse_hex_color(color);
                    draw_text(surface, font, *font_size, *x, *y, color, content);
                }
                None => warn!(family = %font_family, "no font registered, skipping text element"),
            },
            CanvasElement::Image { id, x, y, scale, .. } => {
                match canvas.raster(*id) {
                    Some(raster) => {
                        let box_px = (ELEMENT_BOX * scale).round().max(1.0) as u32;
                        let (w, h) = fit_within(raster.width(), raster.height(), box_px, box_px);
                        let resized = imageops::resize(raster, w, h, imageops::FilterType::Triangle);
                        imageops::overlay(surface, &resized, *x as i64, *y as i64);
                    }
                    // Pixels are decoded before insertion, so a missing
                    // raster means the payload was re-opened without
                    // re-resolving its assets.
                    None => warn!(%id, "image element has no decoded raster, skipping"),
                }
            }
            CanvasElement::Icon {
                markup,
                color,
                x,
                y,
                scale,
                ..
            } => {
                let recolored = markup.replace(ICON_COLOR_TOKEN, color);
                let size = (ELEMENT_BOX * scale).round().max(1.0) as u32;
                let icon = rasterize_icon(&recolored, size);
                imageops::overlay(surface, &icon, *x as i64, *y as i64);
            }
        }
    }
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        CanvasRenderer::new()
    }
}

impl TextMeasure for CanvasRenderer {
    fn text_width(&self, content: &str, font_family: &str, font_size: f32) -> f32 {
        match self.font_for(font_family) {
            Some(font) => text_width(font, font_size, content),
            // No fonts registered: fixed advance keeps hit boxes sane.
            None => content.chars().count() as f32 * 0.6 * font_size,
        }
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// The print-safe-area guide rectangle: 50% width × 60% height, centered.
pub fn safe_area_rect(surface_w: u32, surface_h: u32) -> (u32, u32, u32, u32) {
    let gw = (surface_w as f32 * SAFE_AREA_WIDTH_RATIO) as u32;
    let gh = (surface_h as f32 * SAFE_AREA_HEIGHT_RATIO) as u32;
    ((surface_w - gw) / 2, (surface_h - gh) / 2, gw, gh)
}

/// Scales `(w, h)` to fit inside `(max_w, max_h)` preserving aspect ratio.
pub fn fit_within(w: u32, h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let scale = (max_w as f32 / w as f32).min(max_h as f32 / h as f32);
    (
        ((w as f32 * scale).round() as u32).max(1),
        ((h as f32 * scale).round() as u32).max(1),
    )
}

fn draw_background_fit(surface: &mut RgbaImage, bg: &RgbaImage) {
    let (w, h) = fit_within(bg.width(), bg.height(), surface.width(), surface.height());
    let resized = imageops::resize(bg, w, h, imageops::FilterType::Triangle);
    let x = (surface.width() - w) / 2;
    let y = (surface.height() - h) / 2;
    imageops::overlay(surface, &resized, x as i64, y as i64);
}

// =============================================================================
// Primitive Drawing
// =============================================================================

/// Parses a `#rrggbb` color. Falls back to opaque black on malformed
/// input so a bad stored color degrades visibly instead of failing the
/// whole frame.
pub fn parse_hex_color(s: &str) -> Rgba<u8> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() == 6 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ) {
            return Rgba([r, g, b, 255]);
        }
    }
    warn!(color = %s, "malformed hex color, using black");
    Rgba([0, 0, 0, 255])
}

fn put_pixel_checked(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, color);
    }
}

/// Draws a dashed axis-aligned rectangle outline.
pub fn dashed_rect(img: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
    let (x0, y0) = (x.round() as i64, y.round() as i64);
    let (x1, y1) = ((x + w).round() as i64, (y + h).round() as i64);
    let period = (DASH_ON + DASH_OFF) as i64;

    for px in x0..=x1 {
        if (px - x0).rem_euclid(period) < DASH_ON as i64 {
            put_pixel_checked(img, px, y0, color);
            put_pixel_checked(img, px, y1, color);
        }
    }
    for py in y0..=y1 {
        if (py - y0).rem_euclid(period) < DASH_ON as i64 {
            put_pixel_checked(img, x0, py, color);
            put_pixel_checked(img, x1, py, color);
        }
    }
}

/// Measures rendered text width with real glyph metrics.
fn text_width(font: &Font<'static>, px: f32, text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let mut width: f32 = 0.0;
    for g in font.layout(text, scale, point(0.0, v_metrics.ascent)) {
        if let Some(bb) = g.pixel_bounding_box() {
            width = width.max(bb.max.x as f32);
        }
    }
    width
}

/// Draws text with per-pixel alpha blending of glyph coverage.
fn draw_text(img: &mut RgbaImage, font: &Font<'static>, px: f32, x: f32, y: f32, color: Rgba<u8>, text: &str) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let baseline_y = y + v_metrics.ascent;

    for glyph in font.layout(text, scale, point(x, baseline_y)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                if px >= img.width() || py >= img.height() {
                    return;
                }
                let a = (v * 255.0) as u8;
                if a == 0 {
                    return;
                }
                let dst = img.get_pixel_mut(px, py);
                let sa = a as f32 / 255.0;
                let inv = 1.0 - sa;
                dst.0[0] = (color.0[0] as f32 * sa + dst.0[0] as f32 * inv) as u8;
                dst.0[1] = (color.0[1] as f32 * sa + dst.0[1] as f32 * inv) as u8;
                dst.0[2] = (color.0[2] as f32 * sa + dst.0[2] as f32 * inv) as u8;
                dst.0[3] = 255;
            });
        }
    }
}

// =============================================================================
// Icon Rasterization
// =============================================================================

/// Rasterizes SVG icon markup into an RGBA tile of `size`×`size`.
///
/// The markup is real SVG (typically a 100×100 viewbox), already recolored
/// (the [`ICON_COLOR_TOKEN`] token substituted into its `fill` attributes).
/// The tree is scaled so the document fills the tile, then rendered through
/// `resvg` into a premultiplied pixmap and demultiplied into the tile.
///
/// Malformed markup yields a transparent tile with a warning; an icon never
/// fails a frame.
pub fn rasterize_icon(markup: &str, size: u32) -> RgbaImage {
    let mut tile = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));

    let tree = match usvg::Tree::from_str(markup, &usvg::Options::default()) {
        Ok(tree) => tree,
        Err(e) => {
            warn!(error = %e, "unparseable icon markup, rendering empty tile");
            return tile;
        }
    };

    let Some(mut pixmap) = tiny_skia::Pixmap::new(size, size) else {
        return tile;
    };
    let sx = size as f32 / tree.size().width();
    let sy = size as f32 / tree.size().height();
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    for (i, pixel) in pixmap.pixels().iter().enumerate() {
        let c = pixel.demultiply();
        let x = i as u32 % size;
        let y = i as u32 / size;
        tile.put_pixel(x, y, Rgba([c.red(), c.green(), c.blue(), c.alpha()]));
    }

    tile
}

// =============================================================================
// Preview Encoding
// =============================================================================

/// Encodes a rendered surface as a PNG data URL for the cart preview.
pub fn encode_preview(surface: &RgbaImage) -> CanvasResult<String> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            surface.as_raw(),
            surface.width(),
            surface.height(),
            image::ColorType::Rgba8,
        )
        .map_err(|e| CanvasError::PreviewEncode(e.to_string()))?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(&buf)))
}

// =============================================================================
// Unit Tests
// =============================================================================
