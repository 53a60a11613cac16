use crate::foundation::core::{PackedColor, Rect};

/// One glyph or stroke bitmap produced by the external text renderer.
///
/// Fragments are borrowed read-only for the duration of one rasterization pass; the bitmap is
/// owned by the renderer.
#[derive(Clone, Copy, Debug)]
pub struct Fragment<'a> {
    /// Destination x on the canvas.
    pub x: i32,
    /// Destination y on the canvas.
    pub y: i32,
    /// Width in pixels; fragments with `w <= 0` are ignored.
    pub w: i32,
    /// Height in pixels; fragments with `h <= 0` are ignored.
    pub h: i32,
    /// Bytes between the starts of two consecutive bitmap rows.
    pub stride: usize,
    /// Row-major 8-bit coverage, `stride` bytes per row.
    pub bitmap: &'a [u8],
    /// Solid fill color with inverted alpha.
    pub color: PackedColor,
}

impl<'a> Fragment<'a> {
    /// Bounding box on the canvas.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.x, self.y, self.w, self.h)
    }

    /// Bounding box on the canvas, or `None` when its far edge does not fit in `i32`.
    pub fn checked_rect(&self) -> Option<Rect> {
        Some(Rect::new(
            self.x,
            self.y,
            self.x.checked_add(self.w)?,
            self.y.checked_add(self.h)?,
        ))
    }

    /// Return `true` when the fragment covers at least one pixel.
    pub fn has_area(&self) -> bool {
        self.w > 0 && self.h > 0
    }

    /// Coverage bytes of bitmap row `row`, or `None` when the bitmap is too short for it.
    pub fn coverage_row(&self, row: usize) -> Option<&'a [u8]> {
        let w = usize::try_from(self.w).ok()?;
        let start = row.checked_mul(self.stride)?;
        self.bitmap.get(start..start.checked_add(w)?)
    }

    /// Return `true` when every row of the declared size is backed by bitmap bytes.
    pub fn is_complete(&self) -> bool {
        match usize::try_from(self.h) {
            Ok(0) | Err(_) => true,
            Ok(h) => self.w <= 0 || self.coverage_row(h - 1).is_some(),
        }
    }
}

/// The renderer's answer for one timestamp.
#[derive(Clone, Debug, Default)]
pub struct GlyphFrame<'a> {
    /// Fragments in paint order (later ones composite over earlier ones).
    pub fragments: Vec<Fragment<'a>>,
    /// Whether the output differs from the previous call.
    pub changed: bool,
}

impl<'a> GlyphFrame<'a> {
    /// A frame with nothing to draw.
    pub fn empty(changed: bool) -> Self {
        Self {
            fragments: Vec::new(),
            changed,
        }
    }

    /// Return `true` when the renderer produced no fragment at all.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/glyph/fragment.rs"]
mod tests;
