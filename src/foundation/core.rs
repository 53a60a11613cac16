use crate::foundation::error::{SubrasterError, SubrasterResult};

/// Axis-aligned integer rectangle `[x0, x1) x [y0, y1)` in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x0: i32,
    /// Top edge (inclusive).
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl Rect {
    /// Create a rectangle from its corners.
    ///
    /// Callers are expected to pass `x1 >= x0` and `y1 >= y0`.
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a rectangle from a top-left origin and a size.
    pub fn from_origin_size(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, x.saturating_add(w), y.saturating_add(h))
    }

    /// Width in pixels (`x1 - x0`).
    pub fn width(self) -> i64 {
        i64::from(self.x1) - i64::from(self.x0)
    }

    /// Height in pixels (`y1 - y0`).
    pub fn height(self) -> i64 {
        i64::from(self.y1) - i64::from(self.y0)
    }

    /// Surface in square pixels.
    pub fn area(self) -> i64 {
        self.width() * self.height()
    }

    /// Return `true` when the rectangle covers no pixel.
    pub fn is_empty(self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Smallest rectangle enclosing both `self` and `other`.
    pub fn union(self, other: Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Return `true` when `other` lies entirely inside `self`.
    pub fn contains_rect(self, other: Rect) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }

    /// Grow the rectangle outward by `dx` horizontally and `dy` vertically on every side.
    pub fn expanded(self, dx: i32, dy: i32) -> Rect {
        Rect {
            x0: self.x0.saturating_sub(dx),
            y0: self.y0.saturating_sub(dy),
            x1: self.x1.saturating_add(dx),
            y1: self.y1.saturating_add(dy),
        }
    }

    /// Return `true` when both rectangles, each expanded by `(dx, dy)`, strictly overlap.
    ///
    /// Boxes that only touch after expansion do not overlap.
    pub fn overlaps_with_tolerance(self, other: Rect, dx: i32, dy: i32) -> bool {
        let a = self.expanded(dx, dy);
        let b = other.expanded(dx, dy);
        a.x0.max(b.x0) < a.x1.min(b.x1) && a.y0.max(b.y0) < a.y1.min(b.y1)
    }
}

/// Target canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Timestamp on the subtitle timeline, in microseconds.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Tick(pub i64);

impl Tick {
    /// Zero timestamp.
    pub const ZERO: Tick = Tick(0);

    /// Build a tick from milliseconds.
    pub fn from_millis(ms: i64) -> Self {
        Tick(ms.saturating_mul(1000))
    }

    /// Milliseconds, truncated toward zero.
    pub fn as_millis(self) -> i64 {
        self.0 / 1000
    }

    /// `self + other`, saturating at the numeric bounds.
    pub fn saturating_add(self, other: Tick) -> Tick {
        Tick(self.0.saturating_add(other.0))
    }

    /// `self - other`, saturating at the numeric bounds.
    pub fn saturating_sub(self, other: Tick) -> Tick {
        Tick(self.0.saturating_sub(other.0))
    }
}

/// Fragment color packed as `0xRRGGBBTT`, where `TT` is the *inverted* alpha.
///
/// A stored `TT` of `0x00` means fully opaque and `0xFF` fully transparent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PackedColor(pub u32);

impl PackedColor {
    /// Pack straight color and a regular (non-inverted) alpha.
    pub fn from_rgba(r: u8, g: u8, b: u8, alpha: u8) -> Self {
        PackedColor(
            (u32::from(r) << 24) | (u32::from(g) << 16) | (u32::from(b) << 8) | u32::from(!alpha),
        )
    }

    /// Red channel (bits 31..24).
    pub fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel (bits 23..16).
    pub fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel (bits 15..8).
    pub fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// The stored low byte, as the external renderer writes it.
    pub fn inverted_alpha(self) -> u8 {
        self.0 as u8
    }

    /// Effective opacity: `!packed & 0xFF`.
    pub fn alpha(self) -> u8 {
        (!self.0 & 0xff) as u8
    }
}

/// Frame dimensions used by the overlay (`visible_*` is what gets displayed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct VideoFormat {
    /// Full buffer width in pixels.
    pub width: u32,
    /// Full buffer height in pixels.
    pub height: u32,
    /// Displayed width in pixels.
    pub visible_width: u32,
    /// Displayed height in pixels.
    pub visible_height: u32,
}

impl VideoFormat {
    /// Format whose visible area is the full buffer.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            visible_width: width,
            visible_height: height,
        }
    }

    /// Visible aspect ratio `visible_width / visible_height`.
    pub fn visible_ratio(self) -> SubrasterResult<f64> {
        if self.visible_width == 0 || self.visible_height == 0 {
            return Err(SubrasterError::validation(
                "video format visible dimensions must be > 0",
            ));
        }
        Ok(f64::from(self.visible_width) / f64::from(self.visible_height))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
