use crate::foundation::core::{Tick, VideoFormat};
use crate::foundation::error::SubrasterResult;
use crate::glyph::fragment::GlyphFrame;

/// Layout parameters pushed to the renderer whenever the video geometry changes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderGeometry {
    /// Output frame width (destination visible width).
    pub frame_width: u32,
    /// Output frame height (destination visible height).
    pub frame_height: u32,
    /// Script storage width (source visible width).
    pub storage_width: u32,
    /// Script storage height (source visible height).
    pub storage_height: u32,
    /// `(dst_w / dst_h) / (src_w / src_h)`.
    pub pixel_aspect: f64,
}

impl RenderGeometry {
    /// Derive renderer geometry from the source and destination video formats.
    pub fn from_video(src: VideoFormat, dst: VideoFormat) -> SubrasterResult<Self> {
        let src_ratio = src.visible_ratio()?;
        let dst_ratio = dst.visible_ratio()?;
        Ok(Self {
            frame_width: dst.visible_width,
            frame_height: dst.visible_height,
            storage_width: src.visible_width,
            storage_height: src.visible_height,
            pixel_aspect: dst_ratio / src_ratio,
        })
    }
}

/// External text-layout engine producing glyph fragments for a timestamp.
///
/// Implementations own the fragment bitmaps; the returned frame borrows them until the next call.
pub trait GlyphRenderer {
    /// Update frame size, storage size and pixel aspect.
    fn set_geometry(&mut self, geometry: &RenderGeometry);

    /// Render the subtitle state at `at`.
    fn render_frame(&mut self, at: Tick) -> SubrasterResult<GlyphFrame<'_>>;
}

#[cfg(test)]
#[path = "../../tests/unit/glyph/renderer.rs"]
mod tests;
