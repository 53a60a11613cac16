use crate::config::OverlayConfig;
use crate::foundation::core::{Canvas, Rect, Tick, VideoFormat};
use crate::foundation::error::SubrasterResult;
use crate::glyph::fragment::Fragment;
use crate::glyph::renderer::{GlyphRenderer, RenderGeometry};
use crate::region::partition::partition_with;
use crate::render::pixel_buffer::PixelBuffer;
use crate::render::raster::rasterize_aligned;

/// Source (script storage) and destination (display) video formats for one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VideoGeometry {
    /// Source video format.
    pub src: VideoFormat,
    /// Destination video format.
    pub dst: VideoFormat,
}

/// Region anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    /// `(x, y)` addresses the top-left pixel of the region.
    #[default]
    TopLeft,
}

/// How the consumer positions a region on the destination frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Coordinates are absolute frame coordinates.
    pub absolute: bool,
    /// Coordinates are relative to a window rather than the frame.
    pub in_window: bool,
    /// Anchor of `(x, y)`.
    pub align: Alignment,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            absolute: true,
            in_window: false,
            align: Alignment::TopLeft,
        }
    }
}

/// One composited region of the overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayRegion {
    /// Canvas rectangle covered by `buffer`.
    pub rect: Rect,
    /// RGBA pixels of the region.
    pub buffer: PixelBuffer,
    /// Positioning hints for the consumer.
    pub placement: Placement,
}

impl OverlayRegion {
    /// Destination x of the top-left pixel.
    pub fn x(&self) -> i32 {
        self.rect.x0
    }

    /// Destination y of the top-left pixel.
    pub fn y(&self) -> i32 {
        self.rect.y0
    }
}

/// The set of regions currently on display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overlay {
    /// Regions in partition order.
    pub regions: Vec<OverlayRegion>,
    /// Destination visible width the regions were laid out for.
    pub original_width: u32,
    /// Destination visible height the regions were laid out for.
    pub original_height: u32,
}

impl Overlay {
    /// Return `true` when nothing is displayed.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Result of [`OverlayUpdater::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing changed; the previous overlay stays on display.
    Unchanged,
    /// The pass ran and there is nothing to draw.
    Cleared,
    /// The pass produced this many regions.
    Rendered {
        /// Number of regions in the new overlay.
        regions: usize,
    },
}

/// Partition `fragments` for `canvas` and rasterize every resulting region.
///
/// This is one full pass; any failure yields no regions at all.
pub fn compose_overlay(
    fragments: &[Fragment<'_>],
    canvas: Canvas,
    config: &OverlayConfig,
) -> SubrasterResult<Vec<OverlayRegion>> {
    let rects = partition_with(fragments, canvas, &config.partition_opts())?;
    let mut regions = Vec::new();
    regions.try_reserve_exact(rects.len())?;
    for rect in rects {
        let buffer = rasterize_aligned(rect, fragments, config.row_alignment)?;
        regions.push(OverlayRegion {
            rect,
            buffer,
            placement: Placement::default(),
        });
    }
    Ok(regions)
}

/// Drives a [`GlyphRenderer`] sample by sample and keeps the overlay it produced.
///
/// The updater owns only the previous geometry and the current overlay; every pass allocates its
/// own scratch and pixel buffers.
#[derive(Debug)]
pub struct OverlayUpdater {
    config: OverlayConfig,
    previous: Option<VideoGeometry>,
    overlay: Overlay,
}

impl OverlayUpdater {
    /// Create an updater with a validated configuration.
    pub fn new(config: OverlayConfig) -> SubrasterResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            previous: None,
            overlay: Overlay::default(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// The overlay currently on display.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Hand the overlay to the consumer, leaving an empty one behind.
    pub fn take_overlay(&mut self) -> Overlay {
        std::mem::take(&mut self.overlay)
    }

    /// Drop the overlay and forget the previous geometry, forcing a full pass next time.
    pub fn reset(&mut self) {
        self.previous = None;
        self.overlay = Overlay::default();
    }

    /// Render the overlay for display time `at`.
    ///
    /// Geometry changes are pushed to the renderer first. The pass is skipped when the renderer
    /// reports no change, geometry is unchanged, and whether anything is drawn is unchanged.
    /// On error the overlay is left empty.
    #[tracing::instrument(skip(self, renderer, geometry, at), fields(at = at.0))]
    pub fn update<R: GlyphRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        geometry: VideoGeometry,
        at: Tick,
    ) -> SubrasterResult<UpdateOutcome> {
        let outcome = self.run_pass(renderer, geometry, at);
        if let Err(e) = &outcome {
            tracing::warn!(error = %e, "overlay pass failed, no regions produced");
            self.overlay.regions.clear();
        }
        outcome
    }

    fn run_pass<R: GlyphRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        geometry: VideoGeometry,
        at: Tick,
    ) -> SubrasterResult<UpdateOutcome> {
        let (src_changed, dst_changed) = match self.previous {
            None => (true, true),
            Some(prev) => (
                prev.src.visible_width != geometry.src.visible_width
                    || prev.src.visible_height != geometry.src.visible_height,
                prev.dst != geometry.dst,
            ),
        };
        if src_changed || dst_changed {
            let render_geometry = RenderGeometry::from_video(geometry.src, geometry.dst)?;
            tracing::debug!(?render_geometry, "video geometry changed");
            renderer.set_geometry(&render_geometry);
            self.previous = Some(geometry);
        }

        let frame = renderer.render_frame(at)?;
        if !frame.changed
            && !src_changed
            && !dst_changed
            && frame.is_empty() == self.overlay.is_empty()
        {
            tracing::debug!("overlay unchanged, pass skipped");
            return Ok(UpdateOutcome::Unchanged);
        }

        self.overlay = Overlay {
            regions: Vec::new(),
            original_width: geometry.dst.visible_width,
            original_height: geometry.dst.visible_height,
        };
        let canvas = Canvas {
            width: geometry.dst.width,
            height: geometry.dst.height,
        };
        let regions = compose_overlay(&frame.fragments, canvas, &self.config)?;
        if regions.is_empty() {
            return Ok(UpdateOutcome::Cleared);
        }
        let n = regions.len();
        self.overlay.regions = regions;
        Ok(UpdateOutcome::Rendered { regions: n })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/updater.rs"]
mod tests;
