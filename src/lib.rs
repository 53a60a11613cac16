//! Subraster composites subtitle glyph bitmaps into a small set of RGBA overlay regions.
//!
//! An external text renderer (see [`GlyphRenderer`]) hands over many small, possibly overlapping
//! coverage bitmaps for a timestamp. Subraster then:
//!
//! - groups them into at most `max_regions` rectangles ([`partition`])
//! - blends every fragment of a region into a fresh RGBA buffer ([`rasterize`])
//! - skips the whole pass when nothing relevant changed ([`OverlayUpdater`])
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod glyph;
mod overlay;
mod region;
mod render;

/// Overlay configuration.
pub mod config;
/// Tracing subscriber setup for binaries.
pub mod logging;

pub use crate::config::{LoggingConfig, OverlayConfig};
pub use crate::foundation::core::{Canvas, PackedColor, Rect, Tick, VideoFormat};
pub use crate::foundation::error::{SubrasterError, SubrasterResult};
pub use crate::glyph::fragment::{Fragment, GlyphFrame};
pub use crate::glyph::renderer::{GlyphRenderer, RenderGeometry};
pub use crate::glyph::scripted::{OwnedFragment, ScriptedEvent, ScriptedRenderer};
pub use crate::overlay::cue::{Cue, CueBlock, CueOutcome, CueTimeline};
pub use crate::overlay::updater::{
    Alignment, Overlay, OverlayRegion, OverlayUpdater, Placement, UpdateOutcome, VideoGeometry,
    compose_overlay,
};
pub use crate::region::partition::{
    DEFAULT_MAX_REGIONS, PartitionOpts, Tolerance, TolerancePolicy, partition, partition_rects,
    partition_with,
};
pub use crate::render::pixel_buffer::PixelBuffer;
pub use crate::render::raster::{
    RasterStats, blend_coverage, rasterize, rasterize_aligned, rasterize_into,
};
