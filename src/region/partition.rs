//! Greedy grouping of glyph fragments into a bounded set of overlay regions.
//!
//! The text renderer tends to emit many small bitmaps. Handing each of them to the compositor as
//! its own region is expensive, so fragments that sit close to each other are merged into one
//! rectangle, and the number of rectangles is capped by collapsing the cheapest pair.

use smallvec::SmallVec;

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{SubrasterError, SubrasterResult};
use crate::glyph::fragment::Fragment;

/// Region cap used when nothing else is configured.
pub const DEFAULT_MAX_REGIONS: usize = 4;

/// Proximity tolerance, in pixels, applied on each side of both rectangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tolerance {
    /// Horizontal growth.
    pub dx: i32,
    /// Vertical growth.
    pub dy: i32,
}

impl Tolerance {
    /// Tolerance for a canvas using the default [`TolerancePolicy`].
    pub fn for_canvas(width: u32, height: u32) -> Self {
        TolerancePolicy::default().for_canvas(width, height)
    }
}

/// How the proximity tolerance scales with the canvas.
///
/// `dx = max(ceil(width / width_divisor), min_px)` and likewise for `dy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TolerancePolicy {
    /// Canvas width fraction used for `dx`.
    pub width_divisor: u32,
    /// Canvas height fraction used for `dy`.
    pub height_divisor: u32,
    /// Lower bound for both axes.
    pub min_px: u32,
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self {
            width_divisor: 50,
            height_divisor: 100,
            min_px: 32,
        }
    }
}

impl TolerancePolicy {
    /// Resolve the pixel tolerance for a canvas.
    pub fn for_canvas(&self, width: u32, height: u32) -> Tolerance {
        let dx = width.div_ceil(self.width_divisor.max(1)).max(self.min_px);
        let dy = height.div_ceil(self.height_divisor.max(1)).max(self.min_px);
        Tolerance {
            dx: i32::try_from(dx).unwrap_or(i32::MAX),
            dy: i32::try_from(dy).unwrap_or(i32::MAX),
        }
    }

    /// Reject zero divisors.
    pub fn validate(&self) -> SubrasterResult<()> {
        if self.width_divisor == 0 || self.height_divisor == 0 {
            return Err(SubrasterError::validation(
                "tolerance divisors must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Partitioning parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartitionOpts {
    /// Maximum number of regions returned, must be >= 1.
    pub max_regions: usize,
    /// Proximity tolerance policy.
    pub tolerance: TolerancePolicy,
}

impl Default for PartitionOpts {
    fn default() -> Self {
        Self {
            max_regions: DEFAULT_MAX_REGIONS,
            tolerance: TolerancePolicy::default(),
        }
    }
}

/// Group fragments into at most `max_regions` rectangles covering every fragment with an area.
///
/// An empty result means there is nothing to draw.
pub fn partition(
    fragments: &[Fragment<'_>],
    max_regions: usize,
    canvas_width: u32,
    canvas_height: u32,
) -> SubrasterResult<Vec<Rect>> {
    partition_with(
        fragments,
        Canvas {
            width: canvas_width,
            height: canvas_height,
        },
        &PartitionOpts {
            max_regions,
            ..PartitionOpts::default()
        },
    )
}

/// [`partition`] with an explicit tolerance policy.
#[tracing::instrument(skip(fragments, opts), fields(fragments = fragments.len()))]
pub fn partition_with(
    fragments: &[Fragment<'_>],
    canvas: Canvas,
    opts: &PartitionOpts,
) -> SubrasterResult<Vec<Rect>> {
    let mut rects = Vec::new();
    rects.try_reserve_exact(fragments.len())?;
    for f in fragments.iter().filter(|f| f.has_area()) {
        let rect = f.checked_rect().ok_or_else(|| {
            SubrasterError::validation(format!(
                "fragment at ({}, {}) size {}x{} extends past the i32 canvas range",
                f.x, f.y, f.w, f.h
            ))
        })?;
        rects.push(rect);
    }
    let tolerance = opts.tolerance.for_canvas(canvas.width, canvas.height);
    partition_rects(&rects, opts.max_regions, tolerance)
}

/// Core merge loop over bare rectangles. Empty rectangles are ignored.
///
/// Regions are returned in creation order; a collapsed region leaves its slot and later regions
/// shift down by one.
pub fn partition_rects(
    rects: &[Rect],
    max_regions: usize,
    tolerance: Tolerance,
) -> SubrasterResult<Vec<Rect>> {
    if max_regions == 0 {
        return Err(SubrasterError::validation("max_regions must be >= 1"));
    }

    let mut pending: Vec<Option<Rect>> = Vec::new();
    pending.try_reserve_exact(rects.len())?;
    pending.extend(rects.iter().filter(|r| !r.is_empty()).map(|r| Some(*r)));
    let count = pending.len();
    if count == 0 {
        return Ok(Vec::new());
    }

    // One slot of headroom: a fresh seed may exceed the cap until the next collapse.
    let mut regions: SmallVec<[Rect; DEFAULT_MAX_REGIONS + 1]> = SmallVec::new();
    regions
        .try_reserve_exact(max_regions.min(count).saturating_add(1))
        .map_err(|e| SubrasterError::allocation(format!("region scratch: {e:?}")))?;

    let mut used = 0usize;
    while used < count {
        let Some(seed) = pending.iter_mut().find_map(Option::take) else {
            break;
        };
        regions.push(seed);
        used += 1;

        loop {
            let mut absorbed = false;
            for slot in pending.iter_mut() {
                let Some(r) = *slot else {
                    continue;
                };
                if let Some(best) = best_region(&regions, r, tolerance) {
                    regions[best] = regions[best].union(r);
                    *slot = None;
                    used += 1;
                    absorbed = true;
                }
            }
            if !absorbed {
                break;
            }
        }

        if regions.len() > max_regions {
            collapse_cheapest_pair(&mut regions);
        }
    }

    let mut out = Vec::new();
    out.try_reserve_exact(regions.len())?;
    out.extend_from_slice(&regions);
    tracing::debug!(fragments = count, regions = out.len(), "partitioned fragments");
    Ok(out)
}

/// Index of the smallest region `r` may merge with; ties go to the lowest index.
fn best_region(regions: &[Rect], r: Rect, tolerance: Tolerance) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (k, region) in regions.iter().enumerate() {
        if !region.overlaps_with_tolerance(r, tolerance.dx, tolerance.dy) {
            continue;
        }
        let surface = region.area();
        if best.is_none_or(|(_, s)| surface < s) {
            best = Some((k, surface));
        }
    }
    best.map(|(k, _)| k)
}

/// Merge the pair whose union wastes the least surface, keeping the lower slot.
fn collapse_cheapest_pair(regions: &mut SmallVec<[Rect; DEFAULT_MAX_REGIONS + 1]>) {
    let mut best: Option<(usize, usize, i64)> = None;
    for i in 0..regions.len() {
        for j in i + 1..regions.len() {
            let waste = regions[i].union(regions[j]).area() - regions[i].area() - regions[j].area();
            if best.is_none_or(|(_, _, w)| waste < w) {
                best = Some((i, j, waste));
            }
        }
    }
    if let Some((i, j, _)) = best {
        regions[i] = regions[i].union(regions[j]);
        regions.remove(j);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/region/partition.rs"]
mod tests;
