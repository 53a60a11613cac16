use crate::foundation::core::Rect;
use crate::foundation::error::{SubrasterError, SubrasterResult};
use crate::glyph::fragment::Fragment;
use crate::render::pixel_buffer::PixelBuffer;

/// Per-pass counters reported by [`rasterize_into`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterStats {
    /// Fragments blended into the buffer.
    pub drawn: usize,
    /// Fragments dropped because they do not fit entirely inside the region.
    pub out_of_bounds: usize,
    /// Fragments dropped because their color is fully transparent.
    pub transparent: usize,
    /// Fragments dropped because their bitmap is shorter than `stride * h`.
    pub truncated: usize,
}

/// Allocate a buffer for `region` and blend every fragment that fits inside it.
pub fn rasterize(region: Rect, fragments: &[Fragment<'_>]) -> SubrasterResult<PixelBuffer> {
    rasterize_aligned(region, fragments, 1)
}

/// [`rasterize`] with rows padded to a multiple of `row_alignment` bytes.
#[tracing::instrument(skip(fragments), fields(fragments = fragments.len()))]
pub fn rasterize_aligned(
    region: Rect,
    fragments: &[Fragment<'_>],
    row_alignment: usize,
) -> SubrasterResult<PixelBuffer> {
    let (width, height) = region_size(region)?;
    let mut buf = PixelBuffer::with_row_alignment(width, height, row_alignment)?;
    let stats = rasterize_into(&mut buf, (region.x0, region.y0), fragments);
    tracing::debug!(?stats, "rasterized region");
    Ok(buf)
}

/// Clear `buf` and blend `fragments` into it, `origin` being the canvas position of its top-left
/// pixel.
///
/// Fragments are painted in list order. A fragment that is not fully inside the buffer is skipped,
/// never clipped.
pub fn rasterize_into(
    buf: &mut PixelBuffer,
    origin: (i32, i32),
    fragments: &[Fragment<'_>],
) -> RasterStats {
    buf.clear();
    let mut stats = RasterStats::default();
    let (buf_w, buf_h) = (i64::from(buf.width()), i64::from(buf.height()));
    let pitch = buf.pitch();

    for f in fragments {
        if !f.has_area() {
            continue;
        }
        let dst_x = i64::from(f.x) - i64::from(origin.0);
        let dst_y = i64::from(f.y) - i64::from(origin.1);
        if dst_x < 0 || dst_x + i64::from(f.w) > buf_w || dst_y < 0 || dst_y + i64::from(f.h) > buf_h
        {
            tracing::warn!(x = f.x, y = f.y, w = f.w, h = f.h, "fragment outside region, dropped");
            stats.out_of_bounds += 1;
            continue;
        }

        let alpha = u32::from(f.color.alpha());
        if alpha == 0 {
            stats.transparent += 1;
            continue;
        }
        if !f.is_complete() {
            tracing::warn!(
                w = f.w,
                h = f.h,
                stride = f.stride,
                len = f.bitmap.len(),
                "fragment bitmap truncated, dropped"
            );
            stats.truncated += 1;
            continue;
        }

        let rgb = [f.color.r(), f.color.g(), f.color.b()];
        // Bounds were checked against the buffer above, so these are non-negative and in range.
        let (dst_x, dst_y) = (dst_x as usize, dst_y as usize);
        let row_bytes = f.w as usize * 4;
        let data = buf.data_mut();
        for row in 0..f.h as usize {
            let Some(src) = f.coverage_row(row) else {
                break;
            };
            let start = (dst_y + row) * pitch + dst_x * 4;
            let dst = &mut data[start..start + row_bytes];
            for (px, &opacity) in dst.chunks_exact_mut(4).zip(src) {
                if opacity == 0 {
                    continue;
                }
                let an = alpha * u32::from(opacity) / 255;
                blend_coverage(px, rgb, an);
            }
        }
        stats.drawn += 1;
    }
    stats
}

/// Composite a solid `rgb` sample with coverage `an` (0..=255) over one RGBA pixel.
///
/// Integer arithmetic with truncating division throughout. A transparent destination is
/// overwritten directly.
pub fn blend_coverage(dst: &mut [u8], rgb: [u8; 3], an: u32) {
    let ao = u32::from(dst[3]);
    if ao == 0 {
        dst[0] = rgb[0];
        dst[1] = rgb[1];
        dst[2] = rgb[2];
        dst[3] = an as u8;
        return;
    }

    let ani = 255 - an;
    let new_a = 255 - (255 - ao) * ani / 255;
    dst[3] = new_a as u8;
    if new_a != 0 {
        let aoni = ao * ani / 255;
        for c in 0..3 {
            dst[c] = ((u32::from(dst[c]) * aoni + u32::from(rgb[c]) * an) / new_a) as u8;
        }
    }
}

fn region_size(region: Rect) -> SubrasterResult<(u32, u32)> {
    if region.is_empty() {
        return Err(SubrasterError::geometry(format!(
            "region {region:?} has non-positive size"
        )));
    }
    let w = u32::try_from(region.width())
        .map_err(|_| SubrasterError::geometry("region width out of range"))?;
    let h = u32::try_from(region.height())
        .map_err(|_| SubrasterError::geometry("region height out of range"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
