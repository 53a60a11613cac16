use super::*;
use crate::foundation::core::PackedColor;

fn frag<'a>(x: i32, y: i32, w: i32, h: i32, bitmap: &'a [u8], color: PackedColor) -> Fragment<'a> {
    Fragment {
        x,
        y,
        w,
        h,
        stride: w.max(0) as usize,
        bitmap,
        color,
    }
}

#[test]
fn two_pixel_fragment_writes_direct_on_transparent() {
    let bitmap = [255, 128];
    let f = frag(0, 0, 2, 1, &bitmap, PackedColor(0xC864_3200));
    let buf = rasterize(Rect::new(0, 0, 2, 1), &[f]).unwrap();
    assert_eq!(buf.pixel(0, 0), Some([200, 100, 50, 255]));
    assert_eq!(buf.pixel(1, 0), Some([200, 100, 50, 128]));
}

#[test]
fn opaque_fragment_is_exact() {
    let bitmap = [255u8; 12];
    let f = frag(10, 20, 4, 3, &bitmap, PackedColor::from_rgba(1, 254, 77, 255));
    let buf = rasterize(Rect::new(10, 20, 14, 23), &[f]).unwrap();
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(buf.pixel(x, y), Some([1, 254, 77, 255]));
        }
    }
}

#[test]
fn transparent_color_leaves_buffer_untouched() {
    let bitmap = [255u8; 4];
    let f = frag(0, 0, 2, 2, &bitmap, PackedColor(0x1122_33FF));
    let mut buf = PixelBuffer::new(2, 2).unwrap();
    let stats = rasterize_into(&mut buf, (0, 0), &[f]);
    assert!(buf.is_transparent());
    assert!(buf.data().iter().all(|&b| b == 0));
    assert_eq!(stats.transparent, 1);
    assert_eq!(stats.drawn, 0);
}

#[test]
fn zero_coverage_samples_are_not_written() {
    let opaque = [255u8; 2];
    let holes = [0u8, 0];
    let under = frag(0, 0, 2, 1, &opaque, PackedColor::from_rgba(9, 9, 9, 255));
    let over = frag(0, 0, 2, 1, &holes, PackedColor::from_rgba(200, 0, 0, 255));
    let buf = rasterize(Rect::new(0, 0, 2, 1), &[under, over]).unwrap();
    assert_eq!(buf.pixel(0, 0), Some([9, 9, 9, 255]));
    assert_eq!(buf.pixel(1, 0), Some([9, 9, 9, 255]));
}

#[test]
fn later_fragments_composite_over_earlier_ones() {
    let full = [255u8];
    let half = [128u8];
    let base = frag(0, 0, 1, 1, &full, PackedColor::from_rgba(200, 100, 50, 128));
    let top = frag(0, 0, 1, 1, &full, PackedColor::from_rgba(0, 0, 0, 255));
    let buf = rasterize(Rect::new(0, 0, 1, 1), &[base, top]).unwrap();
    assert_eq!(buf.pixel(0, 0), Some([0, 0, 0, 255]));

    let top_half = frag(0, 0, 1, 1, &half, PackedColor::from_rgba(0, 0, 0, 255));
    let buf = rasterize(Rect::new(0, 0, 1, 1), &[base, top_half]).unwrap();
    assert_eq!(buf.pixel(0, 0), Some([65, 32, 16, 192]));
}

#[test]
fn blend_kernel_truncates() {
    let mut px = [10u8, 20, 30, 40];
    blend_coverage(&mut px, [250, 240, 230], 77);
    assert_eq!(px, [185, 181, 176, 105]);

    let mut faint = [0u8, 0, 0, 1];
    blend_coverage(&mut faint, [255, 255, 255], 1);
    assert_eq!(faint, [127, 127, 127, 2]);
}

#[test]
fn fragments_crossing_the_region_edge_are_dropped() {
    let bitmap = [255u8; 4];
    let color = PackedColor::from_rgba(255, 255, 255, 255);
    let fits = frag(1, 1, 2, 2, &bitmap, color);
    let left = frag(-1, 1, 2, 2, &bitmap, color);
    let bottom = frag(1, 3, 2, 2, &bitmap, color);
    let mut buf = PixelBuffer::new(4, 4).unwrap();
    let stats = rasterize_into(&mut buf, (0, 0), &[left, fits, bottom]);
    assert_eq!(stats.drawn, 1);
    assert_eq!(stats.out_of_bounds, 2);
    assert_eq!(buf.pixel(0, 1), Some([0, 0, 0, 0]));
    assert_eq!(buf.pixel(1, 1), Some([255, 255, 255, 255]));
    assert_eq!(buf.pixel(1, 3), Some([0, 0, 0, 0]));
}

#[test]
fn stride_padding_is_skipped() {
    // Two rows of two pixels, stride 3: the third byte of each row is padding.
    let bitmap = [255, 0, 77, 0, 255, 77];
    let f = Fragment {
        x: 5,
        y: 5,
        w: 2,
        h: 2,
        stride: 3,
        bitmap: &bitmap,
        color: PackedColor::from_rgba(10, 20, 30, 255),
    };
    let buf = rasterize(Rect::new(5, 5, 7, 7), &[f]).unwrap();
    assert_eq!(buf.pixel(0, 0), Some([10, 20, 30, 255]));
    assert_eq!(buf.pixel(1, 0), Some([0, 0, 0, 0]));
    assert_eq!(buf.pixel(0, 1), Some([0, 0, 0, 0]));
    assert_eq!(buf.pixel(1, 1), Some([10, 20, 30, 255]));
}

#[test]
fn truncated_bitmap_is_dropped() {
    let bitmap = [255u8; 3];
    let f = frag(0, 0, 2, 2, &bitmap, PackedColor::from_rgba(1, 2, 3, 255));
    let mut buf = PixelBuffer::new(2, 2).unwrap();
    let stats = rasterize_into(&mut buf, (0, 0), &[f]);
    assert_eq!(stats.truncated, 1);
    assert!(buf.is_transparent());
}

#[test]
fn aligned_rows_land_at_pitch_offsets() {
    let bitmap = [255u8; 2];
    let f = frag(0, 0, 1, 2, &bitmap, PackedColor::from_rgba(7, 8, 9, 255));
    let buf = rasterize_aligned(Rect::new(0, 0, 1, 2), &[f], 32).unwrap();
    assert_eq!(buf.pitch(), 32);
    assert_eq!(&buf.data()[32..36], &[7, 8, 9, 255]);
    assert_eq!(buf.to_tight_rgba().unwrap(), vec![7, 8, 9, 255, 7, 8, 9, 255]);
}

#[test]
fn rasterizing_into_a_dirty_buffer_starts_from_transparent() {
    let mut buf = PixelBuffer::new(1, 1).unwrap();
    buf.data_mut().copy_from_slice(&[1, 2, 3, 4]);
    let stats = rasterize_into(&mut buf, (0, 0), &[]);
    assert_eq!(stats, RasterStats::default());
    assert!(buf.is_transparent());
}

#[test]
fn empty_region_is_a_geometry_error() {
    let err = rasterize(Rect::new(3, 3, 3, 10), &[]).unwrap_err();
    assert!(matches!(err, SubrasterError::Geometry(_)));
}
