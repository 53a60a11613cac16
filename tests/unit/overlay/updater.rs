use super::*;
use crate::foundation::core::PackedColor;
use crate::foundation::error::SubrasterError;
use crate::glyph::fragment::GlyphFrame;
use crate::glyph::scripted::OwnedFragment;

struct StubRenderer {
    fragments: Vec<OwnedFragment>,
    changed: bool,
    geometries: Vec<RenderGeometry>,
    calls: usize,
}

impl StubRenderer {
    fn new(fragments: Vec<OwnedFragment>) -> Self {
        Self {
            fragments,
            changed: true,
            geometries: Vec::new(),
            calls: 0,
        }
    }
}

impl GlyphRenderer for StubRenderer {
    fn set_geometry(&mut self, geometry: &RenderGeometry) {
        self.geometries.push(*geometry);
    }

    fn render_frame(&mut self, _at: Tick) -> SubrasterResult<GlyphFrame<'_>> {
        self.calls += 1;
        Ok(GlyphFrame {
            fragments: self.fragments.iter().map(OwnedFragment::as_fragment).collect(),
            changed: self.changed,
        })
    }
}

fn geometry() -> VideoGeometry {
    VideoGeometry {
        src: VideoFormat::full(640, 480),
        dst: VideoFormat::full(1280, 720),
    }
}

fn white() -> PackedColor {
    PackedColor::from_rgba(255, 255, 255, 255)
}

fn two_lines() -> Vec<OwnedFragment> {
    vec![
        OwnedFragment::solid(100, 600, 300, 40, white()),
        OwnedFragment::solid(100, 20, 200, 30, white()),
    ]
}

#[test]
fn first_update_pushes_geometry_and_renders() {
    let mut r = StubRenderer::new(two_lines());
    let mut u = OverlayUpdater::new(OverlayConfig::default()).unwrap();
    let out = u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    assert_eq!(out, UpdateOutcome::Rendered { regions: 2 });

    assert_eq!(r.geometries.len(), 1);
    let g = r.geometries[0];
    assert_eq!((g.frame_width, g.frame_height), (1280, 720));
    assert_eq!((g.storage_width, g.storage_height), (640, 480));
    assert!((g.pixel_aspect - 4.0 / 3.0).abs() < 1e-12);

    let overlay = u.overlay();
    assert_eq!((overlay.original_width, overlay.original_height), (1280, 720));
    assert_eq!(overlay.regions[0].rect, Rect::new(100, 600, 400, 640));
    assert_eq!((overlay.regions[1].x(), overlay.regions[1].y()), (100, 20));
    assert_eq!(overlay.regions[1].buffer.width(), 200);
    assert_eq!(overlay.regions[1].placement, Placement::default());
    assert!(overlay.regions[1].placement.absolute);
    assert_eq!(overlay.regions[1].buffer.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn unchanged_sample_keeps_previous_overlay() {
    let mut r = StubRenderer::new(two_lines());
    let mut u = OverlayUpdater::new(OverlayConfig::default()).unwrap();
    u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    let before = u.overlay().clone();

    r.changed = false;
    let out = u.update(&mut r, geometry(), Tick::from_millis(40)).unwrap();
    assert_eq!(out, UpdateOutcome::Unchanged);
    assert_eq!(u.overlay(), &before);
    assert_eq!(r.geometries.len(), 1);
    assert_eq!(r.calls, 2);
}

#[test]
fn renderer_change_forces_a_pass() {
    let mut r = StubRenderer::new(two_lines());
    let mut u = OverlayUpdater::new(OverlayConfig::default()).unwrap();
    u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    r.fragments.truncate(1);
    let out = u.update(&mut r, geometry(), Tick::from_millis(40)).unwrap();
    assert_eq!(out, UpdateOutcome::Rendered { regions: 1 });
}

#[test]
fn destination_change_forces_a_pass() {
    let mut r = StubRenderer::new(two_lines());
    let mut u = OverlayUpdater::new(OverlayConfig::default()).unwrap();
    u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    r.changed = false;

    let mut g = geometry();
    g.dst = VideoFormat::full(1920, 1080);
    let out = u.update(&mut r, g, Tick::ZERO).unwrap();
    assert_eq!(out, UpdateOutcome::Rendered { regions: 2 });
    assert_eq!(r.geometries.len(), 2);
    assert_eq!(u.overlay().original_width, 1920);
}

#[test]
fn source_change_outside_visible_area_is_ignored() {
    let mut r = StubRenderer::new(two_lines());
    let mut u = OverlayUpdater::new(OverlayConfig::default()).unwrap();
    u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    r.changed = false;

    let mut g = geometry();
    g.src.width = 656;
    g.src.height = 496;
    let out = u.update(&mut r, g, Tick::ZERO).unwrap();
    assert_eq!(out, UpdateOutcome::Unchanged);
    assert_eq!(r.geometries.len(), 1);
}

#[test]
fn losing_all_fragments_clears_even_without_change_flag() {
    let mut r = StubRenderer::new(two_lines());
    let mut u = OverlayUpdater::new(OverlayConfig::default()).unwrap();
    u.update(&mut r, geometry(), Tick::ZERO).unwrap();

    r.changed = false;
    r.fragments.clear();
    let out = u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    assert_eq!(out, UpdateOutcome::Cleared);
    assert!(u.overlay().is_empty());

    let out = u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    assert_eq!(out, UpdateOutcome::Unchanged);
}

#[test]
fn arealess_fragments_clear_the_overlay() {
    let mut r = StubRenderer::new(vec![OwnedFragment::solid(10, 10, 0, 5, white())]);
    let mut u = OverlayUpdater::new(OverlayConfig::default()).unwrap();
    let out = u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    assert_eq!(out, UpdateOutcome::Cleared);
    assert!(u.overlay().is_empty());
}

#[test]
fn region_cap_comes_from_config() {
    let frags = (0..6)
        .map(|i| OwnedFragment::solid(i * 200, 0, 10, 10, white()))
        .collect();
    let mut r = StubRenderer::new(frags);
    let config = OverlayConfig {
        max_regions: 2,
        row_alignment: 64,
        ..OverlayConfig::default()
    };
    let mut u = OverlayUpdater::new(config).unwrap();
    let out = u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    assert_eq!(out, UpdateOutcome::Rendered { regions: 2 });
    assert!(u.overlay().regions.iter().all(|reg| reg.buffer.pitch() % 64 == 0));
}

#[test]
fn zero_sized_video_is_rejected() {
    let mut r = StubRenderer::new(two_lines());
    let mut u = OverlayUpdater::new(OverlayConfig::default()).unwrap();
    let mut g = geometry();
    g.src.visible_height = 0;
    let err = u.update(&mut r, g, Tick::ZERO).unwrap_err();
    assert!(matches!(err, SubrasterError::Validation(_)));
    assert_eq!(r.calls, 0);
}

#[test]
fn rejected_geometry_clears_the_previous_overlay() {
    let mut r = StubRenderer::new(two_lines());
    let mut u = OverlayUpdater::new(OverlayConfig::default()).unwrap();
    u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    assert_eq!(u.overlay().regions.len(), 2);

    let mut g = geometry();
    g.dst.visible_height = 0;
    assert!(u.update(&mut r, g, Tick::ZERO).is_err());
    assert!(u.overlay().is_empty());
    assert_eq!(r.calls, 1);

    // The old geometry is still current, so the next valid sample renders again.
    r.changed = false;
    let out = u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    assert_eq!(out, UpdateOutcome::Rendered { regions: 2 });
}

struct FailingRenderer;

impl GlyphRenderer for FailingRenderer {
    fn set_geometry(&mut self, _geometry: &RenderGeometry) {}

    fn render_frame(&mut self, _at: Tick) -> SubrasterResult<GlyphFrame<'_>> {
        Err(SubrasterError::validation("renderer unavailable"))
    }
}

#[test]
fn renderer_failure_clears_the_previous_overlay() {
    let mut r = StubRenderer::new(two_lines());
    let mut u = OverlayUpdater::new(OverlayConfig::default()).unwrap();
    u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    assert!(!u.overlay().is_empty());

    assert!(u.update(&mut FailingRenderer, geometry(), Tick::ZERO).is_err());
    assert!(u.overlay().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let config = OverlayConfig {
        max_regions: 0,
        ..OverlayConfig::default()
    };
    assert!(OverlayUpdater::new(config).is_err());
}

#[test]
fn reset_forces_geometry_push_and_full_pass() {
    let mut r = StubRenderer::new(two_lines());
    let mut u = OverlayUpdater::new(OverlayConfig::default()).unwrap();
    u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    let taken = u.take_overlay();
    assert_eq!(taken.regions.len(), 2);
    assert!(u.overlay().is_empty());

    u.reset();
    r.changed = false;
    let out = u.update(&mut r, geometry(), Tick::ZERO).unwrap();
    assert_eq!(out, UpdateOutcome::Rendered { regions: 2 });
    assert_eq!(r.geometries.len(), 2);
}

#[test]
fn compose_overlay_matches_partition_order() {
    let frags = two_lines();
    let borrowed: Vec<_> = frags.iter().map(OwnedFragment::as_fragment).collect();
    let regions = compose_overlay(
        &borrowed,
        Canvas {
            width: 1280,
            height: 720,
        },
        &OverlayConfig::default(),
    )
    .unwrap();
    let rects: Vec<Rect> = regions.iter().map(|r| r.rect).collect();
    assert_eq!(
        rects,
        vec![Rect::new(100, 600, 400, 640), Rect::new(100, 20, 300, 50)]
    );
}
