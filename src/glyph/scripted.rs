use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{PackedColor, Tick};
use crate::foundation::error::{SubrasterError, SubrasterResult};
use crate::glyph::fragment::{Fragment, GlyphFrame};
use crate::glyph::renderer::{GlyphRenderer, RenderGeometry};

/// A fragment that owns its coverage bitmap.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OwnedFragment {
    /// Destination x on the canvas.
    pub x: i32,
    /// Destination y on the canvas.
    pub y: i32,
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
    /// Bytes per bitmap row.
    pub stride: usize,
    /// Packed color, inverted alpha in the low byte.
    pub color: PackedColor,
    /// Row-major coverage bytes.
    pub bitmap: Vec<u8>,
}

impl OwnedFragment {
    /// A fully covered `w x h` block in a single color.
    pub fn solid(x: i32, y: i32, w: i32, h: i32, color: PackedColor) -> Self {
        let stride = usize::try_from(w).unwrap_or(0);
        let rows = usize::try_from(h).unwrap_or(0);
        Self {
            x,
            y,
            w,
            h,
            stride,
            color,
            bitmap: vec![255; stride * rows],
        }
    }

    /// Borrow as a [`Fragment`].
    pub fn as_fragment(&self) -> Fragment<'_> {
        Fragment {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
            stride: self.stride,
            bitmap: &self.bitmap,
            color: self.color,
        }
    }
}

/// Fragments displayed during `[start_ms, stop_ms)`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScriptedEvent {
    /// Inclusive start, in milliseconds.
    pub start_ms: i64,
    /// Exclusive stop, in milliseconds.
    pub stop_ms: i64,
    /// Fragments in paint order.
    pub fragments: Vec<OwnedFragment>,
}

impl ScriptedEvent {
    fn is_active(&self, ms: i64) -> bool {
        self.start_ms <= ms && ms < self.stop_ms
    }
}

#[derive(Clone, Debug, Default)]
struct ScriptedState {
    active: Option<Vec<usize>>,
    geometry: Option<RenderGeometry>,
    geometry_dirty: bool,
    calls: u64,
}

/// Deterministic [`GlyphRenderer`] replaying pre-recorded fragment lists.
///
/// The frame is reported as changed whenever the set of active events differs from the previous
/// call, or the geometry was updated in between.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ScriptedRenderer {
    /// Timed fragment lists; overlapping events are painted in list order.
    pub events: Vec<ScriptedEvent>,
    #[serde(skip)]
    state: ScriptedState,
}

impl ScriptedRenderer {
    /// Build from events, validating every bitmap.
    pub fn new(events: Vec<ScriptedEvent>) -> SubrasterResult<Self> {
        let r = Self {
            events,
            state: ScriptedState::default(),
        };
        r.validate()?;
        Ok(r)
    }

    /// Parse from the JSON fixture format.
    pub fn from_json_str(json: &str) -> SubrasterResult<Self> {
        let r: Self = serde_json::from_str(json)?;
        r.validate()?;
        Ok(r)
    }

    /// Load a JSON fixture from disk.
    pub fn from_path(path: &Path) -> SubrasterResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read glyph script '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Reject events with inverted windows or bitmaps too short for their declared size.
    pub fn validate(&self) -> SubrasterResult<()> {
        for (ei, ev) in self.events.iter().enumerate() {
            if ev.stop_ms < ev.start_ms {
                return Err(SubrasterError::validation(format!(
                    "event {ei}: stop_ms must be >= start_ms"
                )));
            }
            for (fi, f) in ev.fragments.iter().enumerate() {
                if !f.as_fragment().is_complete() {
                    return Err(SubrasterError::validation(format!(
                        "event {ei} fragment {fi}: bitmap shorter than stride * h"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Last geometry pushed by the overlay, if any.
    pub fn geometry(&self) -> Option<&RenderGeometry> {
        self.state.geometry.as_ref()
    }

    /// Number of `render_frame` calls served so far.
    pub fn render_calls(&self) -> u64 {
        self.state.calls
    }
}

impl GlyphRenderer for ScriptedRenderer {
    fn set_geometry(&mut self, geometry: &RenderGeometry) {
        self.state.geometry = Some(*geometry);
        self.state.geometry_dirty = true;
    }

    fn render_frame(&mut self, at: Tick) -> SubrasterResult<GlyphFrame<'_>> {
        let ms = at.as_millis();
        let active: Vec<usize> = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, ev)| ev.is_active(ms))
            .map(|(i, _)| i)
            .collect();

        let changed = self.state.geometry_dirty || self.state.active.as_ref() != Some(&active);
        self.state.geometry_dirty = false;
        self.state.calls += 1;

        let fragments = active
            .iter()
            .flat_map(|&i| self.events[i].fragments.iter())
            .map(OwnedFragment::as_fragment)
            .collect();
        self.state.active = Some(active);

        Ok(GlyphFrame { fragments, changed })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/glyph/scripted.rs"]
mod tests;
