//! Display timing for incoming subtitle blocks.
//!
//! Each block with a new presentation timestamp opens an ephemeral cue (shown until the next cue
//! replaces it). A cue's stop never moves backwards: it is at least the stop of every cue scheduled
//! before it since the last flush.

use crate::foundation::core::Tick;

/// One encoded subtitle block as delivered by the demuxer.
#[derive(Clone, Copy, Debug)]
pub struct CueBlock<'a> {
    /// Presentation timestamp.
    pub pts: Tick,
    /// Declared duration.
    pub length: Tick,
    /// Script payload, forwarded to the renderer untouched.
    pub payload: &'a [u8],
    /// The demuxer flagged the block as damaged.
    pub corrupted: bool,
}

/// A scheduled overlay display window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cue {
    /// Timestamp of the block that opened the cue.
    pub pts: Tick,
    /// First display time.
    pub start: Tick,
    /// Display deadline.
    pub stop: Tick,
}

impl Cue {
    /// Renderer timestamp for a display time: the cue's pts shifted by the time elapsed since
    /// `start`.
    pub fn stream_time(&self, display_pts: Tick) -> Tick {
        self.pts.saturating_add(display_pts.saturating_sub(self.start))
    }
}

/// What happened to a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CueOutcome {
    /// Ignored (damaged or empty); damaged blocks also flush the timeline.
    Dropped,
    /// Same pts as the previous block: the payload feeds the cue already on screen.
    Merged,
    /// A new cue to display.
    Scheduled(Cue),
}

/// Tracks the last pts and the latest stop across accepted blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CueTimeline {
    last_pts: Option<Tick>,
    max_stop: Option<Tick>,
}

impl CueTimeline {
    /// Fresh timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last pts and the running stop (seek or discontinuity).
    pub fn flush(&mut self) {
        self.last_pts = None;
        self.max_stop = None;
    }

    /// Classify `block` and schedule a cue when its pts is new.
    pub fn accept(&mut self, block: &CueBlock<'_>) -> CueOutcome {
        if block.corrupted {
            tracing::debug!(pts = block.pts.0, "corrupted block, flushing cue timeline");
            self.flush();
            return CueOutcome::Dropped;
        }
        if block.payload.first().is_none_or(|&b| b == 0) {
            return CueOutcome::Dropped;
        }

        let outcome = if self.last_pts == Some(block.pts) {
            CueOutcome::Merged
        } else {
            let end = block.pts.saturating_add(block.length);
            let stop = self.max_stop.map_or(end, |m| m.max(end));
            self.max_stop = Some(stop);
            CueOutcome::Scheduled(Cue {
                pts: block.pts,
                start: block.pts,
                stop,
            })
        };
        self.last_pts = Some(block.pts);
        outcome
    }

    /// Latest stop handed out since the last flush.
    pub fn max_stop(&self) -> Option<Tick> {
        self.max_stop
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/cue.rs"]
mod tests;
