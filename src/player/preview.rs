use tracing::{debug, trace};

use super::timecode::format_clock;
use super::traits::MediaElement;
use super::types::PreviewFrame;

/// Result of a pointer move over the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverSchedule {
    /// Caller should schedule one decode after the debounce delay
    Schedule,
    /// A decode is already scheduled; only the pending target moved
    Coalesced,
    /// Duration unknown, nothing to preview
    Unavailable,
}

/// What the view should do after a preview step.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewUpdate {
    Render(PreviewFrame),
    Hide,
    /// Stale or nothing requested; leave the view as it is
    Unchanged,
}

/// Latest-wins hover preview: one pending request slot, one scheduled decode.
#[derive(Debug)]
pub struct HoverPreview {
    pending: Option<f64>,
    scheduled: bool,
    requested: Option<f64>,
    tolerance: f64,
}

impl HoverPreview {
    pub fn new(tolerance: f64) -> Self {
        Self {
            pending: None,
            scheduled: false,
            requested: None,
            tolerance,
        }
    }

    pub fn pending(&self) -> Option<f64> {
        self.pending
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// `fraction` is the pointer position across the timeline, 0.0..=1.0.
    pub fn pointer_moved(&mut self, fraction: f64, duration: Option<f64>) -> HoverSchedule {
        let Some(duration) = duration.filter(|d| d.is_finite() && *d > 0.0) else {
            return HoverSchedule::Unavailable;
        };
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.pending = Some(fraction * duration);
        if self.scheduled {
            HoverSchedule::Coalesced
        } else {
            self.scheduled = true;
            HoverSchedule::Schedule
        }
    }

    pub fn pointer_left(&mut self) {
        self.pending = None;
        self.requested = None;
    }

    /// Runs the scheduled decode: seeks the preview element to the latest
    /// pending time.
    pub fn fire(&mut self, element: &mut dyn MediaElement) -> PreviewUpdate {
        self.scheduled = false;
        let Some(seconds) = self.pending.take() else {
            return PreviewUpdate::Unchanged;
        };

        if !element.has_metadata() {
            trace!("Preview element has no metadata yet");
            self.requested = None;
            return PreviewUpdate::Hide;
        }

        self.requested = Some(seconds);
        element.set_current_time(seconds);
        PreviewUpdate::Unchanged
    }

    /// Preview element finished seeking; capture if it landed near the most
    /// recent request.
    pub fn on_seeked(&mut self, element: &dyn MediaElement) -> PreviewUpdate {
        let Some(requested) = self.requested else {
            return PreviewUpdate::Unchanged;
        };

        let actual = element.current_time();
        if (actual - requested).abs() > self.tolerance {
            trace!(
                "Discarding preview at {:.3}s, latest request is {:.3}s",
                actual, requested
            );
            return PreviewUpdate::Unchanged;
        }
        self.requested = None;

        match element.video_dimensions() {
            Some((w, h)) if w > 0 && h > 0 => {}
            _ => return PreviewUpdate::Hide,
        }

        match element.capture_frame() {
            Ok(snapshot) => PreviewUpdate::Render(PreviewFrame {
                seconds: requested,
                time_label: format_clock(requested),
                snapshot,
            }),
            Err(e) => {
                debug!("Preview capture failed: {}", e);
                PreviewUpdate::Hide
            }
        }
    }
}
