use tracing::trace;

use super::timecode::frame_of;
use super::traits::{MediaElement, ModalView, VideoInfoPanel};
use super::types::{FrameInfo, StepDirection};
use crate::models::VideoId;

/// Derives frame/time readouts from the primary element and republishes
/// them to the info bar and the shared current-video panel.
#[derive(Debug, Clone)]
pub struct FrameSync {
    video_id: VideoId,
    fps: f64,
}

impl FrameSync {
    pub fn new(video_id: VideoId, fps: f64) -> Self {
        Self { video_id, fps }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn snapshot(&self, element: &dyn MediaElement) -> FrameInfo {
        let elapsed = element.current_time();
        FrameInfo {
            video_id: self.video_id.clone(),
            frame: frame_of(elapsed, self.fps),
            total_frames: element
                .duration()
                .filter(|d| d.is_finite() && *d > 0.0)
                .map(|d| frame_of(d, self.fps)),
            elapsed,
            fps: self.fps,
        }
    }

    pub fn publish(
        &self,
        element: &dyn MediaElement,
        view: &mut dyn ModalView,
        panel: &mut dyn VideoInfoPanel,
    ) -> FrameInfo {
        let info = self.snapshot(element);
        view.render_frame_info(&info);
        panel.publish(&info);
        info
    }

    /// Pauses and moves exactly one frame, clamped to the media bounds.
    pub fn step(
        &self,
        element: &mut dyn MediaElement,
        direction: StepDirection,
        view: &mut dyn ModalView,
        panel: &mut dyn VideoInfoPanel,
    ) -> FrameInfo {
        element.pause();

        let upper = element
            .duration()
            .filter(|d| d.is_finite())
            .unwrap_or(f64::INFINITY);
        let new_time =
            (element.current_time() + direction.sign() / self.fps).clamp(0.0, upper.max(0.0));
        trace!("Stepping {:?} to {:.3}s", direction, new_time);
        element.set_current_time(new_time);

        self.publish(element, view, panel)
    }
}
