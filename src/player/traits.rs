//! Seams between the review modal and its host. A browser binding, a native
//! player or a test fake implements these; the modal only ever talks to them.

use crate::config::BufferConfig;
use crate::utils::AppResult;

use super::types::{
    FrameInfo, ListenerId, MediaSlot, PreviewFrame, SessionId, Snapshot, SubmitControl,
};

/// A playable media element (the `<video>` of a browser host).
pub trait MediaElement {
    fn attach_source(&mut self, url: &str);
    /// Drops the current source and resets the element's pipeline.
    fn release_source(&mut self);
    fn source(&self) -> Option<String>;
    fn can_play_type(&self, mime: &str) -> bool;
    fn has_metadata(&self) -> bool;
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    fn duration(&self) -> Option<f64>;
    /// Playback may be refused, e.g. by an autoplay policy.
    fn play(&mut self) -> AppResult<()>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn set_muted(&mut self, muted: bool);
    fn video_dimensions(&self) -> Option<(u32, u32)>;
    fn capture_frame(&self) -> AppResult<Snapshot>;

    /// Starts forwarding this element's events tagged with `session`.
    fn add_listener(&mut self, session: SessionId) -> ListenerId;
    fn remove_listener(&mut self, id: ListenerId);
}

/// Segmented-stream decoder bound to one media element.
pub trait StreamingDecoder {
    fn load_source(&mut self, manifest_url: &str);
    fn attach_media(&mut self, slot: MediaSlot);
    fn start_load(&mut self);
    fn recover_media_error(&mut self);
    fn destroy(&mut self);
}

/// Segmented-stream capability of the runtime.
pub trait StreamingRuntime {
    fn is_supported(&self) -> bool;
    fn create_decoder(&mut self, buffer: BufferConfig) -> Box<dyn StreamingDecoder>;
}

/// The modal's own surface.
pub trait ModalView {
    fn show(&mut self, title: &str);
    fn hide(&mut self);
    fn mount_timeline(&mut self);
    fn unmount_timeline(&mut self);
    fn mount_info_bar(&mut self);
    fn unmount_info_bar(&mut self);
    fn render_frame_info(&mut self, info: &FrameInfo);
    fn render_preview(&mut self, frame: &PreviewFrame);
    fn hide_preview(&mut self);
    fn set_submit_control(&mut self, control: SubmitControl);
    /// Blocking yes/no prompt.
    fn confirm(&mut self, message: &str) -> bool;
    fn alert(&mut self, message: &str);

    fn add_key_listener(&mut self, session: SessionId) -> ListenerId;
    fn remove_key_listener(&mut self, id: ListenerId);
}

/// Shared "current video info" panel that lives outside the modal.
pub trait VideoInfoPanel {
    fn publish(&mut self, info: &FrameInfo);
}
