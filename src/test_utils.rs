#![cfg(test)]

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::BufferConfig;
use crate::player::traits::{
    MediaElement, ModalView, StreamingDecoder, StreamingRuntime, VideoInfoPanel,
};
use crate::player::types::{
    FrameInfo, ListenerId, MediaSlot, PreviewFrame, SessionId, Snapshot, SubmitControl,
};
use crate::utils::{AppError, AppResult};

/// Observable state behind a [`FakeElement`].
#[derive(Debug, Default)]
pub struct ElementState {
    pub source: Option<String>,
    pub native_hls: bool,
    pub has_metadata: bool,
    pub current_time: f64,
    /// Added to every seek to imitate keyframe-snapping
    pub seek_offset: f64,
    pub duration: Option<f64>,
    pub paused: bool,
    pub muted: bool,
    pub dimensions: Option<(u32, u32)>,
    pub capture_fails: bool,
    pub reject_play: bool,
    pub seeks: Vec<f64>,
    pub play_calls: u32,
    pub listeners: Vec<(ListenerId, SessionId)>,
    next_listener: u64,
}

/// In-memory media element; clones share state.
#[derive(Clone, Default)]
pub struct FakeElement {
    pub state: Rc<RefCell<ElementState>>,
}

impl FakeElement {
    pub fn new() -> Self {
        let element = Self::default();
        element.state.borrow_mut().paused = true;
        element
    }

    pub fn with_metadata(duration: f64) -> Self {
        let element = Self::new();
        {
            let mut state = element.state.borrow_mut();
            state.has_metadata = true;
            state.duration = Some(duration);
            state.dimensions = Some((640, 360));
        }
        element
    }
}

impl MediaElement for FakeElement {
    fn attach_source(&mut self, url: &str) {
        let mut state = self.state.borrow_mut();
        state.source = Some(url.to_string());
        state.has_metadata = false;
    }

    fn release_source(&mut self) {
        let mut state = self.state.borrow_mut();
        state.source = None;
        state.has_metadata = false;
        state.current_time = 0.0;
    }

    fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    fn can_play_type(&self, _mime: &str) -> bool {
        self.state.borrow().native_hls
    }

    fn has_metadata(&self) -> bool {
        self.state.borrow().has_metadata
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.state.borrow_mut();
        state.seeks.push(seconds);
        state.current_time = seconds + state.seek_offset;
    }

    fn duration(&self) -> Option<f64> {
        self.state.borrow().duration
    }

    fn play(&mut self) -> AppResult<()> {
        let mut state = self.state.borrow_mut();
        state.play_calls += 1;
        if state.reject_play {
            return Err(AppError::Playback("autoplay blocked".to_string()));
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }

    fn video_dimensions(&self) -> Option<(u32, u32)> {
        self.state.borrow().dimensions
    }

    fn capture_frame(&self) -> AppResult<Snapshot> {
        let state = self.state.borrow();
        if state.capture_fails {
            return Err(AppError::Playback("tainted canvas".to_string()));
        }
        let (width, height) = state.dimensions.unwrap_or((0, 0));
        Ok(Snapshot {
            width,
            height,
            // Tag the pixels with the time so tests can tell frames apart
            pixels: state.current_time.to_le_bytes().to_vec(),
        })
    }

    fn add_listener(&mut self, session: SessionId) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.listeners.push((id, session));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.state.borrow_mut().listeners.retain(|(l, _)| *l != id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecoderCall {
    LoadSource(String),
    AttachMedia(MediaSlot),
    StartLoad,
    RecoverMediaError,
    Destroy,
}

#[derive(Debug, Default)]
pub struct DecoderLog {
    pub created: Vec<BufferConfig>,
    /// Calls per decoder, in creation order
    pub calls: Vec<Vec<DecoderCall>>,
}

impl DecoderLog {
    pub fn live_decoders(&self) -> usize {
        self.calls
            .iter()
            .filter(|calls| !calls.contains(&DecoderCall::Destroy))
            .count()
    }
}

pub struct FakeDecoder {
    index: usize,
    log: Rc<RefCell<DecoderLog>>,
}

impl StreamingDecoder for FakeDecoder {
    fn load_source(&mut self, manifest_url: &str) {
        self.record(DecoderCall::LoadSource(manifest_url.to_string()));
    }

    fn attach_media(&mut self, slot: MediaSlot) {
        self.record(DecoderCall::AttachMedia(slot));
    }

    fn start_load(&mut self) {
        self.record(DecoderCall::StartLoad);
    }

    fn recover_media_error(&mut self) {
        self.record(DecoderCall::RecoverMediaError);
    }

    fn destroy(&mut self) {
        self.record(DecoderCall::Destroy);
    }
}

impl FakeDecoder {
    fn record(&self, call: DecoderCall) {
        self.log.borrow_mut().calls[self.index].push(call);
    }
}

#[derive(Clone, Default)]
pub struct FakeRuntime {
    pub supported: bool,
    pub log: Rc<RefCell<DecoderLog>>,
}

impl FakeRuntime {
    pub fn supported() -> Self {
        Self {
            supported: true,
            ..Default::default()
        }
    }
}

impl StreamingRuntime for FakeRuntime {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create_decoder(&mut self, buffer: BufferConfig) -> Box<dyn StreamingDecoder> {
        let mut log = self.log.borrow_mut();
        log.created.push(buffer);
        log.calls.push(Vec::new());
        Box::new(FakeDecoder {
            index: log.calls.len() - 1,
            log: self.log.clone(),
        })
    }
}

/// Everything the modal did to its view, in order.
#[derive(Debug, Default)]
pub struct ViewState {
    pub visible: bool,
    pub title: Option<String>,
    pub timeline_mounted: bool,
    pub info_bar_mounted: bool,
    pub frame_info: Option<FrameInfo>,
    pub preview: Option<PreviewFrame>,
    pub preview_hides: u32,
    pub submit_control: Option<SubmitControl>,
    pub confirm_answer: bool,
    pub prompts: Vec<String>,
    pub alerts: Vec<String>,
    pub key_listeners: Vec<(ListenerId, SessionId)>,
    next_listener: u64,
}

#[derive(Clone, Default)]
pub struct RecordingView {
    pub state: Rc<RefCell<ViewState>>,
}

impl RecordingView {
    pub fn new() -> Self {
        let view = Self::default();
        view.state.borrow_mut().confirm_answer = true;
        view
    }
}

impl ModalView for RecordingView {
    fn show(&mut self, title: &str) {
        let mut state = self.state.borrow_mut();
        state.visible = true;
        state.title = Some(title.to_string());
    }

    fn hide(&mut self) {
        self.state.borrow_mut().visible = false;
    }

    fn mount_timeline(&mut self) {
        self.state.borrow_mut().timeline_mounted = true;
    }

    fn unmount_timeline(&mut self) {
        self.state.borrow_mut().timeline_mounted = false;
    }

    fn mount_info_bar(&mut self) {
        self.state.borrow_mut().info_bar_mounted = true;
    }

    fn unmount_info_bar(&mut self) {
        self.state.borrow_mut().info_bar_mounted = false;
    }

    fn render_frame_info(&mut self, info: &FrameInfo) {
        self.state.borrow_mut().frame_info = Some(info.clone());
    }

    fn render_preview(&mut self, frame: &PreviewFrame) {
        self.state.borrow_mut().preview = Some(frame.clone());
    }

    fn hide_preview(&mut self) {
        let mut state = self.state.borrow_mut();
        state.preview = None;
        state.preview_hides += 1;
    }

    fn set_submit_control(&mut self, control: SubmitControl) {
        self.state.borrow_mut().submit_control = Some(control);
    }

    fn confirm(&mut self, message: &str) -> bool {
        let mut state = self.state.borrow_mut();
        state.prompts.push(message.to_string());
        state.confirm_answer
    }

    fn alert(&mut self, message: &str) {
        self.state.borrow_mut().alerts.push(message.to_string());
    }

    fn add_key_listener(&mut self, session: SessionId) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.key_listeners.push((id, session));
        id
    }

    fn remove_key_listener(&mut self, id: ListenerId) {
        self.state.borrow_mut().key_listeners.retain(|(l, _)| *l != id);
    }
}

#[derive(Clone, Default)]
pub struct RecordingPanel {
    pub published: Rc<RefCell<Vec<FrameInfo>>>,
}

impl VideoInfoPanel for RecordingPanel {
    fn publish(&mut self, info: &FrameInfo) {
        self.published.borrow_mut().push(info.clone());
    }
}
