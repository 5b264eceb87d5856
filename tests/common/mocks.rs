use async_trait::async_trait;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use vidseek::api::{RetrievalBackend, SearchQuery};
use vidseek::config::BufferConfig;
use vidseek::models::{Credentials, ResultItem, SubmitRequest};
use vidseek::player::{
    FrameInfo, ListenerId, MediaElement, ModalView, PreviewFrame, SessionId, Snapshot,
    StreamingDecoder, StreamingRuntime, SubmitControl, VideoInfoPanel,
};
use vidseek::utils::{AppError, AppResult};

#[derive(Debug, Default)]
pub struct MockElementState {
    pub source: Option<String>,
    pub has_metadata: bool,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub paused: bool,
    pub seeks: Vec<f64>,
    pub listeners: Vec<ListenerId>,
    next_listener: u64,
}

/// Media element whose seeks land exactly where asked.
#[derive(Clone, Default)]
pub struct MockElement {
    pub state: Rc<RefCell<MockElementState>>,
}

impl MockElement {
    pub fn new() -> Self {
        let element = Self::default();
        element.state.borrow_mut().paused = true;
        element
    }

    pub fn load(&self, duration: f64) {
        let mut state = self.state.borrow_mut();
        state.has_metadata = true;
        state.duration = Some(duration);
    }
}

impl MediaElement for MockElement {
    fn attach_source(&mut self, url: &str) {
        let mut state = self.state.borrow_mut();
        state.source = Some(url.to_string());
        state.has_metadata = false;
    }

    fn release_source(&mut self) {
        let mut state = self.state.borrow_mut();
        state.source = None;
        state.has_metadata = false;
    }

    fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    fn can_play_type(&self, _mime: &str) -> bool {
        false
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
        state.current_time = seconds;
    }

    fn duration(&self) -> Option<f64> {
        self.state.borrow().duration
    }

    fn play(&mut self) -> AppResult<()> {
        self.state.borrow_mut().paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn set_muted(&mut self, _muted: bool) {}

    fn video_dimensions(&self) -> Option<(u32, u32)> {
        Some((320, 180))
    }

    fn capture_frame(&self) -> AppResult<Snapshot> {
        Ok(Snapshot {
            width: 320,
            height: 180,
            pixels: vec![0; 4],
        })
    }

    fn add_listener(&mut self, _session: SessionId) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.listeners.push(id);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.state.borrow_mut().listeners.retain(|l| *l != id);
    }
}

struct NullDecoder;

impl StreamingDecoder for NullDecoder {
    fn load_source(&mut self, _manifest_url: &str) {}
    fn attach_media(&mut self, _slot: vidseek::player::MediaSlot) {}
    fn start_load(&mut self) {}
    fn recover_media_error(&mut self) {}
    fn destroy(&mut self) {}
}

/// Streaming runtime that either supports decoders or not.
pub struct MockRuntime {
    pub supported: bool,
}

impl StreamingRuntime for MockRuntime {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create_decoder(&mut self, _buffer: BufferConfig) -> Box<dyn StreamingDecoder> {
        Box::new(NullDecoder)
    }
}

#[derive(Debug, Default)]
pub struct MockViewState {
    pub visible: bool,
    pub frame_info: Option<FrameInfo>,
    pub preview: Option<PreviewFrame>,
    pub submit_control: Option<SubmitControl>,
    pub alerts: Vec<String>,
}

/// View that accepts every confirm prompt.
#[derive(Clone, Default)]
pub struct MockView {
    pub state: Rc<RefCell<MockViewState>>,
}

impl ModalView for MockView {
    fn show(&mut self, _title: &str) {
        self.state.borrow_mut().visible = true;
    }

    fn hide(&mut self) {
        self.state.borrow_mut().visible = false;
    }

    fn mount_timeline(&mut self) {}
    fn unmount_timeline(&mut self) {}
    fn mount_info_bar(&mut self) {}
    fn unmount_info_bar(&mut self) {}

    fn render_frame_info(&mut self, info: &FrameInfo) {
        self.state.borrow_mut().frame_info = Some(info.clone());
    }

    fn render_preview(&mut self, frame: &PreviewFrame) {
        self.state.borrow_mut().preview = Some(frame.clone());
    }

    fn hide_preview(&mut self) {
        self.state.borrow_mut().preview = None;
    }

    fn set_submit_control(&mut self, control: SubmitControl) {
        self.state.borrow_mut().submit_control = Some(control);
    }

    fn confirm(&mut self, _message: &str) -> bool {
        true
    }

    fn alert(&mut self, message: &str) {
        self.state.borrow_mut().alerts.push(message.to_string());
    }

    fn add_key_listener(&mut self, _session: SessionId) -> ListenerId {
        ListenerId(1)
    }

    fn remove_key_listener(&mut self, _id: ListenerId) {}
}

#[derive(Clone, Default)]
pub struct MockPanel {
    pub published: Rc<RefCell<Vec<FrameInfo>>>,
}

impl VideoInfoPanel for MockPanel {
    fn publish(&mut self, info: &FrameInfo) {
        self.published.borrow_mut().push(info.clone());
    }
}

/// Backend that records submits and can be told to fail them.
#[derive(Default)]
pub struct MockBackend {
    pub submitted: Arc<Mutex<Vec<SubmitRequest>>>,
    pub error_mode: Arc<Mutex<Option<String>>>,
}

impl MockBackend {
    pub fn inject_error(&self, error: &str) {
        *self.error_mode.lock().unwrap() = Some(error.to_string());
    }
}

#[async_trait]
impl RetrievalBackend for MockBackend {
    async fn search(&self, _query: &SearchQuery) -> AppResult<Vec<ResultItem>> {
        Ok(Vec::new())
    }

    async fn login(&self) -> AppResult<Credentials> {
        Ok(Credentials::new("mock-session", "mock-evaluation"))
    }

    async fn submit(&self, request: &SubmitRequest) -> AppResult<serde_json::Value> {
        if let Some(message) = self.error_mode.lock().unwrap().clone() {
            return Err(AppError::Api {
                status: 502,
                message,
            });
        }
        self.submitted.lock().unwrap().push(request.clone());
        Ok(serde_json::json!({ "success": true }))
    }
}
