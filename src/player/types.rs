/// Common types shared by the review modal components
use std::fmt;

use crate::models::{ResultItem, VideoId};
use crate::player::timecode::{format_clock, known_fps};

/// Generation number of one open review session. A new `open` always gets a
/// fresh id, so callbacks carrying an older id are recognisably stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub(crate) fn none() -> Self {
        Self(0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Handle returned by a host when a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaSlot {
    Primary,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Segmented stream driven by a streaming decoder
    SegmentedStream,
    /// Segmented manifest handed straight to an element that plays it natively
    NativeStream,
    ProgressiveFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamErrorKind {
    Network,
    Media,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamErrorDetail {
    ManifestLoadError,
    ManifestLoadTimeout,
    ManifestParsingError,
    FragmentLoadError,
    BufferStalled,
    Other(String),
}

/// Error reported by a streaming decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamError {
    pub kind: StreamErrorKind,
    pub detail: StreamErrorDetail,
    pub fatal: bool,
}

impl StreamError {
    pub fn fatal(kind: StreamErrorKind, detail: StreamErrorDetail) -> Self {
        Self {
            kind,
            detail,
            fatal: true,
        }
    }

    pub fn is_manifest_failure(&self) -> bool {
        matches!(
            self.detail,
            StreamErrorDetail::ManifestLoadError
                | StreamErrorDetail::ManifestLoadTimeout
                | StreamErrorDetail::ManifestParsingError
        )
    }
}

/// Events a host forwards from a media element or its decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LoadedMetadata,
    Seeked,
    TimeUpdate,
    /// The element itself failed to load or decode its source
    ElementError,
    Stream(StreamError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    StepBackward,
    StepForward,
    TogglePlay,
    Close,
}

impl KeyCommand {
    /// Maps a DOM-style key name to a modal shortcut.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::StepBackward),
            "ArrowRight" => Some(Self::StepForward),
            " " | "Space" | "Spacebar" => Some(Self::TogglePlay),
            "Escape" | "Esc" => Some(Self::Close),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Backward,
    Forward,
}

impl StepDirection {
    pub fn sign(self) -> f64 {
        match self {
            StepDirection::Backward => -1.0,
            StepDirection::Forward => 1.0,
        }
    }
}

/// RGBA still captured from the preview element.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewFrame {
    pub seconds: f64,
    pub time_label: String,
    pub snapshot: Snapshot,
}

/// What the info bar and the shared "current video" panel display.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub video_id: VideoId,
    pub frame: u64,
    pub total_frames: Option<u64>,
    pub elapsed: f64,
    pub fps: f64,
}

impl FrameInfo {
    pub fn frame_label(&self) -> String {
        match self.total_frames {
            Some(total) => format!("Frame: {} / {}", self.frame, total),
            None => format!("Frame: {} / --", self.frame),
        }
    }

    pub fn time_label(&self) -> String {
        format_clock(self.elapsed)
    }

    pub fn fps_label(&self) -> String {
        format!("{} fps", self.fps)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitControl {
    Ready { label: String },
    Busy,
}

/// Parameters of `ReviewModal::open`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    pub video_id: VideoId,
    pub target_seconds: f64,
    /// `None` when the source gave no usable rate
    pub fps: Option<f64>,
    /// Shown in the modal title only
    pub keyframe_index: u64,
}

impl SessionRequest {
    pub fn new(
        video_id: impl Into<VideoId>,
        target_seconds: f64,
        fps: Option<f64>,
        keyframe_index: u64,
    ) -> Self {
        let target_seconds = if target_seconds.is_finite() {
            target_seconds.max(0.0)
        } else {
            0.0
        };
        Self {
            video_id: video_id.into(),
            target_seconds,
            fps: known_fps(fps),
            keyframe_index,
        }
    }

    pub fn from_result(item: &ResultItem) -> Self {
        Self::new(
            item.video_id.clone(),
            item.start_time(),
            item.fps,
            item.keyframe_index,
        )
    }

    pub fn title(&self) -> String {
        format!("{} · keyframe {}", self.video_id, self.keyframe_index)
    }
}
