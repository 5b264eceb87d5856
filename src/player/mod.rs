pub mod controller;
pub mod disposables;
pub mod frame_sync;
pub mod media;
pub mod modal;
pub mod preview;
pub mod seek;
pub mod source;
pub mod timecode;
pub mod traits;
pub mod types;

pub use controller::{ReviewCommand, ReviewController, ReviewHandle, SubmitOutcome};
pub use media::MediaPair;
pub use modal::{ReviewModal, SubmitTicket};
pub use preview::{HoverSchedule, PreviewUpdate};
pub use seek::{SeekController, SeekPhase};
pub use source::{SourceOutcome, SourceResolver};
pub use traits::{MediaElement, ModalView, StreamingDecoder, StreamingRuntime, VideoInfoPanel};
pub use types::{
    FrameInfo, KeyCommand, ListenerId, MediaEvent, MediaSlot, PreviewFrame, SessionId,
    SessionRequest, Snapshot, StepDirection, StreamError, StreamErrorDetail, StreamErrorKind,
    SubmitControl, TransportKind,
};
