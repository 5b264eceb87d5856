use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc, oneshot};
use tracing::{debug, info, trace, warn};

use super::modal::{ReviewModal, SubmitTicket};
use super::preview::HoverSchedule;
use super::types::{
    FrameInfo, KeyCommand, MediaEvent, MediaSlot, SessionId, SessionRequest, StepDirection,
    TransportKind,
};
use crate::api::RetrievalBackend;
use crate::state::AppState;
use crate::utils::AppResult;

/// How a submit request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Server accepted; the modal has closed
    Accepted {
        frame: u64,
        time_ms: u64,
        response: serde_json::Value,
    },
    /// Server refused; the modal stays open with the submit control restored
    Rejected(String),
    /// User declined, a submit was already in flight, or the session is gone
    Cancelled,
}

/// Commands that can be sent to the review controller
#[derive(Debug)]
pub enum ReviewCommand {
    /// Open a session, replacing any current one
    Open {
        request: SessionRequest,
        respond_to: oneshot::Sender<SessionId>,
    },
    /// Close the current session
    Close,
    /// Event from one of the media elements
    Media {
        session: SessionId,
        slot: MediaSlot,
        event: MediaEvent,
    },
    /// Keyboard shortcut while the modal is focused
    Key {
        session: SessionId,
        key: KeyCommand,
    },
    /// Frame step button
    Step {
        session: SessionId,
        direction: StepDirection,
        respond_to: oneshot::Sender<Option<FrameInfo>>,
    },
    TogglePlay {
        session: SessionId,
    },
    /// Pointer over the timeline, position as a fraction of its width
    PointerMoved {
        session: SessionId,
        fraction: f64,
    },
    PointerLeft {
        session: SessionId,
    },
    /// Debounce timer elapsed
    FireHover {
        session: SessionId,
    },
    /// Submit the current frame
    Submit {
        session: SessionId,
        respond_to: oneshot::Sender<AppResult<SubmitOutcome>>,
    },
    /// Network half of a submit completed
    SubmitFinished {
        ticket: SubmitTicket,
        result: AppResult<serde_json::Value>,
        respond_to: oneshot::Sender<AppResult<SubmitOutcome>>,
    },
    GetFrameInfo {
        respond_to: oneshot::Sender<Option<FrameInfo>>,
    },
    GetTransport {
        slot: MediaSlot,
        respond_to: oneshot::Sender<Option<TransportKind>>,
    },
}

/// Controller that owns the modal and processes commands in order. The
/// modal's host objects are not `Send`, so `run` must be driven from a
/// `LocalSet`.
pub struct ReviewController {
    modal: ReviewModal,
    backend: Arc<dyn RetrievalBackend>,
    state: Arc<RwLock<AppState>>,
    receiver: mpsc::UnboundedReceiver<ReviewCommand>,
    // Weak so that dropping every handle ends the loop
    sender: mpsc::WeakUnboundedSender<ReviewCommand>,
}

impl ReviewController {
    pub fn new(
        modal: ReviewModal,
        backend: Arc<dyn RetrievalBackend>,
        state: Arc<RwLock<AppState>>,
    ) -> (ReviewHandle, ReviewController) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let controller = ReviewController {
            modal,
            backend,
            state,
            receiver,
            sender: sender.downgrade(),
        };
        let handle = ReviewHandle { sender };

        (handle, controller)
    }

    /// Run the controller event loop
    pub async fn run(mut self) {
        debug!("ReviewController event loop started");

        while let Some(command) = self.receiver.recv().await {
            match command {
                ReviewCommand::Open {
                    request,
                    respond_to,
                } => {
                    let session = self.modal.open(request);
                    let _ = respond_to.send(session);
                }
                ReviewCommand::Close => self.modal.close(),
                ReviewCommand::Media {
                    session,
                    slot,
                    event,
                } => {
                    self.modal.handle_event(session, slot, event);
                }
                ReviewCommand::Key { session, key } => {
                    trace!("Key {:?} for {}", key, session);
                    self.modal.handle_key(session, key);
                }
                ReviewCommand::Step {
                    session,
                    direction,
                    respond_to,
                } => {
                    let info = self.modal.step(session, direction);
                    let _ = respond_to.send(info);
                }
                ReviewCommand::TogglePlay { session } => self.modal.toggle_play(session),
                ReviewCommand::PointerMoved { session, fraction } => {
                    if self.modal.pointer_moved(session, fraction) == HoverSchedule::Schedule {
                        self.schedule_hover(session);
                    }
                }
                ReviewCommand::PointerLeft { session } => self.modal.pointer_left(session),
                ReviewCommand::FireHover { session } => self.modal.fire_hover_decode(session),
                ReviewCommand::Submit {
                    session,
                    respond_to,
                } => {
                    self.start_submit(session, respond_to).await;
                }
                ReviewCommand::SubmitFinished {
                    ticket,
                    result,
                    respond_to,
                } => {
                    let outcome = match result {
                        Ok(response) => {
                            self.modal.finish_submit(ticket.session, Ok(()));
                            SubmitOutcome::Accepted {
                                frame: ticket.frame,
                                time_ms: ticket.request.time_ms,
                                response,
                            }
                        }
                        Err(e) => {
                            let message = e.to_string();
                            self.modal.finish_submit(ticket.session, Err(e));
                            SubmitOutcome::Rejected(message)
                        }
                    };
                    let _ = respond_to.send(Ok(outcome));
                }
                ReviewCommand::GetFrameInfo { respond_to } => {
                    let _ = respond_to.send(self.modal.current_frame_info());
                }
                ReviewCommand::GetTransport { slot, respond_to } => {
                    let _ = respond_to.send(self.modal.transport(slot));
                }
            }
        }

        debug!("ReviewController event loop finished");
    }

    /// One decode per debounce window; later moves only update the target.
    fn schedule_hover(&self, session: SessionId) {
        let Some(sender) = self.sender.upgrade() else {
            return;
        };
        let delay = self.modal.playback().hover_debounce();
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(ReviewCommand::FireHover { session });
        });
    }

    async fn start_submit(
        &mut self,
        session: SessionId,
        respond_to: oneshot::Sender<AppResult<SubmitOutcome>>,
    ) {
        let credentials = self.state.read().await.credentials().cloned();

        let ticket = match self.modal.begin_submit(session, credentials.as_ref()) {
            Ok(Some(ticket)) => ticket,
            Ok(None) => {
                let _ = respond_to.send(Ok(SubmitOutcome::Cancelled));
                return;
            }
            Err(e) => {
                let _ = respond_to.send(Err(e));
                return;
            }
        };

        let Some(sender) = self.sender.upgrade() else {
            warn!("Controller shutting down, submit dropped");
            return;
        };
        let backend = self.backend.clone();
        info!("Dispatching submit for {}", ticket.session);

        // Keep processing media events while the request is in flight
        tokio::task::spawn_local(async move {
            let result = backend.submit(&ticket.request).await;
            let _ = sender.send(ReviewCommand::SubmitFinished {
                ticket,
                result,
                respond_to,
            });
        });
    }
}

/// Cloneable handle for talking to the review controller.
#[derive(Debug, Clone)]
pub struct ReviewHandle {
    sender: mpsc::UnboundedSender<ReviewCommand>,
}

impl ReviewHandle {
    fn send(&self, command: ReviewCommand) -> Result<()> {
        self.sender
            .send(command)
            .map_err(|_| anyhow::anyhow!("Review controller disconnected"))
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ReviewCommand,
    ) -> Result<T> {
        let (respond_to, response) = oneshot::channel();
        self.send(make(respond_to))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive response from review controller"))
    }

    /// Open the modal for a video at a target time
    pub async fn open(&self, request: SessionRequest) -> Result<SessionId> {
        self.request(|respond_to| ReviewCommand::Open {
            request,
            respond_to,
        })
        .await
    }

    pub fn close(&self) -> Result<()> {
        self.send(ReviewCommand::Close)
    }

    /// Forward a media element event tagged with the session it was registered for
    pub fn media_event(
        &self,
        session: SessionId,
        slot: MediaSlot,
        event: MediaEvent,
    ) -> Result<()> {
        self.send(ReviewCommand::Media {
            session,
            slot,
            event,
        })
    }

    pub fn key(&self, session: SessionId, key: KeyCommand) -> Result<()> {
        self.send(ReviewCommand::Key { session, key })
    }

    pub async fn step(
        &self,
        session: SessionId,
        direction: StepDirection,
    ) -> Result<Option<FrameInfo>> {
        self.request(|respond_to| ReviewCommand::Step {
            session,
            direction,
            respond_to,
        })
        .await
    }

    pub fn toggle_play(&self, session: SessionId) -> Result<()> {
        self.send(ReviewCommand::TogglePlay { session })
    }

    pub fn pointer_moved(&self, session: SessionId, fraction: f64) -> Result<()> {
        self.send(ReviewCommand::PointerMoved { session, fraction })
    }

    pub fn pointer_left(&self, session: SessionId) -> Result<()> {
        self.send(ReviewCommand::PointerLeft { session })
    }

    /// Submit the current frame; resolves once the server has answered
    pub async fn submit(&self, session: SessionId) -> Result<AppResult<SubmitOutcome>> {
        self.request(|respond_to| ReviewCommand::Submit {
            session,
            respond_to,
        })
        .await
    }

    pub async fn frame_info(&self) -> Result<Option<FrameInfo>> {
        self.request(|respond_to| ReviewCommand::GetFrameInfo { respond_to })
            .await
    }

    pub async fn transport(&self, slot: MediaSlot) -> Result<Option<TransportKind>> {
        self.request(|respond_to| ReviewCommand::GetTransport { slot, respond_to })
            .await
    }
}
