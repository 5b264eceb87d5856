use tracing::{debug, error, info, trace, warn};

use super::disposables::{Disposable, DisposeBag};
use super::frame_sync::FrameSync;
use super::media::MediaPair;
use super::preview::{HoverPreview, HoverSchedule, PreviewUpdate};
use super::seek::SeekController;
use super::source::{SourceOutcome, SourceResolver};
use super::timecode::{resolve_fps, seconds_of};
use super::traits::{ModalView, StreamingRuntime, VideoInfoPanel};
use super::types::{
    FrameInfo, KeyCommand, MediaEvent, MediaSlot, SessionId, SessionRequest, StepDirection,
    SubmitControl, TransportKind,
};
use crate::api::MediaUrls;
use crate::config::{BufferingConfig, PlaybackConfig};
use crate::models::{Credentials, SubmitRequest};
use crate::utils::{AppError, AppResult};

const SUBMIT_LABEL: &str = "Submit";

/// A submit that passed local validation and confirmation, waiting on the
/// network.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    pub session: SessionId,
    pub request: SubmitRequest,
    pub frame: u64,
}

struct ActiveSession {
    id: SessionId,
    request: SessionRequest,
    resolver: SourceResolver,
    seek: SeekController,
    hover: HoverPreview,
    sync: FrameSync,
    resources: DisposeBag,
    submit_label: Option<String>,
}

/// Owns the review modal: at most one open session, and everything the
/// session acquired is released on close.
pub struct ReviewModal {
    media: MediaPair,
    runtime: Box<dyn StreamingRuntime>,
    view: Box<dyn ModalView>,
    panel: Box<dyn VideoInfoPanel>,
    urls: MediaUrls,
    playback: PlaybackConfig,
    buffering: BufferingConfig,
    last_session: SessionId,
    active: Option<ActiveSession>,
}

impl ReviewModal {
    pub fn new(
        media: MediaPair,
        runtime: Box<dyn StreamingRuntime>,
        view: Box<dyn ModalView>,
        panel: Box<dyn VideoInfoPanel>,
        urls: MediaUrls,
        playback: PlaybackConfig,
        buffering: BufferingConfig,
    ) -> Self {
        Self {
            media,
            runtime,
            view,
            panel,
            urls,
            playback,
            buffering,
            last_session: SessionId::none(),
            active: None,
        }
    }

    pub fn playback(&self) -> &PlaybackConfig {
        &self.playback
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.active.as_ref().map(|s| s.id)
    }

    pub fn is_active(&self, session: SessionId) -> bool {
        self.active_session() == Some(session)
    }

    pub fn transport(&self, slot: MediaSlot) -> Option<TransportKind> {
        self.active.as_ref().and_then(|s| s.resolver.transport(slot))
    }

    pub fn current_frame_info(&self) -> Option<FrameInfo> {
        self.active
            .as_ref()
            .map(|s| s.sync.snapshot(self.media.primary.as_ref()))
    }

    /// Opens a session, closing any current one first.
    pub fn open(&mut self, request: SessionRequest) -> SessionId {
        self.close();

        let id = self.last_session.next();
        self.last_session = id;
        let fps = resolve_fps(request.fps, self.playback.default_fps);
        info!(
            "Opening {} for {} at {:.3}s ({} fps)",
            id, request.video_id, request.target_seconds, fps
        );

        self.view.show(&request.title());

        let mut resources = DisposeBag::new();
        for slot in [MediaSlot::Primary, MediaSlot::Preview] {
            let listener = self.media.get_mut(slot).add_listener(id);
            resources.push(Disposable::MediaListener { slot, id: listener });
        }
        self.view.mount_timeline();
        resources.push(Disposable::Timeline);
        self.view.mount_info_bar();
        resources.push(Disposable::InfoBar);
        resources.push(Disposable::KeyListener(self.view.add_key_listener(id)));

        let mut resolver = SourceResolver::new(
            request.video_id.clone(),
            self.urls.clone(),
            self.playback,
            self.buffering.clone(),
        );
        let transport = resolver.bind(self.runtime.as_mut(), &mut self.media);
        debug!("{} bound via {:?}", id, transport);

        let mut seek = SeekController::new(request.target_seconds, self.playback);
        seek.arm(self.media.primary.as_mut());

        self.view.set_submit_control(SubmitControl::Ready {
            label: SUBMIT_LABEL.to_string(),
        });

        self.active = Some(ActiveSession {
            id,
            sync: FrameSync::new(request.video_id.clone(), fps),
            hover: HoverPreview::new(self.playback.preview_tolerance_secs),
            request,
            resolver,
            seek,
            resources,
            submit_label: None,
        });

        id
    }

    /// Tears the session down. Safe to call when nothing is open.
    pub fn close(&mut self) {
        let Some(mut session) = self.active.take() else {
            trace!("Close requested with no open session");
            return;
        };

        self.media.primary.pause();
        session.resources.release(&mut self.media, self.view.as_mut());
        session.resolver.teardown(&mut self.media);
        self.view.hide_preview();
        self.view.hide();
        info!("Closed {} ({})", session.id, session.request.video_id);
    }

    pub fn handle_event(&mut self, session: SessionId, slot: MediaSlot, event: MediaEvent) {
        let Self {
            media,
            view,
            panel,
            active,
            ..
        } = self;
        let Some(active) = active.as_mut().filter(|a| a.id == session) else {
            trace!("Dropping stale {:?} {:?} from {}", slot, event, session);
            return;
        };

        match (slot, event) {
            (MediaSlot::Primary, MediaEvent::LoadedMetadata) => {
                active.seek.on_metadata(media.primary.as_mut());
                active
                    .sync
                    .publish(media.primary.as_ref(), view.as_mut(), panel.as_mut());
            }
            (MediaSlot::Primary, MediaEvent::Seeked) => {
                active.seek.on_seeked(media.primary.as_mut());
            }
            (MediaSlot::Primary, MediaEvent::TimeUpdate) => {
                active.seek.on_time_update(media.primary.as_mut());
                active
                    .sync
                    .publish(media.primary.as_ref(), view.as_mut(), panel.as_mut());
            }
            (MediaSlot::Preview, MediaEvent::Seeked) => {
                let update = active.hover.on_seeked(media.preview.as_ref());
                apply_preview(view.as_mut(), update);
            }
            (MediaSlot::Preview, MediaEvent::LoadedMetadata | MediaEvent::TimeUpdate) => {}
            (slot, MediaEvent::Stream(err)) => {
                let resume_at = resume_point(active, media);
                let outcome = active.resolver.handle_stream_error(slot, &err, media);
                after_source_change(active, media, view.as_mut(), slot, outcome, resume_at);
            }
            (slot, MediaEvent::ElementError) => {
                let resume_at = resume_point(active, media);
                let outcome = active.resolver.handle_element_error(slot, media);
                after_source_change(active, media, view.as_mut(), slot, outcome, resume_at);
            }
        }
    }

    pub fn handle_key(&mut self, session: SessionId, key: KeyCommand) {
        if !self.is_active(session) {
            trace!("Dropping stale key {:?} from {}", key, session);
            return;
        }
        match key {
            KeyCommand::StepBackward => {
                self.step(session, StepDirection::Backward);
            }
            KeyCommand::StepForward => {
                self.step(session, StepDirection::Forward);
            }
            KeyCommand::TogglePlay => self.toggle_play(session),
            KeyCommand::Close => self.close(),
        }
    }

    pub fn step(&mut self, session: SessionId, direction: StepDirection) -> Option<FrameInfo> {
        let active = self.active.as_mut().filter(|a| a.id == session)?;
        active.seek.release();
        Some(active.sync.step(
            self.media.primary.as_mut(),
            direction,
            self.view.as_mut(),
            self.panel.as_mut(),
        ))
    }

    pub fn toggle_play(&mut self, session: SessionId) {
        let Some(active) = self.active.as_mut().filter(|a| a.id == session) else {
            return;
        };
        active.seek.release();

        let primary = self.media.primary.as_mut();
        if primary.is_paused() {
            if let Err(e) = primary.play() {
                warn!("Play rejected: {}", e);
            }
        } else {
            primary.pause();
        }
    }

    /// Pointer moved over the timeline. Returns whether the caller should
    /// schedule [`ReviewModal::fire_hover_decode`] after the debounce delay.
    pub fn pointer_moved(&mut self, session: SessionId, fraction: f64) -> HoverSchedule {
        let Some(active) = self.active.as_mut().filter(|a| a.id == session) else {
            return HoverSchedule::Unavailable;
        };
        active
            .hover
            .pointer_moved(fraction, self.media.primary.duration())
    }

    pub fn pointer_left(&mut self, session: SessionId) {
        if let Some(active) = self.active.as_mut().filter(|a| a.id == session) {
            active.hover.pointer_left();
            self.view.hide_preview();
        }
    }

    pub fn fire_hover_decode(&mut self, session: SessionId) {
        let Some(active) = self.active.as_mut().filter(|a| a.id == session) else {
            return;
        };
        let update = active.hover.fire(self.media.preview.as_mut());
        apply_preview(self.view.as_mut(), update);
    }

    /// Pauses, validates and confirms a submit of the current frame.
    ///
    /// Returns `Ok(None)` when the user declines, a submit is already in
    /// flight, or the session is stale. Validation failures are alerted and
    /// returned without any network call.
    pub fn begin_submit(
        &mut self,
        session: SessionId,
        credentials: Option<&Credentials>,
    ) -> AppResult<Option<SubmitTicket>> {
        let Some(active) = self.active.as_mut().filter(|a| a.id == session) else {
            return Ok(None);
        };
        if active.submit_label.is_some() {
            debug!("Submit already in flight for {}", session);
            return Ok(None);
        }

        self.media.primary.pause();
        active.seek.release();
        let info = active.sync.snapshot(self.media.primary.as_ref());
        let seconds = seconds_of(info.frame, info.fps);

        let request = match SubmitRequest::build(credentials, &active.request.video_id, seconds) {
            Ok(request) => request,
            Err(e) => {
                let message = match &e {
                    AppError::MissingCredentials => {
                        "Connect to the evaluation server before submitting.".to_string()
                    }
                    other => other.to_string(),
                };
                self.view.alert(&message);
                return Err(e);
            }
        };

        let prompt = format!(
            "Submit {} at frame {} ({}, {} ms)?",
            request.video_id,
            info.frame,
            info.time_label(),
            request.time_ms
        );
        if !self.view.confirm(&prompt) {
            debug!("Submit cancelled by user");
            return Ok(None);
        }

        active.submit_label = Some(SUBMIT_LABEL.to_string());
        self.view.set_submit_control(SubmitControl::Busy);
        info!(
            "Submitting {} at {} ms (frame {})",
            request.video_id, request.time_ms, info.frame
        );

        Ok(Some(SubmitTicket {
            session,
            request,
            frame: info.frame,
        }))
    }

    /// Applies the network result of a submit started by `begin_submit`.
    pub fn finish_submit(&mut self, session: SessionId, result: AppResult<()>) {
        let Some(active) = self.active.as_mut().filter(|a| a.id == session) else {
            debug!("Submit result for stale {} dropped", session);
            return;
        };
        let label = active
            .submit_label
            .take()
            .unwrap_or_else(|| SUBMIT_LABEL.to_string());

        match result {
            Ok(()) => {
                info!("Submit accepted for {}", session);
                self.close();
            }
            Err(e) => {
                error!("Submit failed: {}", e);
                self.view.alert(&format!("Submit failed: {}", e));
                self.view.set_submit_control(SubmitControl::Ready { label });
            }
        }
    }
}

impl Drop for ReviewModal {
    fn drop(&mut self) {
        self.close();
    }
}

fn apply_preview(view: &mut dyn ModalView, update: PreviewUpdate) {
    match update {
        PreviewUpdate::Render(frame) => view.render_preview(&frame),
        PreviewUpdate::Hide => view.hide_preview(),
        PreviewUpdate::Unchanged => {}
    }
}

/// Where playback should resume if the source gets replaced right now.
fn resume_point(active: &ActiveSession, media: &MediaPair) -> f64 {
    if active.seek.is_settled() {
        media.primary.current_time()
    } else {
        active.seek.target()
    }
}

fn after_source_change(
    active: &mut ActiveSession,
    media: &mut MediaPair,
    view: &mut dyn ModalView,
    slot: MediaSlot,
    outcome: SourceOutcome,
    resume_at: f64,
) {
    match outcome {
        SourceOutcome::FellBack => {
            active.hover.pointer_left();
            view.hide_preview();
            active.seek.rearm(resume_at, media.primary.as_mut());
        }
        SourceOutcome::Unplayable if slot == MediaSlot::Preview => view.hide_preview(),
        SourceOutcome::Unplayable => {
            error!("{} is unplayable until reopened", active.request.video_id);
        }
        SourceOutcome::Ignored | SourceOutcome::Recovering => {}
    }
}
