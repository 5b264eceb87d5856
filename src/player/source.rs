use tracing::{debug, error, info, warn};

use super::media::MediaPair;
use super::traits::{StreamingDecoder, StreamingRuntime};
use super::types::{MediaSlot, StreamError, StreamErrorKind, TransportKind};
use crate::api::MediaUrls;
use crate::config::{BufferingConfig, PlaybackConfig};
use crate::constants::HLS_MIME_TYPE;
use crate::models::VideoId;

/// What a source failure led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Non-fatal, or not ours to handle
    Ignored,
    /// Same decoder retried (restart load or media recovery)
    Recovering,
    /// Both elements now play the progressive file
    FellBack,
    /// Slot has no working source until the session is reopened
    Unplayable,
}

/// Transport attached to one element.
enum Binding {
    Streaming {
        decoder: Box<dyn StreamingDecoder>,
        network_restarts: u32,
        media_recoveries: u32,
    },
    Native,
    Progressive,
    Unplayable,
}

impl Binding {
    fn streaming(decoder: Box<dyn StreamingDecoder>) -> Self {
        Binding::Streaming {
            decoder,
            network_restarts: 0,
            media_recoveries: 0,
        }
    }

    fn kind(&self) -> Option<TransportKind> {
        match self {
            Binding::Streaming { .. } => Some(TransportKind::SegmentedStream),
            Binding::Native => Some(TransportKind::NativeStream),
            Binding::Progressive => Some(TransportKind::ProgressiveFile),
            Binding::Unplayable => None,
        }
    }

    /// Frees decoder resources. The element's own source is left alone.
    fn teardown(self) {
        if let Binding::Streaming { mut decoder, .. } = self {
            decoder.destroy();
        }
    }
}

/// Picks and owns the transport for both media elements of a session,
/// preferring segmented streaming and falling back to the progressive file.
pub struct SourceResolver {
    video_id: VideoId,
    urls: MediaUrls,
    playback: PlaybackConfig,
    buffering: BufferingConfig,
    primary: Option<Binding>,
    preview: Option<Binding>,
}

impl SourceResolver {
    pub fn new(
        video_id: VideoId,
        urls: MediaUrls,
        playback: PlaybackConfig,
        buffering: BufferingConfig,
    ) -> Self {
        Self {
            video_id,
            urls,
            playback,
            buffering,
            primary: None,
            preview: None,
        }
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn transport(&self, slot: MediaSlot) -> Option<TransportKind> {
        self.binding(slot).as_ref().and_then(Binding::kind)
    }

    /// Attaches sources to both elements, replacing any previous binding.
    pub fn bind(
        &mut self,
        runtime: &mut dyn StreamingRuntime,
        media: &mut MediaPair,
    ) -> TransportKind {
        self.teardown(media);
        media.preview.set_muted(true);

        let manifest = self.urls.manifest(&self.video_id);

        if runtime.is_supported() {
            for slot in [MediaSlot::Primary, MediaSlot::Preview] {
                let buffer = match slot {
                    MediaSlot::Primary => self.buffering.primary,
                    MediaSlot::Preview => self.buffering.preview,
                };
                let mut decoder = runtime.create_decoder(buffer);
                decoder.load_source(&manifest);
                decoder.attach_media(slot);
                *self.binding_mut(slot) = Some(Binding::streaming(decoder));
            }
            info!("Bound {} via segmented stream {}", self.video_id, manifest);
            TransportKind::SegmentedStream
        } else if media.primary.can_play_type(HLS_MIME_TYPE) {
            media.primary.attach_source(&manifest);
            media.preview.attach_source(&manifest);
            self.primary = Some(Binding::Native);
            self.preview = Some(Binding::Native);
            info!("Bound {} via native stream playback", self.video_id);
            TransportKind::NativeStream
        } else {
            debug!("Segmented streaming unavailable, using progressive file");
            self.attach_progressive(media);
            TransportKind::ProgressiveFile
        }
    }

    /// Binds a different content id. Rebinding the id already bound is a no-op.
    pub fn rebind(
        &mut self,
        video_id: VideoId,
        runtime: &mut dyn StreamingRuntime,
        media: &mut MediaPair,
    ) -> TransportKind {
        if video_id == self.video_id {
            if let Some(kind) = self.transport(MediaSlot::Primary) {
                debug!("Rebind to {} skipped, already bound", video_id);
                return kind;
            }
        }
        self.video_id = video_id;
        self.bind(runtime, media)
    }

    /// Destroys any streaming decoders and attaches the progressive file to
    /// both elements.
    pub fn fall_back_to_progressive(&mut self, media: &mut MediaPair) {
        warn!("Falling back to progressive file for {}", self.video_id);
        self.teardown(media);
        self.attach_progressive(media);
    }

    /// Applies the recovery policy to a decoder error on `slot`.
    pub fn handle_stream_error(
        &mut self,
        slot: MediaSlot,
        err: &StreamError,
        media: &mut MediaPair,
    ) -> SourceOutcome {
        if !err.fatal {
            debug!("Recoverable stream error on {:?}: {:?}", slot, err.detail);
            return SourceOutcome::Ignored;
        }

        let max_network_restarts = self.playback.max_network_restarts;
        let max_media_recoveries = self.playback.max_media_recoveries;

        let Some(Binding::Streaming {
            decoder,
            network_restarts,
            media_recoveries,
        }) = self.binding_mut(slot)
        else {
            // A decoder that was already replaced can still report late
            debug!("Stream error on {:?} without a live decoder, ignoring", slot);
            return SourceOutcome::Ignored;
        };

        match err.kind {
            StreamErrorKind::Network if err.is_manifest_failure() => {
                error!("Manifest failed to load ({:?})", err.detail);
                self.fall_back_to_progressive(media);
                SourceOutcome::FellBack
            }
            StreamErrorKind::Network if *network_restarts < max_network_restarts => {
                *network_restarts += 1;
                warn!(
                    "Fatal network error on {:?} ({:?}), restarting load ({}/{})",
                    slot, err.detail, network_restarts, max_network_restarts
                );
                decoder.start_load();
                SourceOutcome::Recovering
            }
            StreamErrorKind::Media if *media_recoveries < max_media_recoveries => {
                *media_recoveries += 1;
                warn!(
                    "Fatal media error on {:?} ({:?}), recovering ({}/{})",
                    slot, err.detail, media_recoveries, max_media_recoveries
                );
                decoder.recover_media_error();
                SourceOutcome::Recovering
            }
            _ => {
                error!(
                    "Unrecoverable stream error on {:?}: {:?} {:?}",
                    slot, err.kind, err.detail
                );
                self.mark_unplayable(slot, media);
                SourceOutcome::Unplayable
            }
        }
    }

    /// The element failed on a source it was playing by itself.
    pub fn handle_element_error(
        &mut self,
        slot: MediaSlot,
        media: &mut MediaPair,
    ) -> SourceOutcome {
        match self.binding(slot) {
            Some(Binding::Native) => {
                self.fall_back_to_progressive(media);
                SourceOutcome::FellBack
            }
            Some(Binding::Progressive) => {
                error!("Progressive file failed on {:?} for {}", slot, self.video_id);
                self.mark_unplayable(slot, media);
                SourceOutcome::Unplayable
            }
            // Decoder-backed bindings report through handle_stream_error
            _ => SourceOutcome::Ignored,
        }
    }

    /// Releases decoders and both elements' sources.
    pub fn teardown(&mut self, media: &mut MediaPair) {
        for slot in [MediaSlot::Primary, MediaSlot::Preview] {
            if let Some(binding) = self.binding_mut(slot).take() {
                binding.teardown();
                media.get_mut(slot).release_source();
            }
        }
    }

    fn attach_progressive(&mut self, media: &mut MediaPair) {
        let url = self.urls.progressive(&self.video_id);
        media.primary.attach_source(&url);
        media.preview.attach_source(&url);
        self.primary = Some(Binding::Progressive);
        self.preview = Some(Binding::Progressive);
        info!("Bound {} via progressive file {}", self.video_id, url);
    }

    fn mark_unplayable(&mut self, slot: MediaSlot, media: &mut MediaPair) {
        if let Some(binding) = self.binding_mut(slot).replace(Binding::Unplayable) {
            binding.teardown();
        }
        media.get_mut(slot).release_source();
    }

    fn binding(&self, slot: MediaSlot) -> &Option<Binding> {
        match slot {
            MediaSlot::Primary => &self.primary,
            MediaSlot::Preview => &self.preview,
        }
    }

    fn binding_mut(&mut self, slot: MediaSlot) -> &mut Option<Binding> {
        match slot {
            MediaSlot::Primary => &mut self.primary,
            MediaSlot::Preview => &mut self.preview,
        }
    }
}

impl Drop for SourceResolver {
    fn drop(&mut self) {
        // Decoders must not outlive the resolver even if teardown was skipped
        for binding in [self.primary.take(), self.preview.take()].into_iter().flatten() {
            binding.teardown();
        }
    }
}
