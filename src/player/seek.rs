use tracing::{debug, trace, warn};

use super::traits::MediaElement;
use crate::config::PlaybackConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekPhase {
    /// Waiting for the element to report metadata
    AwaitingMetadata,
    /// Target time set, waiting for the seek to complete
    Seeking,
    /// Playback requested
    Playing,
}

/// Moves the primary element to a target time, starts playback, then keeps
/// nudging it back while early time updates drift from the target.
#[derive(Debug)]
pub struct SeekController {
    target: f64,
    phase: SeekPhase,
    enforcing: bool,
    reseeks: u32,
    settled: bool,
    policy: PlaybackConfig,
}

impl SeekController {
    pub fn new(target: f64, policy: PlaybackConfig) -> Self {
        Self {
            target,
            phase: SeekPhase::AwaitingMetadata,
            enforcing: false,
            reseeks: 0,
            settled: false,
            policy,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn phase(&self) -> SeekPhase {
        self.phase
    }

    pub fn is_enforcing(&self) -> bool {
        self.enforcing
    }

    /// True once the target has been reached or given up on.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn reseek_attempts(&self) -> u32 {
        self.reseeks
    }

    /// Starts the state machine; seeks right away if metadata is already in.
    pub fn arm(&mut self, element: &mut dyn MediaElement) {
        if element.has_metadata() {
            self.begin_seek(element);
        } else {
            trace!("Seek to {:.3}s waiting for metadata", self.target);
        }
    }

    /// Restarts against a new target, e.g. after the source was replaced.
    pub fn rearm(&mut self, target: f64, element: &mut dyn MediaElement) {
        debug!("Re-arming seek controller at {:.3}s", target);
        self.target = target;
        self.phase = SeekPhase::AwaitingMetadata;
        self.enforcing = false;
        self.reseeks = 0;
        self.settled = false;
        self.arm(element);
    }

    pub fn on_metadata(&mut self, element: &mut dyn MediaElement) {
        if self.phase == SeekPhase::AwaitingMetadata {
            self.begin_seek(element);
        }
    }

    pub fn on_seeked(&mut self, element: &mut dyn MediaElement) {
        if self.phase == SeekPhase::Seeking {
            self.start_playback(element);
        }
    }

    pub fn on_time_update(&mut self, element: &mut dyn MediaElement) {
        if !self.enforcing {
            return;
        }

        let drift = (element.current_time() - self.target).abs();
        if drift <= self.policy.drift_tolerance_secs {
            trace!("Settled at {:.3}s (drift {:.3}s)", element.current_time(), drift);
            self.finish_enforcing();
        } else if self.reseeks < self.policy.max_reseek_attempts {
            self.reseeks += 1;
            debug!(
                "Drift {:.3}s from target {:.3}s, re-seeking ({}/{})",
                drift, self.target, self.reseeks, self.policy.max_reseek_attempts
            );
            element.set_current_time(self.target);
        } else {
            // Close enough
            debug!("Giving up on exact target after {} re-seeks", self.reseeks);
            self.finish_enforcing();
        }
    }

    /// The user took over (step, toggle); stop correcting their position.
    pub fn release(&mut self) {
        if self.enforcing {
            debug!("User input released target enforcement");
        }
        self.finish_enforcing();
    }

    fn begin_seek(&mut self, element: &mut dyn MediaElement) {
        element.set_current_time(self.target);
        if (element.current_time() - self.target).abs() <= self.policy.settle_tolerance_secs {
            self.start_playback(element);
        } else {
            self.phase = SeekPhase::Seeking;
        }
    }

    fn start_playback(&mut self, element: &mut dyn MediaElement) {
        self.phase = SeekPhase::Playing;
        self.enforcing = true;
        if let Err(e) = element.play() {
            warn!("Playback start rejected: {}", e);
        }
    }

    fn finish_enforcing(&mut self) {
        self.enforcing = false;
        if self.phase == SeekPhase::Playing {
            self.settled = true;
        }
    }
}
