use serde::{Deserialize, Serialize};

use super::{Credentials, EvalSessionId, EvaluationId, ResultItem, VideoId};
use crate::player::timecode::{ms_of, resolve_fps, seconds_of};
use crate::utils::{AppError, AppResult};

/// Body of `POST /api/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub session_id: EvalSessionId,
    pub evaluation_id: EvaluationId,
    pub video_id: VideoId,
    pub time_ms: u64,
}

impl SubmitRequest {
    /// Validates locally before anything touches the network: the video id
    /// and time are checked first, then the stored credential pair.
    pub fn build(
        credentials: Option<&Credentials>,
        video_id: &VideoId,
        seconds: f64,
    ) -> AppResult<Self> {
        if video_id.is_blank() {
            return Err(AppError::InvalidSubmit("missing video id".to_string()));
        }
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(AppError::InvalidSubmit(format!(
                "time is not a valid number: {}",
                seconds
            )));
        }

        let credentials = credentials
            .filter(|c| c.is_complete())
            .ok_or(AppError::MissingCredentials)?;

        Ok(Self {
            session_id: credentials.session_id.clone(),
            evaluation_id: credentials.evaluation_id.clone(),
            video_id: video_id.clone(),
            time_ms: ms_of(seconds),
        })
    }

    pub fn for_frame(
        credentials: Option<&Credentials>,
        video_id: &VideoId,
        frame: u64,
        fps: f64,
    ) -> AppResult<Self> {
        Self::build(credentials, video_id, seconds_of(frame, fps))
    }

    /// Submit straight from a result card. `default_fps` covers hits without a rate.
    pub fn for_result(
        credentials: Option<&Credentials>,
        item: &ResultItem,
        default_fps: f64,
    ) -> AppResult<Self> {
        match item.frame_number {
            Some(frame) => {
                let fps = resolve_fps(item.fps, default_fps);
                Self::for_frame(credentials, &item.video_id, frame, fps)
            }
            None => Self::build(credentials, &item.video_id, item.start_time()),
        }
    }
}
