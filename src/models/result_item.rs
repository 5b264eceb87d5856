use serde::{Deserialize, Serialize};

use super::VideoId;
use crate::constants::TRANSCRIPT_SNIPPET_CHARS;
use crate::player::timecode::{format_clock, frame_of, normalize_fps};

/// One hit returned by `POST /search`.
///
/// Visual hits carry `clip_score` and `frame_number`; transcript hits carry
/// `transcript_text`, `transcript_score` and `end`. The server sends both
/// `start` and `start_seconds` with the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub video_id: VideoId,
    pub keyframe_index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Relevance {
    Visual { score: f64 },
    Transcript { score: Option<f64>, snippet: String },
    Unscored,
}

impl ResultItem {
    pub fn fps(&self) -> f64 {
        normalize_fps(self.fps)
    }

    pub fn start_time(&self) -> f64 {
        self.start_seconds.or(self.start).unwrap_or(0.0).max(0.0)
    }

    /// Original frame number, derived from the start time when the server
    /// didn't resolve one.
    pub fn frame(&self) -> u64 {
        self.frame_number
            .unwrap_or_else(|| frame_of(self.start_time(), self.fps()))
    }

    pub fn relevance(&self) -> Relevance {
        if let Some(text) = &self.transcript_text {
            Relevance::Transcript {
                score: self.transcript_score,
                snippet: snippet(text, TRANSCRIPT_SNIPPET_CHARS),
            }
        } else if let Some(score) = self.clip_score {
            Relevance::Visual { score }
        } else {
            Relevance::Unscored
        }
    }
}

/// View model for one card in the result grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    pub title: String,
    pub thumbnail_url: String,
    pub frame_label: String,
    pub time_label: String,
    pub detail: String,
}

impl ResultCard {
    pub fn new(item: &ResultItem, thumbnail_url: String) -> Self {
        let detail = match item.relevance() {
            Relevance::Visual { score } => format!("Score: {:.3}", score),
            Relevance::Transcript { snippet, .. } => snippet,
            Relevance::Unscored => String::new(),
        };

        Self {
            title: format!("{} #{}", item.video_id, item.keyframe_index),
            thumbnail_url,
            frame_label: format!("Frame {}", item.frame()),
            time_label: format_clock(item.start_time()),
            detail,
        }
    }
}

fn snippet(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
