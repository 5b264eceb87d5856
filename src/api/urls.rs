use url::Url;

use crate::config::ServerConfig;
use crate::models::VideoId;
use crate::utils::{AppError, AppResult};

/// Builds media resource URLs for a content id. Ids are percent-encoded as
/// single path segments.
#[derive(Debug, Clone)]
pub struct MediaUrls {
    base: Url,
    manifest_name: String,
}

impl MediaUrls {
    pub fn new(base_url: &str, manifest_name: impl Into<String>) -> AppResult<Self> {
        let base = parse_base_url(base_url)?;
        Ok(Self {
            base,
            manifest_name: manifest_name.into(),
        })
    }

    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        Self::new(&config.base_url, config.hls_manifest_name.clone())
    }

    pub fn manifest(&self, video_id: &VideoId) -> String {
        self.join(&["hls", video_id.as_str(), &self.manifest_name])
    }

    pub fn progressive(&self, video_id: &VideoId) -> String {
        self.join(&["videos", video_id.as_str()])
    }

    pub fn keyframe(&self, video_id: &VideoId, keyframe_index: u64) -> String {
        let file = format!("keyframe_{}.webp", keyframe_index);
        self.join(&["keyframes", video_id.as_str(), &file])
    }

    fn join(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        // parse_base_url rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }
}

pub(crate) fn parse_base_url(base_url: &str) -> AppResult<Url> {
    let url = Url::parse(base_url.trim())
        .map_err(|e| AppError::Configuration(format!("invalid server url {:?}: {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(AppError::Configuration(format!(
            "server url {:?} cannot carry a path",
            base_url
        )));
    }
    Ok(url)
}
