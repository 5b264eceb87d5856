use tracing::{debug, info, warn};

use super::credential_store::CredentialStore;
use crate::api::MediaUrls;
use crate::models::{Credentials, ResultCard, ResultItem, VideoId};
use crate::utils::AppResult;

/// Client-side state shared by the search page and the review modal: the
/// last result set, the active video filter and the evaluation credentials.
#[derive(Debug, Default)]
pub struct AppState {
    results: Vec<ResultItem>,
    video_filter: Option<VideoId>,
    search_error: Option<String>,
    credentials: Option<Credentials>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Option<Credentials>) -> Self {
        Self {
            credentials: credentials.filter(|c| c.is_complete()),
            ..Self::default()
        }
    }

    /// Replaces the result set. A video filter that no longer matches any
    /// result is reset.
    pub fn set_search_results(&mut self, results: Vec<ResultItem>) {
        self.search_error = None;
        self.results = results;

        if let Some(filter) = &self.video_filter {
            if !self.results.iter().any(|r| &r.video_id == filter) {
                debug!("Video filter {} no longer present, resetting", filter);
                self.video_filter = None;
            }
        }
        info!("{} results loaded", self.results.len());
    }

    pub fn set_search_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("Search failed: {}", message);
        self.results.clear();
        self.video_filter = None;
        self.search_error = Some(message);
    }

    pub fn search_error(&self) -> Option<&str> {
        self.search_error.as_deref()
    }

    pub fn results(&self) -> &[ResultItem] {
        &self.results
    }

    /// `None` shows every video. Unknown ids are ignored.
    pub fn filter_by_video(&mut self, video_id: Option<VideoId>) {
        self.video_filter = video_id.filter(|id| self.results.iter().any(|r| &r.video_id == id));
    }

    pub fn video_filter(&self) -> Option<&VideoId> {
        self.video_filter.as_ref()
    }

    pub fn visible_results(&self) -> Vec<&ResultItem> {
        self.results
            .iter()
            .filter(|r| self.video_filter.as_ref().is_none_or(|f| &r.video_id == f))
            .collect()
    }

    /// Distinct video ids in order of first appearance.
    pub fn video_options(&self) -> Vec<VideoId> {
        let mut options: Vec<VideoId> = Vec::new();
        for item in &self.results {
            if !options.contains(&item.video_id) {
                options.push(item.video_id.clone());
            }
        }
        options
    }

    pub fn result_cards(&self, urls: &MediaUrls) -> Vec<ResultCard> {
        self.visible_results()
            .into_iter()
            .map(|item| ResultCard::new(item, urls.keyframe(&item.video_id, item.keyframe_index)))
            .collect()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn connect(
        &mut self,
        credentials: Credentials,
        store: &dyn CredentialStore,
    ) -> AppResult<()> {
        store.save(&credentials)?;
        info!("Connected to evaluation {}", credentials.evaluation_id);
        self.credentials = Some(credentials);
        Ok(())
    }

    pub fn disconnect(&mut self, store: &dyn CredentialStore) -> AppResult<()> {
        self.credentials = None;
        store.clear()?;
        info!("Disconnected from evaluation server");
        Ok(())
    }
}
