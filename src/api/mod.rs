pub mod client;
pub mod urls;


use async_trait::async_trait;

pub use client::{ApiClient, SearchQuery};
pub use urls::MediaUrls;

use crate::models::{Credentials, ResultItem, SubmitRequest};
use crate::utils::AppResult;

/// The retrieval backend as seen from the client: search, plus the
/// evaluation-server login and submit proxies.
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> AppResult<Vec<ResultItem>>;
    async fn login(&self) -> AppResult<Credentials>;
    async fn submit(&self, request: &SubmitRequest) -> AppResult<serde_json::Value>;
}
