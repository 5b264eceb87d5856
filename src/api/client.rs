use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use url::Url;

use super::RetrievalBackend;
use super::urls::parse_base_url;
use crate::config::ServerConfig;
use crate::models::{Credentials, LoginResponse, ResultItem, SubmitRequest};
use crate::utils::{AppError, AppResult};

/// Search request body. Either field alone selects visual (CLIP) or
/// transcript search; both together ask the server for the intersection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl SearchQuery {
    pub fn visual(text: impl Into<String>) -> Self {
        Self {
            description: non_blank(text.into()),
            transcript: None,
        }
    }

    pub fn transcript(text: impl Into<String>) -> Self {
        Self {
            description: None,
            transcript: non_blank(text.into()),
        }
    }

    pub fn combined(description: impl Into<String>, transcript: impl Into<String>) -> Self {
        Self {
            description: non_blank(description.into()),
            transcript: non_blank(transcript.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.transcript.is_none()
    }
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ServerConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let mut base_url = parse_base_url(&config.base_url)?;
        // Endpoints are joined relative to the base, which needs a trailing slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Configuration(format!("bad endpoint {}: {}", path, e)))
    }

    pub async fn search(&self, query: &SearchQuery) -> AppResult<Vec<ResultItem>> {
        if query.is_empty() {
            return Err(AppError::InvalidQuery("search text is empty".to_string()));
        }

        let url = self.endpoint("search")?;
        info!("Searching {:?}", query);

        let response = self.client.post(url).json(query).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let results: Vec<ResultItem> = response.json().await?;
        info!("Search returned {} results", results.len());
        Ok(results)
    }

    pub async fn login(&self) -> AppResult<Credentials> {
        let url = self.endpoint("api/login")?;

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let login: LoginResponse = response.json().await?;
        if let Some(message) = &login.message {
            debug!("Login response: {}", message);
        }
        let credentials = Credentials::from(login);
        if !credentials.is_complete() {
            return Err(AppError::Api {
                status: 200,
                message: "login response is missing session or evaluation id".to_string(),
            });
        }

        info!("Connected to evaluation {}", credentials.evaluation_id);
        Ok(credentials)
    }

    pub async fn submit(&self, request: &SubmitRequest) -> AppResult<serde_json::Value> {
        let url = self.endpoint("api/submit")?;
        info!(
            "Submitting {} at {} ms to evaluation {}",
            request.video_id, request.time_ms, request.evaluation_id
        );

        let response = self.client.post(url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body = response.text().await?;
        // Any success payload is accepted, including an empty one
        let value = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
        Ok(value)
    }

    /// Extracts the server's own message from a failed response.
    async fn error_from(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        error!("Server returned {}: {}", status, message);
        AppError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl RetrievalBackend for ApiClient {
    async fn search(&self, query: &SearchQuery) -> AppResult<Vec<ResultItem>> {
        ApiClient::search(self, query).await
    }

    async fn login(&self) -> AppResult<Credentials> {
        ApiClient::login(self).await
    }

    async fn submit(&self, request: &SubmitRequest) -> AppResult<serde_json::Value> {
        ApiClient::submit(self, request).await
    }
}
