use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid submit data: {0}")]
    InvalidSubmit(String),

    #[error("Not connected to the evaluation server, connect first")]
    MissingCredentials,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Credential store error: {0}")]
    Credentials(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// True for failures reported by the server itself rather than the transport.
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, AppError::Api { .. })
    }
}
