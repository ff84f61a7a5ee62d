use thiserror::Error;

pub type AiResult<T> = std::result::Result<T, AiError>;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("ai provider is not configured")]
    NotConfigured,
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("ai provider returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("ai provider returned no text")]
    EmptyResponse,
    #[error("invalid ai output: {0}")]
    InvalidOutput(String),
    #[error("json error: {0}")]
    SerdeError(#[from] serde_json::Error),
}
