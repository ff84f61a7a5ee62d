use thiserror::Error;
use tracing::error;
use tracing_error::SpanTrace;

/// Failures that abort startup or a CLI command.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("config error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
    #[error("database error: {0}")]
    DatabaseError(#[from] crate::model::DatabaseError),
    #[error("crypt error: {0}")]
    CryptError(#[from] crate::auth::CryptError),
    #[error("ai error: {0}")]
    AiError(#[from] crate::ai::AiError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Awaits `run` and turns an error into a logged span trace plus exit code 1.
pub async fn run_with_error_handler<F, T>(run: F) -> T
where
    F: AsyncFn() -> AppResult<T>,
    T: Send + Sync,
{
    run().await.unwrap_or_else(|e| {
        log_error(&e);
        std::process::exit(1)
    })
}

/// Logs `error` together with the span it was raised in.
pub fn log_error<E: std::error::Error>(error: &E) {
    error!("{error}\n{}", SpanTrace::capture());
}
