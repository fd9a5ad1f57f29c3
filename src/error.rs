#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{operation} failed with status {status}: {detail}")]
    Api {
        operation: &'static str,
        status: u16,
        detail: String,
    },
    #[error("Token refresh rejected with status {status}: {detail}")]
    RefreshFailed { status: u16, detail: String },
    #[error("Session expired")]
    SessionExpired,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Token decode error: {0}")]
    Token(String),
    #[error("Token storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
