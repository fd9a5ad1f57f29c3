use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Image proxy failures, each mapped to a JSON `{"error": ...}` response.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// No `url` query parameter, or an empty one.
    #[error("Missing image URL")]
    MissingUrl,

    /// `url` is not an absolute http(s) URL.
    #[error("Invalid image URL")]
    InvalidUrl,

    /// `url` points outside the configured allow-list.
    #[error("Image host not allowed")]
    HostNotAllowed,

    /// Upstream answered with a non-success status, passed through as-is.
    #[error("Failed to fetch image")]
    UpstreamStatus(StatusCode),

    /// Upstream could not be reached or its body could not be read.
    #[error("Upstream request failed: {0}")]
    Upstream(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingUrl | Self::InvalidUrl => StatusCode::BAD_REQUEST,
            Self::HostNotAllowed => StatusCode::FORBIDDEN,
            Self::UpstreamStatus(status) => *status,
            Self::Upstream(_) => {
                tracing::error!(error = %self, "Image proxy error");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "Internal server error" })),
                )
                    .into_response();
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
