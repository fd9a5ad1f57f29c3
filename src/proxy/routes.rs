use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use url::Url;

use super::config::ProxyConfig;
use super::error::ProxyError;

pub const PROXY_PATH: &str = "/api/proxy-image";
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=31536000, immutable";
const FALLBACK_CONTENT_TYPE: &str = "image/png";
const MAX_REDIRECTS: usize = 10;

#[derive(Clone)]
struct ProxyState {
    config: Arc<ProxyConfig>,
    http: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
#[error("redirect to a host outside the allow-list")]
struct RedirectRejected;

/// Create the image proxy router.
pub fn proxy_routes(config: ProxyConfig) -> Router {
    let config = Arc::new(config);
    let state = ProxyState {
        http: build_http_client(Arc::clone(&config)),
        config,
    };
    Router::new()
        .route(PROXY_PATH, get(proxy_image))
        .with_state(state)
}

/// Every redirect hop is held to the same allow-list as the requested URL.
fn build_http_client(config: Arc<ProxyConfig>) -> reqwest::Client {
    let policy = reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if config.allows(attempt.url()) {
            attempt.follow()
        } else {
            tracing::warn!(host = ?attempt.url().host_str(), "Image redirect rejected");
            attempt.error(RedirectRejected)
        }
    });
    reqwest::Client::builder()
        .redirect(policy)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to an HTTP client without redirects");
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap_or_default()
        })
}

fn is_rejected_redirect(error: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        if inner.is::<RedirectRejected>() {
            return true;
        }
        source = inner.source();
    }
    false
}

#[derive(Deserialize)]
struct ProxyParams {
    url: Option<String>,
}

async fn proxy_image(
    State(state): State<ProxyState>,
    Query(params): Query<ProxyParams>,
) -> Result<Response, ProxyError> {
    let raw = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or(ProxyError::MissingUrl)?;

    let url: Url = raw.trim().parse().map_err(|_| ProxyError::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProxyError::InvalidUrl);
    }
    if !state.config.allows(&url) {
        tracing::warn!(host = ?url.host_str(), "Image host rejected");
        return Err(ProxyError::HostNotAllowed);
    }

    let upstream = state.http.get(url).send().await.map_err(|e| {
        if is_rejected_redirect(&e) {
            ProxyError::HostNotAllowed
        } else {
            ProxyError::Upstream(e.to_string())
        }
    })?;

    if !upstream.status().is_success() {
        let status = StatusCode::from_u16(upstream.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        tracing::debug!(%status, "Image upstream returned an error");
        return Err(ProxyError::UpstreamStatus(status));
    }

    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| HeaderValue::from_bytes(v.as_bytes()).ok())
        .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| ProxyError::Upstream(e.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, content_type),
            (CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE)),
        ],
        bytes,
    )
        .into_response())
}
