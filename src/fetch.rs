//! Authenticated requests with one-shot session recovery.
//!
//! Every request carries the current access token. A `401` with a durable
//! refresh token on hand triggers one refresh against the backend and one
//! retry of the original request. Refreshes are serialized through a single
//! gate: callers that hit `401` concurrently wait for the first refresh and
//! reuse its token instead of issuing their own.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::navigator::{Navigator, TracingNavigator};
use crate::storage::TokenStorage;
use crate::store::AuthStore;
use crate::token;
use crate::types::{AccessToken, RefreshToken};

/// Method, headers and body of one request.
///
/// The body is kept as bytes so the request can be replayed after a refresh.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    method: Method,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl RequestOptions {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    #[must_use]
    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Add a header. `Authorization` and `Content-Type` are always overwritten at send time.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if `body` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, Error> {
        Ok(self.with_body(serde_json::to_vec(body)?))
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Body of a successful refresh. `refresh_token` is present only when the backend rotated it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub(crate) access_token: AccessToken,
    #[serde(default)]
    pub(crate) refresh_token: Option<RefreshToken>,
}

/// HTTP client bound to one session.
///
/// Cheap to clone; clones share the session, the durable token storage and
/// the refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
    store: AuthStore,
    storage: Arc<dyn TokenStorage>,
    navigator: Arc<dyn Navigator>,
    refresh_gate: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("session", &self.store.snapshot())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client. Navigation requests are only logged until
    /// [`with_navigator`](Self::with_navigator) installs a real one.
    #[must_use]
    pub fn new(config: ClientConfig, store: AuthStore, storage: impl TokenStorage) -> Self {
        let http = build_http_client(&config);
        Self {
            config: Arc::new(config),
            http,
            store,
            storage: Arc::new(storage),
            navigator: Arc::new(TracingNavigator),
            refresh_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: impl Navigator) -> Self {
        self.navigator = Arc::new(navigator);
        self
    }

    /// Share a navigator the caller also holds on to.
    #[must_use]
    pub fn with_shared_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Share a storage the caller also holds on to.
    #[must_use]
    pub fn with_shared_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    #[must_use]
    pub fn storage(&self) -> &dyn TokenStorage {
        self.storage.as_ref()
    }

    pub(crate) fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// Issue an authenticated request to `path` (relative to the base URL).
    ///
    /// Non-OK statuses come back as the response for the caller to inspect.
    /// A `401` is retried once after a successful refresh; without a stored
    /// refresh token the `401` is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure, [`Error::RefreshFailed`]
    /// if the backend rejected the refresh token (the session is cleared and
    /// the user sent to the login path first), or [`Error::SessionExpired`]
    /// if a concurrent refresh already failed.
    pub async fn fetch(&self, path: &str, options: RequestOptions) -> Result<Response, Error> {
        let url = self.config.endpoint(path)?;
        let sent_token = self.store.access_token();

        let response = self
            .send(&url, &options, Some(bearer(sent_token.as_ref())?))
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        if self.storage.load()?.is_none() {
            tracing::debug!(path, "Unauthorized with no refresh token on hand");
            return Ok(response);
        }

        let token = self.recover_session(sent_token.as_ref()).await?;
        self.send(&url, &options, Some(bearer(Some(&token))?))
            .await
    }

    /// Issue a request without any `Authorization` header and without recovery.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure.
    pub async fn fetch_public(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        let url = self.config.endpoint(path)?;
        self.send(&url, &options, None).await
    }

    /// Mint a new access token from the stored refresh token.
    ///
    /// On success the session and (if rotated) the durable token are updated.
    /// On failure nothing is cleared; the caller decides what a failed
    /// refresh means.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] if no refresh token is stored,
    /// [`Error::RefreshFailed`] if the backend rejected it, or
    /// [`Error::Http`] on transport failure.
    pub async fn refresh_session(&self) -> Result<AccessToken, Error> {
        let _gate = self.refresh_gate.lock().await;
        let refresh_token = self.storage.load()?.ok_or(Error::Unauthenticated)?;
        let tokens = self.request_refresh(&refresh_token).await?;
        self.apply_refresh(tokens)
    }

    /// Recover from a `401` seen with `stale` as the bearer token.
    async fn recover_session(&self, stale: Option<&AccessToken>) -> Result<AccessToken, Error> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.store.access_token() {
            if Some(&current) != stale {
                tracing::debug!("Reusing access token from a concurrent refresh");
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.storage.load()? else {
            return Err(Error::SessionExpired);
        };

        tracing::debug!("Access token rejected, refreshing");
        match self.request_refresh(&refresh_token).await {
            Ok(tokens) => self.apply_refresh(tokens),
            Err(e @ Error::RefreshFailed { .. }) => {
                tracing::warn!(error = %e, "Refresh token rejected, signing out");
                self.expire_session();
                Err(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh did not complete");
                Err(e)
            }
        }
    }

    async fn request_refresh(&self, refresh_token: &RefreshToken) -> Result<RefreshResponse, Error> {
        let url = self.config.endpoint(&self.config.refresh_path)?;
        let response = self
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh_token: refresh_token.as_str(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::RefreshFailed { status, detail });
        }

        response.json::<RefreshResponse>().await.map_err(Into::into)
    }

    /// Store freshly minted tokens. The durable token is overwritten only when rotated.
    pub(crate) fn apply_refresh(&self, tokens: RefreshResponse) -> Result<AccessToken, Error> {
        let user =
            token::decode_user(tokens.access_token.as_str()).or_else(|| self.store.user());
        self.store.set_auth(tokens.access_token.clone(), user);

        if let Some(rotated) = &tokens.refresh_token {
            self.storage.store(rotated)?;
        }
        Ok(tokens.access_token)
    }

    /// Drop every credential and send the user to the login entry point.
    pub(crate) fn expire_session(&self) {
        self.store.clear_auth();
        if let Err(e) = self.storage.remove() {
            tracing::warn!(error = %e, "Failed to remove refresh token");
        }
        self.navigator.navigate(&self.config.login_path);
    }

    async fn send(
        &self,
        url: &Url,
        options: &RequestOptions,
        authorization: Option<HeaderValue>,
    ) -> Result<Response, Error> {
        let mut headers = options.headers.clone();
        if let Some(value) = authorization {
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut request = self
            .http
            .request(options.method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }
        Ok(request.send().await?)
    }
}

/// `Bearer <token>`, or an empty value when there is no token.
fn bearer(token: Option<&AccessToken>) -> Result<HeaderValue, Error> {
    let Some(token) = token else {
        return Ok(HeaderValue::from_static(""));
    };
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(|_| Error::Token("access token is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

fn build_http_client(config: &ClientConfig) -> reqwest::Client {
    let Some(timeout) = config.timeout else {
        return reqwest::Client::new();
    };
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Checks HTTP response status; returns the response on success or an error with details.
pub(crate) async fn ensure_success(
    response: Response,
    operation: &'static str,
) -> Result<Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let detail = response.text().await.unwrap_or_default();
    Err(Error::Api {
        operation,
        status,
        detail,
    })
}

/// [`ensure_success`] followed by a JSON decode of the body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    operation: &'static str,
) -> Result<T, Error> {
    let response = ensure_success(response, operation).await?;
    response.json::<T>().await.map_err(Into::into)
}
