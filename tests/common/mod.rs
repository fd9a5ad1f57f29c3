//! In-process mock of the backend, served on an ephemeral port.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use atelier_client::{ApiClient, AuthStore, ClientConfig, MemoryTokenStorage, RecordingNavigator};
use axum::extract::{OriginalUri, Path, RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post, put};
use axum::Router;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

pub const LOGIN_PASSWORD: &str = "secret";
pub const LOGIN_REFRESH_TOKEN: &str = "r-login";
pub const REGISTER_REFRESH_TOKEN: &str = "r-register";
/// Logging in as this address yields an access token with no decodable payload.
pub const OPAQUE_LOGIN_EMAIL: &str = "opaque@example.com";
pub const OPAQUE_ACCESS_TOKEN: &str = "opaque-access-token";

/// Unsigned JWT-shaped token carrying `payload`.
pub fn jwt(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

pub fn user_token(id: &str, name: &str) -> String {
    jwt(&json!({
        "id": id,
        "name": name,
        "email": format!("{id}@example.com"),
        "age": "29",
        "pfpUrl": format!("https://img.example/{id}.png"),
    }))
}

#[derive(Clone, Default)]
pub struct Backend {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    valid_access: Mutex<String>,
    valid_refresh: Mutex<Option<String>>,
    next_access: Mutex<String>,
    rotate_to: Mutex<Option<String>>,
    refresh_delay: Mutex<Option<Duration>>,
    refresh_calls: AtomicUsize,
    seen_auth: Mutex<Vec<String>>,
    update_token: Mutex<Option<String>>,
    requests: Mutex<Vec<String>>,
}

impl Backend {
    /// Accepts `access` on protected routes and `refresh` at the refresh
    /// endpoint; a refresh mints `next_access`.
    pub fn new(access: &str, refresh: &str, next_access: &str) -> Self {
        let backend = Self::default();
        *backend.inner.valid_access.lock().unwrap() = access.to_owned();
        *backend.inner.valid_refresh.lock().unwrap() = Some(refresh.to_owned());
        *backend.inner.next_access.lock().unwrap() = next_access.to_owned();
        backend
    }

    pub fn rotate_refresh_to(&self, token: &str) {
        *self.inner.rotate_to.lock().unwrap() = Some(token.to_owned());
    }

    pub fn reject_all_refreshes(&self) {
        *self.inner.valid_refresh.lock().unwrap() = None;
    }

    pub fn slow_refresh(&self, delay: Duration) {
        *self.inner.refresh_delay.lock().unwrap() = Some(delay);
    }

    /// Answer profile updates with a freshly minted `token` instead of a user.
    pub fn reissue_on_update(&self, token: &str) {
        *self.inner.update_token.lock().unwrap() = Some(token.to_owned());
    }

    /// `METHOD /path?query` of every request seen by the resource routes.
    pub fn requests(&self) -> Vec<String> {
        self.inner.requests.lock().unwrap().clone()
    }

    fn record(&self, method: &Method, uri: &OriginalUri) {
        self.inner.requests.lock().unwrap().push(format!("{method} {}", uri.0));
    }

    pub fn refresh_calls(&self) -> usize {
        self.inner.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn seen_auth(&self) -> Vec<String> {
        self.inner.seen_auth.lock().unwrap().clone()
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("<none>")
            .to_owned();
        self.inner.seen_auth.lock().unwrap().push(auth.clone());
        auth == format!("Bearer {}", self.inner.valid_access.lock().unwrap())
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/protected", get(protected))
            .route("/always-unauthorized", get(always_unauthorized))
            .route("/missing", get(missing))
            .route("/users/refresh", post(refresh))
            .route("/users/login", post(login))
            .route("/users/register", post(register))
            .route("/users/{id}", put(update_user).get(user_profile))
            .route("/campaigns/{id}", delete(delete_campaign))
            .route("/exhibitions", post(submit_exhibition))
            .route("/galleries", get(galleries))
            .route("/notices", get(notices))
            .route("/posts/feed", get(feed))
            .route("/advertisements", get(advertisements))
            .with_state(self.clone())
    }

    /// Serve on `127.0.0.1:0`; returns the base URL.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn protected(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if backend.authorized(&headers) {
        Json(json!({ "ok": true })).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn always_unauthorized(State(backend): State<Backend>, headers: HeaderMap) -> StatusCode {
    backend.authorized(&headers);
    StatusCode::UNAUTHORIZED
}

async fn missing(State(backend): State<Backend>, headers: HeaderMap) -> StatusCode {
    backend.authorized(&headers);
    StatusCode::NOT_FOUND
}

async fn refresh(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    backend.inner.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = *backend.inner.refresh_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let presented = body.get("refreshToken").and_then(Value::as_str);
    let valid = backend.inner.valid_refresh.lock().unwrap().clone();
    if presented.is_none() || presented != valid.as_deref() {
        return (StatusCode::UNAUTHORIZED, "invalid refresh token").into_response();
    }

    let next = backend.inner.next_access.lock().unwrap().clone();
    *backend.inner.valid_access.lock().unwrap() = next.clone();

    let rotated = backend.inner.rotate_to.lock().unwrap().clone();
    let mut response = json!({ "accessToken": next });
    if let Some(rotated) = rotated {
        *backend.inner.valid_refresh.lock().unwrap() = Some(rotated.clone());
        response["refreshToken"] = Value::String(rotated);
    }
    Json(response).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body.get("password").and_then(Value::as_str) != Some(LOGIN_PASSWORD) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "bad credentials" })))
            .into_response();
    }
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let id = email.split('@').next().unwrap_or_default();
    let token = if email == OPAQUE_LOGIN_EMAIL {
        OPAQUE_ACCESS_TOKEN.to_owned()
    } else {
        user_token(id, "Logged In")
    };
    Json(json!({
        "token": token,
        "refreshToken": LOGIN_REFRESH_TOKEN,
        "message": "welcome",
    }))
    .into_response()
}

async fn update_user(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let reissued = backend.inner.update_token.lock().unwrap().clone();
    if let Some(token) = reissued {
        return Json(json!({ "token": token, "message": "Profile saved" })).into_response();
    }
    Json(json!({
        "user": {
            "id": id,
            "name": body["name"],
            "email": body["email"],
            "age": body["age"],
            "pfp_url": body["pfpUrl"],
        }
    }))
    .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    let name = body.get("name").and_then(Value::as_str).unwrap_or_default();
    let id = name.to_lowercase();
    Json(json!({
        "token": user_token(&id, name),
        "refreshToken": REGISTER_REFRESH_TOKEN,
    }))
    .into_response()
}

async fn user_profile(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "_id": id, "name": format!("Artist {id}"), "pfp_url": "p.png" })).into_response()
}

async fn delete_campaign(
    State(backend): State<Backend>,
    method: Method,
    uri: OriginalUri,
    headers: HeaderMap,
) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    backend.record(&method, &uri);
    Json(json!({ "message": "Campaign deleted" })).into_response()
}

async fn submit_exhibition(
    State(backend): State<Backend>,
    method: Method,
    uri: OriginalUri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    backend.record(&method, &uri);
    Json(body).into_response()
}

async fn galleries(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        { "_id": "g1", "name": "North Hall", "image": "n.png", "maxArts": 12, "modelUrl": "n.glb" },
        { "_id": "g2", "name": "South Hall" }
    ]))
    .into_response()
}

async fn notices(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([{ "title": "Closed Monday", "description": "Maintenance", "imageUrl": "c.png" }]))
        .into_response()
}

async fn feed(
    State(backend): State<Backend>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        { "_id": "p1", "name": "Dawn", "description": query.unwrap_or_default(), "imageUrl": "d.png" }
    ]))
    .into_response()
}

async fn advertisements(
    State(backend): State<Backend>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        { "_id": "a1", "name": "Easel", "description": query.unwrap_or_default(), "price": 20 }
    ]))
    .into_response()
}

/// Client wired to `base_url` with in-memory storage and a recording navigator.
pub fn client(
    base_url: &str,
    refresh_token: Option<&str>,
) -> (ApiClient, Arc<MemoryTokenStorage>, Arc<RecordingNavigator>) {
    let storage = Arc::new(match refresh_token {
        Some(token) => MemoryTokenStorage::with_token(atelier_client::RefreshToken::new(token)),
        None => MemoryTokenStorage::new(),
    });
    let navigator = Arc::new(RecordingNavigator::new());
    let client = ApiClient::new(
        ClientConfig::new(base_url.parse().unwrap()),
        AuthStore::new(),
        MemoryTokenStorage::new(),
    )
    .with_shared_storage(storage.clone())
    .with_shared_navigator(navigator.clone());
    (client, storage, navigator)
}
