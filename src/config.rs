use std::time::Duration;

use url::Url;

use crate::error::Error;

pub const DEFAULT_REFRESH_PATH: &str = "/users/refresh";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Backend client configuration.
///
/// The required field (`base_url`) is a constructor parameter; everything
/// else has a default and a `with_*` override.
///
/// ```rust,ignore
/// use atelier_client::ClientConfig;
///
/// let config = ClientConfig::new("http://localhost:5000".parse()?)
///     .with_login_path("/signin");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) refresh_path: String,
    pub(crate) login_path: String,
    pub(crate) timeout: Option<Duration>,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            refresh_path: DEFAULT_REFRESH_PATH.into(),
            login_path: DEFAULT_LOGIN_PATH.into(),
            timeout: None,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `ATELIER_BACKEND_URL`: REST backend base URL
    ///
    /// # Optional env vars
    /// - `ATELIER_REFRESH_PATH`: Override the token refresh endpoint path
    /// - `ATELIER_LOGIN_PATH`: Override the login entry point
    /// - `ATELIER_TIMEOUT_SECS`: Transport timeout in whole seconds
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or values are invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let base_url_str = lookup("ATELIER_BACKEND_URL")
            .ok_or_else(|| Error::Config("ATELIER_BACKEND_URL is required".into()))?;
        let base_url: Url = base_url_str
            .parse()
            .map_err(|e| Error::Config(format!("ATELIER_BACKEND_URL: {e}")))?;

        let mut config = Self::new(base_url);

        if let Some(path) = lookup("ATELIER_REFRESH_PATH") {
            config = config.with_refresh_path(path);
        }
        if let Some(path) = lookup("ATELIER_LOGIN_PATH") {
            config = config.with_login_path(path);
        }
        if let Some(secs) = lookup("ATELIER_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("ATELIER_TIMEOUT_SECS: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Override the token refresh endpoint (default: `/users/refresh`).
    #[must_use]
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Override the login entry point users are sent to (default: `/login`).
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Set a transport timeout. Without one, requests wait as long as the transport allows.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolve `path` against the base URL by plain concatenation.
    ///
    /// `Url::join` would drop a base path such as `/api`; the backend expects
    /// paths appended verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the result is not a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = if path.is_empty() || path.starts_with('/') || path.starts_with('?') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        joined
            .parse()
            .map_err(|e| Error::Config(format!("invalid endpoint {joined}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_constructor_defaults() {
        let config = ClientConfig::new("http://localhost:5000".parse().unwrap());
        assert_eq!(config.refresh_path(), "/users/refresh");
        assert_eq!(config.login_path(), "/login");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = ClientConfig::new("https://api.example.com/v1/".parse().unwrap());
        assert_eq!(
            config.endpoint("/posts/feed?userId=u1").unwrap().as_str(),
            "https://api.example.com/v1/posts/feed?userId=u1"
        );
        assert_eq!(
            config.endpoint("galleries").unwrap().as_str(),
            "https://api.example.com/v1/galleries"
        );
    }

    #[test]
    fn test_from_lookup_requires_backend_url() {
        let err = ClientConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("ATELIER_BACKEND_URL")));
    }

    #[test]
    fn test_from_lookup_rejects_bad_url() {
        let err =
            ClientConfig::from_lookup(lookup_from(&[("ATELIER_BACKEND_URL", "not a url")]))
                .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_lookup_with_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("ATELIER_BACKEND_URL", "http://localhost:5000"),
            ("ATELIER_REFRESH_PATH", "/auth/refresh"),
            ("ATELIER_LOGIN_PATH", "/signin"),
            ("ATELIER_TIMEOUT_SECS", " 30 "),
        ]))
        .unwrap();

        assert_eq!(config.refresh_path(), "/auth/refresh");
        assert_eq!(config.login_path(), "/signin");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup_from(&[
            ("ATELIER_BACKEND_URL", "http://localhost:5000"),
            ("ATELIER_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("ATELIER_TIMEOUT_SECS")));
    }
}
