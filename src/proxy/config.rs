use url::Url;

use crate::error::Error;

const DEFAULT_PORT: u16 = 3000;

/// Image proxy configuration.
///
/// Use [`from_env()`](ProxyConfig::from_env) for convention-based setup,
/// or [`new()`](ProxyConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ProxyConfig {
    pub(super) port: u16,
    pub(super) allowed_hosts: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyConfig {
    /// Listen on port 3000 and proxy any host.
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_hosts: Vec::new(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `PORT`: Listen port (default 3000)
    /// - `ATELIER_PROXY_ALLOWED_HOSTS`: Comma-separated image hosts; unset or empty allows any host
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::new();

        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("PORT: {e}")))?;
            config = config.with_port(port);
        }
        if let Some(hosts) = lookup("ATELIER_PROXY_ALLOWED_HOSTS") {
            config = config.with_allowed_hosts(
                hosts
                    .split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(str::to_owned)
                    .collect(),
            );
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Restrict proxying to these hosts (exact, case-insensitive match). Empty allows any host.
    #[must_use]
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts
            .into_iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();
        self
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    pub(super) fn allows(&self, url: &Url) -> bool {
        if self.allowed_hosts.is_empty() {
            return true;
        }
        url.host_str().is_some_and(|host| {
            let host = host.to_ascii_lowercase();
            self.allowed_hosts.iter().any(|allowed| *allowed == host)
        })
    }
}
