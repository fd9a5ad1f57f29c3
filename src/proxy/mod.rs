//! Image proxy for the web front end.
//!
//! Remote images (profile pictures, artwork) are fetched server-side and
//! streamed back with long-lived cache headers, so the browser never makes a
//! cross-origin request for them.
//!
//! ```rust,ignore
//! use atelier_client::proxy::{ProxyConfig, proxy_routes};
//!
//! let config = ProxyConfig::from_env()?;
//! let app = axum::Router::new().merge(proxy_routes(config));
//! ```

mod config;
mod error;
mod routes;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use routes::{CACHE_CONTROL_VALUE, PROXY_PATH, proxy_routes};
