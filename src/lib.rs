#![doc = include_str!("../README.md")]

#[cfg(feature = "client")]
pub mod auth;
pub mod config;
pub mod error;
#[cfg(feature = "client")]
pub mod fetch;
#[cfg(feature = "client")]
pub mod guard;
pub mod navigator;
#[cfg(feature = "proxy")]
pub mod proxy;
#[cfg(feature = "client")]
pub mod services;
pub mod storage;
pub mod store;
pub mod token;
pub mod types;

// Re-exports for convenient access
#[cfg(feature = "client")]
pub use auth::{AuthResponse, AuthService, NewUser, UpdateOutcome, UpdateUser};
pub use config::ClientConfig;
pub use error::Error;
#[cfg(feature = "client")]
pub use fetch::{ApiClient, RequestOptions};
#[cfg(feature = "client")]
pub use guard::{AuthChecker, GateState};
pub use navigator::{Navigator, RecordingNavigator, TracingNavigator};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use store::{AuthStore, Session};
pub use token::{UnverifiedClaims, decode_unverified, decode_user};
pub use types::{AccessToken, RefreshToken, SessionUser, UserId};
