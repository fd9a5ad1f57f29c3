use std::sync::{Arc, PoisonError, RwLock};

use crate::types::{AccessToken, SessionUser};

/// In-memory pairing of the access token and the decoded user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<AccessToken>,
    pub user: Option<SessionUser>,
}

impl Session {
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Shared handle to the current session.
///
/// Cloning is cheap; every clone sees the same session. Pass one handle to
/// every client that needs it instead of reaching for a global.
#[derive(Debug, Clone, Default)]
pub struct AuthStore {
    inner: Arc<RwLock<Session>>,
}

impl AuthStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace token and user together. No validation is performed.
    pub fn set_auth(&self, access_token: AccessToken, user: Option<SessionUser>) {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *session = Session {
            access_token: Some(access_token),
            user,
        };
    }

    /// Reset to the signed-out state. Idempotent.
    pub fn clear_auth(&self) {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *session = Session::default();
    }

    /// Synchronous copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<AccessToken> {
        self.snapshot().access_token
    }

    #[must_use]
    pub fn user(&self) -> Option<SessionUser> {
        self.snapshot().user
    }
}
