use crate::error::Error;
use crate::fetch::ApiClient;

/// Where a protected route stands after its mount-time check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Check not run yet; render a placeholder.
    Loading,
    /// Render the protected content.
    Authorized,
    /// The user was sent elsewhere; render nothing further.
    Redirecting { to: String },
}

/// Mount-time gate in front of protected routes.
///
/// The check runs once. Token expiry later in the session is handled per
/// request by [`ApiClient::fetch`], not here.
#[derive(Debug)]
pub struct AuthChecker {
    client: ApiClient,
    state: GateState,
}

impl AuthChecker {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: GateState::Loading,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Run the check for `path` and settle the gate.
    ///
    /// The login route is always authorized. Elsewhere a durable refresh
    /// token is required and must survive one refresh; otherwise the session
    /// is cleared, the token removed and the user sent to the login route. Once settled,
    /// further calls return the settled state without doing any work.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the durable token cannot be read.
    pub async fn mount(&mut self, path: &str) -> Result<&GateState, Error> {
        if self.state != GateState::Loading {
            return Ok(&self.state);
        }

        let login_path = self.client.config().login_path().to_owned();
        if path == login_path {
            self.state = GateState::Authorized;
            return Ok(&self.state);
        }

        if self.client.storage().load()?.is_none() {
            tracing::debug!(path, "No refresh token, redirecting to login");
            return Ok(self.redirect(login_path));
        }

        match self.client.refresh_session().await {
            Ok(_) => {
                self.state = GateState::Authorized;
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "Session could not be restored");
                self.client.store().clear_auth();
                if let Err(e) = self.client.storage().remove() {
                    tracing::warn!(error = %e, "Failed to remove refresh token");
                }
                self.redirect(login_path);
            }
        }
        Ok(&self.state)
    }

    fn redirect(&mut self, to: String) -> &GateState {
        self.client.navigator().navigate(&to);
        self.state = GateState::Redirecting { to };
        &self.state
    }
}
