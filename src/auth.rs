use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::fetch::{self, ApiClient, RequestOptions};
use crate::token;
use crate::types::{AccessToken, RefreshToken, SessionUser, UserId};

/// Registration payload for `POST /users/register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub password: String,
    pub pfp_url: String,
}

impl NewUser {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        age: u32,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
            password: password.into(),
            pfp_url: String::new(),
        }
    }

    #[must_use]
    pub fn with_pfp_url(mut self, url: impl Into<String>) -> Self {
        self.pfp_url = url.into();
        self
    }
}

/// Profile update for `PUT /users/{id}`. The id goes in the path, not the body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct UpdateUser {
    #[serde(skip)]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub pfp_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UpdateUser {
    /// Start an update from the user's current profile.
    #[must_use]
    pub fn from_user(user: &SessionUser) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
            pfp_url: user.pfp_url.clone().unwrap_or_default(),
            password: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    #[must_use]
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    #[must_use]
    pub fn with_pfp_url(mut self, url: impl Into<String>) -> Self {
        self.pfp_url = url.into();
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Body returned by login and registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct AuthResponse {
    pub token: AccessToken,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of a successful profile update.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct UpdateOutcome {
    pub user: SessionUser,
    pub message: String,
}

#[derive(Deserialize)]
struct UpdateResponse {
    #[serde(default)]
    token: Option<AccessToken>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    user: Option<SessionUser>,
    #[serde(flatten)]
    rest: serde_json::Value,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Login, registration and profile management for the signed-in user.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] if the backend rejects the credentials,
    /// [`Error::Storage`] if the refresh token cannot be persisted, or
    /// [`Error::Http`] on network failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, Error> {
        let options = RequestOptions::post().with_json(&Credentials { email, password })?;
        let response = self.client.fetch_public("/users/login", options).await?;
        let body: AuthResponse = fetch::read_json(response, "login").await?;
        self.start_session(&body)?;
        tracing::info!("Login successful");
        Ok(body)
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Same as [`login`](Self::login).
    pub async fn register(&self, user: &NewUser) -> Result<AuthResponse, Error> {
        let options = RequestOptions::post().with_json(user)?;
        let response = self.client.fetch_public("/users/register", options).await?;
        let body: AuthResponse = fetch::read_json(response, "registration").await?;
        self.start_session(&body)?;
        tracing::info!("Registration successful");
        Ok(body)
    }

    /// Forget the session and the durable refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the refresh token could not be removed;
    /// the in-memory session is cleared regardless.
    pub fn logout(&self) -> Result<(), Error> {
        self.client.store().clear_auth();
        self.client.storage().remove()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn profile(&self) -> Option<SessionUser> {
        self.client.store().user()
    }

    /// Update the signed-in user's profile.
    ///
    /// A new token in the response re-seeds the session from its claims;
    /// otherwise the user is read from the body and the current token kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-OK response, [`Error::Json`] if the
    /// body carries no recognizable user, or any error from
    /// [`ApiClient::fetch`].
    pub async fn update_user(&self, update: &UpdateUser) -> Result<UpdateOutcome, Error> {
        let path = format!("/users/{}", urlencoding::encode(update.id.as_str()));
        let options = RequestOptions::put().with_json(update)?;
        let response = self.client.fetch(&path, options).await?;
        let body: UpdateResponse = fetch::read_json(response, "profile update").await?;

        let message = body
            .message
            .unwrap_or_else(|| "Profile updated successfully".to_owned());

        if let Some(token) = body.token {
            if let Some(user) = token::decode_user(token.as_str()) {
                self.client.store().set_auth(token, Some(user.clone()));
                return Ok(UpdateOutcome { user, message });
            }
        }

        let user = match body.user {
            Some(user) => user,
            None => serde_json::from_value::<SessionUser>(body.rest)?,
        };
        let store = self.client.store();
        match store.access_token() {
            Some(token) => store.set_auth(token, Some(user.clone())),
            None => tracing::debug!("Profile updated without an active access token"),
        }
        Ok(UpdateOutcome { user, message })
    }

    /// Seed the session from a login or registration response. A token whose
    /// payload carries no user still starts a session, just without a user.
    fn start_session(&self, body: &AuthResponse) -> Result<(), Error> {
        let user = token::decode_user(body.token.as_str());
        self.client.store().set_auth(body.token.clone(), user);
        if let Some(refresh_token) = &body.refresh_token {
            self.client.storage().store(refresh_token)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_user_body_omits_id_and_empty_password() {
        let user = SessionUser {
            id: UserId::from("u1"),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            age: 36,
            pfp_url: Some("p.png".into()),
        };
        let update = UpdateUser::from_user(&user).with_name("Ada L.");
        let json = serde_json::to_value(&update).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "Ada L.",
                "email": "ada@example.com",
                "age": 36,
                "pfpUrl": "p.png",
            })
        );
    }

    #[test]
    fn test_update_user_password_serialized_when_set() {
        let user = SessionUser {
            id: UserId::from("u1"),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            age: 36,
            pfp_url: None,
        };
        let json = serde_json::to_value(UpdateUser::from_user(&user).with_password("pw")).unwrap();
        assert_eq!(json["password"], "pw");
        assert_eq!(json["pfpUrl"], "");
    }

    #[test]
    fn test_new_user_camel_case() {
        let json =
            serde_json::to_value(NewUser::new("Ada", "a@b.c", 36, "pw").with_pfp_url("p.png"))
                .unwrap();
        assert_eq!(json["pfpUrl"], "p.png");
        assert_eq!(json["age"], 36);
    }

    #[test]
    fn test_update_response_nested_or_top_level_user() {
        let nested: UpdateResponse = serde_json::from_str(
            r#"{"user":{"id":"u1","name":"A","email":"e","age":"3"}}"#,
        )
        .unwrap();
        assert_eq!(nested.user.unwrap().age, 3);

        let flat: UpdateResponse =
            serde_json::from_str(r#"{"id":"u1","name":"A","email":"e","age":3,"pfp_url":"x"}"#)
                .unwrap();
        assert!(flat.user.is_none());
        let user: SessionUser = serde_json::from_value(flat.rest).unwrap();
        assert_eq!(user.pfp_url.as_deref(), Some("x"));
    }
}
