use derive_more::{Display, From, Into};
use serde::{Deserialize, Deserializer, Serialize};

/// Backend user identifier (opaque string, Mongo `_id` format in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Short-lived bearer credential.
///
/// `Debug` is redacted so the value never lands in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Long-lived credential used to mint new access tokens.
///
/// The only credential that survives a restart; see
/// [`TokenStorage`](crate::storage::TokenStorage).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl RefreshToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RefreshToken(..)")
    }
}

/// Display identity of the signed-in user.
///
/// Decoded from the access token payload or read from a profile response.
/// The backend is inconsistent about `age` (number or numeric string) and
/// the profile image key (`pfpUrl` or `pfp_url`); both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: u32,
    #[serde(default, alias = "pfp_url")]
    pub pfp_url: Option<String>,
}

fn lenient_age<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Age {
        Number(u32),
        Text(String),
        Null(()),
    }

    match Age::deserialize(deserializer)? {
        Age::Number(n) => Ok(n),
        Age::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Age::Null(()) => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_user_accepts_numeric_string_age() {
        let user: SessionUser = serde_json::from_str(
            r#"{"id":"u1","name":"Ada","email":"ada@example.com","age":"31","pfpUrl":"p.png"}"#,
        )
        .unwrap();
        assert_eq!(user.age, 31);
        assert_eq!(user.pfp_url.as_deref(), Some("p.png"));
    }

    #[test]
    fn test_session_user_accepts_snake_case_pfp() {
        let user: SessionUser = serde_json::from_str(
            r#"{"id":"u1","name":"Ada","email":"ada@example.com","age":31,"pfp_url":"p.png"}"#,
        )
        .unwrap();
        assert_eq!(user.pfp_url.as_deref(), Some("p.png"));
    }

    #[test]
    fn test_session_user_rejects_non_numeric_age() {
        let result = serde_json::from_str::<SessionUser>(
            r#"{"id":"u1","name":"Ada","email":"ada@example.com","age":"old"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_tokens_do_not_leak_through_debug() {
        let access = AccessToken::new("secret-access");
        let refresh = RefreshToken::new("secret-refresh");
        assert!(!format!("{access:?}").contains("secret"));
        assert!(!format!("{refresh:?}").contains("secret"));
    }

    #[test]
    fn test_user_id_from_string() {
        let id = UserId::from("user-123".to_string());
        assert_eq!(id.to_string(), "user-123");
    }
}
