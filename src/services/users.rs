use serde::Deserialize;

use super::segment;
use crate::error::Error;
use crate::fetch::{ApiClient, RequestOptions, read_json};
use crate::types::UserId;

/// Public profile of any user, as shown next to their posts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "pfp_url")]
    pub pfp_url: Option<String>,
}

/// `/users/{id}` lookups.
#[derive(Debug, Clone, Copy)]
pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self, user_id: &UserId) -> Result<UserProfile, Error> {
        let path = format!("/users/{}", segment(user_id.as_str()));
        let response = self.client.fetch(&path, RequestOptions::get()).await?;
        read_json(response, "load user profile").await
    }
}
