use serde::{Deserialize, Serialize};

use super::{Owned, current_user_id, segment, with_query};
use crate::error::Error;
use crate::fetch::{ApiClient, RequestOptions, ensure_success, read_json};
use crate::types::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub name: String,
    pub description: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Post {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

/// `/posts` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct PostsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PostsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, draft: &PostDraft) -> Result<Post, Error> {
        let user_id = current_user_id(self.client)?;
        let options = RequestOptions::post().with_json(&Owned {
            body: draft,
            user_id: &user_id,
        })?;
        let response = self.client.fetch("/posts/create", options).await?;
        read_json(response, "create post").await
    }

    /// Posts authored by the signed-in user.
    pub async fn list_mine(&self) -> Result<Vec<Post>, Error> {
        let user_id = current_user_id(self.client)?;
        let path = with_query("/posts", [("userId", user_id.as_str())]);
        let response = self.client.fetch(&path, RequestOptions::get()).await?;
        read_json(response, "list posts").await
    }

    /// Feed assembled for the signed-in user.
    pub async fn feed(&self) -> Result<Vec<Post>, Error> {
        let user_id = current_user_id(self.client)?;
        let path = with_query("/posts/feed", [("userId", user_id.as_str())]);
        let response = self.client.fetch(&path, RequestOptions::get()).await?;
        read_json(response, "load feed").await
    }

    pub async fn update(&self, post_id: &str, draft: &PostDraft) -> Result<Post, Error> {
        let user_id = current_user_id(self.client)?;
        let options = RequestOptions::put().with_json(&Owned {
            body: draft,
            user_id: &user_id,
        })?;
        let path = format!("/posts/{}", segment(post_id));
        let response = self.client.fetch(&path, options).await?;
        read_json(response, "update post").await
    }

    pub async fn delete(&self, post_id: &str) -> Result<(), Error> {
        let path = format!("/posts/{}", segment(post_id));
        let response = self.client.fetch(&path, RequestOptions::delete()).await?;
        ensure_success(response, "delete post").await?;
        Ok(())
    }
}
