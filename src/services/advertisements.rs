use serde::{Deserialize, Serialize};

use super::{Owned, current_user_id, segment, with_query};
use crate::error::Error;
use crate::fetch::{ApiClient, RequestOptions, ensure_success, read_json};
use crate::types::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdSortBy {
    Time,
    Name,
}

impl AdSortBy {
    fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Listing filters. Only the fields that are set reach the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdFilters {
    pub search: Option<String>,
    pub sort_by: Option<AdSortBy>,
    pub order: Option<SortOrder>,
    pub sort_user: Option<String>,
}

impl AdFilters {
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    #[must_use]
    pub fn sort_by(mut self, sort_by: AdSortBy, order: SortOrder) -> Self {
        self.sort_by = Some(sort_by);
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn sort_user(mut self, user: impl Into<String>) -> Self {
        self.sort_user = Some(user.into());
        self
    }

    fn apply(&self, path: &str) -> String {
        let pairs = [
            ("search", self.search.as_deref().filter(|s| !s.is_empty())),
            ("sortBy", self.sort_by.map(AdSortBy::as_str)),
            ("order", self.order.map(SortOrder::as_str)),
            ("sortUser", self.sort_user.as_deref().filter(|s| !s.is_empty())),
        ];
        with_query(
            path,
            pairs
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        )
    }
}

/// Fields the owner edits when creating or updating an advertisement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image_url: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Advertisement {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: serde_json::Value,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `/advertisements` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AdvertisementsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdvertisementsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, draft: &AdDraft) -> Result<Advertisement, Error> {
        let user_id = current_user_id(self.client)?;
        let options = RequestOptions::post().with_json(&Owned {
            body: draft,
            user_id: &user_id,
        })?;
        let response = self.client.fetch("/advertisements", options).await?;
        read_json(response, "create advertisement").await
    }

    pub async fn list(&self, filters: &AdFilters) -> Result<Vec<Advertisement>, Error> {
        let path = filters.apply("/advertisements");
        let response = self.client.fetch(&path, RequestOptions::get()).await?;
        read_json(response, "list advertisements").await
    }

    pub async fn list_for_user(
        &self,
        user_id: &UserId,
        filters: &AdFilters,
    ) -> Result<Vec<Advertisement>, Error> {
        let path = filters.apply(&format!("/advertisements/user/{}", segment(user_id.as_str())));
        let response = self.client.fetch(&path, RequestOptions::get()).await?;
        read_json(response, "list user advertisements").await
    }

    pub async fn update(&self, id: &str, draft: &AdDraft) -> Result<Advertisement, Error> {
        let user_id = current_user_id(self.client)?;
        let options = RequestOptions::put().with_json(&Owned {
            body: draft,
            user_id: &user_id,
        })?;
        let path = format!("/advertisements/{}", segment(id));
        let response = self.client.fetch(&path, options).await?;
        read_json(response, "update advertisement").await
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let path = format!("/advertisements/{}", segment(id));
        let response = self.client.fetch(&path, RequestOptions::delete()).await?;
        ensure_success(response, "delete advertisement").await?;
        Ok(())
    }
}
