use serde::Deserialize;
use serde_json::{Map, Value};

use super::{current_user_id, with_query};
use crate::error::Error;
use crate::fetch::{ApiClient, RequestOptions, read_json};
use crate::types::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ExhibitionGallery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
}

/// Exhibition as listed on the cards page, joined with its gallery.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ExhibitionCard {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub gallery: Option<ExhibitionGallery>,
}

/// `/exhibitions` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ExhibitionsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ExhibitionsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Submit the exhibition form. The form is free-form; `userId` is set
    /// from the session and overrides any value already present.
    pub async fn submit(&self, mut form: Map<String, Value>) -> Result<Value, Error> {
        let user_id = current_user_id(self.client)?;
        form.insert("userId".into(), Value::String(user_id.into()));
        let options = RequestOptions::post().with_json(&form)?;
        let response = self.client.fetch("/exhibitions", options).await?;
        read_json(response, "submit exhibition").await
    }

    pub async fn cards(&self) -> Result<Vec<ExhibitionCard>, Error> {
        let response = self
            .client
            .fetch("/exhibitions/cards", RequestOptions::get())
            .await?;
        read_json(response, "list exhibitions").await
    }

    pub async fn details(&self, exhibition_id: &str) -> Result<Value, Error> {
        let path = with_query("/exhibitions/details", [("exhibitionId", exhibition_id)]);
        let response = self.client.fetch(&path, RequestOptions::get()).await?;
        read_json(response, "load exhibition").await
    }
}
