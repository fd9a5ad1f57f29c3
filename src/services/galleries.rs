use serde::Deserialize;

use crate::error::Error;
use crate::fetch::{ApiClient, RequestOptions, read_json};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Gallery {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub max_arts: u32,
    #[serde(default)]
    pub model_url: String,
}

/// `/galleries` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct GalleriesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> GalleriesApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Gallery>, Error> {
        let response = self.client.fetch("/galleries", RequestOptions::get()).await?;
        read_json(response, "list galleries").await
    }
}
