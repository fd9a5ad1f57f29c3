use serde::Deserialize;

use crate::error::Error;
use crate::fetch::{ApiClient, RequestOptions, read_json};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Notice {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

/// `/notices` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct NoticesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> NoticesApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Notice>, Error> {
        let response = self.client.fetch("/notices", RequestOptions::get()).await?;
        read_json(response, "list notices").await
    }
}
