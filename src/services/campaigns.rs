use serde::{Deserialize, Serialize};

use super::{Owned, current_user_id, segment, with_query};
use crate::error::Error;
use crate::fetch::{ApiClient, RequestOptions, ensure_success, read_json};
use crate::types::UserId;

/// New fundraising campaign. `stripe_account_id` is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDraft {
    pub title: String,
    pub reason: String,
    pub image_url: String,
    pub stripe_account_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Campaign {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub required_amount: f64,
    #[serde(default)]
    pub funded_amount: f64,
    #[serde(default)]
    pub stripe_account_id: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl Campaign {
    /// Share of the target raised so far, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.required_amount <= 0.0 {
            return 0.0;
        }
        (self.funded_amount / self.required_amount).clamp(0.0, 1.0)
    }
}

/// `/campaigns` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct CampaignsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CampaignsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, draft: &CampaignDraft) -> Result<Campaign, Error> {
        let user_id = current_user_id(self.client)?;
        let options = RequestOptions::post().with_json(&Owned {
            body: draft,
            user_id: &user_id,
        })?;
        let response = self.client.fetch("/campaigns", options).await?;
        read_json(response, "create campaign").await
    }

    /// Campaigns owned by the signed-in user.
    pub async fn list_mine(&self) -> Result<Vec<Campaign>, Error> {
        let user_id = current_user_id(self.client)?;
        let path = format!("/campaigns/user/{}", segment(user_id.as_str()));
        let response = self.client.fetch(&path, RequestOptions::get()).await?;
        read_json(response, "list campaigns").await
    }

    pub async fn delete(&self, campaign_id: &str) -> Result<(), Error> {
        let user_id = current_user_id(self.client)?;
        let path = with_query(
            &format!("/campaigns/{}", segment(campaign_id)),
            [("userId", user_id.as_str())],
        );
        let response = self.client.fetch(&path, RequestOptions::delete()).await?;
        ensure_success(response, "delete campaign").await?;
        Ok(())
    }
}
