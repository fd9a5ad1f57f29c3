//! Typed wrappers for the backend's resource endpoints.
//!
//! Every call goes through [`ApiClient::fetch`], so an expired access token
//! is recovered transparently. A non-OK response becomes [`Error::Api`].
//! Calls that act on behalf of the signed-in user read their id from the
//! session and fail with [`Error::Unauthenticated`] when there is none.

mod advertisements;
mod campaigns;
mod exhibitions;
mod galleries;
mod notices;
mod posts;
mod users;

use serde::Serialize;

use crate::error::Error;
use crate::fetch::ApiClient;
use crate::types::UserId;

pub use advertisements::{AdDraft, AdFilters, AdSortBy, Advertisement, AdvertisementsApi, SortOrder};
pub use campaigns::{Campaign, CampaignDraft, CampaignsApi};
pub use exhibitions::{ExhibitionCard, ExhibitionGallery, ExhibitionsApi};
pub use galleries::{GalleriesApi, Gallery};
pub use notices::{Notice, NoticesApi};
pub use posts::{Post, PostDraft, PostsApi};
pub use users::{UserProfile, UsersApi};

impl ApiClient {
    #[must_use]
    pub fn advertisements(&self) -> AdvertisementsApi<'_> {
        AdvertisementsApi::new(self)
    }

    #[must_use]
    pub fn campaigns(&self) -> CampaignsApi<'_> {
        CampaignsApi::new(self)
    }

    #[must_use]
    pub fn exhibitions(&self) -> ExhibitionsApi<'_> {
        ExhibitionsApi::new(self)
    }

    #[must_use]
    pub fn galleries(&self) -> GalleriesApi<'_> {
        GalleriesApi::new(self)
    }

    #[must_use]
    pub fn notices(&self) -> NoticesApi<'_> {
        NoticesApi::new(self)
    }

    #[must_use]
    pub fn posts(&self) -> PostsApi<'_> {
        PostsApi::new(self)
    }

    #[must_use]
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }
}

/// Request body `T` with the owner's `userId` merged in.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Owned<'a, T: Serialize> {
    #[serde(flatten)]
    body: &'a T,
    user_id: &'a UserId,
}

fn current_user_id(client: &ApiClient) -> Result<UserId, Error> {
    client
        .store()
        .user()
        .map(|user| user.id)
        .ok_or(Error::Unauthenticated)
}

/// `path` followed by the form-encoded `pairs`, or `path` alone if there are none.
fn with_query<'a>(path: &str, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs {
        serializer.append_pair(key, value);
        any = true;
    }
    if any {
        format!("{path}?{}", serializer.finish())
    } else {
        path.to_owned()
    }
}

fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}
