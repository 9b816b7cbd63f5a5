use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiResult, RequestBody, RequestOptions};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Partial profile update; unset fields are left alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.bio.is_none() && self.role.is_none()
    }
}

/// Profile endpoints
pub struct Profiles<'a> {
    client: &'a ApiClient,
}

impl<'a> Profiles<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> ApiResult<Profile> {
        self.client
            .get("profile/", RequestOptions::new())
            .await?
            .json()
    }

    pub async fn update(&self, update: &ProfileUpdate) -> ApiResult<Profile> {
        self.client
            .patch("profile/", RequestBody::json(update)?, RequestOptions::new())
            .await?
            .json()
    }
}
