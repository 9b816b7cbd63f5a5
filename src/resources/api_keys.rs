//! Credentials for third-party ad platforms

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{require, ResourceId};
use crate::client::{ApiClient, ApiResult, RequestBody, RequestOptions};

/// Ad platform a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdPlatform {
    GoogleAds,
    FacebookAds,
    InstagramAds,
    TiktokAds,
    LinkedinAds,
    #[serde(other)]
    Other,
}

impl AdPlatform {
    pub const ALL: [AdPlatform; 5] = [
        AdPlatform::GoogleAds,
        AdPlatform::FacebookAds,
        AdPlatform::InstagramAds,
        AdPlatform::TiktokAds,
        AdPlatform::LinkedinAds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdPlatform::GoogleAds => "google_ads",
            AdPlatform::FacebookAds => "facebook_ads",
            AdPlatform::InstagramAds => "instagram_ads",
            AdPlatform::TiktokAds => "tiktok_ads",
            AdPlatform::LinkedinAds => "linkedin_ads",
            AdPlatform::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AdPlatform::GoogleAds => "Google Ads",
            AdPlatform::FacebookAds => "Facebook Ads",
            AdPlatform::InstagramAds => "Instagram Ads",
            AdPlatform::TiktokAds => "TikTok Ads",
            AdPlatform::LinkedinAds => "LinkedIn Ads",
            AdPlatform::Other => "Other",
        }
    }
}

impl fmt::Display for AdPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AdPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "google_ads" | "google" => Ok(AdPlatform::GoogleAds),
            "facebook_ads" | "facebook" => Ok(AdPlatform::FacebookAds),
            "instagram_ads" | "instagram" => Ok(AdPlatform::InstagramAds),
            "tiktok_ads" | "tiktok" => Ok(AdPlatform::TiktokAds),
            "linkedin_ads" | "linkedin" => Ok(AdPlatform::LinkedinAds),
            "other" => Ok(AdPlatform::Other),
            other => Err(format!("unknown ad platform: {}", other)),
        }
    }
}

/// Stored key as listed by the backend. The secret itself is never returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: ResourceId,
    pub api_type: AdPlatform,
    pub api_name: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub verification_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Key submitted for storage
#[derive(Clone, Serialize)]
pub struct NewApiKey {
    pub api_type: AdPlatform,
    pub api_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub account_id: String,
    /// Only meaningful for Google Ads
    pub developer_token: String,
}

impl NewApiKey {
    pub fn new(api_type: AdPlatform, api_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_type,
            api_name: api_name.into(),
            api_key: api_key.into(),
            api_secret: String::new(),
            account_id: String::new(),
            developer_token: String::new(),
        }
    }
}

impl fmt::Debug for NewApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewApiKey")
            .field("api_type", &self.api_type)
            .field("api_name", &self.api_name)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    #[serde(default)]
    pub verification_status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl VerificationResult {
    pub fn is_verified(&self) -> bool {
        self.verification_status.as_deref() == Some("verified")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResult {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
struct ApiKeyList {
    #[serde(default)]
    api_keys: Vec<ApiKey>,
}

/// API key endpoints
pub struct ApiKeys<'a> {
    client: &'a ApiClient,
}

impl<'a> ApiKeys<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<ApiKey>> {
        let list: ApiKeyList = self
            .client
            .get("api-keys/", RequestOptions::new())
            .await?
            .json()?;
        Ok(list.api_keys)
    }

    pub async fn create(&self, key: &NewApiKey) -> ApiResult<()> {
        require(&key.api_name, "Please enter a name")?;
        require(&key.api_key, "Please enter an API key")?;
        self.client
            .post("api-keys/create/", RequestBody::json(key)?, RequestOptions::new())
            .await?;
        tracing::info!(platform = key.api_type.as_str(), "Stored API key");
        Ok(())
    }

    pub async fn delete(&self, id: &ResourceId) -> ApiResult<()> {
        self.client
            .delete(&format!("api-keys/{}/delete/", id.segment()), RequestOptions::new())
            .await?;
        Ok(())
    }

    /// Ask the backend to test the key against its platform
    pub async fn verify(&self, id: &ResourceId) -> ApiResult<VerificationResult> {
        self.client
            .post(
                &format!("api-keys/{}/verify/", id.segment()),
                RequestBody::Empty,
                RequestOptions::new(),
            )
            .await?
            .json()
    }

    pub async fn toggle(&self, id: &ResourceId) -> ApiResult<ToggleResult> {
        self.client
            .patch(
                &format!("api-keys/{}/toggle/", id.segment()),
                RequestBody::Empty,
                RequestOptions::new(),
            )
            .await?
            .json()
    }
}
