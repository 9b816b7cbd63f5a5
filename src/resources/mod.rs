//! Typed Backend Resources
//!
//! One thin wrapper per resource family of the AdVision REST API. Each
//! wrapper borrows the [`ApiClient`] and goes through its session handling.
//!
//! ```rust,no_run
//! use advision::{ApiClient, ClientConfig, MemoryTokenStore};
//! use std::sync::Arc;
//!
//! # async fn run() -> advision::ApiResult<()> {
//! let client = ApiClient::new(ClientConfig::default(), Arc::new(MemoryTokenStore::new()))?;
//! client.auth().login("me@example.com", "hunter22").await?;
//!
//! for campaign in client.campaigns().list().await? {
//!     println!("{} ({})", campaign.title, campaign.platform);
//! }
//! # Ok(())
//! # }
//! ```

mod analytics;
mod api_keys;
mod audience;
mod auth;
mod campaigns;
mod content;
mod dashboard;
mod images;
mod profile;
mod reports;

pub use ab_tests::{
    AbTest, AbTestAnalysis, AbTests, AnalysisVerdict, NewAbTest, Variation, VariationInput,
};
pub use analytics::{Analytics, AnalyticsSummary, DailyPoint};
pub use api_keys::{AdPlatform, ApiKey, ApiKeys, NewApiKey, ToggleResult, VerificationResult};
pub use audience::{Audience, AudienceInsights};
pub use auth::{
    google_authorization_url, validate_registration, Auth, RegistrationOutcome, TokenResponse,
};
pub use campaigns::{Campaign, CampaignInput, Campaigns, Comment, CommentAuthor};
pub use content::{AdContent, Content, TextGenerationRequest, TextGenerationResult};
pub use dashboard::{Dashboard, DashboardStats, PlatformSyncResult, SyncReport, SyncSummary};
pub use images::{GeneratedImage, ImageAsset, ImageGenerationRequest, Images, SaveImageRequest};
pub use profile::{Profile, ProfileUpdate, Profiles};
pub use reports::{
    PdfReport, Recommendation, ReportInsights, ReportSummary, Reports, WeeklyReport,
};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::client::{ApiClient, ApiError, ApiResult};

/// Backend primary key; integers and strings are both accepted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{}", id),
            ResourceId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        id.parse().unwrap_or_else(|_| ResourceId::Text(id.to_string()))
    }
}

impl FromStr for ResourceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(id) => ResourceId::Int(id),
            Err(_) => ResourceId::Text(s.trim().to_string()),
        })
    }
}

impl ResourceId {
    /// Percent-encoded form for use inside a URL path
    pub(crate) fn segment(&self) -> String {
        urlencoding::encode(&self.to_string()).into_owned()
    }
}

impl ApiClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn profile(&self) -> Profiles<'_> {
        Profiles::new(self)
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(self)
    }

    pub fn campaigns(&self) -> Campaigns<'_> {
        Campaigns::new(self)
    }

    pub fn content(&self) -> Content<'_> {
        Content::new(self)
    }

    pub fn images(&self) -> Images<'_> {
        Images::new(self)
    }

    pub fn analytics(&self) -> Analytics<'_> {
        Analytics::new(self)
    }

    pub fn audience(&self) -> Audience<'_> {
        Audience::new(self)
    }

    pub fn ab_tests(&self) -> AbTests<'_> {
        AbTests::new(self)
    }

    pub fn api_keys(&self) -> ApiKeys<'_> {
        ApiKeys::new(self)
    }

    pub fn reports(&self) -> Reports<'_> {
        Reports::new(self)
    }
}

/// Reject blank form input before it reaches the network
pub(crate) fn require(value: &str, message: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        Err(ApiError::InvalidInput(message.to_string()))
    } else {
        Ok(())
    }
}

/// Decimal fields arrive as strings (`"1500.00"`) or numbers
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Number>::deserialize(deserializer)? {
        Some(Number::Float(v)) => Some(v),
        Some(Number::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
