//! Audience demographics and engagement insights

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient_f64, ResourceId};
use crate::client::{ApiClient, ApiResult, RequestOptions};

/// Breakdowns are passed through as JSON since their shape varies by
/// data source (estimated vs. synced platform data).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AudienceInsights {
    pub total_reach: u64,
    pub engaged_users: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub engagement_rate: Option<f64>,
    pub engagement_change: Option<String>,
    pub engagement_trend: Option<String>,
    pub age_groups: Vec<Value>,
    pub gender: Vec<Value>,
    pub interests: Vec<Value>,
    pub top_locations: Vec<Value>,
    pub best_times: Vec<Value>,
    pub recommendations: Vec<Value>,
    pub data_note: Option<String>,
}

impl AudienceInsights {
    pub fn is_increasing(&self) -> bool {
        self.engagement_trend.as_deref() == Some("Increasing")
    }
}

/// Audience endpoints
pub struct Audience<'a> {
    client: &'a ApiClient,
}

impl<'a> Audience<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn insights(&self, campaign: &ResourceId) -> ApiResult<AudienceInsights> {
        self.client
            .get(
                "audience/insights/",
                RequestOptions::new().query("campaign_id", campaign),
            )
            .await?
            .json()
    }
}
