//! Campaign performance analytics

use serde::{Deserialize, Serialize};

use super::ResourceId;
use crate::client::{ApiClient, ApiResult, RequestOptions};

/// Campaign performance summary with parallel per-day series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSummary {
    pub campaign_name: String,
    pub platform: String,
    pub days_active: u32,
    pub ad_count: u32,
    pub image_count: u32,

    pub total_impressions: f64,
    pub total_clicks: f64,
    pub total_conversions: f64,
    pub total_spend: f64,

    pub avg_ctr: f64,
    pub avg_cpc: f64,
    pub conversion_rate: f64,
    pub cost_per_conversion: f64,
    pub roas: f64,
    pub performance_score: f64,

    pub dates: Vec<String>,
    pub impressions: Vec<f64>,
    pub clicks: Vec<f64>,
    pub conversions: Vec<f64>,
    pub spend: Vec<f64>,
    pub ctr: Vec<f64>,
}

/// One day of the series, as plotted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub impressions: Option<f64>,
    pub clicks: Option<f64>,
    pub conversions: Option<f64>,
    pub spend: Option<f64>,
    pub ctr: Option<f64>,
}

impl AnalyticsSummary {
    /// Rows keyed by `dates`; a series shorter than `dates` yields `None`
    pub fn daily_series(&self) -> Vec<DailyPoint> {
        self.dates
            .iter()
            .enumerate()
            .map(|(i, date)| DailyPoint {
                date: date.clone(),
                impressions: self.impressions.get(i).copied(),
                clicks: self.clicks.get(i).copied(),
                conversions: self.conversions.get(i).copied(),
                spend: self.spend.get(i).copied(),
                ctr: self.ctr.get(i).copied(),
            })
            .collect()
    }
}

/// Analytics endpoints
pub struct Analytics<'a> {
    client: &'a ApiClient,
}

impl<'a> Analytics<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn summary(&self, campaign: &ResourceId) -> ApiResult<AnalyticsSummary> {
        self.client
            .get(
                "analytics/summary/",
                RequestOptions::new().query("campaign_id", campaign),
            )
            .await?
            .json()
    }
}
