//! Dashboard totals and ad-platform campaign sync

use serde::{Deserialize, Serialize};

use super::lenient_f64;
use crate::client::{ApiClient, ApiResult, RequestBody, RequestOptions};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_campaigns: u64,
    pub active_campaigns: u64,
    pub total_ads: u64,
    pub total_images: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_budget: Option<f64>,
}

/// Outcome of pulling campaigns from every connected ad platform
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncReport {
    pub success: bool,
    pub summary: Option<SyncSummary>,
    pub results: Vec<PlatformSyncResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSummary {
    pub successful: u32,
    pub total_platforms: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSyncResult {
    pub platform: String,
    pub api_key_name: String,
    pub success: bool,
    pub synced_campaigns: Option<u32>,
    pub error: Option<String>,
}

impl SyncReport {
    pub fn failures(&self) -> impl Iterator<Item = &PlatformSyncResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// Dashboard endpoints
pub struct Dashboard<'a> {
    client: &'a ApiClient,
}

impl<'a> Dashboard<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> ApiResult<DashboardStats> {
        self.client
            .get("dashboard/stats/", RequestOptions::new())
            .await?
            .json()
    }

    pub async fn sync_campaigns(&self) -> ApiResult<SyncReport> {
        let report: SyncReport = self
            .client
            .post("sync/campaigns/", RequestBody::Empty, RequestOptions::new())
            .await?
            .json()?;

        if let Some(summary) = &report.summary {
            tracing::info!(
                successful = summary.successful,
                total = summary.total_platforms,
                "Campaign sync finished"
            );
        }
        Ok(report)
    }
}
