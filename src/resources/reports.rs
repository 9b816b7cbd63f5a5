//! Weekly performance report and its PDF export

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::lenient_f64;
use crate::client::{ApiClient, ApiError, ApiResult, RequestBody, RequestOptions, ResponseType};

const PDF_CONTENT_TYPE: &str = "application/pdf";
const PDF_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyReport {
    /// Human-readable date range, e.g. `"Mar 03 - Mar 09, 2025"`
    pub period: Value,
    pub summary: ReportSummary,
    pub insights: ReportInsights,
    pub recommendations: Vec<Recommendation>,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSummary {
    pub campaigns_created: u64,
    pub ads_generated: u64,
    pub images_generated: u64,
    pub active_campaigns: u64,
    pub total_engagement: u64,
    /// Signed percentage string such as `"+8.5%"`
    pub engagement_growth: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportInsights {
    pub top_performing_platform: Option<String>,
    pub top_campaign_name: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub top_campaign_score: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub avg_ctr: Option<f64>,
    pub total_impressions: u64,
    pub impression_growth: Option<String>,
    pub total_conversions: u64,
    pub conversion_growth: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub roas: Option<f64>,
}

impl ReportInsights {
    /// The backend reports `"N/A"` when no campaign qualifies
    pub fn top_campaign(&self) -> Option<&str> {
        self.top_campaign_name
            .as_deref()
            .filter(|name| !name.is_empty() && *name != "N/A")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendation {
    pub priority: String,
    pub category: Option<String>,
    pub title: String,
    pub description: String,
    pub impact: Option<String>,
    pub metric: Option<String>,
    pub current: Option<Value>,
    pub target: Option<Value>,
}

impl WeeklyReport {
    pub fn period_label(&self) -> String {
        match &self.period {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Exported report ready to be written to disk
#[derive(Debug, Clone)]
pub struct PdfReport {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl PdfReport {
    pub fn filename_for(date: NaiveDate) -> String {
        format!("advision_weekly_report_{}.pdf", date.format("%Y-%m-%d"))
    }
}

/// Report endpoints
pub struct Reports<'a> {
    client: &'a ApiClient,
}

impl<'a> Reports<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn weekly(&self) -> ApiResult<WeeklyReport> {
        self.client
            .get("reports/weekly/", RequestOptions::new())
            .await?
            .json()
    }

    /// Render the weekly report server-side. Generation is slow, so this
    /// uses a longer timeout than ordinary calls.
    pub async fn export_pdf(&self) -> ApiResult<PdfReport> {
        let options = RequestOptions::new()
            .response_type(ResponseType::Blob)
            .header("Accept", PDF_CONTENT_TYPE)
            .timeout(PDF_TIMEOUT);

        let response = self
            .client
            .post("reports/weekly/pdf/", RequestBody::Json(json!({})), options)
            .await?;

        let is_pdf = response
            .content_type()
            .map(|ct| ct.trim().to_ascii_lowercase().starts_with(PDF_CONTENT_TYPE))
            .unwrap_or(false);
        if !is_pdf {
            return Err(ApiError::Decode(format!(
                "expected a PDF but received {}",
                response.content_type().unwrap_or("no content type")
            )));
        }
        if response.is_empty() {
            return Err(ApiError::Decode("generated PDF is empty".to_string()));
        }

        let bytes = response.into_bytes();
        tracing::info!(size = bytes.len(), "Weekly report PDF generated");

        Ok(PdfReport {
            bytes,
            filename: PdfReport::filename_for(Utc::now().date_naive()),
        })
    }
}
