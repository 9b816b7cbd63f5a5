//! Ad copy library and AI text generation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require, ResourceId};
use crate::client::{ApiClient, ApiError, ApiResult, RequestBody, RequestOptions};

/// Saved piece of ad copy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdContent {
    pub id: ResourceId,
    #[serde(default)]
    pub campaign: Option<ResourceId>,
    pub text: String,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub clicks: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Ad copy generation parameters
#[derive(Debug, Clone, Serialize)]
pub struct TextGenerationRequest {
    pub prompt: String,
    pub tone: String,
    pub platform: String,
    pub campaign_id: ResourceId,
    pub variations: u32,
}

impl TextGenerationRequest {
    pub fn new(prompt: impl Into<String>, campaign_id: ResourceId) -> Self {
        Self {
            prompt: prompt.into(),
            tone: "persuasive".to_string(),
            platform: "instagram".to_string(),
            campaign_id,
            variations: 3,
        }
    }
}

/// Generated copy. The backend either saves one ad per variation or
/// returns a single unsaved text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextGenerationResult {
    #[serde(default)]
    pub saved_ads: Vec<AdContent>,
    #[serde(default)]
    pub generated_text: Option<String>,
}

impl TextGenerationResult {
    pub fn texts(&self) -> Vec<&str> {
        if self.saved_ads.is_empty() {
            self.generated_text.as_deref().into_iter().collect()
        } else {
            self.saved_ads.iter().map(|ad| ad.text.as_str()).collect()
        }
    }
}

/// Ad copy endpoints
pub struct Content<'a> {
    client: &'a ApiClient,
}

impl<'a> Content<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<AdContent>> {
        self.client
            .get("adcontent/", RequestOptions::new())
            .await?
            .json()
    }

    pub async fn delete(&self, id: &ResourceId) -> ApiResult<()> {
        self.client
            .delete(&format!("adcontent/{}/", id.segment()), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn generate_text(
        &self,
        request: &TextGenerationRequest,
    ) -> ApiResult<TextGenerationResult> {
        require(&request.prompt, "Please enter a prompt.")?;
        if request.variations == 0 {
            return Err(ApiError::InvalidInput(
                "Ask for at least one variation.".to_string(),
            ));
        }

        let mut request = request.clone();
        request.prompt = request.prompt.trim().to_string();

        self.client
            .post(
                "generate/text/",
                RequestBody::json(&request)?,
                RequestOptions::new(),
            )
            .await?
            .json()
    }
}
