//! Image library, AI image generation, and cloud saving

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require, ResourceId};
use crate::client::{ApiClient, ApiResult, RequestBody, RequestOptions};

/// Image stored in the library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: ResourceId,
    #[serde(default)]
    pub campaign: Option<ResourceId>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub clicks: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Image generation parameters
#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub campaign_id: ResourceId,
    pub style: String,
    pub aspect_ratio: String,
    pub ad_template: String,
    pub include_text: bool,
    pub headline: String,
    pub tagline: String,
    pub cta_text: String,
    /// Ask every configured provider, not just the first
    pub generate_both: bool,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>, campaign_id: ResourceId) -> Self {
        Self {
            prompt: prompt.into(),
            campaign_id,
            style: "professional".to_string(),
            aspect_ratio: "1:1".to_string(),
            ad_template: "modern".to_string(),
            include_text: true,
            headline: String::new(),
            tagline: String::new(),
            cta_text: "Learn More".to_string(),
            generate_both: true,
        }
    }
}

/// Unsaved image returned by a generation provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Base64 payload or data URL, passed back verbatim when saving
    pub image_data: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    images: Vec<GeneratedImage>,
}

/// Request to persist a generated image
#[derive(Debug, Clone, Serialize)]
pub struct SaveImageRequest {
    pub campaign_id: ResourceId,
    pub image_data: String,
    pub provider: String,
    pub prompt: String,
}

impl SaveImageRequest {
    pub fn from_generated(
        campaign_id: ResourceId,
        image: &GeneratedImage,
        fallback_prompt: &str,
    ) -> Self {
        Self {
            campaign_id,
            image_data: image.image_data.clone(),
            provider: image.provider.clone(),
            prompt: image
                .prompt
                .clone()
                .unwrap_or_else(|| fallback_prompt.to_string()),
        }
    }
}

#[derive(Serialize)]
struct PromptUpdate<'a> {
    prompt: &'a str,
}

/// Image endpoints
pub struct Images<'a> {
    client: &'a ApiClient,
}

impl<'a> Images<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<ImageAsset>> {
        self.client
            .get("images/", RequestOptions::new())
            .await?
            .json()
    }

    /// Removes the image from cloud storage as well
    pub async fn delete(&self, id: &ResourceId) -> ApiResult<()> {
        self.client
            .delete(&format!("images/{}/delete/", id.segment()), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn update_prompt(&self, id: &ResourceId, prompt: &str) -> ApiResult<()> {
        require(prompt, "Prompt cannot be empty!")?;
        self.client
            .patch(
                &format!("images/{}/update/", id.segment()),
                RequestBody::json(&PromptUpdate {
                    prompt: prompt.trim(),
                })?,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    /// Generate candidate images; an empty list means no provider produced one
    pub async fn generate(&self, request: &ImageGenerationRequest) -> ApiResult<Vec<GeneratedImage>> {
        require(&request.prompt, "Please enter an image description.")?;

        let mut request = request.clone();
        request.prompt = request.prompt.trim().to_string();

        let response: ImageGenerationResponse = self
            .client
            .post(
                "generate/image/",
                RequestBody::json(&request)?,
                RequestOptions::new(),
            )
            .await?
            .json()?;

        Ok(response.images)
    }

    pub async fn save(&self, request: &SaveImageRequest) -> ApiResult<ImageAsset> {
        require(&request.image_data, "No image data to save.")?;
        self.client
            .post(
                "generate/image/save/",
                RequestBody::json(request)?,
                RequestOptions::new(),
            )
            .await?
            .json()
    }
}
