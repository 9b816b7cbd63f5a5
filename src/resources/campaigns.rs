//! Campaign CRUD and campaign comments

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{lenient_f64, require, AdContent, ImageAsset, ResourceId};
use crate::client::{ApiClient, ApiError, ApiResult, RequestBody, RequestOptions};

/// An ad campaign. Detail responses also embed its content, images, and
/// comments; list responses leave those empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: ResourceId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub platform: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub budget: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ad_content: Vec<AdContent>,
    #[serde(default)]
    pub images: Vec<ImageAsset>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Fields submitted when creating or editing a campaign
#[derive(Debug, Clone, Serialize)]
pub struct CampaignInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl CampaignInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            start_date: None,
            end_date: None,
            platform: "instagram".to_string(),
            budget: None,
        }
    }

    fn validate(&self) -> ApiResult<()> {
        require(&self.title, "Please enter a campaign title.")?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ApiError::InvalidInput(
                    "End date must not be before the start date.".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl From<&Campaign> for CampaignInput {
    fn from(campaign: &Campaign) -> Self {
        Self {
            title: campaign.title.clone(),
            description: campaign.description.clone(),
            start_date: campaign.start_date,
            end_date: campaign.end_date,
            platform: campaign.platform.clone(),
            budget: campaign.budget,
        }
    }
}

/// Comment left on a campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: ResourceId,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<CommentAuthor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub email: String,
}

#[derive(Serialize)]
struct NewComment<'a> {
    campaign: &'a ResourceId,
    message: &'a str,
}

/// Campaign endpoints
pub struct Campaigns<'a> {
    client: &'a ApiClient,
}

impl<'a> Campaigns<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Campaign>> {
        self.client
            .get("campaigns/", RequestOptions::new())
            .await?
            .json()
    }

    /// Campaign with its ad content, images, and comments
    pub async fn get(&self, id: &ResourceId) -> ApiResult<Campaign> {
        self.client
            .get(&format!("campaigns/{}/", id.segment()), RequestOptions::new())
            .await?
            .json()
    }

    pub async fn create(&self, input: &CampaignInput) -> ApiResult<Campaign> {
        input.validate()?;
        self.client
            .post("campaigns/", RequestBody::json(input)?, RequestOptions::new())
            .await?
            .json()
    }

    pub async fn update(&self, id: &ResourceId, input: &CampaignInput) -> ApiResult<Campaign> {
        input.validate()?;
        self.client
            .patch(
                &format!("campaigns/{}/", id.segment()),
                RequestBody::json(input)?,
                RequestOptions::new(),
            )
            .await?
            .json()
    }

    pub async fn delete(&self, id: &ResourceId) -> ApiResult<()> {
        self.client
            .delete(&format!("campaigns/{}/", id.segment()), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn add_comment(&self, campaign: &ResourceId, message: &str) -> ApiResult<Comment> {
        require(message, "Comment cannot be empty.")?;
        let body = RequestBody::json(&NewComment {
            campaign,
            message: message.trim(),
        })?;
        self.client
            .post("comments/", body, RequestOptions::new())
            .await?
            .json()
    }

    pub async fn delete_comment(&self, comment: &ResourceId) -> ApiResult<()> {
        self.client
            .delete(&format!("comments/{}/", comment.segment()), RequestOptions::new())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_detail_deserializes() {
        let json = r#"{
            "id": 12,
            "title": "Spring Sale",
            "description": null,
            "start_date": "2025-03-01",
            "end_date": "2025-03-31",
            "platform": "facebook",
            "budget": "2500.00",
            "created_at": "2025-02-20T10:15:00Z",
            "ad_content": [{"id": 1, "text": "Save 20% today", "tone": "persuasive"}],
            "images": [{"id": 4, "image_url": "https://cdn.example/img.png", "prompt": "spring"}],
            "comments": [{"id": 9, "message": "Looks good", "user": {"email": "a@b.c"}}]
        }"#;

        let campaign: Campaign = serde_json::from_str(json).unwrap();
        assert_eq!(campaign.id, ResourceId::Int(12));
        assert_eq!(campaign.budget, Some(2500.0));
        assert_eq!(campaign.start_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(campaign.ad_content.len(), 1);
        assert_eq!(campaign.images[0].prompt.as_deref(), Some("spring"));
        assert_eq!(campaign.comments[0].user.as_ref().unwrap().email, "a@b.c");
    }

    #[test]
    fn test_campaign_list_item_without_relations() {
        let campaign: Campaign =
            serde_json::from_str(r#"{"id": "c-1", "title": "Launch", "platform": "instagram"}"#)
                .unwrap();
        assert!(campaign.comments.is_empty());
        assert!(campaign.budget.is_none());
    }

    #[test]
    fn test_input_serialization_skips_unset_fields() {
        let mut input = CampaignInput::new("Launch");
        input.budget = Some(100.0);

        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["title"], "Launch");
        assert_eq!(value["platform"], "instagram");
        assert_eq!(value["budget"], 100.0);
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_input_validation() {
        assert!(CampaignInput::new("  ").validate().is_err());

        let mut input = CampaignInput::new("Launch");
        input.start_date = NaiveDate::from_ymd_opt(2025, 5, 10);
        input.end_date = NaiveDate::from_ymd_opt(2025, 5, 1);
        assert!(input.validate().is_err());

        input.end_date = NaiveDate::from_ymd_opt(2025, 5, 10);
        assert!(input.validate().is_ok());
    }
}
