//! # AdVision
//!
//! Client library for the AdVision marketing backend: authenticated REST
//! access with transparent token refresh, plus typed wrappers for every
//! resource the dashboard works with.
//!
//! ## Features
//!
//! - **Session handling**: access/refresh token pair kept in a pluggable store
//! - **Transparent refresh**: a 401 triggers one refresh exchange and one retry
//! - **Single-flight**: concurrent 401s share one refresh exchange
//! - **Typed resources**: campaigns, content, images, analytics, A/B tests, and more
//!
//! ## Modules
//!
//! - [`client`]: Authenticated HTTP client and request state machine
//! - [`session`]: Token pair storage (memory and file backed)
//! - [`resources`]: Typed backend endpoints
//! - [`config`]: TOML + environment configuration
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use advision::{ApiClient, ClientConfig, FileTokenStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tokens = Arc::new(FileTokenStore::default_location()?);
//!     let client = ApiClient::new(ClientConfig::new("http://localhost:8000/api"), tokens)?;
//!
//!     if !client.auth().is_authenticated().await? {
//!         client.auth().login("me@example.com", "correct horse").await?;
//!     }
//!
//!     // Expired access tokens are renewed behind this call
//!     let stats = client.dashboard().stats().await?;
//!     println!("{} campaigns, {} active", stats.total_campaigns, stats.active_campaigns);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod logging;
pub mod resources;
pub mod session;

// Re-export top-level types for convenience
pub use client::{
    ApiClient, ApiError, ApiResponse, ApiResult, AuthFailure, ClientConfig, FieldErrors,
    RequestBody, RequestFlow, RequestOptions, ResponseType, Stage,
};

pub use session::{
    FileTokenStore, MemoryTokenStore, SessionError, SessionResult, TokenPair, TokenStore,
};

pub use config::{ApiConfig, AuthConfig, Config, ConfigError, LoggingConfig};

pub use resources::{
    AbTest, AdContent, AdPlatform, AnalyticsSummary, ApiKey, AudienceInsights, Campaign,
    CampaignInput, DashboardStats, ImageAsset, Profile, ResourceId, WeeklyReport,
};
