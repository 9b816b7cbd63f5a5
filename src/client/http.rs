//! Authenticated REST client
//!
//! Attaches the stored access token to every request. A 401 triggers one
//! refresh exchange followed by one retry; everything else is returned to
//! the caller untouched.

use reqwest::header::ACCEPT;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::{ApiError, ApiResult, AuthFailure};
use super::flow::{Event, FlowError, Outcome, RequestFlow, Stage};
use super::request::{ApiResponse, RequestBody, RequestOptions};
use crate::session::{TokenPair, TokenStore};

/// Connection settings for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Path of the token refresh endpoint, relative to `base_url`
    pub refresh_path: String,
    /// Default per-request timeout
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            refresh_path: "auth/token/refresh/".to_string(),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("advision/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl From<&crate::config::ApiConfig> for ClientConfig {
    fn from(api: &crate::config::ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            refresh_path: api.refresh_path.clone(),
            request_timeout: Duration::from_secs(api.request_timeout_secs),
            ..Self::default()
        }
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

enum RefreshOutcome {
    Renewed(String),
    Failed(AuthFailure),
}

/// REST client for the AdVision backend
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
    /// Serializes refresh exchanges across concurrent requests
    refresh_gate: Mutex<()>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            config,
            tokens,
            refresh_gate: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Session storage shared with the auth resource
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Absolute URL for a backend path
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> ApiResult<ApiResponse> {
        self.request(Method::GET, path, RequestBody::Empty, options)
            .await
    }

    pub async fn post(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<ApiResponse> {
        self.request(Method::POST, path, body, options).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<ApiResponse> {
        self.request(Method::PUT, path, body, options).await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<ApiResponse> {
        self.request(Method::PATCH, path, body, options).await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> ApiResult<ApiResponse> {
        self.request(Method::DELETE, path, RequestBody::Empty, options)
            .await
    }

    /// Send a request, refreshing the session at most once on a 401
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let url = self.url(path);
        let request_id = Uuid::new_v4();

        let (mut flow, mut credential) = if options.anonymous {
            (RequestFlow::anonymous(), None)
        } else {
            let stored = self.tokens.get().await?;
            (RequestFlow::new(), stored.map(|t| t.access))
        };

        flow.advance(Event::Dispatch)?;

        loop {
            let sent = self
                .dispatch(&method, &url, &body, &options, credential.as_deref(), request_id)
                .await;

            let outcome = match &sent {
                Ok(response) => Outcome::from_status(response.status),
                Err(_) => Outcome::Error,
            };
            let stage = flow.advance(Event::Response(outcome))?;

            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = path,
                status = ?sent.as_ref().ok().map(|r| r.status),
                stage = %stage,
                "API response"
            );

            match stage {
                Stage::Succeeded | Stage::RetriedSucceeded => return Ok(sent?),
                Stage::Failed => return Err(into_error(sent)),
                Stage::RetriedFailed => {
                    return Err(with_cause(into_error(sent), AuthFailure::RejectedAfterRefresh));
                }
                Stage::AuthRejected => {
                    let rejected = sent?;
                    flow.advance(Event::BeginRefresh)?;

                    match self.refresh_session(credential.as_deref()).await? {
                        RefreshOutcome::Renewed(access) => {
                            flow.advance(Event::RefreshSucceeded)?;
                            tracing::debug!(request_id = %request_id, "Retrying with renewed access token");
                            credential = Some(access);
                        }
                        RefreshOutcome::Failed(cause) => {
                            flow.advance(Event::RefreshFailed)?;
                            let err = ApiError::from_response(rejected.status, &rejected.body);
                            return Err(with_cause(err, cause));
                        }
                    }
                }
                other => {
                    return Err(FlowError {
                        from: other,
                        event: Event::Response(outcome),
                    }
                    .into());
                }
            }
        }
    }

    async fn dispatch(
        &self,
        method: &Method,
        url: &str,
        body: &RequestBody,
        options: &RequestOptions,
        credential: Option<&str>,
        request_id: Uuid,
    ) -> Result<ApiResponse, reqwest::Error> {
        let mut builder = self
            .http
            .request(method.clone(), url)
            .header("X-Request-Id", request_id.to_string());

        if !options.has_header("accept") {
            builder = builder.header(ACCEPT, options.response_type.accept());
        }
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(token) = credential {
            builder = builder.bearer_auth(token);
        }
        if let RequestBody::Json(value) = body {
            builder = builder.json(value);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// Renew the access token after `rejected` was refused
    ///
    /// Runs under the refresh gate. If another request already replaced the
    /// rejected token, the stored one is reused without a new exchange.
    async fn refresh_session(&self, rejected: Option<&str>) -> ApiResult<RefreshOutcome> {
        let _gate = self.refresh_gate.lock().await;

        let tokens = match self.tokens.get().await? {
            Some(current) if rejected != Some(current.access.as_str()) => {
                tracing::debug!("Access token already renewed by a concurrent request");
                return Ok(RefreshOutcome::Renewed(current.access));
            }
            Some(current) => current,
            None => {
                self.tokens.clear().await?;
                tracing::warn!("No refresh token stored, session dropped");
                return Ok(RefreshOutcome::Failed(AuthFailure::MissingRefreshToken));
            }
        };

        match self.exchange_refresh_token(&tokens.refresh).await {
            Ok(renewed) => {
                let next: TokenPair = tokens.refreshed(renewed.access, renewed.refresh);
                self.tokens.set(&next).await?;
                tracing::debug!("Access token renewed");
                Ok(RefreshOutcome::Renewed(next.access))
            }
            Err(cause) => {
                self.tokens.clear().await?;
                tracing::warn!(cause = %cause, "Token refresh failed, session dropped");
                Ok(RefreshOutcome::Failed(cause))
            }
        }
    }

    async fn exchange_refresh_token(&self, refresh: &str) -> Result<RefreshResponse, AuthFailure> {
        let url = self.url(&self.config.refresh_path);

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&RefreshRequest { refresh })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Token refresh request failed");
                AuthFailure::RefreshFailed { status: None }
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(AuthFailure::RefreshFailed {
                status: Some(status),
            });
        }

        response.json::<RefreshResponse>().await.map_err(|e| {
            tracing::warn!(error = %e, "Token refresh response was not understood");
            AuthFailure::RefreshFailed {
                status: Some(status),
            }
        })
    }
}

fn into_error(sent: Result<ApiResponse, reqwest::Error>) -> ApiError {
    match sent {
        Ok(response) => ApiError::from_response(response.status, &response.body),
        Err(e) => e.into(),
    }
}

fn with_cause(err: ApiError, cause: AuthFailure) -> ApiError {
    match err {
        ApiError::Unauthorized {
            status, message, ..
        } => ApiError::Unauthorized {
            status,
            message,
            cause,
        },
        other => other,
    }
}
