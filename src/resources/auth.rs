//! Sign-in, registration, and Google OAuth exchange
//!
//! Every successful sign-in writes the access and refresh tokens to the
//! client's token store in one step.

use serde::{Deserialize, Serialize};

use super::require;
use crate::client::{ApiClient, ApiError, ApiResult, RequestBody, RequestOptions};
use crate::session::TokenPair;

const MIN_PASSWORD_LEN: usize = 8;
const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Token pair returned by the login endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl TokenResponse {
    fn into_pair(self) -> Option<TokenPair> {
        match (self.access, self.refresh) {
            (Some(access), Some(refresh)) => Some(TokenPair { access, refresh }),
            _ => None,
        }
    }
}

/// What happened after a registration was accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Tokens were issued and stored
    SignedIn,
    /// Account created; the user must sign in separately
    LoginRequired,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password1: &'a str,
    password2: &'a str,
}

#[derive(Serialize)]
struct GoogleAuthRequest<'a> {
    code: &'a str,
    redirect_uri: &'a str,
}

/// Authentication endpoints
pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Email/password sign-in
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<()> {
        require(email, "Please enter your email.")?;
        require(password, "Please enter your password.")?;

        let body = RequestBody::json(&LoginRequest { email, password })?;
        let response = self
            .client
            .post("auth/login/", body, RequestOptions::new())
            .await?;

        let tokens = response
            .json::<TokenResponse>()?
            .into_pair()
            .ok_or_else(|| ApiError::Decode("login response is missing tokens".to_string()))?;

        self.client.tokens().set(&tokens).await?;
        tracing::info!("Signed in");
        Ok(())
    }

    /// Create an account. Sent without credentials.
    pub async fn register(
        &self,
        email: &str,
        password1: &str,
        password2: &str,
    ) -> ApiResult<RegistrationOutcome> {
        validate_registration(email, password1, password2)?;

        let body = RequestBody::json(&RegisterRequest {
            email,
            password1,
            password2,
        })?;
        let response = self
            .client
            .post(
                "auth/registration/",
                body,
                RequestOptions::new().anonymous(),
            )
            .await?;

        // Some backends only confirm the account and expect a separate login
        let tokens = if response.is_empty() {
            None
        } else {
            response.json::<TokenResponse>()?.into_pair()
        };

        match tokens {
            Some(tokens) => {
                self.client.tokens().set(&tokens).await?;
                Ok(RegistrationOutcome::SignedIn)
            }
            None => Ok(RegistrationOutcome::LoginRequired),
        }
    }

    /// Exchange a Google authorization code for a session
    pub async fn login_with_google(&self, code: &str, redirect_uri: &str) -> ApiResult<()> {
        require(code, "Missing Google authorization code.")?;

        let body = RequestBody::json(&GoogleAuthRequest { code, redirect_uri })?;
        let response = self
            .client
            .post("auth/google/", body, RequestOptions::new())
            .await?;

        let tokens = response
            .json::<TokenResponse>()?
            .into_pair()
            .ok_or_else(|| ApiError::Decode("Google login response is missing tokens".to_string()))?;

        self.client.tokens().set(&tokens).await?;
        tracing::info!("Signed in with Google");
        Ok(())
    }

    /// Forget the stored session
    pub async fn logout(&self) -> ApiResult<()> {
        self.client.tokens().clear().await?;
        Ok(())
    }

    /// Whether an access token is stored
    pub async fn is_authenticated(&self) -> ApiResult<bool> {
        Ok(self.client.tokens().get().await?.is_some())
    }
}

/// Checks the registration form before submitting it
pub fn validate_registration(email: &str, password1: &str, password2: &str) -> ApiResult<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::InvalidInput(
            "Please enter a valid email address.".to_string(),
        ));
    }
    if password1 != password2 {
        return Err(ApiError::InvalidInput("Passwords do not match!".to_string()));
    }
    if password1.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidInput(format!(
            "Password must be at least {} characters long.",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Google OAuth authorization-code URL for the given client
pub fn google_authorization_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        GOOGLE_AUTH_ENDPOINT,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode("openid email profile"),
    )
}
