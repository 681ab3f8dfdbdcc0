//! OAuth2 refresh-token authentication for the Google Ads API.
//!
//! Every request carries a bearer access token, the developer token and,
//! for manager-account access, a `login-customer-id` header.

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::Error;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Refresh this long before the token actually expires.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + EXPIRY_SKEW < self.expires_at
    }
}

#[derive(Clone)]
pub struct GoogleAdsAuth {
    http: reqwest::Client,
    credentials: OAuthCredentials,
    developer_token: String,
    login_customer_id: Option<String>,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl std::fmt::Debug for GoogleAdsAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAdsAuth")
            .field("credentials", &self.credentials)
            .field("login_customer_id", &self.login_customer_id)
            .finish_non_exhaustive()
    }
}

fn header_value(name: &str, raw: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(raw).map_err(|e| Error::Auth(format!("invalid {} header: {}", name, e)))
}

/// Request headers for one Google Ads API call.
pub fn build_headers(
    access_token: &str,
    developer_token: &str,
    login_customer_id: Option<&str>,
) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        header_value("authorization", &format!("Bearer {}", access_token))?,
    );
    headers.insert("developer-token", header_value("developer-token", developer_token)?);
    if let Some(login) = login_customer_id {
        headers.insert("login-customer-id", header_value("login-customer-id", login)?);
    }
    Ok(headers)
}

impl GoogleAdsAuth {
    pub fn new(
        http: reqwest::Client,
        credentials: OAuthCredentials,
        developer_token: String,
        login_customer_id: Option<String>,
    ) -> Result<Self, Error> {
        if credentials.client_id.is_empty()
            || credentials.client_secret.is_empty()
            || credentials.refresh_token.is_empty()
        {
            return Err(Error::Auth(
                "client_id, client_secret and refresh_token are all required".into(),
            ));
        }
        if developer_token.is_empty() {
            return Err(Error::Auth("developer token is required".into()));
        }

        Ok(Self {
            http,
            credentials,
            developer_token,
            login_customer_id: login_customer_id.filter(|id| !id.is_empty()),
            token: Arc::new(Mutex::new(None)),
        })
    }

    async fn refresh(&self) -> Result<CachedToken, Error> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let resp = self
            .http
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("token request failed: {}", e)))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| Error::Auth(format!("token response unreadable: {}", e)))?;

        debug!("Refreshed Google Ads access token (expires_in={}s)", token.expires_in);
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    async fn access_token(&self) -> Result<String, Error> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.is_fresh(Instant::now()) {
                return Ok(cached.access_token.clone());
            }
        }

        let fresh = self.refresh().await?;
        let access_token = fresh.access_token.clone();
        *guard = Some(fresh);
        Ok(access_token)
    }

    /// Headers for an authenticated request, refreshing the token if needed.
    pub async fn headers(&self) -> Result<HeaderMap, Error> {
        let access_token = self.access_token().await?;
        build_headers(
            &access_token,
            &self.developer_token,
            self.login_customer_id.as_deref(),
        )
    }
}
