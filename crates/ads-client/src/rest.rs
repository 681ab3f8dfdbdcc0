//! REST client for the Google Ads API.
//!
//! Covers: campaign performance reports (`searchStream`), campaign pause and
//! campaign budget updates (`mutate`).

use std::error::Error as StdError;
use std::time::Duration;

use common::{CampaignSnapshot, Error};
use execution_engine::CampaignMutator;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::auth::{GoogleAdsAuth, OAuthCredentials};
use crate::query::{
    budget_resource_query, parse_budget_resource, parse_campaign_rows, CampaignQuery,
    SearchStreamBatch,
};
use crate::rate_limit::RateLimiter;

const API_BASE_URL: &str = "https://googleads.googleapis.com";
/// Budgets must be a multiple of the smallest currency unit (one cent).
const BUDGET_STEP_MICROS: i64 = 10_000;

fn format_reqwest_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

fn summarize_response_body(raw: &str) -> String {
    const MAX_CHARS: usize = 800;
    let compact = raw.replace(['\n', '\r'], " ");
    match compact.char_indices().nth(MAX_CHARS) {
        Some((cut, _)) => format!("{}…", &compact[..cut]),
        None => compact,
    }
}

/// Round a budget down to whole cents.
pub fn align_budget_micros(amount_micros: i64) -> i64 {
    amount_micros - amount_micros.rem_euclid(BUDGET_STEP_MICROS)
}

/// Cent-aligned target for a budget increase. Errors when alignment leaves
/// nothing above the current budget.
pub fn aligned_budget_increase(current_micros: i64, new_micros: i64) -> Result<i64, Error> {
    let aligned = align_budget_micros(new_micros);
    if aligned <= current_micros {
        return Err(Error::Other(format!(
            "budget increase {} -> {} micros is below one cent after alignment",
            current_micros, new_micros
        )));
    }
    Ok(aligned)
}

/// Async REST client for one Google Ads customer account.
#[derive(Debug, Clone)]
pub struct GoogleAdsClient {
    client: reqwest::Client,
    auth: GoogleAdsAuth,
    base_url: String,
    customer_id: String,
    limiter: RateLimiter,
}

impl GoogleAdsClient {
    /// `customer_id` must already be normalized (digits only).
    pub fn new(
        credentials: OAuthCredentials,
        developer_token: String,
        login_customer_id: Option<String>,
        customer_id: String,
        api_version: &str,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;

        let auth = GoogleAdsAuth::new(
            client.clone(),
            credentials,
            developer_token,
            login_customer_id,
        )?;

        Ok(Self {
            client,
            auth,
            base_url: format!("{}/{}", API_BASE_URL, api_version.trim_matches('/')),
            customer_id,
            limiter: RateLimiter::new(),
        })
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    fn url(&self, method: &str) -> String {
        format!("{}/customers/{}/{}", self.base_url, self.customer_id, method)
    }

    async fn post(&self, method: &str, body: &Value) -> Result<Value, Error> {
        let headers = self.auth.headers().await?;
        let resp = self
            .client
            .post(self.url(method))
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;

        let status = resp.status().as_u16();
        let raw = resp
            .text()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;
        if status != 200 {
            return Err(Error::GoogleAdsApi {
                status,
                message: summarize_response_body(&raw),
            });
        }

        Ok(serde_json::from_str(&raw)?)
    }

    async fn search_stream(&self, gaql: &str) -> Result<Vec<SearchStreamBatch>, Error> {
        self.limiter.wait_search().await;
        debug!("GAQL: {}", gaql);
        let body = self
            .post("googleAds:searchStream", &json!({ "query": gaql }))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    // ── Read endpoints ────────────────────────────────────────────────

    /// Enabled campaigns with aggregated metrics over the query window.
    pub async fn fetch_campaign_metrics(
        &self,
        query: &CampaignQuery,
    ) -> Result<Vec<CampaignSnapshot>, Error> {
        let batches = self.search_stream(&query.to_gaql()).await?;
        let snapshots = parse_campaign_rows(batches)?;
        info!(
            "Fetched {} campaigns for customer {} (last {} days)",
            snapshots.len(),
            self.customer_id,
            query.days
        );
        Ok(snapshots)
    }

    async fn budget_resource_name(&self, campaign_id: &str) -> Result<String, Error> {
        let batches = self.search_stream(&budget_resource_query(campaign_id)?).await?;
        parse_budget_resource(batches).ok_or_else(|| {
            Error::Other(format!("campaign {} has no budget resource", campaign_id))
        })
    }

    // ── Write endpoints ───────────────────────────────────────────────

    async fn mutate(&self, method: &str, operation: Value) -> Result<(), Error> {
        self.limiter.wait_mutate().await;
        let body = self
            .post(method, &json!({ "operations": [operation] }))
            .await?;
        debug!("{} response: {}", method, body);
        Ok(())
    }

    pub async fn pause(&self, campaign_id: &str) -> Result<(), Error> {
        let resource_name = format!("customers/{}/campaigns/{}", self.customer_id, campaign_id);
        self.mutate(
            "campaigns:mutate",
            json!({
                "update": { "resourceName": resource_name, "status": "PAUSED" },
                "updateMask": "status"
            }),
        )
        .await
    }

    pub async fn set_budget(
        &self,
        campaign_id: &str,
        current_micros: i64,
        new_micros: i64,
    ) -> Result<(), Error> {
        let aligned = aligned_budget_increase(current_micros, new_micros)?;
        if aligned != new_micros {
            debug!(
                "Budget {} aligned down to {} micros for {}",
                new_micros, aligned, campaign_id
            );
        }
        let resource_name = self.budget_resource_name(campaign_id).await?;
        self.mutate(
            "campaignBudgets:mutate",
            json!({
                "update": { "resourceName": resource_name, "amountMicros": aligned.to_string() },
                "updateMask": "amountMicros"
            }),
        )
        .await
    }
}

impl CampaignMutator for GoogleAdsClient {
    async fn pause_campaign(&self, campaign_id: &str) -> common::Result<()> {
        self.pause(campaign_id).await
    }

    async fn set_campaign_budget(
        &self,
        campaign_id: &str,
        current_micros: i64,
        new_micros: i64,
    ) -> common::Result<()> {
        self.set_budget(campaign_id, current_micros, new_micros).await
    }
}
