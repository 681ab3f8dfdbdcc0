//! Metrics providers: a JSON snapshot file or the live Google Ads account.

use std::path::{Path, PathBuf};

use ads_client::{normalize_customer_id, CampaignQuery, GoogleAdsClient, OAuthCredentials};
use common::{CampaignSnapshot, Error};

use crate::config::AppConfig;

pub enum MetricsSource {
    Snapshot(PathBuf),
    GoogleAds {
        client: GoogleAdsClient,
        query: CampaignQuery,
    },
}

impl MetricsSource {
    pub fn label(&self) -> String {
        match self {
            MetricsSource::Snapshot(path) => format!("snapshot {}", path.display()),
            MetricsSource::GoogleAds { client, query } => format!(
                "google ads customer {} (last {} days)",
                client.customer_id(),
                query.days
            ),
        }
    }

    pub async fn fetch(&self) -> Result<Vec<CampaignSnapshot>, Error> {
        match self {
            MetricsSource::Snapshot(path) => load_snapshot_file(path).await,
            MetricsSource::GoogleAds { client, query } => {
                client.fetch_campaign_metrics(query).await
            }
        }
    }
}

/// Read a JSON array of campaign snapshots.
pub async fn load_snapshot_file(path: &Path) -> Result<Vec<CampaignSnapshot>, Error> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read snapshot {}: {}", path.display(), e),
        ))
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Build a Google Ads client from the `[google_ads]` section.
pub fn build_google_ads_client(config: &AppConfig) -> Result<GoogleAdsClient, Error> {
    let ads = &config.google_ads;
    let customer_id = normalize_customer_id(&ads.customer_id)?;
    let login_customer_id = if ads.login_customer_id.trim().is_empty() {
        None
    } else {
        Some(normalize_customer_id(&ads.login_customer_id)?)
    };

    GoogleAdsClient::new(
        OAuthCredentials {
            client_id: ads.client_id.clone(),
            client_secret: ads.client_secret.clone(),
            refresh_token: ads.refresh_token.clone(),
        },
        ads.developer_token.clone(),
        login_customer_id,
        customer_id,
        &ads.api_version,
    )
}
