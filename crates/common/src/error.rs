//! Unified error type for the campaign rules bot.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid metric record {campaign_id:?}: field `{field}` {reason}")]
    InvalidMetric {
        campaign_id: String,
        field: &'static str,
        reason: String,
    },

    #[error("Google Ads API error (status={status}): {message}")]
    GoogleAdsApi { status: u16, message: String },

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn invalid_metric(
        campaign_id: &str,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidMetric {
            campaign_id: campaign_id.to_string(),
            field,
            reason: reason.into(),
        }
    }
}
