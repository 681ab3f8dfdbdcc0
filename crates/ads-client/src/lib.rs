//! Google Ads API client library.
//!
//! Provides OAuth-authenticated REST access to the Google Ads API: campaign
//! metric reports over GAQL and campaign status / budget mutations.

pub mod auth;
pub mod query;
pub mod rate_limit;
pub mod rest;

pub use auth::{GoogleAdsAuth, OAuthCredentials};
pub use query::{normalize_customer_id, CampaignQuery};
pub use rate_limit::RateLimiter;
pub use rest::GoogleAdsClient;
