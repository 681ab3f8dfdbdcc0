//! Configuration loader: merges config.toml, the .env file and env vars.

use std::path::{Path, PathBuf};

use ads_client::query::SUPPORTED_WINDOWS;
use common::{Error, FilterConfig, RulesConfig};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Report actions without applying them.
    #[serde(default = "default_true")]
    pub preview_mode: bool,

    /// Trailing window the metrics are aggregated over.
    #[serde(default = "default_days_to_analyze")]
    pub days_to_analyze: u32,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub filters: FilterConfig,

    #[serde(default)]
    pub google_ads: GoogleAdsConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub journal: JournalConfig,
}

#[derive(Clone, Deserialize)]
pub struct GoogleAdsConfig {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub login_customer_id: String,
    #[serde(default)]
    pub developer_token: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Campaigns at or below this many impressions are not reported.
    #[serde(default = "default_min_impressions")]
    pub min_impressions: i64,
}

// Secrets stay out of logs.
impl std::fmt::Debug for GoogleAdsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAdsConfig")
            .field("customer_id", &self.customer_id)
            .field("login_customer_id", &self.login_customer_id)
            .field("api_version", &self.api_version)
            .field("min_impressions", &self.min_impressions)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Slack-compatible incoming webhook. Empty disables notifications.
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default = "default_notify_timeout")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalConfig {
    /// Empty resolves to `<repo root>/ACTIONS`.
    #[serde(default)]
    pub dir: String,
}

fn default_true() -> bool {
    true
}

fn default_days_to_analyze() -> u32 {
    14
}

fn default_api_version() -> String {
    "v17".into()
}

fn default_min_impressions() -> i64 {
    100
}

fn default_notify_timeout() -> u64 {
    10_000
}

impl Default for GoogleAdsConfig {
    fn default() -> Self {
        Self {
            customer_id: String::new(),
            login_customer_id: String::new(),
            developer_token: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            api_version: default_api_version(),
            min_impressions: default_min_impressions(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            request_timeout_ms: default_notify_timeout(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preview_mode: true,
            days_to_analyze: default_days_to_analyze(),
            rules: RulesConfig::default(),
            filters: FilterConfig::default(),
            google_ads: GoogleAdsConfig::default(),
            notify: NotifyConfig::default(),
            journal: JournalConfig::default(),
        }
    }
}

impl GoogleAdsConfig {
    pub fn is_configured(&self) -> bool {
        !self.customer_id.trim().is_empty()
    }
}

impl AppConfig {
    pub fn parse(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Environment variables take priority over file values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&str, &mut String); 8] = [
            ("GOOGLE_ADS_CUSTOMER_ID", &mut self.google_ads.customer_id),
            ("GOOGLE_ADS_LOGIN_CUSTOMER_ID", &mut self.google_ads.login_customer_id),
            ("GOOGLE_ADS_DEVELOPER_TOKEN", &mut self.google_ads.developer_token),
            ("GOOGLE_ADS_CLIENT_ID", &mut self.google_ads.client_id),
            ("GOOGLE_ADS_CLIENT_SECRET", &mut self.google_ads.client_secret),
            ("GOOGLE_ADS_REFRESH_TOKEN", &mut self.google_ads.refresh_token),
            ("SLACK_WEBHOOK_URL", &mut self.notify.webhook_url),
            ("ACTIONS_DIR", &mut self.journal.dir),
        ];
        for (name, slot) in targets {
            if let Some(value) = lookup(name) {
                *slot = value.trim().to_string();
            }
        }

        if let Some(preview) = lookup("PREVIEW_MODE") {
            self.preview_mode = preview != "0" && preview.to_lowercase() != "false";
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.rules.validate()?;
        if !SUPPORTED_WINDOWS.contains(&self.days_to_analyze) {
            return Err(Error::Config(format!(
                "days_to_analyze must be one of {:?}, got {}",
                SUPPORTED_WINDOWS, self.days_to_analyze
            )));
        }
        if self.google_ads.min_impressions < 0 {
            return Err(Error::Config(
                "google_ads.min_impressions must be >= 0".into(),
            ));
        }
        Ok(())
    }

    pub fn journal_dir(&self) -> Option<PathBuf> {
        let trimmed = self.journal.dir.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }
}

/// Load configuration: defaults, then the TOML file, then `.env` and
/// process environment.
///
/// A missing file is only an error when the path was given explicitly.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Error> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    let (config_path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    let mut config = if config_path.exists() {
        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;
        AppConfig::parse(&contents)?
    } else if explicit {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            config_path.display()
        )));
    } else {
        AppConfig::default()
    };

    config.apply_env_overrides(|name| std::env::var(name).ok());
    config.validate()?;
    Ok(config)
}
