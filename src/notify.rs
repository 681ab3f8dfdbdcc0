//! Run summary notification over a Slack-compatible webhook.

use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{Action, Error};
use decision_engine::rules::budget_change_label;
use serde_json::json;
use tracing::info;

use crate::config::NotifyConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub subject: String,
    pub body: String,
}

impl Summary {
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.subject, self.body)
    }
}

pub fn compose_summary(actions: &[Action], preview: bool, now: DateTime<Utc>) -> Summary {
    let pause_count = actions.iter().filter(|a| a.kind.is_pause()).count();
    let budget_count = actions.len() - pause_count;

    let mut subject = format!("Google Ads Automation: {} Actions", actions.len());
    if preview {
        subject.push_str(" (Preview Mode)");
    }

    let mut body = String::from("Google Ads Automation Report\n\n");
    body.push_str(&format!(
        "Mode: {}\n",
        if preview {
            "PREVIEW (no changes made)"
        } else {
            "LIVE (changes applied)"
        }
    ));
    body.push_str(&format!("Date: {}\n\n", now.format("%Y-%m-%d %H:%M UTC")));
    body.push_str("Summary:\n");
    body.push_str(&format!("• Campaigns paused: {}\n", pause_count));
    body.push_str(&format!("• Budgets increased: {}\n\n", budget_count));
    body.push_str("Details:\n");

    for (i, action) in actions.iter().enumerate() {
        body.push_str(&format!(
            "{}. {}: {}\n",
            i + 1,
            action.kind.as_str(),
            action.campaign_name
        ));
        body.push_str(&format!("   Reason: {}\n", action.reason));
        if let Some(change) = budget_change_label(&action.kind) {
            body.push_str(&format!("   Budget: {}\n", change));
        }
    }

    Summary { subject, body }
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// `None` when no webhook is configured.
    pub fn from_config(config: &NotifyConfig) -> Result<Option<Self>, Error> {
        let url = config.webhook_url.trim();
        if url.is_empty() {
            return Ok(None);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| Error::Notify(e.to_string()))?;

        Ok(Some(Self {
            client,
            url: url.to_string(),
        }))
    }

    pub async fn send(&self, summary: &Summary) -> Result<(), Error> {
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({ "text": summary.text() }))
            .send()
            .await
            .map_err(|e| Error::Notify(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Notify(format!(
                "webhook returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        info!("📧 Notification sent: {}", summary.subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use common::{ActionKind, RuleId, Trigger};

    use super::*;

    fn pause(name: &str) -> Action {
        Action {
            campaign_id: "1".into(),
            campaign_name: name.into(),
            kind: ActionKind::Pause,
            reason: "High CPA: $200.00 (threshold: $100)".into(),
            trigger: Trigger {
                rule: RuleId::HighCpa,
                value: 200.0,
                threshold: 100.0,
            },
        }
    }

    fn increase(name: &str) -> Action {
        Action {
            kind: ActionKind::IncreaseBudget {
                current_budget_micros: 200_000_000,
                new_budget_micros: 240_000_000,
            },
            reason: "High ROAS: 4.00x (threshold: 3x)".into(),
            ..pause(name)
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_summary_counts_pauses_and_increases() {
        let summary = compose_summary(
            &[pause("A"), increase("B"), pause("C")],
            false,
            now(),
        );
        assert_eq!(summary.subject, "Google Ads Automation: 3 Actions");
        assert!(summary.body.contains("• Campaigns paused: 2"));
        assert!(summary.body.contains("• Budgets increased: 1"));
        assert!(summary.body.contains("LIVE (changes applied)"));
        assert!(summary.body.contains("Date: 2026-03-01 09:30 UTC"));
    }

    #[test]
    fn test_summary_details_in_order() {
        let summary = compose_summary(&[pause("A"), increase("B")], true, now());
        assert!(summary.subject.ends_with("(Preview Mode)"));
        let first = summary.body.find("1. PAUSE: A").unwrap();
        let second = summary.body.find("2. INCREASE_BUDGET: B").unwrap();
        assert!(first < second);
        assert!(summary.body.contains("Budget: $200.00 → $240.00"));
    }

    #[test]
    fn test_empty_webhook_disables_notifier() {
        let notifier = WebhookNotifier::from_config(&NotifyConfig::default()).unwrap();
        assert!(notifier.is_none());
    }
}
