use std::path::PathBuf;

use ads_client::{CampaignQuery, GoogleAdsClient};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use common::{Action, CampaignMetric, CampaignSnapshot, Error};
use decision_engine::rules::budget_change_label;
use decision_engine::types::describe_filters;
use decision_engine::DecisionEngine;
use execution_engine::{CampaignMutator, ExecutionEngine, ExecutionOutcome};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::journal::{action_event, now_iso, resolve_actions_dir, ActionJournal};
use crate::notify::{compose_summary, WebhookNotifier};
use crate::provider::{build_google_ads_client, MetricsSource};
use crate::report::log_campaigns;

/// Where live mutations go.
pub enum Mutator {
    GoogleAds(GoogleAdsClient),
    Unavailable,
}

impl CampaignMutator for Mutator {
    async fn pause_campaign(&self, campaign_id: &str) -> common::Result<()> {
        match self {
            Mutator::GoogleAds(client) => client.pause(campaign_id).await,
            Mutator::Unavailable => Err(Error::Config(
                "no Google Ads account configured for live changes".into(),
            )),
        }
    }

    async fn set_campaign_budget(
        &self,
        campaign_id: &str,
        current_micros: i64,
        new_micros: i64,
    ) -> common::Result<()> {
        match self {
            Mutator::GoogleAds(client) => {
                client.set_budget(campaign_id, current_micros, new_micros).await
            }
            Mutator::Unavailable => Err(Error::Config(
                "no Google Ads account configured for live changes".into(),
            )),
        }
    }
}

/// What happened during one evaluation pass.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: String,
    pub campaigns_analyzed: usize,
    pub actions: Vec<Action>,
    pub outcomes: Vec<ExecutionOutcome>,
    pub journal_errors: Vec<String>,
    pub notify_error: Option<String>,
}

impl RunReport {
    pub fn failed_applies(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ExecutionOutcome::Failed(_)))
            .count()
    }
}

pub struct Bot {
    config: AppConfig,
    source: MetricsSource,
    decision_engine: DecisionEngine,
    execution_engine: ExecutionEngine<Mutator>,
    journal: Option<ActionJournal>,
    notifier: Option<WebhookNotifier>,
}

impl Bot {
    pub fn new(config: AppConfig, snapshot: Option<PathBuf>) -> Result<Self> {
        let decision_engine = DecisionEngine::new(&config.rules, &config.filters)?;

        let google_ads = if config.google_ads.is_configured() {
            Some(build_google_ads_client(&config).context("Google Ads client setup failed")?)
        } else {
            None
        };

        let source = match (snapshot, &google_ads) {
            (Some(path), _) => MetricsSource::Snapshot(path),
            (None, Some(client)) => MetricsSource::GoogleAds {
                client: client.clone(),
                query: CampaignQuery::new(
                    config.days_to_analyze,
                    config.google_ads.min_impressions,
                )?,
            },
            (None, None) => bail!(
                "No metrics source: pass --snapshot or set GOOGLE_ADS_CUSTOMER_ID"
            ),
        };

        let mutator = match google_ads {
            Some(client) => Mutator::GoogleAds(client),
            None if !config.preview_mode => {
                bail!("Live mode requires Google Ads credentials; keep preview_mode on or configure [google_ads]")
            }
            None => Mutator::Unavailable,
        };
        let execution_engine = ExecutionEngine::new(mutator, config.preview_mode);

        let journal = match ActionJournal::open(resolve_actions_dir(config.journal_dir())) {
            Ok(journal) => {
                info!("Action journal: {}", journal.current_path().display());
                Some(journal)
            }
            Err(e) => {
                warn!("Action journal unavailable, continuing without it: {}", e);
                None
            }
        };

        let notifier = WebhookNotifier::from_config(&config.notify)?;
        if notifier.is_none() {
            info!("No webhook configured; notifications disabled");
        }

        Ok(Self {
            config,
            source,
            decision_engine,
            execution_engine,
            journal,
            notifier,
        })
    }

    fn log_settings(&self) {
        let rules = &self.config.rules;
        info!(
            "Mode: {}",
            if self.config.preview_mode {
                "🔍 PREVIEW (no changes)"
            } else {
                "🚀 LIVE (applying changes)"
            }
        );
        info!("Source: {}", self.source.label());
        info!("Pause if CPA > ${}", rules.pause_cpa_above);
        info!("Pause if CTR < {}%", rules.pause_ctr_below);
        info!(
            "Scale if ROAS > {}x (+{}%, max ${})",
            rules.increase_budget_roas_above, rules.budget_increase_percent, rules.max_budget
        );
        info!("Min spend to evaluate: ${}", rules.min_spend_to_evaluate);
        info!("Filters: {}", describe_filters(&self.config.filters));
    }

    /// Journal failures are collected, never raised.
    fn record(&mut self, event: serde_json::Value, errors: &mut Vec<String>) {
        let Some(journal) = self.journal.as_mut() else {
            return;
        };
        if let Err(e) = journal.write_event(&event) {
            warn!("Action journal write failed: {}", e);
            errors.push(e.to_string());
        }
    }

    async fn fetch_snapshots(&self) -> Result<Vec<CampaignSnapshot>> {
        self.source
            .fetch()
            .await
            .with_context(|| format!("failed to fetch metrics from {}", self.source.label()))
    }

    /// Fetch and evaluate. Returns the number of campaigns fetched and the
    /// action plan.
    async fn plan(&self) -> Result<(usize, Vec<Action>)> {
        let snapshots = self.fetch_snapshots().await?;
        let analyzed = snapshots.len();
        let actions = self
            .decision_engine
            .evaluate_snapshots(snapshots)
            .context("metrics provider returned an invalid record")?;
        Ok((analyzed, actions))
    }

    /// One evaluation pass. Errors only when no trustworthy input could be
    /// obtained; in that case nothing has been applied.
    pub async fn run_once(&mut self) -> Result<RunReport> {
        let run_id = Uuid::new_v4().to_string();
        let mut journal_errors = Vec::new();
        self.log_settings();

        self.record(
            json!({
                "ts": now_iso(),
                "run_id": run_id,
                "kind": "run_start",
                "mode": if self.config.preview_mode { "preview" } else { "live" },
                "source": self.source.label(),
                "rules": {
                    "pause_cpa_above": self.config.rules.pause_cpa_above,
                    "pause_ctr_below": self.config.rules.pause_ctr_below,
                    "increase_budget_roas_above": self.config.rules.increase_budget_roas_above,
                    "budget_increase_percent": self.config.rules.budget_increase_percent,
                    "max_budget": self.config.rules.max_budget,
                    "min_spend_to_evaluate": self.config.rules.min_spend_to_evaluate
                },
                "filters": {
                    "include_substring": self.config.filters.include_substring,
                    "exclude_substring": self.config.filters.exclude_substring
                }
            }),
            &mut journal_errors,
        );

        let (analyzed, actions) = match self.plan().await {
            Ok(plan) => plan,
            Err(e) => {
                error!("Aborting run, no actions taken: {:#}", e);
                self.record(
                    json!({
                        "ts": now_iso(),
                        "run_id": run_id,
                        "kind": "run_abort",
                        "error": format!("{:#}", e)
                    }),
                    &mut journal_errors,
                );
                return Err(e);
            }
        };

        info!(
            "📊 Campaigns analyzed: {}, actions to take: {}",
            analyzed,
            actions.len()
        );

        if actions.is_empty() {
            info!("✅ All campaigns are performing within your thresholds");
        }
        for action in &actions {
            info!(
                "{} {}: {} - {}",
                if action.kind.is_pause() { "⏸️" } else { "📈" },
                action.kind.as_str(),
                action.campaign_name,
                action.reason
            );
            if let Some(change) = budget_change_label(&action.kind) {
                info!("   Budget: {}", change);
            }
        }

        let outcomes = self.execution_engine.execute_all(&actions).await;

        let ts = now_iso();
        for (action, outcome) in actions.iter().zip(&outcomes) {
            self.record(action_event(&ts, &run_id, action, outcome), &mut journal_errors);
        }

        let mut notify_error = None;
        if !actions.is_empty() {
            if let Some(notifier) = &self.notifier {
                let summary = compose_summary(&actions, self.execution_engine.preview_mode(), Utc::now());
                if let Err(e) = notifier.send(&summary).await {
                    warn!("Notification failed: {}", e);
                    notify_error = Some(e.to_string());
                }
            }
        }

        let failed_applies = outcomes
            .iter()
            .filter(|o| matches!(o, ExecutionOutcome::Failed(_)))
            .count();
        if failed_applies > 0 {
            warn!("{} action(s) failed to apply", failed_applies);
        }

        self.record(
            json!({
                "ts": now_iso(),
                "run_id": run_id,
                "kind": "run_end",
                "campaigns_analyzed": analyzed,
                "actions": actions.len(),
                "pauses": actions.iter().filter(|a| a.kind.is_pause()).count(),
                "failed_applies": failed_applies,
                "notify_error": notify_error
            }),
            &mut journal_errors,
        );

        Ok(RunReport {
            run_id,
            campaigns_analyzed: analyzed,
            actions,
            outcomes,
            journal_errors,
            notify_error,
        })
    }

    /// Print campaigns, the account summary and each campaign's verdict.
    /// Never applies anything.
    pub async fn list(&self) -> Result<()> {
        let metrics = CampaignMetric::from_snapshots(self.fetch_snapshots().await?)
            .context("metrics provider returned an invalid record")?;
        log_campaigns(&metrics);
        for metric in &metrics {
            info!(
                "   {} -> {}",
                metric.name(),
                self.decision_engine.explain(metric).label()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use common::ActionKind;

    use super::*;

    const SNAPSHOT: &str = r#"[
        {"id": "1", "name": "Search - Low CTR", "budget_micros": 100000000,
         "cost_micros": 60000000, "impressions": 10000, "clicks": 50,
         "conversions": 0.0, "conversion_value_micros": 0},
        {"id": "2", "name": "Search - Winner", "budget_micros": 200000000,
         "cost_micros": 100000000, "impressions": 10000, "clicks": 300,
         "conversions": 2.0, "conversion_value_micros": 400000000},
        {"id": "3", "name": "Brand - Tiny", "budget_micros": 50000000,
         "cost_micros": 10000000, "impressions": 10000, "clicks": 1,
         "conversions": 0.0, "conversion_value_micros": 0}
    ]"#;

    fn write_snapshot(dir: &std::path::Path, contents: &str) -> PathBuf {
        let path = dir.join("snapshot.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn config(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.journal.dir = dir.join("actions").display().to_string();
        config
    }

    #[tokio::test]
    async fn test_preview_run_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path(), SNAPSHOT);
        let mut bot = Bot::new(config(dir.path()), Some(snapshot)).unwrap();

        let report = bot.run_once().await.unwrap();
        assert_eq!(report.campaigns_analyzed, 3);
        assert_eq!(report.actions.len(), 2);
        assert_eq!(report.actions[0].campaign_id, "1");
        assert_eq!(report.actions[0].kind, ActionKind::Pause);
        assert_eq!(report.actions[1].campaign_id, "2");
        assert!(report
            .outcomes
            .iter()
            .all(|o| *o == ExecutionOutcome::Preview));
        assert!(report.journal_errors.is_empty());
        assert!(report.notify_error.is_none());

        let journal_dir = dir.path().join("actions");
        let file = std::fs::read_dir(&journal_dir)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let lines: Vec<serde_json::Value> = std::fs::read_to_string(file)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        // run_start, two actions, run_end
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1]["status"], "PREVIEW");
        assert_eq!(lines[2]["action"], "INCREASE_BUDGET");
        assert_eq!(lines[3]["kind"], "run_end");
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut bot = Bot::new(
            config(dir.path()),
            Some(dir.path().join("missing.json")),
        )
        .unwrap();
        assert!(bot.run_once().await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_record_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(
            dir.path(),
            r#"[{"id": "9", "name": "Bad", "budget_micros": 0, "cost_micros": -5,
                 "impressions": 0, "clicks": 0, "conversions": 0.0,
                 "conversion_value_micros": 0}]"#,
        );
        let mut bot = Bot::new(config(dir.path()), Some(snapshot)).unwrap();
        let err = bot.run_once().await.unwrap_err();
        assert!(format!("{:#}", err).contains("cost_micros"));
        assert!(bot.list().await.is_err());

        let journal = std::fs::read_dir(dir.path().join("actions"))
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let kinds: Vec<String> = std::fs::read_to_string(journal)
            .unwrap()
            .lines()
            .map(|l| {
                let event: serde_json::Value = serde_json::from_str(l).unwrap();
                event["kind"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(kinds, vec!["run_start", "run_abort"]);
    }

    #[tokio::test]
    async fn test_list_reads_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path(), SNAPSHOT);
        let bot = Bot::new(config(dir.path()), Some(snapshot)).unwrap();
        assert!(bot.list().await.is_ok());
    }

    #[test]
    fn test_live_mode_without_credentials_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.preview_mode = false;
        let result = Bot::new(config, Some(dir.path().join("snapshot.json")));
        assert!(result.is_err());
    }

    #[test]
    fn test_no_source_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Bot::new(config(dir.path()), None).is_err());
    }

    #[tokio::test]
    async fn test_unavailable_mutator_reports_failure() {
        let err = Mutator::Unavailable.pause_campaign("1").await.unwrap_err();
        assert!(err.to_string().contains("no Google Ads account"));
    }
}
