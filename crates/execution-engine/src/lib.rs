use std::future::Future;

use common::{Action, ActionKind};
use tracing::{error, info};

/// Live campaign state the execution engine writes to.
pub trait CampaignMutator {
    fn pause_campaign(&self, campaign_id: &str) -> impl Future<Output = common::Result<()>> + Send;

    /// Raise a budget from `current_micros` to `new_micros`. Implementations
    /// that cannot represent the change exactly must error rather than apply
    /// a no-op.
    fn set_campaign_budget(
        &self,
        campaign_id: &str,
        current_micros: i64,
        new_micros: i64,
    ) -> impl Future<Output = common::Result<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Preview,
    Applied,
    Failed(String),
}

impl ExecutionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionOutcome::Preview => "PREVIEW",
            ExecutionOutcome::Applied => "APPLIED",
            ExecutionOutcome::Failed(_) => "FAILED",
        }
    }
}

pub struct ExecutionEngine<M> {
    mutator: M,
    preview_mode: bool,
}

impl<M: CampaignMutator> ExecutionEngine<M> {
    pub fn new(mutator: M, preview_mode: bool) -> Self {
        Self {
            mutator,
            preview_mode,
        }
    }

    pub fn preview_mode(&self) -> bool {
        self.preview_mode
    }

    pub async fn execute(&self, action: &Action) -> ExecutionOutcome {
        if self.preview_mode {
            info!(
                "Preview mode active - not applying {} to {}",
                action.kind.as_str(),
                action.campaign_name
            );
            return ExecutionOutcome::Preview;
        }

        let result = match action.kind {
            ActionKind::Pause => self.mutator.pause_campaign(&action.campaign_id).await,
            ActionKind::IncreaseBudget {
                current_budget_micros,
                new_budget_micros,
            } => {
                self.mutator
                    .set_campaign_budget(
                        &action.campaign_id,
                        current_budget_micros,
                        new_budget_micros,
                    )
                    .await
            }
        };

        match result {
            Ok(()) => {
                info!("✅ {} applied: {}", action.kind.as_str(), action.campaign_name);
                ExecutionOutcome::Applied
            }
            Err(e) => {
                error!(
                    "❌ {} failed for {} ({}): {}",
                    action.kind.as_str(),
                    action.campaign_name,
                    action.campaign_id,
                    e
                );
                ExecutionOutcome::Failed(e.to_string())
            }
        }
    }

    /// Apply actions one at a time, in order. A failure does not stop the rest.
    pub async fn execute_all(&self, actions: &[Action]) -> Vec<ExecutionOutcome> {
        let mut outcomes = Vec::with_capacity(actions.len());
        for action in actions {
            outcomes.push(self.execute(action).await);
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use common::{Error, RuleId, Trigger};

    use super::*;

    #[derive(Default)]
    struct RecordingMutator {
        calls: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl RecordingMutator {
        fn record(&self, call: String, campaign_id: &str) -> common::Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail_on.as_deref() == Some(campaign_id) {
                return Err(Error::GoogleAdsApi {
                    status: 400,
                    message: "mutate rejected".into(),
                });
            }
            Ok(())
        }
    }

    impl CampaignMutator for RecordingMutator {
        async fn pause_campaign(&self, campaign_id: &str) -> common::Result<()> {
            self.record(format!("pause:{}", campaign_id), campaign_id)
        }

        async fn set_campaign_budget(
            &self,
            campaign_id: &str,
            current_micros: i64,
            new_micros: i64,
        ) -> common::Result<()> {
            self.record(
                format!("budget:{}:{}->{}", campaign_id, current_micros, new_micros),
                campaign_id,
            )
        }
    }

    fn pause(id: &str) -> Action {
        Action {
            campaign_id: id.into(),
            campaign_name: format!("Campaign {}", id),
            kind: ActionKind::Pause,
            reason: "Low CTR: 0.50% (threshold: 1%)".into(),
            trigger: Trigger {
                rule: RuleId::LowCtr,
                value: 0.5,
                threshold: 1.0,
            },
        }
    }

    fn increase(id: &str) -> Action {
        Action {
            kind: ActionKind::IncreaseBudget {
                current_budget_micros: 200_000_000,
                new_budget_micros: 240_000_000,
            },
            reason: "High ROAS: 4.00x (threshold: 3x)".into(),
            trigger: Trigger {
                rule: RuleId::HighRoas,
                value: 4.0,
                threshold: 3.0,
            },
            ..pause(id)
        }
    }

    #[tokio::test]
    async fn test_preview_mode_never_mutates() {
        let engine = ExecutionEngine::new(RecordingMutator::default(), true);
        let outcomes = engine.execute_all(&[pause("1"), increase("2")]).await;
        assert_eq!(outcomes, vec![ExecutionOutcome::Preview, ExecutionOutcome::Preview]);
        assert!(engine.mutator.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_live_mode_applies_in_order() {
        let engine = ExecutionEngine::new(RecordingMutator::default(), false);
        let outcomes = engine.execute_all(&[pause("1"), increase("2")]).await;
        assert_eq!(outcomes, vec![ExecutionOutcome::Applied, ExecutionOutcome::Applied]);
        assert_eq!(
            *engine.mutator.calls.lock().unwrap(),
            vec!["pause:1".to_string(), "budget:2:200000000->240000000".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_remaining_actions() {
        let mutator = RecordingMutator {
            fail_on: Some("1".into()),
            ..RecordingMutator::default()
        };
        let engine = ExecutionEngine::new(mutator, false);
        let outcomes = engine.execute_all(&[pause("1"), increase("2")]).await;
        assert!(matches!(outcomes[0], ExecutionOutcome::Failed(ref msg) if msg.contains("mutate rejected")));
        assert_eq!(outcomes[1], ExecutionOutcome::Applied);
        assert_eq!(engine.mutator.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ExecutionOutcome::Preview.label(), "PREVIEW");
        assert_eq!(ExecutionOutcome::Applied.label(), "APPLIED");
        assert_eq!(ExecutionOutcome::Failed("x".into()).label(), "FAILED");
    }
}
