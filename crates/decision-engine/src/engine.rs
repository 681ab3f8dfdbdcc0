use common::{Action, CampaignMetric, CampaignSnapshot, FilterConfig, RulesConfig};
use tracing::debug;

use crate::filter::NameFilter;
use crate::rules::RULE_CHAIN;
use crate::types::{RuleOutcome, RulePolicy, Verdict};

/// Filter -> min-spend gate -> rule chain, one action per campaign at most.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    policy: RulePolicy,
    filter: NameFilter,
}

impl DecisionEngine {
    pub fn new(rules: &RulesConfig, filters: &FilterConfig) -> common::Result<Self> {
        rules.validate()?;
        Ok(Self {
            policy: RulePolicy::from_config(rules),
            filter: NameFilter::new(filters),
        })
    }

    /// Gate and rule chain for a campaign that already passed the name filter.
    fn judge(&self, metric: &CampaignMetric) -> Verdict {
        if metric.cost_micros() < self.policy.min_spend_micros {
            return Verdict::BelowMinSpend;
        }

        for rule in RULE_CHAIN {
            match rule.evaluate(metric, &self.policy) {
                RuleOutcome::Pass => continue,
                RuleOutcome::Emit(action) => return Verdict::Flagged(action),
                RuleOutcome::Suppress => return Verdict::Suppressed(rule.id()),
            }
        }
        Verdict::NoRuleMatched
    }

    /// Full verdict for a single campaign, including the name filter.
    pub fn explain(&self, metric: &CampaignMetric) -> Verdict {
        if !self.filter.matches(metric.name()) {
            return Verdict::Filtered;
        }
        self.judge(metric)
    }

    /// Actions for every flagged campaign, in input order.
    pub fn evaluate(&self, metrics: &[CampaignMetric]) -> Vec<Action> {
        let eligible = self.filter.apply(metrics);
        debug!(
            "Filter kept {}/{} campaigns",
            eligible.len(),
            metrics.len()
        );

        eligible
            .into_iter()
            .filter_map(|metric| match self.judge(metric) {
                Verdict::Flagged(action) => Some(action),
                verdict => {
                    debug!(
                        "{} ({}): {}",
                        metric.name(),
                        metric.id(),
                        verdict.label()
                    );
                    None
                }
            })
            .collect()
    }

    /// Validate raw records, then evaluate. Any invalid record fails the
    /// whole batch.
    pub fn evaluate_snapshots(
        &self,
        snapshots: Vec<CampaignSnapshot>,
    ) -> common::Result<Vec<Action>> {
        let metrics = CampaignMetric::from_snapshots(snapshots)?;
        Ok(self.evaluate(&metrics))
    }
}
