//! The ordered rule chain. The first rule that does not `Pass` decides.

use common::money::format_money;
use common::{Action, ActionKind, CampaignMetric, RuleId, Trigger};

use crate::budget::candidate_budget;
use crate::types::{RuleOutcome, RulePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    HighCpaPause,
    LowCtrPause,
    HighRoasIncrease,
}

/// Evaluation order. Earlier rules take precedence.
pub const RULE_CHAIN: [Rule; 3] = [Rule::HighCpaPause, Rule::LowCtrPause, Rule::HighRoasIncrease];

fn action(metric: &CampaignMetric, kind: ActionKind, reason: String, trigger: Trigger) -> Action {
    Action {
        campaign_id: metric.id().to_string(),
        campaign_name: metric.name().to_string(),
        kind,
        reason,
        trigger,
    }
}

impl Rule {
    pub fn id(&self) -> RuleId {
        match self {
            Rule::HighCpaPause => RuleId::HighCpa,
            Rule::LowCtrPause => RuleId::LowCtr,
            Rule::HighRoasIncrease => RuleId::HighRoas,
        }
    }

    pub fn evaluate(&self, metric: &CampaignMetric, policy: &RulePolicy) -> RuleOutcome {
        match self {
            Rule::HighCpaPause => {
                let threshold = policy.pause_cpa_above;
                match metric.cpa() {
                    Some(cpa) if cpa > threshold => RuleOutcome::Emit(action(
                        metric,
                        ActionKind::Pause,
                        format!("High CPA: ${:.2} (threshold: ${})", cpa, threshold),
                        Trigger {
                            rule: self.id(),
                            value: cpa,
                            threshold,
                        },
                    )),
                    _ => RuleOutcome::Pass,
                }
            }
            Rule::LowCtrPause => {
                let threshold = policy.pause_ctr_below;
                let ctr = metric.ctr();
                if ctr < threshold {
                    RuleOutcome::Emit(action(
                        metric,
                        ActionKind::Pause,
                        format!("Low CTR: {:.2}% (threshold: {}%)", ctr, threshold),
                        Trigger {
                            rule: self.id(),
                            value: ctr,
                            threshold,
                        },
                    ))
                } else {
                    RuleOutcome::Pass
                }
            }
            Rule::HighRoasIncrease => {
                let threshold = policy.increase_budget_roas_above;
                let roas = metric.roas();
                if !(roas > threshold && metric.conversions() >= 1.0) {
                    return RuleOutcome::Pass;
                }

                let current = metric.budget_micros();
                let candidate =
                    candidate_budget(current, policy.increase_percent, policy.max_budget_micros);
                if candidate <= current {
                    return RuleOutcome::Suppress;
                }

                RuleOutcome::Emit(action(
                    metric,
                    ActionKind::IncreaseBudget {
                        current_budget_micros: current,
                        new_budget_micros: candidate,
                    },
                    format!("High ROAS: {:.2}x (threshold: {}x)", roas, threshold),
                    Trigger {
                        rule: self.id(),
                        value: roas,
                        threshold,
                    },
                ))
            }
        }
    }
}

/// Human-readable budget change, e.g. `$200.00 → $240.00`.
pub fn budget_change_label(kind: &ActionKind) -> Option<String> {
    match kind {
        ActionKind::IncreaseBudget {
            current_budget_micros,
            new_budget_micros,
        } => Some(format!(
            "{} → {}",
            format_money(*current_budget_micros),
            format_money(*new_budget_micros)
        )),
        ActionKind::Pause => None,
    }
}
