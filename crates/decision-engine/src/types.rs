use common::money::to_micros;
use common::{Action, FilterConfig, RuleId, RulesConfig};

/// Rule thresholds resolved into the units the rules compare in.
#[derive(Debug, Clone, PartialEq)]
pub struct RulePolicy {
    pub pause_cpa_above: f64,
    pub pause_ctr_below: f64,
    pub increase_budget_roas_above: f64,
    pub increase_percent: f64,
    pub max_budget_micros: i64,
    pub min_spend_micros: i64,
}

impl RulePolicy {
    /// Callers must validate `rules` first.
    pub(crate) fn from_config(rules: &RulesConfig) -> Self {
        Self {
            pause_cpa_above: rules.pause_cpa_above,
            pause_ctr_below: rules.pause_ctr_below,
            increase_budget_roas_above: rules.increase_budget_roas_above,
            increase_percent: rules.budget_increase_percent,
            max_budget_micros: to_micros(rules.max_budget),
            min_spend_micros: to_micros(rules.min_spend_to_evaluate),
        }
    }
}

/// Result of applying one rule to one campaign.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// Condition not met; the next rule in the chain is tried.
    Pass,
    /// Condition met; stop and emit this action.
    Emit(Action),
    /// Condition met but there is nothing to change; stop without an action.
    Suppress,
}

/// Why a campaign did or did not produce an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Filtered,
    BelowMinSpend,
    NoRuleMatched,
    Suppressed(RuleId),
    Flagged(Action),
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Filtered => "filtered",
            Verdict::BelowMinSpend => "below_min_spend",
            Verdict::NoRuleMatched => "no_rule_matched",
            Verdict::Suppressed(_) => "suppressed",
            Verdict::Flagged(_) => "flagged",
        }
    }
}

/// Snapshot of the filter settings, for run narration.
pub fn describe_filters(filters: &FilterConfig) -> String {
    let include = filters.include_substring.as_str();
    let exclude = filters.exclude_substring.as_str();
    match (include.is_empty(), exclude.is_empty()) {
        (true, true) => "all campaigns".to_string(),
        (false, true) => format!("only names containing '{}'", include),
        (true, false) => format!("excluding names containing '{}'", exclude),
        (false, false) => format!(
            "only names containing '{}', excluding '{}'",
            include, exclude
        ),
    }
}
