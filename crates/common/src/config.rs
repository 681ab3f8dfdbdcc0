//! Rule thresholds and name filters.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Thresholds and budget policy applied by the decision engine.
///
/// Monetary values are in account currency units; the engine converts them
/// to micros once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Pause when CPA is strictly above this amount.
    #[serde(default = "default_pause_cpa_above")]
    pub pause_cpa_above: f64,

    /// Pause when CTR (percent) is strictly below this value.
    #[serde(default = "default_pause_ctr_below")]
    pub pause_ctr_below: f64,

    /// Raise budget when ROAS is strictly above this multiple.
    #[serde(default = "default_increase_budget_roas_above")]
    pub increase_budget_roas_above: f64,

    /// Budget increase step, percent of the current budget.
    #[serde(default = "default_budget_increase_percent")]
    pub budget_increase_percent: f64,

    /// Budgets are never raised above this amount.
    #[serde(default = "default_max_budget")]
    pub max_budget: f64,

    /// Campaigns that spent less than this are not evaluated.
    #[serde(default = "default_min_spend_to_evaluate")]
    pub min_spend_to_evaluate: f64,
}

/// Case-insensitive campaign name filters. Empty means "not configured".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Only campaigns whose name contains this text are evaluated.
    #[serde(default)]
    pub include_substring: String,

    /// Campaigns whose name contains this text are never evaluated.
    #[serde(default)]
    pub exclude_substring: String,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_pause_cpa_above() -> f64 {
    100.0
}
fn default_pause_ctr_below() -> f64 {
    1.0
}
fn default_increase_budget_roas_above() -> f64 {
    3.0
}
fn default_budget_increase_percent() -> f64 {
    20.0
}
fn default_max_budget() -> f64 {
    500.0
}
fn default_min_spend_to_evaluate() -> f64 {
    50.0
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            pause_cpa_above: default_pause_cpa_above(),
            pause_ctr_below: default_pause_ctr_below(),
            increase_budget_roas_above: default_increase_budget_roas_above(),
            budget_increase_percent: default_budget_increase_percent(),
            max_budget: default_max_budget(),
            min_spend_to_evaluate: default_min_spend_to_evaluate(),
        }
    }
}

impl RulesConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let fields = [
            ("pause_cpa_above", self.pause_cpa_above),
            ("pause_ctr_below", self.pause_ctr_below),
            ("increase_budget_roas_above", self.increase_budget_roas_above),
            ("budget_increase_percent", self.budget_increase_percent),
            ("max_budget", self.max_budget),
            ("min_spend_to_evaluate", self.min_spend_to_evaluate),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Config(format!(
                "rules.{} must be a finite number, got {}",
                name, value
            )));
        }

        if self.budget_increase_percent <= 0.0 {
            return Err(Error::Config(format!(
                "rules.budget_increase_percent must be > 0, got {}",
                self.budget_increase_percent
            )));
        }
        if self.max_budget <= 0.0 {
            return Err(Error::Config(format!(
                "rules.max_budget must be > 0, got {}",
                self.max_budget
            )));
        }
        if self.min_spend_to_evaluate < 0.0 {
            return Err(Error::Config(format!(
                "rules.min_spend_to_evaluate must be >= 0, got {}",
                self.min_spend_to_evaluate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(RulesConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_increase() {
        let cfg = RulesConfig {
            budget_increase_percent: 0.0,
            ..RulesConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("budget_increase_percent"));
    }

    #[test]
    fn test_rejects_non_finite_threshold() {
        let cfg = RulesConfig {
            pause_ctr_below: f64::INFINITY,
            ..RulesConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_min_spend() {
        let cfg = RulesConfig {
            min_spend_to_evaluate: -1.0,
            ..RulesConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
