//! Campaign metric records and the actions derived from them.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::money::from_micros;

/// Raw per-campaign aggregates as delivered by a metrics provider.
///
/// Monetary fields are micros. Nothing here is trusted until it has been
/// converted into a [`CampaignMetric`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub budget_micros: i64,
    pub cost_micros: i64,
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: f64,
    pub conversion_value_micros: i64,
}

/// A validated campaign record with its derived ratios.
///
/// Derived fields are computed once at construction. `cpa` is `None` when
/// the campaign has no conversions.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignMetric {
    id: String,
    name: String,
    budget_micros: i64,
    cost_micros: i64,
    impressions: i64,
    clicks: i64,
    conversions: f64,
    conversion_value_micros: i64,
    ctr: f64,
    cpa: Option<f64>,
    roas: f64,
}

impl CampaignMetric {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn budget_micros(&self) -> i64 {
        self.budget_micros
    }

    pub fn cost_micros(&self) -> i64 {
        self.cost_micros
    }

    pub fn impressions(&self) -> i64 {
        self.impressions
    }

    pub fn clicks(&self) -> i64 {
        self.clicks
    }

    pub fn conversions(&self) -> f64 {
        self.conversions
    }

    pub fn conversion_value_micros(&self) -> i64 {
        self.conversion_value_micros
    }

    /// Click-through rate as a percentage.
    pub fn ctr(&self) -> f64 {
        self.ctr
    }

    /// Cost per acquisition in currency units.
    pub fn cpa(&self) -> Option<f64> {
        self.cpa
    }

    /// Conversion value per unit of cost.
    pub fn roas(&self) -> f64 {
        self.roas
    }

    /// Validate a provider batch in order. The first invalid record fails
    /// the whole batch.
    pub fn from_snapshots(snapshots: Vec<CampaignSnapshot>) -> Result<Vec<Self>, Error> {
        snapshots.into_iter().map(Self::try_from).collect()
    }
}

fn require_non_negative(id: &str, field: &'static str, value: i64) -> Result<(), Error> {
    if value < 0 {
        return Err(Error::invalid_metric(
            id,
            field,
            format!("must be non-negative, got {}", value),
        ));
    }
    Ok(())
}

impl TryFrom<CampaignSnapshot> for CampaignMetric {
    type Error = Error;

    fn try_from(raw: CampaignSnapshot) -> Result<Self, Error> {
        if raw.id.trim().is_empty() {
            return Err(Error::invalid_metric(&raw.id, "id", "must not be empty"));
        }
        require_non_negative(&raw.id, "budget_micros", raw.budget_micros)?;
        require_non_negative(&raw.id, "cost_micros", raw.cost_micros)?;
        require_non_negative(&raw.id, "impressions", raw.impressions)?;
        require_non_negative(&raw.id, "clicks", raw.clicks)?;
        require_non_negative(
            &raw.id,
            "conversion_value_micros",
            raw.conversion_value_micros,
        )?;
        if !raw.conversions.is_finite() || raw.conversions < 0.0 {
            return Err(Error::invalid_metric(
                &raw.id,
                "conversions",
                format!("must be finite and non-negative, got {}", raw.conversions),
            ));
        }

        let ctr = if raw.impressions > 0 {
            raw.clicks as f64 * 100.0 / raw.impressions as f64
        } else {
            0.0
        };
        let cpa = if raw.conversions > 0.0 {
            Some(from_micros(raw.cost_micros) / raw.conversions)
        } else {
            None
        };
        let roas = if raw.cost_micros > 0 {
            raw.conversion_value_micros as f64 / raw.cost_micros as f64
        } else {
            0.0
        };

        Ok(Self {
            id: raw.id,
            name: raw.name,
            budget_micros: raw.budget_micros,
            cost_micros: raw.cost_micros,
            impressions: raw.impressions,
            clicks: raw.clicks,
            conversions: raw.conversions,
            conversion_value_micros: raw.conversion_value_micros,
            ctr,
            cpa,
            roas,
        })
    }
}

/// Which rule produced an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    HighCpa,
    LowCtr,
    HighRoas,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::HighCpa => "high_cpa",
            RuleId::LowCtr => "low_ctr",
            RuleId::HighRoas => "high_roas",
        }
    }
}

/// The measured value and the threshold it crossed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub rule: RuleId,
    pub value: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    Pause,
    IncreaseBudget {
        current_budget_micros: i64,
        new_budget_micros: i64,
    },
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Pause => "PAUSE",
            ActionKind::IncreaseBudget { .. } => "INCREASE_BUDGET",
        }
    }

    pub fn is_pause(&self) -> bool {
        matches!(self, ActionKind::Pause)
    }
}

/// One change recommended for one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub campaign_id: String,
    pub campaign_name: String,
    #[serde(flatten)]
    pub kind: ActionKind,
    pub reason: String,
    pub trigger: Trigger,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CampaignSnapshot {
        CampaignSnapshot {
            id: "101".into(),
            name: "Search - Generic".into(),
            budget_micros: 200_000_000,
            cost_micros: 100_000_000,
            impressions: 10_000,
            clicks: 300,
            conversions: 2.0,
            conversion_value_micros: 400_000_000,
        }
    }

    #[test]
    fn test_derived_ratios() {
        let m = CampaignMetric::try_from(snapshot()).unwrap();
        assert!((m.ctr() - 3.0).abs() < 1e-9);
        assert_eq!(m.cpa(), Some(50.0));
        assert!((m.roas() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_denominators() {
        let m = CampaignMetric::try_from(CampaignSnapshot {
            cost_micros: 0,
            impressions: 0,
            clicks: 0,
            conversions: 0.0,
            ..snapshot()
        })
        .unwrap();
        assert_eq!(m.ctr(), 0.0);
        assert_eq!(m.cpa(), None);
        assert_eq!(m.roas(), 0.0);
    }

    #[test]
    fn test_rejects_negative_cost() {
        let err = CampaignMetric::try_from(CampaignSnapshot {
            cost_micros: -1,
            ..snapshot()
        })
        .unwrap_err();
        match err {
            Error::InvalidMetric {
                campaign_id, field, ..
            } => {
                assert_eq!(campaign_id, "101");
                assert_eq!(field, "cost_micros");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_nan_conversions() {
        let err = CampaignMetric::try_from(CampaignSnapshot {
            conversions: f64::NAN,
            ..snapshot()
        })
        .unwrap_err();
        assert!(err.to_string().contains("conversions"));
    }

    #[test]
    fn test_rejects_blank_id() {
        let err = CampaignMetric::try_from(CampaignSnapshot {
            id: "  ".into(),
            ..snapshot()
        })
        .unwrap_err();
        assert!(err.to_string().contains("`id`"));
    }

    #[test]
    fn test_from_snapshots_keeps_order_and_fails_fast() {
        let second = CampaignSnapshot {
            id: "102".into(),
            ..snapshot()
        };
        let metrics = CampaignMetric::from_snapshots(vec![snapshot(), second.clone()]).unwrap();
        let ids: Vec<&str> = metrics.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["101", "102"]);

        let bad = CampaignSnapshot {
            impressions: -1,
            ..second
        };
        let err = CampaignMetric::from_snapshots(vec![snapshot(), bad]).unwrap_err();
        assert!(err.to_string().contains("impressions"));
    }

    #[test]
    fn test_action_serializes_with_flat_kind() {
        let action = Action {
            campaign_id: "7".into(),
            campaign_name: "Shopping".into(),
            kind: ActionKind::IncreaseBudget {
                current_budget_micros: 1,
                new_budget_micros: 2,
            },
            reason: "High ROAS: 4.00x (threshold: 3x)".into(),
            trigger: Trigger {
                rule: RuleId::HighRoas,
                value: 4.0,
                threshold: 3.0,
            },
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["kind"], "increase_budget");
        assert_eq!(value["new_budget_micros"], 2);
        assert_eq!(value["trigger"]["rule"], "high_roas");
    }
}
