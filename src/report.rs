//! Account-level performance summary for `--list`.

use common::money::{format_money, from_micros};
use common::CampaignMetric;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub total_campaigns: usize,
    pub total_spend_micros: i64,
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub total_conversions: f64,
    /// Mean of per-campaign CTRs.
    pub avg_ctr: f64,
    /// Account-wide clicks / impressions.
    pub overall_ctr: Option<f64>,
    pub overall_cpa: Option<f64>,
}

impl PerformanceSummary {
    /// `None` for an empty account.
    pub fn from_metrics(metrics: &[CampaignMetric]) -> Option<Self> {
        if metrics.is_empty() {
            return None;
        }

        let total_spend_micros: i64 = metrics.iter().map(|m| m.cost_micros()).sum();
        let total_impressions: i64 = metrics.iter().map(|m| m.impressions()).sum();
        let total_clicks: i64 = metrics.iter().map(|m| m.clicks()).sum();
        let total_conversions: f64 = metrics.iter().map(|m| m.conversions()).sum();
        let avg_ctr = metrics.iter().map(|m| m.ctr()).sum::<f64>() / metrics.len() as f64;

        let overall_ctr = (total_impressions > 0)
            .then(|| total_clicks as f64 * 100.0 / total_impressions as f64);
        let overall_cpa = (total_conversions > 0.0 && total_spend_micros > 0)
            .then(|| from_micros(total_spend_micros) / total_conversions);

        Some(Self {
            total_campaigns: metrics.len(),
            total_spend_micros,
            total_impressions,
            total_clicks,
            total_conversions,
            avg_ctr,
            overall_ctr,
            overall_cpa,
        })
    }
}

fn optional(value: Option<f64>, suffix: &str) -> String {
    value
        .map(|v| format!("{:.2}{}", v, suffix))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn log_campaigns(metrics: &[CampaignMetric]) {
    info!("📊 Campaign overview:");
    for m in metrics {
        info!(
            "   {} ({}) budget={} cost={} ctr={:.2}% cpa={} roas={:.2}x",
            m.name(),
            m.id(),
            format_money(m.budget_micros()),
            format_money(m.cost_micros()),
            m.ctr(),
            m.cpa()
                .map(|cpa| format!("${:.2}", cpa))
                .unwrap_or_else(|| "n/a".to_string()),
            m.roas()
        );
    }

    match PerformanceSummary::from_metrics(metrics) {
        None => info!("No campaigns found"),
        Some(summary) => {
            info!("📈 Performance summary:");
            info!("   campaigns: {}", summary.total_campaigns);
            info!("   spend: {}", format_money(summary.total_spend_micros));
            info!("   clicks: {}", summary.total_clicks);
            info!("   impressions: {}", summary.total_impressions);
            info!("   conversions: {:.2}", summary.total_conversions);
            info!("   avg ctr: {:.2}%", summary.avg_ctr);
            info!("   overall ctr: {}", optional(summary.overall_ctr, "%"));
            info!("   overall cpa: {}", optional(summary.overall_cpa, ""));
        }
    }
}

#[cfg(test)]
mod tests {
    use common::CampaignSnapshot;

    use super::*;

    fn metric(cost: i64, impressions: i64, clicks: i64, conversions: f64) -> CampaignMetric {
        CampaignMetric::try_from(CampaignSnapshot {
            id: "1".into(),
            name: "C".into(),
            budget_micros: 0,
            cost_micros: cost,
            impressions,
            clicks,
            conversions,
            conversion_value_micros: 0,
        })
        .unwrap()
    }

    #[test]
    fn test_empty_summary() {
        assert!(PerformanceSummary::from_metrics(&[]).is_none());
    }

    #[test]
    fn test_summary_totals() {
        let summary = PerformanceSummary::from_metrics(&[
            metric(100_000_000, 2_500, 50, 5.0),
            metric(200_000_000, 5_000, 150, 10.0),
        ])
        .unwrap();

        assert_eq!(summary.total_campaigns, 2);
        assert_eq!(summary.total_spend_micros, 300_000_000);
        assert_eq!(summary.total_conversions, 15.0);
        assert_eq!(summary.overall_cpa, Some(20.0));
        // 200 clicks / 7500 impressions
        assert!((summary.overall_ctr.unwrap() - 2.6666666).abs() < 1e-6);
        // (2.0 + 3.0) / 2
        assert!((summary.avg_ctr - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_summary_without_conversions_has_no_cpa() {
        let summary = PerformanceSummary::from_metrics(&[metric(100_000_000, 0, 0, 0.0)]).unwrap();
        assert_eq!(summary.overall_cpa, None);
        assert_eq!(summary.overall_ctr, None);
    }
}
