//! GAQL report queries and `searchStream` row decoding.

use common::money::to_micros;
use common::{CampaignSnapshot, Error};
use serde::{Deserialize, Deserializer};

/// Date windows GAQL accepts as `LAST_N_DAYS` literals.
pub const SUPPORTED_WINDOWS: [u32; 3] = [7, 14, 30];

/// Strip dashes and whitespace from a customer id (`123-456-7890` -> `1234567890`).
pub fn normalize_customer_id(raw: &str) -> Result<String, Error> {
    let id: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();
    if id.is_empty() {
        return Err(Error::Config("GOOGLE_ADS_CUSTOMER_ID is required".into()));
    }
    if !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Config(format!(
            "customer id must contain only digits and dashes, got {:?}",
            raw
        )));
    }
    Ok(id)
}

/// Enabled-campaign performance report over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignQuery {
    pub days: u32,
    pub min_impressions: i64,
}

impl CampaignQuery {
    pub fn new(days: u32, min_impressions: i64) -> Result<Self, Error> {
        if !SUPPORTED_WINDOWS.contains(&days) {
            return Err(Error::Config(format!(
                "days_to_analyze must be one of {:?}, got {}",
                SUPPORTED_WINDOWS, days
            )));
        }
        Ok(Self {
            days,
            min_impressions,
        })
    }

    pub fn to_gaql(&self) -> String {
        format!(
            "SELECT campaign.id, campaign.name, campaign.status, \
             campaign_budget.amount_micros, metrics.impressions, metrics.clicks, \
             metrics.cost_micros, metrics.conversions, metrics.conversions_value \
             FROM campaign \
             WHERE campaign.status = 'ENABLED' \
             AND metrics.impressions > {} \
             AND segments.date DURING LAST_{}_DAYS",
            self.min_impressions, self.days
        )
    }
}

/// GAQL lookup of the budget resource attached to a campaign.
pub fn budget_resource_query(campaign_id: &str) -> Result<String, Error> {
    if campaign_id.is_empty() || !campaign_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Other(format!(
            "campaign id must be numeric, got {:?}",
            campaign_id
        )));
    }
    Ok(format!(
        "SELECT campaign_budget.resource_name FROM campaign WHERE campaign.id = {}",
        campaign_id
    ))
}

/// The API encodes int64 as JSON strings; accept numbers too.
fn de_int64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Text(String),
        Number(i64),
    }

    match Int64::deserialize(deserializer)? {
        Int64::Number(n) => Ok(n),
        Int64::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchStreamBatch {
    #[serde(default)]
    pub results: Vec<SearchRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRow {
    #[serde(default)]
    pub campaign: Option<CampaignField>,
    #[serde(default)]
    pub campaign_budget: Option<CampaignBudgetField>,
    #[serde(default)]
    pub metrics: Option<MetricsField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignField {
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default, deserialize_with = "de_int64")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBudgetField {
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default, deserialize_with = "de_int64")]
    pub amount_micros: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsField {
    #[serde(default, deserialize_with = "de_int64")]
    pub impressions: i64,
    #[serde(default, deserialize_with = "de_int64")]
    pub clicks: i64,
    #[serde(default, deserialize_with = "de_int64")]
    pub cost_micros: i64,
    #[serde(default)]
    pub conversions: f64,
    /// Currency units, not micros.
    #[serde(default)]
    pub conversions_value: f64,
}

/// Flatten `searchStream` batches into campaign snapshots, in order.
pub fn parse_campaign_rows(batches: Vec<SearchStreamBatch>) -> Result<Vec<CampaignSnapshot>, Error> {
    let mut snapshots = Vec::new();
    for row in batches.into_iter().flat_map(|b| b.results) {
        let campaign = row
            .campaign
            .ok_or_else(|| Error::Other("searchStream row missing campaign".into()))?;
        let metrics = row.metrics.unwrap_or_default();
        let budget_micros = row.campaign_budget.map(|b| b.amount_micros).unwrap_or(0);

        snapshots.push(CampaignSnapshot {
            id: campaign.id.to_string(),
            name: campaign.name,
            budget_micros,
            cost_micros: metrics.cost_micros,
            impressions: metrics.impressions,
            clicks: metrics.clicks,
            conversions: metrics.conversions,
            conversion_value_micros: to_micros(metrics.conversions_value),
        });
    }
    Ok(snapshots)
}

/// First budget resource name in a `searchStream` response.
pub fn parse_budget_resource(batches: Vec<SearchStreamBatch>) -> Option<String> {
    batches
        .into_iter()
        .flat_map(|b| b.results)
        .find_map(|row| row.campaign_budget.and_then(|b| b.resource_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_customer_id() {
        assert_eq!(normalize_customer_id("123-456-7890").unwrap(), "1234567890");
        assert_eq!(normalize_customer_id(" 1234567890 ").unwrap(), "1234567890");
    }

    #[test]
    fn test_normalize_customer_id_rejects_empty() {
        let err = normalize_customer_id("--").unwrap_err();
        assert!(err.to_string().contains("GOOGLE_ADS_CUSTOMER_ID"));
        assert!(normalize_customer_id("12a-456").is_err());
    }

    #[test]
    fn test_query_rejects_unsupported_window() {
        assert!(CampaignQuery::new(14, 100).is_ok());
        assert!(CampaignQuery::new(10, 100).is_err());
    }

    #[test]
    fn test_gaql_contains_window_and_floor() {
        let gaql = CampaignQuery::new(14, 100).unwrap().to_gaql();
        assert!(gaql.contains("DURING LAST_14_DAYS"));
        assert!(gaql.contains("metrics.impressions > 100"));
        assert!(gaql.contains("campaign.status = 'ENABLED'"));
    }

    #[test]
    fn test_budget_query_requires_numeric_id() {
        assert!(budget_resource_query("123").unwrap().ends_with("campaign.id = 123"));
        assert!(budget_resource_query("1 OR 1=1").is_err());
    }

    #[test]
    fn test_parse_campaign_rows() {
        let body = r#"[
            {"results": [
                {
                    "campaign": {"resourceName": "customers/1/campaigns/11", "id": "11", "name": "Search A", "status": "ENABLED"},
                    "campaignBudget": {"resourceName": "customers/1/campaignBudgets/9", "amountMicros": "200000000"},
                    "metrics": {"impressions": "10000", "clicks": "300", "costMicros": "100000000", "conversions": 2.0, "conversionsValue": 400.0}
                }
            ]},
            {"results": [
                {
                    "campaign": {"id": "12", "name": "Display B"},
                    "metrics": {"impressions": "150"}
                }
            ]}
        ]"#;
        let batches: Vec<SearchStreamBatch> = serde_json::from_str(body).unwrap();
        let rows = parse_campaign_rows(batches).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "11");
        assert_eq!(rows[0].budget_micros, 200_000_000);
        assert_eq!(rows[0].cost_micros, 100_000_000);
        assert_eq!(rows[0].conversion_value_micros, 400_000_000);
        assert_eq!(rows[1].id, "12");
        assert_eq!(rows[1].clicks, 0);
        assert_eq!(rows[1].budget_micros, 0);
    }

    #[test]
    fn test_parse_rejects_bad_int64() {
        let body = r#"[{"results": [{"campaign": {"id": "abc"}}]}]"#;
        assert!(serde_json::from_str::<Vec<SearchStreamBatch>>(body).is_err());
    }

    #[test]
    fn test_parse_budget_resource() {
        let body = r#"[{"results": [{"campaignBudget": {"resourceName": "customers/1/campaignBudgets/9"}}]}]"#;
        let batches: Vec<SearchStreamBatch> = serde_json::from_str(body).unwrap();
        assert_eq!(
            parse_budget_resource(batches).as_deref(),
            Some("customers/1/campaignBudgets/9")
        );
    }
}
