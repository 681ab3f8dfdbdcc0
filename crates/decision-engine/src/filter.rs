//! Campaign name filter stage.

use common::{CampaignMetric, FilterConfig};

/// Case-insensitive substring include / exclude filter.
///
/// Exclusion is checked after inclusion, so a name matching both is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    include: Option<String>,
    exclude: Option<String>,
}

fn non_empty_lower(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_lowercase())
    }
}

impl NameFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            include: non_empty_lower(&config.include_substring),
            exclude: non_empty_lower(&config.exclude_substring),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        if let Some(include) = &self.include {
            if !name.contains(include.as_str()) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if name.contains(exclude.as_str()) {
                return false;
            }
        }
        true
    }

    /// Eligible campaigns, in input order.
    pub fn apply<'a>(&self, metrics: &'a [CampaignMetric]) -> Vec<&'a CampaignMetric> {
        metrics.iter().filter(|m| self.matches(m.name())).collect()
    }
}
