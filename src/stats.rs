use crate::models::User;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Elo summary for one region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionSummary {
    pub region: String,
    /// Enabled users only; the elo figures are computed over these.
    pub count: usize,
    /// Disabled users, counted apart from `count`.
    pub disabled: usize,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute elo statistics per region. Disabled accounts are counted but do not
/// contribute to the elo figures.
pub fn region_summary(users: &[User]) -> Vec<RegionSummary> {
    let mut groups: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
    let mut disabled: BTreeMap<&str, usize> = BTreeMap::new();
    for u in users {
        if u.disabled {
            *disabled.entry(u.region.as_str()).or_default() += 1;
            groups.entry(u.region.as_str()).or_default();
        } else {
            groups.entry(u.region.as_str()).or_default().push(u.elo);
        }
    }

    let mut out = Vec::new();
    for (region, mut vals) in groups {
        vals.sort_unstable();
        let count = vals.len();
        let min = vals.first().copied();
        let max = vals.last().copied();
        let mean = if count > 0 {
            Some(vals.iter().map(|&v| v as f64).sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2] as f64)
        } else {
            Some((vals[count / 2 - 1] as f64 + vals[count / 2] as f64) / 2.0)
        };
        let dis = disabled.get(region).copied().unwrap_or(0);
        out.push(RegionSummary {
            region: region.to_string(),
            count,
            disabled: dis,
            min,
            max,
            mean,
            median,
        });
    }
    out
}
