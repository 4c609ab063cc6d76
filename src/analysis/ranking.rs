//! Ranking of countries by the average of a metric.

use super::descriptive;
use crate::dataset::CombinedDataset;
use crate::error::Result;
use crate::models::{RankingRow, RankingTable};

use std::cmp::Ordering;
use tracing::debug;

/// Rank countries by mean `metric`, highest first
///
/// Countries without a non-missing value are left out. Exactly equal
/// averages are ordered alphabetically by country label.
pub fn rank(dataset: &CombinedDataset, metric: &str) -> Result<RankingTable> {
    let groups = dataset.grouped_values(metric)?;

    let mut averages: Vec<_> = groups
        .into_iter()
        .filter_map(|(country, values)| descriptive::mean(&values).map(|avg| (country, avg)))
        .collect();

    averages.sort_by(|(country_a, avg_a), (country_b, avg_b)| {
        avg_b
            .partial_cmp(avg_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| country_a.cmp(country_b))
    });

    let rows: Vec<RankingRow> = averages
        .into_iter()
        .enumerate()
        .map(|(i, (country, average))| RankingRow {
            country,
            average,
            rank: i + 1,
        })
        .collect();

    debug!("Ranked {} countries by {}", rows.len(), metric);

    Ok(RankingTable {
        metric: metric.to_string(),
        rows,
    })
}

/// Alias used by the presentation layer
pub fn rank_countries_by_metric(dataset: &CombinedDataset, metric: &str) -> Result<RankingTable> {
    rank(dataset, metric)
}

impl RankingTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column heading for the average, e.g. `Average GHI`
    pub fn average_heading(&self) -> String {
        format!("Average {}", self.metric)
    }

    pub fn leader(&self) -> Option<&RankingRow> {
        self.rows.first()
    }
}
