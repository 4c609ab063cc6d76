//! Chart inputs for the presentation layer.
//!
//! Every function takes the combined dataset, a metric and a country
//! selection. An empty selection means every country present in the data.
//! Nothing here draws; the results carry exactly what a plotting front end
//! needs.

use super::descriptive;
use crate::constants::BOXPLOT_WHISKER_IQR;
use crate::dataset::CombinedDataset;
use crate::error::{Result, SolarError};
use crate::models::{Country, Metric};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Box statistics of one country's values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSeries {
    pub country: Country,
    pub values: Vec<f64>,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value at or above `q1 - 1.5 * IQR`
    pub lower_whisker: f64,
    /// Largest value at or below `q3 + 1.5 * IQR`
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSeries {
    fn from_values(country: Country, values: Vec<f64>) -> Option<Self> {
        let sorted = descriptive::sorted(&values);
        let q1 = descriptive::quantile_sorted(&sorted, 0.25)?;
        let median = descriptive::quantile_sorted(&sorted, 0.5)?;
        let q3 = descriptive::quantile_sorted(&sorted, 0.75)?;

        let reach = BOXPLOT_WHISKER_IQR * (q3 - q1);
        let (low_fence, high_fence) = (q1 - reach, q3 + reach);

        let inside = sorted.iter().filter(|v| **v >= low_fence && **v <= high_fence);
        let lower_whisker = inside.clone().next().copied().unwrap_or(q1);
        let upper_whisker = inside.last().copied().unwrap_or(q3);

        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            country,
            values,
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Boxplot comparing one metric across countries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonFigure {
    pub metric: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<BoxSeries>,
}

/// Mean of a metric for one country on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub country: Country,
    pub mean: f64,
}

/// Value distribution of one country over shared bin edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub country: Country,
    /// `counts.len() + 1` ascending edges; the last bin is closed
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Header figures shown above the charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub total_records: usize,
    /// Mean of the metric over the whole selection
    pub average: Option<f64>,
    pub countries_selected: usize,
}

/// Boxplot of `metric` for the selected countries
pub fn create_comparison_boxplot(
    dataset: &CombinedDataset,
    metric: &str,
    countries: &[Country],
) -> Result<ComparisonFigure> {
    let groups = selected_groups(dataset, metric, countries)?;

    let series: Vec<BoxSeries> = groups
        .into_iter()
        .filter_map(|(country, values)| BoxSeries::from_values(country, values))
        .collect();

    debug!("Built {} boxplot series for {}", series.len(), metric);

    Ok(ComparisonFigure {
        metric: metric.to_string(),
        title: format!("{} Comparison Across Countries", metric),
        x_label: "Country".to_string(),
        y_label: Metric::axis_label(metric),
        series,
    })
}

/// Mean of `metric` per calendar day and country, ordered by date then country
pub fn daily_averages(
    dataset: &CombinedDataset,
    metric: &str,
    countries: &[Country],
) -> Result<Vec<DailyAverage>> {
    let selection = select(dataset, metric, countries)?;

    let mut sums: BTreeMap<(NaiveDate, Country), (f64, usize)> = BTreeMap::new();
    for (date, (country, value)) in selection
        .dates()?
        .into_iter()
        .zip(selection.observations(metric)?)
    {
        if let (Some(date), Some(value)) = (date, value) {
            let entry = sums.entry((date, country)).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    Ok(sums
        .into_iter()
        .map(|((date, country), (sum, count))| DailyAverage {
            date,
            country,
            mean: sum / count as f64,
        })
        .collect())
}

/// Per-country histograms of `metric` over `bins` shared equal-width bins
pub fn histogram(
    dataset: &CombinedDataset,
    metric: &str,
    countries: &[Country],
    bins: usize,
) -> Result<Vec<Histogram>> {
    if bins == 0 {
        return Err(SolarError::insufficient_data(
            metric,
            "a histogram needs at least one bin",
        ));
    }

    let groups = selected_groups(dataset, metric, countries)?;
    let all_values: Vec<f64> = groups.values().flatten().copied().collect();
    let (Some(low), Some(high)) = (
        descriptive::min(&all_values),
        descriptive::max(&all_values),
    ) else {
        return Ok(Vec::new());
    };

    // A single distinct value still gets a bin of unit width
    let (low, high) = if low == high {
        (low - 0.5, high + 0.5)
    } else {
        (low, high)
    };
    let width = (high - low) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { high } else { low + width * i as f64 })
        .collect();

    Ok(groups
        .into_iter()
        .map(|(country, values)| {
            let mut counts = vec![0; bins];
            for value in values {
                let index = (((value - low) / width).floor() as usize).min(bins - 1);
                counts[index] += 1;
            }
            Histogram {
                country,
                edges: edges.clone(),
                counts,
            }
        })
        .collect())
}

/// Record count, overall mean and number of countries for the selection
pub fn overview(
    dataset: &CombinedDataset,
    metric: &str,
    countries: &[Country],
) -> Result<DashboardOverview> {
    let selection = select(dataset, metric, countries)?;
    let values: Vec<f64> = selection.metric_values(metric)?.into_iter().flatten().collect();

    let countries_selected = if countries.is_empty() {
        selection.countries()?.len()
    } else {
        countries.len()
    };

    Ok(DashboardOverview {
        total_records: selection.height(),
        average: descriptive::mean(&values),
        countries_selected,
    })
}

fn select(
    dataset: &CombinedDataset,
    metric: &str,
    countries: &[Country],
) -> Result<CombinedDataset> {
    if !dataset.has_metric(metric) {
        return Err(SolarError::unknown_metric(metric));
    }
    if countries.is_empty() {
        Ok(dataset.clone())
    } else {
        dataset.filter_countries(countries)
    }
}

fn selected_groups(
    dataset: &CombinedDataset,
    metric: &str,
    countries: &[Country],
) -> Result<BTreeMap<Country, Vec<f64>>> {
    select(dataset, metric, countries)?.grouped_values(metric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_series_whiskers_and_outliers() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let series = BoxSeries::from_values(Country::Togo, values).unwrap();

        assert_eq!(series.q1, 2.25);
        assert_eq!(series.median, 3.5);
        assert_eq!(series.q3, 4.75);
        assert_eq!(series.lower_whisker, 1.0);
        assert_eq!(series.upper_whisker, 5.0);
        assert_eq!(series.outliers, vec![100.0]);
        assert_eq!(series.iqr(), 2.5);
    }

    #[test]
    fn test_box_series_single_value() {
        let series = BoxSeries::from_values(Country::Benin, vec![7.0]).unwrap();
        assert_eq!(series.lower_whisker, 7.0);
        assert_eq!(series.upper_whisker, 7.0);
        assert!(series.outliers.is_empty());
    }

    #[test]
    fn test_box_series_empty() {
        assert!(BoxSeries::from_values(Country::Benin, Vec::new()).is_none());
    }
}
