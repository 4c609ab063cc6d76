//! Grouped descriptive statistics and the summary CSV export.
//!
//! Statistics are computed at full precision; rounding is applied only when
//! producing the display form.

use super::descriptive;
use crate::constants::DISPLAY_DECIMALS;
use crate::dataset::CombinedDataset;
use crate::error::{Result, SolarError};
use crate::models::{Country, SummaryRow, SummaryTable};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Headline findings of a summary table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryInsights {
    /// Country with the highest mean and that mean
    pub highest_mean: (Country, f64),
    /// Country with the lowest standard deviation, if any group has one
    pub most_consistent: Option<(Country, f64)>,
}

/// Per-country statistics of `metric`, optionally restricted to `countries`
///
/// An empty `countries` slice yields an empty table. Countries without any
/// non-missing value get no row.
pub fn summarize(
    dataset: &CombinedDataset,
    metric: &str,
    countries: Option<&[Country]>,
) -> Result<SummaryTable> {
    if !dataset.has_metric(metric) {
        return Err(SolarError::unknown_metric(metric));
    }

    let groups = match countries {
        Some([]) => BTreeMap::new(),
        Some(subset) => dataset.filter_countries(subset)?.grouped_values(metric)?,
        None => dataset.grouped_values(metric)?,
    };

    let rows = groups
        .into_iter()
        .filter_map(|(country, values)| summarize_group(country, &values))
        .collect::<Vec<_>>();

    debug!("Summarized {} over {} countries", metric, rows.len());

    Ok(SummaryTable {
        metric: metric.to_string(),
        rows,
    })
}

/// Summary of every country, rounded for display
pub fn calculate_summary_stats(dataset: &CombinedDataset, metric: &str) -> Result<SummaryTable> {
    Ok(summarize(dataset, metric, None)?.rounded(DISPLAY_DECIMALS))
}

fn summarize_group(country: Country, values: &[f64]) -> Option<SummaryRow> {
    Some(SummaryRow {
        country,
        mean: descriptive::mean(values)?,
        median: descriptive::median(values)?,
        std_dev: descriptive::sample_std(values),
        min: descriptive::min(values)?,
        max: descriptive::max(values)?,
        count: values.len(),
    })
}

/// Row layout of the exported CSV
#[derive(Debug, Serialize, Deserialize)]
struct SummaryRecord {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Mean")]
    mean: f64,
    #[serde(rename = "Median")]
    median: f64,
    #[serde(rename = "Std Dev")]
    std_dev: Option<f64>,
    #[serde(rename = "Min")]
    min: f64,
    #[serde(rename = "Max")]
    max: f64,
    #[serde(rename = "Count")]
    count: usize,
}

impl SummaryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, country: Country) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| row.country == country)
    }

    pub fn countries(&self) -> Vec<Country> {
        self.rows.iter().map(|row| row.country).collect()
    }

    /// Copy with every statistic rounded to `decimals` places
    pub fn rounded(&self, decimals: u32) -> SummaryTable {
        let round = |v: f64| descriptive::round_to(v, decimals);
        SummaryTable {
            metric: self.metric.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| SummaryRow {
                    country: row.country,
                    mean: round(row.mean),
                    median: round(row.median),
                    std_dev: row.std_dev.map(round),
                    min: round(row.min),
                    max: round(row.max),
                    count: row.count,
                })
                .collect(),
        }
    }

    /// Highest mean and most consistent country; first row wins ties
    pub fn insights(&self) -> Option<SummaryInsights> {
        let first = self.rows.first()?;
        let highest = self.rows.iter().fold(first, |best, row| {
            if row.mean > best.mean { row } else { best }
        });

        let most_consistent = self
            .rows
            .iter()
            .filter_map(|row| row.std_dev.map(|std| (row.country, std)))
            .fold(None, |best: Option<(Country, f64)>, candidate| match best {
                Some(current) if current.1 <= candidate.1 => Some(current),
                _ => Some(candidate),
            });

        Some(SummaryInsights {
            highest_mean: (highest.country, highest.mean),
            most_consistent,
        })
    }

    /// Write the table as CSV with `Country` as the row key
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(SummaryRecord {
                country: row.country.label().to_string(),
                mean: row.mean,
                median: row.median,
                std_dev: row.std_dev,
                min: row.min,
                max: row.max,
                count: row.count,
            })?;
        }
        if self.rows.is_empty() {
            csv_writer.write_record(crate::constants::SUMMARY_CSV_HEADER)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Render the CSV export as a string
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.to_csv_writer(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| SolarError::Configuration {
            message: format!("CSV export is not valid UTF-8: {}", e),
        })
    }

    /// Write the export to `path`
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.to_csv_writer(file)?;
        debug!("Wrote summary of {} to {}", self.metric, path.display());
        Ok(())
    }

    /// Parse an export produced by [`SummaryTable::to_csv_writer`]
    pub fn read_csv<R: Read>(reader: R, metric: &str) -> Result<SummaryTable> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();

        for record in csv_reader.deserialize::<SummaryRecord>() {
            let record = record?;
            rows.push(SummaryRow {
                country: record.country.parse()?,
                mean: record.mean,
                median: record.median,
                std_dev: record.std_dev,
                min: record.min,
                max: record.max,
                count: record.count,
            });
        }

        Ok(SummaryTable {
            metric: metric.to_string(),
            rows,
        })
    }
}
