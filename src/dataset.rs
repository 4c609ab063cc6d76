//! Dataset loading and merging.
//!
//! Reads each country's cleaned CSV into a polars `DataFrame`, parses the
//! `Timestamp` column into the leading datetime index, stamps every row with
//! its country, and concatenates the per-country tables into one combined
//! table without any alignment or deduplication.

use crate::config::SolarConfig;
use crate::constants::{COUNTRY_COLUMN, NULL_MARKERS, TIMESTAMP_COLUMN};
use crate::error::{Result, SolarError};
use crate::models::Country;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

/// Date-time layouts accepted in the `Timestamp` column
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// One country's records, in file order
#[derive(Debug, Clone)]
pub struct CountryDataset {
    country: Country,
    frame: DataFrame,
}

impl CountryDataset {
    pub fn country(&self) -> Country {
        self.country
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// All loaded countries stacked in load order
#[derive(Debug, Clone)]
pub struct CombinedDataset {
    frame: DataFrame,
}

impl CombinedDataset {
    /// Combined dataset with no rows and no columns
    pub fn empty() -> Self {
        Self {
            frame: DataFrame::empty(),
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Numeric columns usable as a metric, in column order
    pub fn metric_names(&self) -> Vec<String> {
        self.frame
            .get_columns()
            .iter()
            .filter(|column| is_metric_column(column))
            .map(|column| column.name().to_string())
            .collect()
    }

    pub fn has_metric(&self, metric: &str) -> bool {
        self.frame
            .column(metric)
            .map(is_metric_column)
            .unwrap_or(false)
    }

    /// Distinct countries in order of first appearance
    pub fn countries(&self) -> Result<Vec<Country>> {
        let mut seen = Vec::new();
        for country in self.row_countries()? {
            if !seen.contains(&country) {
                seen.push(country);
            }
        }
        Ok(seen)
    }

    /// Values of `metric` row by row; `NaN` is reported as missing
    pub fn metric_values(&self, metric: &str) -> Result<Vec<Option<f64>>> {
        if !self.has_metric(metric) {
            return Err(SolarError::unknown_metric(metric));
        }

        let values = self
            .frame
            .column(metric)?
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|value| value.filter(|v| !v.is_nan()))
            .collect();
        Ok(values)
    }

    /// Country tag and metric value of every row
    pub fn observations(&self, metric: &str) -> Result<Vec<(Country, Option<f64>)>> {
        let values = self.metric_values(metric)?;
        let countries = self.row_countries()?;
        Ok(countries.into_iter().zip(values).collect())
    }

    /// Non-missing values of `metric` per country
    ///
    /// Countries without a single non-missing value have no entry.
    pub fn grouped_values(&self, metric: &str) -> Result<BTreeMap<Country, Vec<f64>>> {
        let mut groups: BTreeMap<Country, Vec<f64>> = BTreeMap::new();
        for (country, value) in self.observations(metric)? {
            if let Some(v) = value {
                groups.entry(country).or_default().push(v);
            }
        }
        Ok(groups)
    }

    /// Row timestamps; `None` only for rows outside the representable range
    pub fn timestamps(&self) -> Result<Vec<Option<NaiveDateTime>>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let millis = self.frame.column(TIMESTAMP_COLUMN)?.cast(&DataType::Int64)?;
        let timestamps = millis
            .as_materialized_series()
            .i64()?
            .into_iter()
            .map(|ms| ms.and_then(DateTime::from_timestamp_millis).map(|dt| dt.naive_utc()))
            .collect();
        Ok(timestamps)
    }

    /// Calendar dates of the rows
    pub fn dates(&self) -> Result<Vec<Option<NaiveDate>>> {
        Ok(self
            .timestamps()?
            .into_iter()
            .map(|ts| ts.map(|t| t.date()))
            .collect())
    }

    /// Keep only rows of the given countries; an empty list keeps nothing
    pub fn filter_countries(&self, countries: &[Country]) -> Result<CombinedDataset> {
        if self.is_empty() {
            return Ok(self.clone());
        }

        let predicate = countries
            .iter()
            .map(|country| col(COUNTRY_COLUMN).eq(lit(country.label())))
            .reduce(|acc, expr| acc.or(expr));

        let frame = match predicate {
            Some(predicate) => self.frame.clone().lazy().filter(predicate).collect()?,
            None => self.frame.clear(),
        };

        debug!(
            "Filtered combined dataset to {:?}: {} of {} rows",
            countries,
            frame.height(),
            self.frame.height()
        );
        Ok(CombinedDataset { frame })
    }

    fn row_countries(&self) -> Result<Vec<Country>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let labels = self.frame.column(COUNTRY_COLUMN)?.as_materialized_series().str()?;
        labels
            .into_iter()
            .enumerate()
            .map(|(row, label)| {
                label.and_then(country_from_label).ok_or_else(|| {
                    SolarError::schema_violation(
                        "combined dataset",
                        format!("row {} carries no valid country label", row + 1),
                    )
                })
            })
            .collect()
    }
}

impl From<CountryDataset> for CombinedDataset {
    fn from(dataset: CountryDataset) -> Self {
        Self {
            frame: dataset.frame,
        }
    }
}

/// Loads country datasets according to the configuration table
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    config: SolarConfig,
}

impl DatasetLoader {
    pub fn new(config: SolarConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolarConfig {
        &self.config
    }

    /// Load a country given by its label
    pub fn load_named(&self, name: &str) -> Result<CountryDataset> {
        let country = name.parse::<Country>()?;
        self.load(country)
    }

    /// Load one country's dataset
    pub fn load(&self, country: Country) -> Result<CountryDataset> {
        let path = self.config.source_path(country)?;
        debug!("Loading {} from {}", country, path.display());

        let frame = read_source_csv(&path)?;
        let frame = normalize_metric_columns(frame)?;
        let frame = index_by_timestamp(frame, &path)?;

        // Stamp the source country onto every row
        let frame = frame
            .lazy()
            .with_columns([lit(country.label()).alias(COUNTRY_COLUMN)])
            .collect()?;

        if frame.height() == 0 {
            warn!("Dataset for {} has no records: {}", country, path.display());
        }
        info!(
            "Loaded {} records for {} ({} columns)",
            frame.height(),
            country,
            frame.width()
        );

        Ok(CountryDataset { country, frame })
    }

    /// Load every configured country in enumeration order and merge them
    pub fn load_all(&self) -> Result<CombinedDataset> {
        let datasets = Country::ALL
            .into_iter()
            .map(|country| self.load(country))
            .collect::<Result<Vec<_>>>()?;
        merge_datasets(datasets)
    }
}

/// Load one country's dataset with the given configuration
pub fn load_country_data(config: &SolarConfig, country: Country) -> Result<CountryDataset> {
    DatasetLoader::new(config.clone()).load(country)
}

/// Load and merge all countries
pub fn load_all_countries(config: &SolarConfig) -> Result<CombinedDataset> {
    DatasetLoader::new(config.clone()).load_all()
}

/// Concatenate per-country datasets in the given order
///
/// Columns are aligned by name to the first dataset's order; differing column
/// sets or types are a schema violation.
pub fn merge_datasets(datasets: Vec<CountryDataset>) -> Result<CombinedDataset> {
    let Some(first) = datasets.first() else {
        return Ok(CombinedDataset::empty());
    };

    let reference = column_types(&first.frame);
    let order: Vec<PlSmallStr> = first.frame.get_column_names().into_iter().cloned().collect();

    let mut frames = Vec::with_capacity(datasets.len());
    for dataset in &datasets {
        check_compatible(first.country, &reference, dataset)?;
        frames.push(dataset.frame.select(order.clone())?.lazy());
    }

    let frame = concat(frames, UnionArgs::default())?.collect()?;
    debug!(
        "Merged {} datasets into {} rows",
        datasets.len(),
        frame.height()
    );

    Ok(CombinedDataset { frame })
}

fn read_source_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| SolarError::DataSourceUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let null_values = NullValues::AllColumns(NULL_MARKERS.iter().map(|m| (*m).into()).collect());

    // Every column is read as text; types are decided over the whole file afterwards
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_null_values(Some(null_values)))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| SolarError::DataSourceUnavailable {
            path: path.to_path_buf(),
            reason: format!("unreadable CSV: {}", e),
        })
}

/// Cast every column whose values all parse as numbers to `Float64`
///
/// All-empty columns become `Float64` nulls. A column with any value that is
/// not a number stays text and is not a metric.
fn normalize_metric_columns(mut frame: DataFrame) -> Result<DataFrame> {
    let names: Vec<PlSmallStr> = frame.get_column_names().into_iter().cloned().collect();

    for name in names {
        if name.as_str() == TIMESTAMP_COLUMN || name.as_str() == COUNTRY_COLUMN {
            continue;
        }

        let column = frame.column(name.as_str())?;
        if column.dtype() == &DataType::Float64 {
            continue;
        }

        // Unparseable values turn into extra nulls under a non-strict cast
        let converted = column.cast(&DataType::Float64)?;
        if converted.null_count() == column.null_count() {
            frame.with_column(converted)?;
        } else {
            debug!("Keeping non-numeric column {} ({})", name, column.dtype());
        }
    }

    Ok(frame)
}

/// Parse `Timestamp` into a millisecond datetime column and move it to the front
fn index_by_timestamp(mut frame: DataFrame, path: &Path) -> Result<DataFrame> {
    let source_name = path.display().to_string();

    let column = frame.column(TIMESTAMP_COLUMN).map_err(|_| {
        SolarError::schema_violation(&source_name, "missing Timestamp column")
    })?;
    let text = column.cast(&DataType::String)?;

    let mut millis = Vec::with_capacity(text.len());
    for (row, value) in text.as_materialized_series().str()?.into_iter().enumerate() {
        let raw = value.ok_or_else(|| {
            SolarError::schema_violation(&source_name, format!("empty Timestamp at row {}", row + 1))
        })?;
        let parsed = parse_timestamp(raw).ok_or_else(|| {
            SolarError::schema_violation(
                &source_name,
                format!("unparseable Timestamp '{}' at row {}", raw, row + 1),
            )
        })?;
        millis.push(parsed.and_utc().timestamp_millis());
    }

    let index = Series::new(TIMESTAMP_COLUMN.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    frame.with_column(index)?;

    let mut order: Vec<PlSmallStr> = vec![TIMESTAMP_COLUMN.into()];
    order.extend(
        frame
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != TIMESTAMP_COLUMN)
            .cloned(),
    );

    Ok(frame.select(order)?)
}

/// Parse the timestamp layouts found in the cleaned exports
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn column_types(frame: &DataFrame) -> BTreeMap<String, DataType> {
    frame
        .get_columns()
        .iter()
        .map(|column| (column.name().to_string(), column.dtype().clone()))
        .collect()
}

fn check_compatible(
    reference_country: Country,
    reference: &BTreeMap<String, DataType>,
    dataset: &CountryDataset,
) -> Result<()> {
    let actual = column_types(&dataset.frame);

    let missing: Vec<&str> = reference
        .keys()
        .filter(|name| !actual.contains_key(*name))
        .map(String::as_str)
        .collect();
    let extra: Vec<&str> = actual
        .keys()
        .filter(|name| !reference.contains_key(*name))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() || !extra.is_empty() {
        return Err(SolarError::schema_violation(
            dataset.country.label(),
            format!(
                "columns differ from {}: missing {:?}, extra {:?}",
                reference_country, missing, extra
            ),
        ));
    }

    for (name, dtype) in reference {
        if let Some(other) = actual.get(name) {
            if other != dtype {
                return Err(SolarError::schema_violation(
                    dataset.country.label(),
                    format!(
                        "column {} is {} but {} in {}",
                        name, other, dtype, reference_country
                    ),
                ));
            }
        }
    }

    Ok(())
}

fn is_metric_column(column: &Column) -> bool {
    let name = column.name().as_str();
    name != TIMESTAMP_COLUMN && name != COUNTRY_COLUMN && column.dtype() == &DataType::Float64
}

fn country_from_label(label: &str) -> Option<Country> {
    Country::ALL
        .into_iter()
        .find(|country| country.label() == label)
        .or_else(|| label.parse().ok())
}
