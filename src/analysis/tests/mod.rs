//! Cross-module tests for the analytics over real loaded datasets
//!
//! Fixtures are written as CSV files into a temporary directory and loaded
//! through the regular loader so the tests exercise the same column types
//! the binary sees.

use std::fmt::Write as _;
use std::fs;
use tempfile::TempDir;

use crate::config::SolarConfig;
use crate::dataset::{CombinedDataset, DatasetLoader, merge_datasets};
use crate::models::Country;


/// Write `body` as the cleaned CSV of `country` inside `dir`
pub fn write_country_csv(dir: &TempDir, country: Country, body: &str) {
    fs::write(dir.path().join(country.default_file_name()), body).unwrap();
}

/// Load and merge the given countries from `dir`, in the given order
pub fn load_countries(dir: &TempDir, countries: &[Country]) -> CombinedDataset {
    let loader = DatasetLoader::new(SolarConfig::default().with_data_dir(dir.path()));
    let datasets = countries
        .iter()
        .map(|country| loader.load(*country).unwrap())
        .collect();
    merge_datasets(datasets).unwrap()
}

/// Combined dataset with `GHI` values per country; `None` is written as `NA`
///
/// Rows are one hour apart starting at 2021-08-09 00:00. `DNI` carries twice
/// the `GHI` value.
pub fn dataset_with_values(groups: &[(Country, Vec<Option<f64>>)]) -> CombinedDataset {
    let dir = TempDir::new().unwrap();

    for (country, values) in groups {
        let mut body = String::from("Timestamp,GHI,DNI\n");
        for (i, value) in values.iter().enumerate() {
            let timestamp = format!("2021-08-{:02} {:02}:00", 9 + i / 24, i % 24);
            match value {
                Some(v) => writeln!(body, "{},{},{}", timestamp, v, v * 2.0).unwrap(),
                None => writeln!(body, "{},NA,NA", timestamp).unwrap(),
            }
        }
        write_country_csv(&dir, *country, &body);
    }

    let countries: Vec<Country> = groups.iter().map(|(country, _)| *country).collect();
    load_countries(&dir, &countries)
}

/// Combined dataset where every `GHI` value is present
pub fn dataset_with_ghi(groups: &[(Country, &[f64])]) -> CombinedDataset {
    let groups: Vec<(Country, Vec<Option<f64>>)> = groups
        .iter()
        .map(|(country, values)| (*country, values.iter().copied().map(Some).collect()))
        .collect();
    dataset_with_values(&groups)
}
