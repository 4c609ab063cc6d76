//! Core data structures and types for the comparison core.
//!
//! Defines the country and metric enumerations, the summary and ranking
//! tables, and the hypothesis test results handed to the presentation layer.

use crate::error::{Result, SolarError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Countries with a cleaned dataset
///
/// Declaration order is alphabetical by label, so the derived `Ord` matches
/// the grouping-key order of the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Country {
    Benin,
    SierraLeone,
    Togo,
}

impl Country {
    pub const ALL: [Country; 3] = [Country::Benin, Country::SierraLeone, Country::Togo];

    /// Label stored in the `Country` column and shown to users
    pub fn label(&self) -> &'static str {
        match self {
            Country::Benin => "Benin",
            Country::SierraLeone => "Sierra Leone",
            Country::Togo => "Togo",
        }
    }

    /// Cleaned file shipped for this country
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Country::Benin => "benin_clean.csv",
            Country::SierraLeone => "sierraleone_clean.csv",
            Country::Togo => "togo_clean.csv",
        }
    }

    /// Parse a comma-separated list such as `"Benin,Sierra Leone"`
    pub fn parse_list(list: &str) -> Result<Vec<Country>> {
        let mut countries = Vec::new();
        for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let country = part.parse::<Country>()?;
            if !countries.contains(&country) {
                countries.push(country);
            }
        }
        Ok(countries)
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Country {
    type Err = SolarError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "benin" => Ok(Country::Benin),
            "sierraleone" => Ok(Country::SierraLeone),
            "togo" => Ok(Country::Togo),
            _ => Err(SolarError::UnknownCountry {
                name: s.to_string(),
            }),
        }
    }
}

/// Standard metrics offered for selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Ghi,
    Dni,
    Dhi,
    Tamb,
    Rh,
    Ws,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Ghi,
        Metric::Dni,
        Metric::Dhi,
        Metric::Tamb,
        Metric::Rh,
        Metric::Ws,
    ];

    /// Column name in the input files
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Ghi => "GHI",
            Metric::Dni => "DNI",
            Metric::Dhi => "DHI",
            Metric::Tamb => "Tamb",
            Metric::Rh => "RH",
            Metric::Ws => "WS",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Ghi | Metric::Dni | Metric::Dhi => "W/m²",
            Metric::Tamb => "°C",
            Metric::Rh => "%",
            Metric::Ws => "m/s",
        }
    }

    /// Axis label for a column name, with a unit when the metric is standard
    pub fn axis_label(column: &str) -> String {
        match column.parse::<Metric>() {
            Ok(metric) => format!("{} ({})", column, metric.unit()),
            Err(_) => column.to_string(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = SolarError;

    fn from_str(s: &str) -> Result<Self> {
        Metric::ALL
            .into_iter()
            .find(|m| m.column().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SolarError::unknown_metric(s))
    }
}

/// Descriptive statistics of one metric for one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub country: Country,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; absent below two observations
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Per-country statistics for one metric, ordered by country
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryTable {
    pub metric: String,
    pub rows: Vec<SummaryRow>,
}

/// One entry of a ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub country: Country,
    pub average: f64,
    pub rank: usize,
}

/// Countries ordered by average value, highest first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankingTable {
    pub metric: String,
    pub rows: Vec<RankingRow>,
}

/// Hypothesis tests run by the significance tester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestKind {
    KruskalWallis,
    Anova,
}

impl TestKind {
    pub fn key(&self) -> &'static str {
        match self {
            TestKind::KruskalWallis => "kruskal_wallis",
            TestKind::Anova => "anova",
        }
    }

    /// Name of the statistic the test produces
    pub fn statistic_name(&self) -> &'static str {
        match self {
            TestKind::KruskalWallis => "H-statistic",
            TestKind::Anova => "F-statistic",
        }
    }
}

/// Outcome of one hypothesis test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub kind: TestKind,
    pub statistic: f64,
    pub p_value: f64,
    pub significant: bool,
}

impl TestResult {
    pub fn new(kind: TestKind, statistic: f64, p_value: f64, significance_level: f64) -> Self {
        Self {
            kind,
            statistic,
            p_value,
            significant: p_value < significance_level,
        }
    }
}

/// Both tests for one metric across the country groups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticalComparison {
    pub kruskal_wallis: TestResult,
    pub anova: TestResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_parsing() {
        assert_eq!("Benin".parse::<Country>().unwrap(), Country::Benin);
        assert_eq!("sierra leone".parse::<Country>().unwrap(), Country::SierraLeone);
        assert_eq!("sierra-leone".parse::<Country>().unwrap(), Country::SierraLeone);
        assert_eq!("SierraLeone".parse::<Country>().unwrap(), Country::SierraLeone);
        assert_eq!(" TOGO ".parse::<Country>().unwrap(), Country::Togo);

        let err = "Ghana".parse::<Country>().unwrap_err();
        assert!(matches!(err, SolarError::UnknownCountry { ref name } if name == "Ghana"));
    }

    #[test]
    fn test_country_order_is_alphabetical() {
        let mut labels: Vec<&str> = Country::ALL.iter().map(|c| c.label()).collect();
        labels.sort();
        let ordered: Vec<&str> = Country::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, ordered);
    }

    #[test]
    fn test_country_list_parsing() {
        let countries = Country::parse_list("Togo, Benin,togo,").unwrap();
        assert_eq!(countries, vec![Country::Togo, Country::Benin]);
        assert!(Country::parse_list("Benin,Mali").is_err());
        assert!(Country::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_metric_parsing_and_units() {
        assert_eq!("ghi".parse::<Metric>().unwrap(), Metric::Ghi);
        assert_eq!("Tamb".parse::<Metric>().unwrap().unit(), "°C");
        assert!("ModA".parse::<Metric>().is_err());
        assert_eq!(Metric::axis_label("DNI"), "DNI (W/m²)");
        assert_eq!(Metric::axis_label("ModA"), "ModA");
    }

    #[test]
    fn test_significance_is_strict() {
        let at_level = TestResult::new(TestKind::Anova, 3.0, 0.05, 0.05);
        assert!(!at_level.significant);
        let below = TestResult::new(TestKind::Anova, 3.0, 0.0499, 0.05);
        assert!(below.significant);
    }
}
