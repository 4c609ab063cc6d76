//! Configuration management and validation.
//!
//! Provides the configuration table mapping each country to its backing
//! file, plus the statistical and display settings used by the analysis
//! modules.

use crate::constants::{
    APP_DATA_DIR_NAME, DEFAULT_DATA_DIR, DEFAULT_HISTOGRAM_BINS, DISPLAY_DECIMALS,
    SIGNIFICANCE_LEVEL,
};
use crate::error::{Result, SolarError};
use crate::models::Country;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backing file of one country's dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySource {
    /// File name, resolved against the data directory unless absolute
    pub file_name: PathBuf,
}

impl CountrySource {
    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

/// Global configuration for loading and comparing the country datasets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarConfig {
    /// Directory holding the cleaned per-country files
    pub data_dir: PathBuf,

    /// Country to file lookup
    pub sources: HashMap<Country, CountrySource>,

    /// p-value threshold for the `significant` flag
    pub significance_level: f64,

    /// Decimal places of displayed and exported summary values
    pub display_decimals: u32,

    /// Bin count of the distribution histogram
    pub histogram_bins: usize,
}

impl Default for SolarConfig {
    fn default() -> Self {
        let sources = Country::ALL
            .into_iter()
            .map(|country| (country, CountrySource::new(country.default_file_name())))
            .collect();

        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            sources,
            significance_level: SIGNIFICANCE_LEVEL,
            display_decimals: DISPLAY_DECIMALS,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl SolarConfig {
    /// Create configuration reading from `data_dir`
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Point one country at a different file
    pub fn with_source(mut self, country: Country, file_name: impl Into<PathBuf>) -> Self {
        self.sources.insert(country, CountrySource::new(file_name));
        self
    }

    pub fn with_significance_level(mut self, level: f64) -> Self {
        self.significance_level = level;
        self
    }

    pub fn with_display_decimals(mut self, decimals: u32) -> Self {
        self.display_decimals = decimals;
        self
    }

    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    /// Resolve the backing file of `country`
    pub fn source_path(&self, country: Country) -> Result<PathBuf> {
        let source = self
            .sources
            .get(&country)
            .ok_or_else(|| SolarError::Configuration {
                message: format!("No data source configured for {}", country),
            })?;

        if source.file_name.is_absolute() {
            Ok(source.file_name.clone())
        } else {
            Ok(self.data_dir.join(&source.file_name))
        }
    }

    /// Check settings that would make every computation meaningless
    pub fn validate(&self) -> Result<()> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(SolarError::Configuration {
                message: format!(
                    "Significance level must lie in (0, 1), got {}",
                    self.significance_level
                ),
            });
        }

        if self.histogram_bins == 0 {
            return Err(SolarError::Configuration {
                message: "Histogram bin count must be positive".to_string(),
            });
        }

        for country in Country::ALL {
            if !self.sources.contains_key(&country) {
                return Err(SolarError::Configuration {
                    message: format!("No data source configured for {}", country),
                });
            }
        }

        Ok(())
    }
}

/// Pick the data directory: explicit path, then `./data`, then the user data dir
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        debug!("Using data directory from arguments: {}", path.display());
        return path.to_path_buf();
    }

    let local = PathBuf::from(DEFAULT_DATA_DIR);
    if local.is_dir() {
        debug!("Using local data directory: {}", local.display());
        return local;
    }

    match dirs::data_dir() {
        Some(dir) => {
            let candidate = dir.join(APP_DATA_DIR_NAME).join(DEFAULT_DATA_DIR);
            debug!("Using user data directory: {}", candidate.display());
            candidate
        }
        None => local,
    }
}
