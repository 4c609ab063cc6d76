//! Solar Compare Library
//!
//! Cross-country comparison of solar irradiance and weather measurements for
//! Benin, Sierra Leone and Togo.
//!
//! This library provides tools for:
//! - Loading each country's cleaned CSV export into a timestamp-indexed table
//! - Merging the per-country tables into one combined dataset
//! - Per-country descriptive statistics with a CSV export
//! - Ranking countries by the average of a metric
//! - Kruskal-Wallis and one-way ANOVA significance tests across countries
//! - Boxplot, daily average and histogram inputs for a dashboard

pub mod cache;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod models;

// Analytics over the combined dataset
pub mod analysis;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use analysis::{
    calculate_summary_stats, create_comparison_boxplot, perform_statistical_test,
    rank_countries_by_metric,
};
pub use cache::DatasetCache;
pub use config::SolarConfig;
pub use dataset::{CombinedDataset, CountryDataset, DatasetLoader, load_all_countries};
pub use error::{Result, SolarError};
pub use models::{Country, Metric, RankingTable, StatisticalComparison, SummaryTable};
