//! Cross-country analytics over the combined dataset
//!
//! All operations are pure functions of a [`CombinedDataset`] and a metric
//! column name:
//! - [`summary`] - Per-country descriptive statistics and the CSV export
//! - [`ranking`] - Countries ordered by the average of a metric
//! - [`significance`] - Kruskal-Wallis and one-way ANOVA across countries
//! - [`charts`] - Boxplot, daily average and histogram inputs
//! - [`descriptive`] - Sample statistics shared by the above
//!
//! ## Usage
//!
//! ```no_run
//! use solar_compare::analysis::{calculate_summary_stats, compare, rank};
//! use solar_compare::{load_all_countries, SolarConfig};
//!
//! # fn example() -> solar_compare::Result<()> {
//! let dataset = load_all_countries(&SolarConfig::default())?;
//! let summary = calculate_summary_stats(&dataset, "GHI")?;
//! let ranking = rank(&dataset, "GHI")?;
//! let tests = compare(&dataset, "GHI")?;
//! println!("{} countries, leader {:?}, p={}",
//!          summary.rows.len(),
//!          ranking.leader(),
//!          tests.kruskal_wallis.p_value);
//! # Ok(())
//! # }
//! ```
//!
//! [`CombinedDataset`]: crate::dataset::CombinedDataset

pub mod charts;
pub mod descriptive;
pub mod ranking;
pub mod significance;
pub mod summary;

#[cfg(test)]
pub mod tests;

pub use charts::{
    BoxSeries, ComparisonFigure, DailyAverage, DashboardOverview, Histogram,
    create_comparison_boxplot, daily_averages, histogram, overview,
};
pub use ranking::{rank, rank_countries_by_metric};
pub use significance::{compare, compare_with_level, perform_statistical_test};
pub use summary::{SummaryInsights, calculate_summary_stats, summarize};
