//! Application constants for the solar comparison core
//!
//! Column names, statistical thresholds and default values shared by the
//! loader, the analysis modules and the CLI.

// =============================================================================
// Column Names
// =============================================================================

/// Date-time column every input file must carry
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Column stamped onto every row by the loader
pub const COUNTRY_COLUMN: &str = "Country";

/// Metrics offered for selection by the presentation layer
pub const STANDARD_METRICS: &[&str] = &["GHI", "DNI", "DHI", "Tamb", "RH", "WS"];

/// Metric used when none is selected
pub const DEFAULT_METRIC: &str = "GHI";

/// Strings read as missing values in addition to empty fields
pub const NULL_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan"];

// =============================================================================
// Statistics
// =============================================================================

/// p-value threshold below which a group difference is called significant
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Decimal places used for displayed and exported summary values
pub const DISPLAY_DECIMALS: u32 = 2;

/// Whisker reach of the comparison boxplot, in multiples of the IQR
pub const BOXPLOT_WHISKER_IQR: f64 = 1.5;

/// Bin count of the distribution histogram
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

// =============================================================================
// Paths and Files
// =============================================================================

/// Data directory looked up relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Application directory under the user data directory
pub const APP_DATA_DIR_NAME: &str = "solar-compare";

/// Summary export header, row key first
pub const SUMMARY_CSV_HEADER: &[&str] = &[
    "Country", "Mean", "Median", "Std Dev", "Min", "Max", "Count",
];

/// File name suggested for a summary export of `metric`
pub fn summary_export_file_name(metric: &str) -> String {
    format!("{}_summary_stats.csv", metric)
}
