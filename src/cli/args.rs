//! Command-line argument definitions for the solar comparison tool
//!
//! This module defines the CLI interface using the clap derive API. Every
//! subcommand shares the same selection arguments: data directory, country
//! list and metric.

use crate::config::{SolarConfig, resolve_data_dir};
use crate::constants::DEFAULT_METRIC;
use crate::error::{Result, SolarError};
use crate::models::Country;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the solar comparison tool
///
/// Compares solar irradiance and weather measurements across Benin,
/// Sierra Leone and Togo.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "solar-compare",
    version,
    about = "Compare solar irradiance measurements across Benin, Sierra Leone and Togo",
    long_about = "Loads the cleaned per-country solar measurement exports, merges them into one \
                  combined dataset and compares a selected metric across countries: descriptive \
                  statistics, a ranking by average, and Kruskal-Wallis / ANOVA significance tests."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Per-country descriptive statistics of a metric
    Summary(AnalysisArgs),
    /// Rank countries by the average of a metric
    Rank(AnalysisArgs),
    /// Kruskal-Wallis and ANOVA tests across countries
    Test(AnalysisArgs),
    /// Full comparison report: overview, statistics, ranking, tests, boxplot
    Report(AnalysisArgs),
    /// Write the summary statistics to a CSV file
    Export(ExportArgs),
}

/// Selection arguments shared by every subcommand
#[derive(Debug, Clone, Parser)]
pub struct AnalysisArgs {
    /// Directory holding benin_clean.csv, sierraleone_clean.csv and togo_clean.csv
    ///
    /// If not specified, uses ./data when present, otherwise the
    /// solar-compare directory under the user data directory.
    #[arg(
        long = "data-dir",
        value_name = "PATH",
        help = "Directory holding the cleaned country CSV files"
    )]
    pub data_dir: Option<PathBuf>,

    /// Countries to compare (comma-separated list)
    ///
    /// If not specified, every country is included.
    #[arg(
        short = 'c',
        long = "countries",
        value_name = "LIST",
        help = "Comma-separated list of countries (Benin, Sierra Leone, Togo)"
    )]
    pub countries: Option<CountryList>,

    /// Metric column to compare
    #[arg(
        short = 'm',
        long = "metric",
        value_name = "COLUMN",
        default_value = DEFAULT_METRIC,
        help = "Metric column to compare (GHI, DNI, DHI, Tamb, RH, WS, ...)"
    )]
    pub metric: String,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress logging and progress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the export command
#[derive(Debug, Clone, Parser)]
pub struct ExportArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Output file or directory for the summary CSV
    ///
    /// A directory receives `<metric>_summary_stats.csv`. If not specified,
    /// the file is written to the current directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output file or directory for the summary CSV"
    )]
    pub output: Option<PathBuf>,
}

/// Wrapper for parsing comma-separated country lists
#[derive(Debug, Clone, PartialEq)]
pub struct CountryList {
    pub countries: Vec<Country>,
}

impl FromStr for CountryList {
    type Err = SolarError;

    fn from_str(s: &str) -> Result<Self> {
        let countries = Country::parse_list(s)?;

        if countries.is_empty() {
            return Err(SolarError::Configuration {
                message: "Country list cannot be empty".to_string(),
            });
        }

        Ok(CountryList { countries })
    }
}

impl Args {
    /// Selection arguments of whichever subcommand was given
    pub fn analysis(&self) -> Option<&AnalysisArgs> {
        self.command.as_ref().map(Commands::analysis)
    }
}

impl Commands {
    pub fn analysis(&self) -> &AnalysisArgs {
        match self {
            Commands::Summary(args)
            | Commands::Rank(args)
            | Commands::Test(args)
            | Commands::Report(args) => args,
            Commands::Export(args) => &args.analysis,
        }
    }
}

impl AnalysisArgs {
    /// Validate the selection arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.metric.trim().is_empty() {
            return Err(SolarError::Configuration {
                message: "Metric name cannot be empty".to_string(),
            });
        }

        if let Some(data_dir) = &self.data_dir {
            if !data_dir.is_dir() {
                return Err(SolarError::Configuration {
                    message: format!("Data directory does not exist: {}", data_dir.display()),
                });
            }
        }

        Ok(())
    }

    /// Selected countries; empty means every country
    pub fn get_countries(&self) -> Vec<Country> {
        match &self.countries {
            Some(list) => list.countries.clone(),
            None => Vec::new(),
        }
    }

    /// Metric column name as given on the command line
    pub fn get_metric(&self) -> &str {
        self.metric.trim()
    }

    /// Build the loader configuration from the arguments
    pub fn to_config(&self) -> SolarConfig {
        SolarConfig::default().with_data_dir(resolve_data_dir(self.data_dir.as_deref()))
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show the loading spinner (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl ExportArgs {
    /// Destination of the summary CSV for `metric`
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        match &self.output {
            Some(path) if path.is_dir() => path.join(file_name),
            Some(path) => path.clone(),
            None => PathBuf::from(file_name),
        }
    }
}

impl Default for AnalysisArgs {
    fn default() -> Self {
        Self {
            data_dir: None,
            countries: None,
            metric: DEFAULT_METRIC.to_string(),
            verbose: 0,
            quiet: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_country_list_parsing() {
        let result = CountryList::from_str("Benin").unwrap();
        assert_eq!(result.countries, vec![Country::Benin]);

        let result = CountryList::from_str(" togo , sierra-leone ").unwrap();
        assert_eq!(result.countries, vec![Country::Togo, Country::SierraLeone]);

        // Unknown country
        assert!(matches!(
            CountryList::from_str("Ghana"),
            Err(SolarError::UnknownCountry { .. })
        ));

        // Empty string and only commas
        assert!(CountryList::from_str("").is_err());
        assert!(CountryList::from_str(",,,").is_err());
    }

    #[test]
    fn test_cli_parsing() {
        let args = Args::try_parse_from([
            "solar-compare",
            "rank",
            "--metric",
            "DNI",
            "--countries",
            "Benin,Togo",
            "-vv",
        ])
        .unwrap();

        let analysis = args.analysis().unwrap();
        assert!(matches!(args.command, Some(Commands::Rank(_))));
        assert_eq!(analysis.get_metric(), "DNI");
        assert_eq!(analysis.get_countries(), vec![Country::Benin, Country::Togo]);
        assert_eq!(analysis.get_log_level(), "debug");
    }

    #[test]
    fn test_cli_defaults_and_conflicts() {
        let args = Args::try_parse_from(["solar-compare", "summary"]).unwrap();
        let analysis = args.analysis().unwrap();
        assert_eq!(analysis.get_metric(), "GHI");
        assert!(analysis.get_countries().is_empty());

        assert!(Args::try_parse_from(["solar-compare", "test", "-q", "-v"]).is_err());
        assert!(Args::try_parse_from(["solar-compare", "test", "--countries", "Mars"]).is_err());

        let no_command = Args::try_parse_from(["solar-compare"]).unwrap();
        assert!(no_command.analysis().is_none());
    }

    #[test]
    fn test_analysis_args_validation() {
        let temp_dir = TempDir::new().unwrap();

        let args = AnalysisArgs {
            data_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(args.validate().is_ok());
        assert_eq!(args.to_config().data_dir, temp_dir.path());

        let mut invalid_args = args.clone();
        invalid_args.data_dir = Some(PathBuf::from("/nonexistent/path"));
        assert!(invalid_args.validate().is_err());

        let mut invalid_args = args.clone();
        invalid_args.metric = "  ".to_string();
        assert!(invalid_args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = AnalysisArgs::default();

        // Default level
        assert_eq!(args.get_log_level(), "warn");

        // Verbose levels
        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");

        args.verbose = 2;
        assert_eq!(args.get_log_level(), "debug");

        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        // Quiet mode
        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_export_output_path() {
        let temp_dir = TempDir::new().unwrap();

        let mut args = ExportArgs {
            analysis: AnalysisArgs::default(),
            output: None,
        };
        assert_eq!(
            args.output_path("GHI_summary_stats.csv"),
            PathBuf::from("GHI_summary_stats.csv")
        );

        args.output = Some(temp_dir.path().to_path_buf());
        assert_eq!(
            args.output_path("GHI_summary_stats.csv"),
            temp_dir.path().join("GHI_summary_stats.csv")
        );

        args.output = Some(temp_dir.path().join("out.csv"));
        assert_eq!(
            args.output_path("GHI_summary_stats.csv"),
            temp_dir.path().join("out.csv")
        );
    }
}
