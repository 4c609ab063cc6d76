//! Command implementations for the solar comparison CLI
//!
//! This module contains the command execution logic, the loading spinner and
//! the console rendering of the analysis results.

use crate::analysis::charts::{ComparisonFigure, DashboardOverview};
use crate::analysis::{self, SummaryInsights};
use crate::cache::DatasetCache;
use crate::cli::args::{AnalysisArgs, Args, Commands, ExportArgs};
use crate::config::SolarConfig;
use crate::constants::summary_export_file_name;
use crate::dataset::CombinedDataset;
use crate::error::{Result, SolarError};
use crate::models::{Country, RankingTable, StatisticalComparison, SummaryTable, TestResult};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Main command runner
///
/// Sets up logging, loads the combined dataset once and dispatches to the
/// selected subcommand.
pub fn run(args: Args) -> Result<()> {
    let command = args.command.ok_or_else(|| SolarError::Configuration {
        message: "No command given".to_string(),
    })?;
    let selection = command.analysis().clone();

    setup_logging(&selection);
    debug!("Command line arguments: {:?}", command);

    selection.validate()?;
    let config = selection.to_config();
    config.validate()?;
    info!("Reading country data from {}", config.data_dir.display());

    let cache = DatasetCache::new(config);
    let dataset = load_with_progress(&cache, selection.show_progress())?;
    let config = cache.config();

    match &command {
        Commands::Summary(args) => run_summary(&dataset, config, args),
        Commands::Rank(args) => run_rank(&dataset, args),
        Commands::Test(args) => run_test(&dataset, config, args),
        Commands::Report(args) => run_report(&dataset, config, args),
        Commands::Export(args) => run_export(&dataset, config, args).map(|_| ()),
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &AnalysisArgs) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("solar_compare={}", log_level)));

    let initialized = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();

    if initialized.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

/// Load the combined dataset behind a spinner
fn load_with_progress(cache: &DatasetCache, show_progress: bool) -> Result<Arc<CombinedDataset>> {
    let spinner = show_progress.then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Loading country datasets...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = cache.get();

    if let Some(pb) = spinner {
        match &result {
            Ok(dataset) => pb.finish_with_message(format!("Loaded {} records", dataset.height())),
            Err(_) => pb.abandon_with_message("Loading failed"),
        }
    }

    result
}

/// Restrict the combined dataset to the selected countries
fn selected(dataset: &CombinedDataset, countries: &[Country]) -> Result<CombinedDataset> {
    if countries.is_empty() {
        Ok(dataset.clone())
    } else {
        dataset.filter_countries(countries)
    }
}

fn run_summary(dataset: &CombinedDataset, config: &SolarConfig, args: &AnalysisArgs) -> Result<()> {
    let countries = args.get_countries();
    let subset = (!countries.is_empty()).then_some(countries.as_slice());

    let table = analysis::summarize(dataset, args.get_metric(), subset)?
        .rounded(config.display_decimals);
    print_summary(&table, config.display_decimals);

    if let Some(insights) = table.insights() {
        print_insights(&table.metric, &insights);
    }
    Ok(())
}

fn run_rank(dataset: &CombinedDataset, args: &AnalysisArgs) -> Result<()> {
    let selection = selected(dataset, &args.get_countries())?;
    let ranking = analysis::rank(&selection, args.get_metric())?;
    print_ranking(&ranking);
    Ok(())
}

fn run_test(dataset: &CombinedDataset, config: &SolarConfig, args: &AnalysisArgs) -> Result<()> {
    let selection = selected(dataset, &args.get_countries())?;
    let comparison =
        analysis::compare_with_level(&selection, args.get_metric(), config.significance_level)?;
    print_comparison(args.get_metric(), &comparison, config.significance_level);
    Ok(())
}

fn run_report(dataset: &CombinedDataset, config: &SolarConfig, args: &AnalysisArgs) -> Result<()> {
    let metric = args.get_metric();
    let countries = args.get_countries();

    let overview = analysis::overview(dataset, metric, &countries)?;
    print_overview(metric, &overview);

    run_summary(dataset, config, args)?;
    run_rank(dataset, args)?;

    // Too few observations only skips the tests, the rest of the report stands
    let selection = selected(dataset, &countries)?;
    match analysis::compare_with_level(&selection, metric, config.significance_level) {
        Ok(comparison) => print_comparison(metric, &comparison, config.significance_level),
        Err(SolarError::InsufficientData { reason, .. }) => {
            warn!("Skipping significance tests for {}: {}", metric, reason);
            println!(
                "\n{} {}",
                "Significance tests skipped:".bright_yellow().bold(),
                reason
            );
        }
        Err(e) => return Err(e),
    }

    let figure = analysis::create_comparison_boxplot(dataset, metric, &countries)?;
    print_boxplot(&figure, config.display_decimals);

    let daily = analysis::daily_averages(dataset, metric, &countries)?;
    if let (Some(first), Some(last)) = (daily.first(), daily.last()) {
        println!(
            "\n{} {} daily means from {} to {}",
            "Daily averages:".bright_green().bold(),
            daily.len(),
            first.date,
            last.date
        );
    }

    let histograms = analysis::histogram(dataset, metric, &countries, config.histogram_bins)?;
    for hist in &histograms {
        let peak = hist
            .counts
            .iter()
            .enumerate()
            .max_by_key(|(_, count)| **count)
            .map(|(i, _)| (hist.edges[i], hist.edges[i + 1]));
        if let Some((low, high)) = peak {
            println!(
                "   {} most frequent range {:.1} to {:.1} ({} values)",
                hist.country.label().bright_white(),
                low,
                high,
                hist.total()
            );
        }
    }

    Ok(())
}

/// Write the rounded summary to CSV and return the written path
fn run_export(dataset: &CombinedDataset, config: &SolarConfig, args: &ExportArgs) -> Result<PathBuf> {
    let metric = args.analysis.get_metric();
    let countries = args.analysis.get_countries();
    let subset = (!countries.is_empty()).then_some(countries.as_slice());

    let table = analysis::summarize(dataset, metric, subset)?.rounded(config.display_decimals);
    let path = args.output_path(&summary_export_file_name(metric));
    table.write_csv(&path)?;

    info!("Exported {} summary rows to {}", table.rows.len(), path.display());
    if args.analysis.show_progress() {
        println!(
            "{} {}",
            "Summary written to".bright_green().bold(),
            path.display().to_string().bright_white()
        );
    }
    Ok(path)
}

fn format_value(value: f64, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, value)
}

fn print_overview(metric: &str, overview: &DashboardOverview) {
    println!("\n{}", "Overview".bright_green().bold());
    println!(
        "   • Total records: {}",
        overview.total_records.to_string().bright_white().bold()
    );
    match overview.average {
        Some(avg) => println!("   • Average {}: {:.2}", metric, avg),
        None => println!("   • Average {}: n/a", metric),
    }
    println!("   • Countries selected: {}", overview.countries_selected);
}

fn print_summary(table: &SummaryTable, decimals: u32) {
    println!(
        "\n{}",
        format!("{} Summary Statistics", table.metric).bright_green().bold()
    );

    if table.is_empty() {
        println!("   No observations for the selected countries");
        return;
    }

    println!(
        "{:<14} {:>10} {:>10} {:>10} {:>10} {:>10} {:>8}",
        "Country", "Mean", "Median", "Std Dev", "Min", "Max", "Count"
    );
    for row in &table.rows {
        let std_dev = row
            .std_dev
            .map(|s| format_value(s, decimals))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<14} {:>10} {:>10} {:>10} {:>10} {:>10} {:>8}",
            row.country.label(),
            format_value(row.mean, decimals),
            format_value(row.median, decimals),
            std_dev,
            format_value(row.min, decimals),
            format_value(row.max, decimals),
            row.count
        );
    }
}

fn print_insights(metric: &str, insights: &SummaryInsights) {
    let (leader, mean) = insights.highest_mean;
    println!(
        "\n{} {} has the highest average {} ({:.2})",
        "Key insight:".bright_cyan().bold(),
        leader.label().bright_white().bold(),
        metric,
        mean
    );
    if let Some((country, std_dev)) = insights.most_consistent {
        println!(
            "{} {} is the most consistent (std dev {:.2})",
            "Key insight:".bright_cyan().bold(),
            country.label().bright_white().bold(),
            std_dev
        );
    }
}

fn print_ranking(ranking: &RankingTable) {
    println!(
        "\n{}",
        format!("Countries Ranked by {}", ranking.average_heading())
            .bright_green()
            .bold()
    );

    if ranking.is_empty() {
        println!("   No observations for the selected countries");
        return;
    }

    for row in &ranking.rows {
        let line = format!("{:>3}. {:<14} {:>10.2}", row.rank, row.country.label(), row.average);
        if row.rank == 1 {
            println!("{}", line.bright_yellow().bold());
        } else {
            println!("{}", line);
        }
    }
}

fn print_test_result(result: &TestResult) {
    let verdict = if result.significant {
        "significant".bright_green().bold()
    } else {
        "not significant".bright_red()
    };
    println!(
        "   • {}: {} = {:.4}, p = {:.6} ({})",
        result.kind.key(),
        result.kind.statistic_name(),
        result.statistic,
        result.p_value,
        verdict
    );
}

fn print_comparison(metric: &str, comparison: &StatisticalComparison, level: f64) {
    println!(
        "\n{}",
        format!("Statistical Tests for {} (alpha = {})", metric, level)
            .bright_green()
            .bold()
    );
    print_test_result(&comparison.kruskal_wallis);
    print_test_result(&comparison.anova);
}

fn print_boxplot(figure: &ComparisonFigure, decimals: u32) {
    println!("\n{}", figure.title.bright_green().bold());
    println!("   {} by {}", figure.y_label, figure.x_label);
    for series in &figure.series {
        println!(
            "   {:<14} whiskers {} to {}, quartiles {} / {} / {}, {} outliers",
            series.country.label(),
            format_value(series.lower_whisker, decimals),
            format_value(series.upper_whisker, decimals),
            format_value(series.q1, decimals),
            format_value(series.median, decimals),
            format_value(series.q3, decimals),
            series.outliers.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir) {
        let rows = [
            (Country::Benin, ["10", "20", "30"]),
            (Country::SierraLeone, ["5", "NA", "7"]),
            (Country::Togo, ["40", "50", "60"]),
        ];
        for (country, values) in rows {
            let mut body = String::from("Timestamp,GHI,DNI\n");
            for (i, value) in values.iter().enumerate() {
                body.push_str(&format!("2021-08-09 0{}:00,{},1\n", i, value));
            }
            fs::write(dir.path().join(country.default_file_name()), body).unwrap();
        }
    }

    fn analysis_args(dir: &TempDir) -> AnalysisArgs {
        AnalysisArgs {
            data_dir: Some(dir.path().to_path_buf()),
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(3.14159, 2), "3.14");
        assert_eq!(format_value(2.0, 0), "2");
    }

    #[test]
    fn test_export_writes_summary_csv() {
        let data_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        write_fixture(&data_dir);

        let args = ExportArgs {
            analysis: analysis_args(&data_dir),
            output: Some(out_dir.path().to_path_buf()),
        };
        let cache = DatasetCache::new(args.analysis.to_config());
        let dataset = cache.get().unwrap();

        let path = run_export(&dataset, cache.config(), &args).unwrap();
        assert_eq!(path, out_dir.path().join("GHI_summary_stats.csv"));

        let table = SummaryTable::read_csv(fs::File::open(&path).unwrap(), "GHI").unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.row(Country::SierraLeone).unwrap().count, 2);
        assert_eq!(table.row(Country::Togo).unwrap().mean, 50.0);
    }

    #[test]
    fn test_run_commands_end_to_end() {
        let data_dir = TempDir::new().unwrap();
        write_fixture(&data_dir);

        for command in [
            Commands::Summary(analysis_args(&data_dir)),
            Commands::Rank(analysis_args(&data_dir)),
            Commands::Test(analysis_args(&data_dir)),
            Commands::Report(analysis_args(&data_dir)),
        ] {
            let result = run(Args {
                command: Some(command),
            });
            assert!(result.is_ok(), "{:?}", result);
        }
    }

    #[test]
    fn test_run_reports_unknown_metric() {
        let data_dir = TempDir::new().unwrap();
        write_fixture(&data_dir);

        let args = AnalysisArgs {
            metric: "Pressure".to_string(),
            ..analysis_args(&data_dir)
        };
        let result = run(Args {
            command: Some(Commands::Rank(args)),
        });
        assert!(matches!(result, Err(SolarError::UnknownMetric { .. })));
    }

    #[test]
    fn test_report_survives_insufficient_data() {
        let data_dir = TempDir::new().unwrap();
        write_fixture(&data_dir);

        // A single selected country cannot be tested but still gets a report
        let args = AnalysisArgs {
            countries: Some("Togo".parse().unwrap()),
            ..analysis_args(&data_dir)
        };
        let result = run(Args {
            command: Some(Commands::Report(args)),
        });
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_missing_command() {
        assert!(matches!(
            run(Args { command: None }),
            Err(SolarError::Configuration { .. })
        ));
    }
}
