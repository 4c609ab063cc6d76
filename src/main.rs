use anyhow::Context;
use clap::Parser;
use solar_compare::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let command_name = args
        .command
        .as_ref()
        .map(command_name)
        .unwrap_or("command");

    let result = commands::run(args).with_context(|| format!("{} failed", command_name));

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

fn command_name(command: &solar_compare::cli::args::Commands) -> &'static str {
    use solar_compare::cli::args::Commands;

    match command {
        Commands::Summary(_) => "summary",
        Commands::Rank(_) => "rank",
        Commands::Test(_) => "test",
        Commands::Report(_) => "report",
        Commands::Export(_) => "export",
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Solar Compare - Cross-Country Solar Measurement Comparison");
    println!("==========================================================");
    println!();
    println!("Compare solar irradiance and weather measurements across Benin,");
    println!("Sierra Leone and Togo from the cleaned per-country CSV exports.");
    println!();
    println!("USAGE:");
    println!("    solar-compare <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    summary     Per-country descriptive statistics of a metric");
    println!("    rank        Rank countries by the average of a metric");
    println!("    test        Kruskal-Wallis and ANOVA tests across countries");
    println!("    report      Overview, statistics, ranking, tests and boxplot figures");
    println!("    export      Write the summary statistics to <metric>_summary_stats.csv");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Summary of GHI for every country:");
    println!("    solar-compare summary");
    println!();
    println!("    # Rank two countries by direct normal irradiance:");
    println!("    solar-compare rank --metric DNI --countries \"Benin,Togo\"");
    println!();
    println!("    # Export the summary from a custom data directory:");
    println!("    solar-compare export --data-dir /path/to/data --output results/");
    println!();
    println!("For detailed help on any command, use:");
    println!("    solar-compare <COMMAND> --help");
}
