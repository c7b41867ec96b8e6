//! Webtrace Studio CLI
//!
//! A performance diagnostics tool for web page loads.
//! Computes metric reports from browser trace files.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use webtrace_studio::commands::{
    display_schema, display_version, execute_analyze, validate_args, validate_report_file,
    AnalyzeArgs,
};

/// Webtrace Studio - Trace-based performance diagnostics for web page loads
#[derive(Parser, Debug)]
#[command(name = "webtrace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a trace file and write a metric report
    Analyze {
        /// Path to the trace JSON file
        #[arg(short, long)]
        trace: PathBuf,

        /// Output path for the JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Also compute the speed index and include it in the report
        #[arg(long)]
        speed_index: bool,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            trace,
            output,
            speed_index,
            summary,
        } => {
            let args = AnalyzeArgs {
                trace_path: trace,
                output_json: output,
                report_speed_index: speed_index,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            // Execute analysis
            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
