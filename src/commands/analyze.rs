//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads trace JSON from disk
//! 2. Parses the event stream
//! 3. Builds the object model
//! 4. Classifies user expectations
//! 5. Runs the registered metrics (plus the optional speed index)
//! 6. Writes the report

use crate::gatherer::{LoadData, PassContext, SpeedlineGatherer};
use crate::metrics::value::{NumericValue, Unit};
use crate::metrics::MetricRegistry;
use crate::model::{build_model, TypeRegistry};
use crate::output::{build_report, write_report};
use crate::parser::parse_trace;
use crate::usermodel::UserExpectationClassifier;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Path to the trace JSON file
    pub trace_path: PathBuf,

    /// Output path for the JSON report
    pub output_json: PathBuf,

    /// Also compute the speed index and include it in the report
    pub report_speed_index: bool,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            trace_path: PathBuf::new(),
            output_json: PathBuf::from("report.json"),
            report_speed_index: false,
            print_summary: false,
        }
    }
}

/// Validate analyze arguments before doing any work
///
/// **Public** - called from main.rs ahead of execute_analyze
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.trace_path.as_os_str().is_empty() {
        anyhow::bail!("trace path must not be empty");
    }
    if !args.trace_path.exists() {
        anyhow::bail!("trace file not found: {}", args.trace_path.display());
    }
    Ok(())
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Analyze command arguments
///
/// # Returns
/// Ok if analysis succeeds, Err with context if any step fails
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Starting analysis of: {}", args.trace_path.display());

    // Step 1: Read the trace file
    info!("Step 1/6: Reading trace file...");
    let raw = std::fs::read_to_string(&args.trace_path)
        .with_context(|| format!("Failed to read trace file {}", args.trace_path.display()))?;
    let trace_contents: serde_json::Value =
        serde_json::from_str(&raw).context("Trace file is not valid JSON")?;

    // Step 2: Parse the event stream
    info!("Step 2/6: Parsing trace events...");
    let events = parse_trace(&trace_contents).context("Failed to parse trace data")?;

    // Step 3: Build the object model
    info!("Step 3/6: Building object model...");
    let registry = TypeRegistry::with_defaults();
    let mut model = build_model(&registry, &events);

    debug!(
        "Model: {} processes, {} slices, {} object instances",
        model.processes.len(),
        model.slice_count(),
        model.instances.len()
    );

    // Step 4: Classify user expectations
    info!("Step 4/6: Classifying user expectations...");
    let classifier = UserExpectationClassifier::with_default_detectors();
    classifier.classify(&mut model);

    // Step 5: Run registered metrics
    info!("Step 5/6: Computing metrics...");
    let metrics = MetricRegistry::with_defaults();
    let mut values = metrics.run_all(&model);

    if args.report_speed_index {
        if let Some(value) = compute_speed_index_value(&trace_contents) {
            values.push(value);
        }
    }

    // Step 6: Write the report
    info!("Step 6/6: Writing report...");
    let trace_label = args
        .trace_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.trace_path.display().to_string());
    let report = build_report(&trace_label, values);
    write_report(&report, &args.output_json).context("Failed to write report")?;

    if args.print_summary {
        print_summary(&report, &model);
    }

    info!("Analysis completed in {:.2?}", start_time.elapsed());

    Ok(())
}

/// Run the speed-index gatherer and wrap its artifact as a value.
///
/// A gatherer failure is reported through the artifact's debug string and
/// the value is simply omitted; analysis itself never fails on it.
fn compute_speed_index_value(trace_contents: &serde_json::Value) -> Option<NumericValue> {
    let mut gatherer = SpeedlineGatherer::new();
    let load_data = LoadData {
        trace_contents: trace_contents.clone(),
    };
    gatherer.after_pass(&PassContext::default(), &load_data);

    match gatherer.artifact.speed_index {
        Some(speed_index) => Some(NumericValue::new(
            "speed index",
            Unit::UnitlessNumberSmallerIsBetter,
            speed_index,
            "Time-weighted average of visual incompleteness during load",
        )),
        None => {
            warn!(
                "Speed index omitted from report: {}",
                gatherer
                    .artifact
                    .debug_string
                    .as_deref()
                    .unwrap_or("unknown failure")
            );
            None
        }
    }
}

/// Print a human-readable summary to stdout
///
/// **Private** - internal helper for execute_analyze
fn print_summary(report: &crate::output::DiagnosticsReport, model: &crate::model::Model) {
    println!("Trace: {}", report.trace_label);
    println!("  Processes:    {}", model.processes.len());
    println!("  Slices:       {}", model.slice_count());
    println!("  Instances:    {}", model.instances.len());
    println!("  Expectations: {}", model.expectations.len());
    println!();
    println!("Values:");
    for value in &report.values {
        println!("  {:<28} {:.4}", value.name, value.value);
    }
}
