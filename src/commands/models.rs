use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Trace: {}", report.trace_label);
    println!("  Values: {}", report.values.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Webtrace Studio Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string        - Schema version (e.g., '1.0.0')");
        println!("  trace_label: string    - Name of the analyzed trace");
        println!("  values: array          - Metric values in pipeline order");
        println!("    name: string         - Value name (e.g., 'hazard')");
        println!("    unit: string         - Fixed unit identifier");
        println!("    value: number        - The numeric value");
        println!("    description: string  - Human-readable meaning");
        println!("    groupingKeys: object - Keys the reporting layer groups by");
        println!("    diagnostics: object  - Named lists of supporting values");
        println!("  generated_at: string   - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Webtrace Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Trace-based performance diagnostics for web page loads.");
}
