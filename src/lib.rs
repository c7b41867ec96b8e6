//! Webtrace Studio
//!
//! Trace-based performance diagnostics for web page loads.
//!
//! This crate ingests structured execution traces captured from a
//! browser's tracing subsystem, reconstructs a typed object model
//! (process/thread slices, async spans, object-lifetime snapshots,
//! classified activity segments), and computes derived quality metrics
//! through an extensible registry of metric calculators.
//!
//! ## Getting Started
//!
//! Most users should install and use the CLI:
//!
//! ```bash
//! cargo install webtrace-studio
//! webtrace --help
//! ```

pub mod commands;
pub mod gatherer;
pub mod metrics;
pub mod model;
pub mod output;
pub mod parser;
pub mod usermodel;
pub mod utils;
