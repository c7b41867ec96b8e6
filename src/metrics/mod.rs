//! Metric computation over a built and classified model.
//!
//! This module provides:
//! - The `NumericValue` output record and its unit enumeration
//! - Numeric aggregation primitives (weighted mean)
//! - The metric registry and pipeline driver
//! - The registered metrics (responsiveness hazard)

pub mod hazard;
pub mod registry;
pub mod responsiveness;
pub mod statistics;
pub mod value;

// Re-export main types
pub use hazard::HazardMetric;
pub use registry::{Metric, MetricRegistry};
pub use responsiveness::{compute_responsiveness_risk, satisfied_fraction, ReferenceDistribution};
pub use statistics::weighted_mean;
pub use value::{NumericValue, Unit};
