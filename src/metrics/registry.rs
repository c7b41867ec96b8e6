//! Metric registry and pipeline driver.
//!
//! Metrics are registered behind a common interface and run in
//! registration order. A metric's compute is pure with respect to the
//! model: its only side effect is producing output values.

use super::value::NumericValue;
use crate::model::Model;
use crate::utils::error::MetricError;
use log::{debug, warn};

/// A named metric computation over a built and classified model
pub trait Metric {
    fn name(&self) -> &str;

    /// Compute this metric's values. Must not mutate anything observable;
    /// the model is shared read-only across metrics.
    fn compute(&self, model: &Model) -> Result<Vec<NumericValue>, MetricError>;
}

/// Registration table of metrics, run in registration order.
///
/// Registering a name twice keeps only the latest registration
/// (last-registration-wins, matching the type registry policy), and the
/// metric moves to the end of the run order.
#[derive(Default)]
pub struct MetricRegistry {
    metrics: Vec<Box<dyn Metric>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in metrics
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(super::hazard::HazardMetric));
        registry
    }

    pub fn register(&mut self, metric: Box<dyn Metric>) {
        if let Some(position) = self
            .metrics
            .iter()
            .position(|existing| existing.name() == metric.name())
        {
            warn!(
                "metric '{}' re-registered, keeping the latest registration",
                metric.name()
            );
            self.metrics.remove(position);
        }
        self.metrics.push(metric);
    }

    /// Registered metric names, in run order
    pub fn names(&self) -> Vec<&str> {
        self.metrics.iter().map(|metric| metric.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Run every registered metric and concatenate their outputs in
    /// registration order.
    ///
    /// A metric's internal failure does not abort the remaining metrics;
    /// the failure is logged and its output omitted.
    pub fn run_all(&self, model: &Model) -> Vec<NumericValue> {
        let mut values = Vec::new();
        for metric in &self.metrics {
            debug!("Running metric '{}'", metric.name());
            match metric.compute(model) {
                Ok(mut metric_values) => values.append(&mut metric_values),
                Err(e) => warn!(
                    "metric '{}' failed, continuing with remaining metrics: {}",
                    metric.name(),
                    e
                ),
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::value::Unit;

    struct ConstantMetric {
        name: &'static str,
        value: f64,
    }

    impl Metric for ConstantMetric {
        fn name(&self) -> &str {
            self.name
        }

        fn compute(&self, _model: &Model) -> Result<Vec<NumericValue>, MetricError> {
            Ok(vec![NumericValue::new(
                self.name,
                Unit::UnitlessNumberSmallerIsBetter,
                self.value,
                "constant",
            )])
        }
    }

    struct FailingMetric;

    impl Metric for FailingMetric {
        fn name(&self) -> &str {
            "failing"
        }

        fn compute(&self, _model: &Model) -> Result<Vec<NumericValue>, MetricError> {
            Err(MetricError::ComputationFailed {
                metric: "failing".to_string(),
                reason: "synthetic".to_string(),
            })
        }
    }

    #[test]
    fn test_run_order_matches_registration_order() {
        let mut registry = MetricRegistry::new();
        registry.register(Box::new(ConstantMetric { name: "b", value: 2.0 }));
        registry.register(Box::new(ConstantMetric { name: "a", value: 1.0 }));

        let values = registry.run_all(&Model::new());
        let names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_failure_does_not_abort_remaining_metrics() {
        let mut registry = MetricRegistry::new();
        registry.register(Box::new(ConstantMetric { name: "first", value: 1.0 }));
        registry.register(Box::new(FailingMetric));
        registry.register(Box::new(ConstantMetric { name: "last", value: 3.0 }));

        let values = registry.run_all(&Model::new());
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].name, "first");
        assert_eq!(values[1].name, "last");
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = MetricRegistry::new();
        registry.register(Box::new(ConstantMetric { name: "m", value: 1.0 }));
        registry.register(Box::new(ConstantMetric { name: "other", value: 0.0 }));
        registry.register(Box::new(ConstantMetric { name: "m", value: 9.0 }));

        assert_eq!(registry.len(), 2);
        let values = registry.run_all(&Model::new());
        assert_eq!(values[0].name, "other");
        assert_eq!(values[1].name, "m");
        assert_eq!(values[1].value, 9.0);
    }
}
