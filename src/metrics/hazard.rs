//! Long-idle-task hazard metric.
//!
//! Estimates the risk that background work degrades perceived
//! responsiveness. Each Idle segment is scored independently: the idle
//! period right after a load is usually still very busy, while the idle
//! before it is nearly empty, and one combined score would hide that.
//!
//! This metric only sees events the classifier associated with Idle
//! segments; long tasks claimed by another segment kind are out of its
//! view.

use super::registry::Metric;
use super::responsiveness::compute_responsiveness_risk;
use super::statistics::weighted_mean;
use super::value::{NumericValue, Unit};
use crate::model::slice::Slice;
use crate::model::Model;
use crate::usermodel::expectation::{ExpectationKind, UserExpectation};
use crate::utils::config::LONG_TASK_MS;
use crate::utils::error::MetricError;

const RISK_DESCRIPTION: &str = "Risk of impacting responsiveness";

/// Weighting transform biasing a mean toward the worst (largest) scores.
///
/// Deliberately unbounded so a single very bad task dominates the blend.
pub fn perceptual_blend(score: f64) -> f64 {
    score.exp()
}

/// Top-level associated events longer than the long-task threshold
fn find_long_tasks<'m>(model: &'m Model, expectation: &UserExpectation) -> Vec<&'m Slice> {
    expectation
        .associated_events
        .iter()
        .filter_map(|&event_id| model.event_slice(event_id))
        .filter(|slice| slice.is_top_level && slice.duration_ms() > LONG_TASK_MS)
        .collect()
}

/// Hazard score for one Idle segment, plus its emitted value.
///
/// The per-task durations ride along as diagnostics; the grouping keys
/// let the reporting layer attribute the value to its segment.
fn compute_long_idle_task_hazard(
    model: &Model,
    expectation: &UserExpectation,
) -> (f64, NumericValue) {
    let long_tasks = find_long_tasks(model, expectation);

    let mut risk_scores = Vec::with_capacity(long_tasks.len());
    let mut duration_values = Vec::with_capacity(long_tasks.len());
    for task in long_tasks {
        risk_scores.push(compute_responsiveness_risk(task.duration_ms()));
        duration_values.push(NumericValue::new(
            "long idle task duration",
            Unit::TimeDurationInMsSmallerIsBetter,
            task.duration_ms(),
            "Duration of a long idle task",
        ));
    }

    // No long tasks means no measured hazard; 0 is substituted for the
    // no-data sentinel, indistinguishable from a measured zero downstream
    let hazard_score = weighted_mean(&risk_scores, perceptual_blend).unwrap_or(0.0);

    let mut value = NumericValue::new(
        "long idle tasks hazard",
        Unit::NormalizedPercentageSmallerIsBetter,
        hazard_score,
        RISK_DESCRIPTION,
    );
    value.grouping_keys.insert(
        "userExpectationStableId".to_string(),
        expectation.stable_id.clone(),
    );
    value.grouping_keys.insert(
        "userExpectationStageTitle".to_string(),
        expectation.stage_title().to_string(),
    );
    value.grouping_keys.insert(
        "userExpectationInitiatorTitle".to_string(),
        expectation.initiator_title.clone(),
    );
    value
        .diagnostics
        .insert("values".to_string(), duration_values);

    (hazard_score, value)
}

/// Responsiveness-risk score over all Idle segments
pub struct HazardMetric;

impl HazardMetric {
    pub const NAME: &'static str = "hazard";
}

impl Metric for HazardMetric {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn compute(&self, model: &Model) -> Result<Vec<NumericValue>, MetricError> {
        let mut hazard_scores = Vec::new();
        let mut expectation_values = Vec::new();

        for expectation in model
            .expectations
            .iter()
            .filter(|expectation| expectation.kind == ExpectationKind::Idle)
        {
            let (score, value) = compute_long_idle_task_hazard(model, expectation);
            hazard_scores.push(score);
            expectation_values.push(value);
        }

        let overall_hazard = weighted_mean(&hazard_scores, perceptual_blend).unwrap_or(0.0);

        let mut overall = NumericValue::new(
            Self::NAME,
            Unit::NormalizedPercentageSmallerIsBetter,
            overall_hazard,
            RISK_DESCRIPTION,
        );
        overall
            .diagnostics
            .insert("values".to_string(), expectation_values.clone());

        let mut values = expectation_values;
        values.push(overall);
        Ok(values)
    }
}
