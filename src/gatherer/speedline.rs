//! Speed-index gatherer.
//!
//! Computes the speed index of a page load: the time-weighted integral of
//! visual incompleteness over the load, in milliseconds. Lower is faster.
//! Visual-completeness frames reach the engine as `VisualProgress` object
//! snapshots recorded in the trace by an upstream frame analyzer.

use crate::model::object_instance::SnapshotPayload;
use crate::model::{build_model, visual_progress, TypeRegistry};
use crate::parser::parse_trace;
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::Serialize;

/// Context for the pass the gatherer ran in
#[derive(Debug, Clone, Default)]
pub struct PassContext {
    /// URL of the audited page, when known
    pub page_url: Option<String>,
}

/// Trace data collected during the pass
#[derive(Debug, Clone)]
pub struct LoadData {
    /// Raw trace JSON as streamed from the tracing subsystem
    pub trace_contents: serde_json::Value,
}

/// The artifact a speed-index gatherer stores after its pass.
///
/// A populated `debug_string` means the computation failed; `speed_index`
/// is `None` in that case.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpeedIndexArtifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_index: Option<f64>,

    pub frame_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_string: Option<String>,
}

/// Gatherer producing a speed-index artifact from trace contents
#[derive(Debug, Default)]
pub struct SpeedlineGatherer {
    pub artifact: SpeedIndexArtifact,
}

impl SpeedlineGatherer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run after the trace pass and store the artifact.
    ///
    /// Never fails outward: any failure (malformed or absent trace, no
    /// visual frames) is stored as a non-empty `debug_string` on the
    /// artifact instead of being raised.
    pub fn after_pass(&mut self, pass_context: &PassContext, load_data: &LoadData) {
        if let Some(url) = &pass_context.page_url {
            debug!("Computing speed index for {}", url);
        }

        self.artifact = match compute_speed_index(&load_data.trace_contents) {
            Ok((speed_index, frame_count)) => {
                debug!(
                    "Speed index {:.1} over {} visual frames",
                    speed_index, frame_count
                );
                SpeedIndexArtifact {
                    speed_index: Some(speed_index),
                    frame_count,
                    debug_string: None,
                }
            }
            Err(e) => {
                warn!("Speed index unavailable: {}", e);
                let mut message = e.to_string();
                if message.is_empty() {
                    message = "speed index unavailable".to_string();
                }
                SpeedIndexArtifact {
                    speed_index: None,
                    frame_count: 0,
                    debug_string: Some(message),
                }
            }
        };
    }
}

/// Compute the speed index and frame count from raw trace contents
///
/// **Public** - also used directly by the analyze command
///
/// # Errors
/// * `ParseError::InvalidFormat` - Unusable trace, or no visual progress
///   frames to integrate over
pub fn compute_speed_index(trace_contents: &serde_json::Value) -> Result<(f64, usize), ParseError> {
    let events = parse_trace(trace_contents)?;
    if events.is_empty() {
        return Err(ParseError::InvalidFormat(
            "trace contains no events".to_string(),
        ));
    }

    let registry = TypeRegistry::with_defaults();
    let model = build_model(&registry, &events);

    let mut frames: Vec<(i64, f64)> = Vec::new();
    for instance in model.instances_of_type(visual_progress::TYPE_NAME) {
        for snapshot in &instance.snapshots {
            if let SnapshotPayload::VisualProgress(frame) = &snapshot.payload {
                frames.push((snapshot.base.timestamp, frame.completeness));
            }
        }
    }
    frames.sort_by_key(|&(timestamp, _)| timestamp);

    if frames.len() < 2 {
        return Err(ParseError::InvalidFormat(
            "trace carries no visual progress frames".to_string(),
        ));
    }

    // Integral of (1 - completeness) over time, converted from µs to ms
    let mut area_us = 0.0;
    for pair in frames.windows(2) {
        let (start, completeness) = pair[0];
        let (end, _) = pair[1];
        area_us += (1.0 - completeness) * (end - start) as f64;
    }

    Ok((area_us / 1000.0, frames.len()))
}
