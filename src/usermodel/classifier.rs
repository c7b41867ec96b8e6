//! User expectation classifier.
//!
//! Detection is pluggable per kind: each detector scans the model's
//! markers for candidate windows. Detectors run in claim-priority order
//! and each sees the segments produced by the detectors before it, which
//! is how the idle detector fills the gaps the others leave.
//!
//! Event assignment is first-claim-wins: a top-level event goes to the
//! first expectation (in priority order) whose window contains its start
//! timestamp. Events claimed by none stay unassociated and are invisible
//! to metrics that scan `associated_events` - a documented limitation,
//! not corrected here.

use super::expectation::{ExpectationKind, UserExpectation};
use crate::model::Model;
use crate::utils::config::{
    ANIMATION_MAX_FRAME_GAP_US, FIRST_PAINT_MARKERS, FRAME_INTERVAL_US, FRAME_MARKER_NAMES,
    INPUT_MARKER_PREFIX, LOAD_FALLBACK_WINDOW_US, MIN_ANIMATION_FRAMES, NAVIGATION_START_MARKERS,
    RESPONSE_WINDOW_US,
};
use log::debug;

/// A candidate activity window produced by a detector
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateWindow {
    pub start: i64,
    pub end: i64,
    pub initiator_title: String,
}

/// Detects candidate windows for one expectation kind
pub trait ExpectationDetector {
    fn kind(&self) -> ExpectationKind;

    /// Scan the model for candidate windows. `earlier` holds the
    /// segments already produced by higher-priority detectors.
    fn detect(&self, model: &Model, earlier: &[UserExpectation]) -> Vec<CandidateWindow>;
}

/// Runs the detector set and assigns events to the resulting segments
pub struct UserExpectationClassifier {
    detectors: Vec<Box<dyn ExpectationDetector>>,
}

impl UserExpectationClassifier {
    /// Classifier with no detectors; add them in claim-priority order
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// The standard detector set, in claim-priority order
    pub fn with_default_detectors() -> Self {
        let mut classifier = Self::new();
        for kind in ExpectationKind::PRIORITY_ORDER {
            let detector: Box<dyn ExpectationDetector> = match kind {
                ExpectationKind::Response => Box::new(ResponseDetector),
                ExpectationKind::Load => Box::new(LoadDetector),
                ExpectationKind::Animation => Box::new(AnimationDetector),
                ExpectationKind::Idle => Box::new(IdleDetector),
            };
            classifier.add_detector(detector);
        }
        classifier
    }

    pub fn add_detector(&mut self, detector: Box<dyn ExpectationDetector>) {
        self.detectors.push(detector);
    }

    /// Annotate the model with its ordered expectation sequence
    ///
    /// **Public** - main entry point, runs detection then assignment
    pub fn classify(&self, model: &mut Model) {
        let mut expectations: Vec<UserExpectation> = Vec::new();

        for detector in &self.detectors {
            let kind = detector.kind();
            let mut windows = detector.detect(model, &expectations);
            windows.sort_by_key(|window| window.start);

            let mut index = 0;
            for window in windows {
                if window.end <= window.start {
                    continue;
                }
                expectations.push(UserExpectation {
                    stable_id: format!("{}.{}", kind.stage_title(), index),
                    kind,
                    initiator_title: window.initiator_title,
                    start: window.start,
                    end: window.end,
                    associated_events: Vec::new(),
                });
                index += 1;
            }
        }

        // First-claim-wins: expectations are in priority order here, so a
        // linear scan gives each event to the highest-priority window
        // containing its start
        for event_id in model.top_level_events() {
            let Some(slice) = model.event_slice(event_id) else {
                continue;
            };
            if let Some(index) = expectations
                .iter()
                .position(|expectation| expectation.contains(slice.start))
            {
                expectations[index].associated_events.push(event_id);
            }
        }

        // The model's expectation sequence is ordered by window start,
        // priority breaking ties
        expectations.sort_by(|a, b| a.start.cmp(&b.start).then(a.kind.cmp(&b.kind)));

        debug!("Classified {} user expectations", expectations.len());
        model.expectations = expectations;
    }
}

impl Default for UserExpectationClassifier {
    fn default() -> Self {
        Self::with_default_detectors()
    }
}

/// Collect timestamps of markers matching `predicate`, across all threads
fn marker_timestamps<F>(model: &Model, predicate: F) -> Vec<i64>
where
    F: Fn(&str) -> bool,
{
    let mut timestamps: Vec<i64> = model
        .processes
        .values()
        .flat_map(|process| process.threads.values())
        .flat_map(|thread| thread.markers.iter())
        .filter(|marker| predicate(&marker.name))
        .map(|marker| marker.timestamp)
        .collect();
    timestamps.sort_unstable();
    timestamps
}

/// Load windows run from a navigation start to the first paint marker
/// after it, or a fixed fallback window when no paint follows
pub struct LoadDetector;

impl ExpectationDetector for LoadDetector {
    fn kind(&self) -> ExpectationKind {
        ExpectationKind::Load
    }

    fn detect(&self, model: &Model, _earlier: &[UserExpectation]) -> Vec<CandidateWindow> {
        let navigations =
            marker_timestamps(model, |name| NAVIGATION_START_MARKERS.contains(&name));
        let paints = marker_timestamps(model, |name| FIRST_PAINT_MARKERS.contains(&name));

        navigations
            .into_iter()
            .map(|start| {
                let end = paints
                    .iter()
                    .find(|&&paint| paint > start)
                    .copied()
                    .unwrap_or(start + LOAD_FALLBACK_WINDOW_US);
                CandidateWindow {
                    start,
                    end,
                    initiator_title: "Navigation".to_string(),
                }
            })
            .collect()
    }
}

/// Response windows open at each input-dispatch marker
pub struct ResponseDetector;

impl ExpectationDetector for ResponseDetector {
    fn kind(&self) -> ExpectationKind {
        ExpectationKind::Response
    }

    fn detect(&self, model: &Model, _earlier: &[UserExpectation]) -> Vec<CandidateWindow> {
        let mut windows = Vec::new();
        for process in model.processes.values() {
            for thread in process.threads.values() {
                for marker in &thread.markers {
                    if let Some(gesture) = marker.name.strip_prefix(INPUT_MARKER_PREFIX) {
                        windows.push(CandidateWindow {
                            start: marker.timestamp,
                            end: marker.timestamp + RESPONSE_WINDOW_US,
                            initiator_title: gesture.to_string(),
                        });
                    }
                }
            }
        }
        windows
    }
}

/// Animation windows are maximal runs of frame markers with small gaps
pub struct AnimationDetector;

impl ExpectationDetector for AnimationDetector {
    fn kind(&self) -> ExpectationKind {
        ExpectationKind::Animation
    }

    fn detect(&self, model: &Model, _earlier: &[UserExpectation]) -> Vec<CandidateWindow> {
        let frames = marker_timestamps(model, |name| FRAME_MARKER_NAMES.contains(&name));
        let mut windows = Vec::new();
        let mut run_start = 0;

        for index in 0..frames.len() {
            let is_run_end = match frames.get(index + 1) {
                Some(&next) => next - frames[index] > ANIMATION_MAX_FRAME_GAP_US,
                None => true,
            };
            if is_run_end {
                let run = &frames[run_start..=index];
                if run.len() >= MIN_ANIMATION_FRAMES {
                    windows.push(CandidateWindow {
                        start: run[0],
                        end: run[run.len() - 1] + FRAME_INTERVAL_US,
                        initiator_title: "Frame".to_string(),
                    });
                }
                run_start = index + 1;
            }
        }
        windows
    }
}

/// Idle windows are the complement of every earlier window within the
/// trace bounds
pub struct IdleDetector;

impl ExpectationDetector for IdleDetector {
    fn kind(&self) -> ExpectationKind {
        ExpectationKind::Idle
    }

    fn detect(&self, model: &Model, earlier: &[UserExpectation]) -> Vec<CandidateWindow> {
        let Some((min_ts, max_ts)) = model.bounds else {
            return Vec::new();
        };
        // Half-open windows: extend one past the final timestamp so an
        // event starting exactly at the trace end is still covered
        let trace_end = max_ts + 1;

        let mut busy: Vec<(i64, i64)> = earlier
            .iter()
            .map(|expectation| (expectation.start, expectation.end))
            .collect();
        busy.sort_unstable();

        let mut windows = Vec::new();
        let mut cursor = min_ts;
        for (start, end) in busy {
            if start > cursor {
                windows.push(CandidateWindow {
                    start: cursor,
                    end: start,
                    initiator_title: String::new(),
                });
            }
            cursor = cursor.max(end);
        }
        if cursor < trace_end {
            windows.push(CandidateWindow {
                start: cursor,
                end: trace_end,
                initiator_title: String::new(),
            });
        }
        windows
    }
}
