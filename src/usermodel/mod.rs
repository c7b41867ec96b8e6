//! User-facing activity segmentation.
//!
//! Post-processes the built model into labeled activity segments
//! (Load/Response/Idle/Animation) and assigns each top-level event to at
//! most one segment.

pub mod classifier;
pub mod expectation;

// Re-export main types
pub use classifier::{
    AnimationDetector, CandidateWindow, ExpectationDetector, IdleDetector, LoadDetector,
    ResponseDetector, UserExpectationClassifier,
};
pub use expectation::{ExpectationKind, UserExpectation};
