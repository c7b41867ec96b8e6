//! Gatherer boundary for artifact-producing collaborators.
//!
//! Gatherers run after a trace pass completes and store their result on
//! themselves. The contract: `after_pass` never fails outward. On any
//! failure the stored artifact carries a human-readable `debug_string`
//! instead, and callers detect failure by checking for it.

pub mod speedline;

// Re-export main types
pub use speedline::{LoadData, PassContext, SpeedIndexArtifact, SpeedlineGatherer};
