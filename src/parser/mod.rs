//! Trace parsing and schema definitions.
//!
//! This module handles:
//! - Deserializing raw trace JSON into event records
//! - Tolerating the container formats real trace producers emit
//! - Dropping malformed records without aborting ingestion

pub mod schema;
pub mod trace_event;

// Re-export main types
pub use schema::{Phase, RawEvent};
pub use trace_event::parse_trace;
