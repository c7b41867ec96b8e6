//! Main trace parser.
//!
//! Turns raw trace JSON into a sequence of `RawEvent` records, preserving
//! input order (later events can extend or close state opened earlier, so
//! the builder depends on seeing them in their original order).

use super::schema::RawEvent;
use crate::utils::config::EVENT_ARRAY_FIELD_NAMES;
use crate::utils::error::ParseError;
use log::{debug, warn};

/// Parse raw trace JSON into event records
///
/// **Public** - main entry point for parsing
///
/// # Arguments
/// * `raw_trace` - Trace JSON: either a bare event array or an object
///   wrapping the array under a known field name
///
/// # Returns
/// Event records in input order; malformed individual records are dropped
///
/// # Errors
/// * `ParseError::InvalidFormat` - No recognizable event array, or every
///   record in a non-empty array was malformed
pub fn parse_trace(raw_trace: &serde_json::Value) -> Result<Vec<RawEvent>, ParseError> {
    let events_array = extract_event_array(raw_trace)?;
    let events = parse_event_array(events_array)?;

    debug!("Parsed {} trace events", events.len());

    Ok(events)
}

/// Locate the event array inside the trace container
///
/// **Private** - internal helper for parse_trace
fn extract_event_array(raw_trace: &serde_json::Value) -> Result<&Vec<serde_json::Value>, ParseError> {
    match raw_trace {
        serde_json::Value::Array(events) => Ok(events),

        serde_json::Value::Object(obj) => {
            for field in EVENT_ARRAY_FIELD_NAMES {
                if let Some(events) = obj.get(*field).and_then(|v| v.as_array()) {
                    return Ok(events);
                }
            }
            Err(ParseError::InvalidFormat(
                "trace object carries no recognizable event array".to_string(),
            ))
        }

        _ => Err(ParseError::InvalidFormat(
            "trace must be a JSON object or array".to_string(),
        )),
    }
}

/// Parse the array of event records
///
/// **Private** - internal parsing logic
fn parse_event_array(events_array: &[serde_json::Value]) -> Result<Vec<RawEvent>, ParseError> {
    let mut events = Vec::with_capacity(events_array.len());

    for (index, event_value) in events_array.iter().enumerate() {
        match serde_json::from_value::<RawEvent>(event_value.clone()) {
            Ok(event) => events.push(event),
            Err(e) => {
                // Log but don't fail - ingestion continues past malformed records
                warn!("Dropping malformed trace event {}: {}", index, e);
            }
        }
    }

    if events.is_empty() && !events_array.is_empty() {
        return Err(ParseError::InvalidFormat(
            "all trace events failed to parse".to_string(),
        ));
    }

    Ok(events)
}
