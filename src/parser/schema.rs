//! Wire schema for trace event records.
//!
//! Field names, phase codes, and timestamp units match the trace-event
//! format emitted by browser tracing subsystems, so existing producers
//! can be consumed without translation.

use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Phase code of a trace event, decoded from the single-character `ph` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// `B` - begin of a nested duration slice
    Begin,
    /// `E` - end of a nested duration slice
    End,
    /// `X` - complete slice carrying its own `dur`
    Complete,
    /// `I`/`i` - instant marker
    Instant,
    /// `R` - mark (navigation timing and similar)
    Mark,
    /// `N` - object creation
    ObjectCreate,
    /// `O` - object snapshot
    ObjectSnapshot,
    /// `D` - object deletion
    ObjectDelete,
    /// `b` - async span begin
    AsyncBegin,
    /// `e` - async span end
    AsyncEnd,
    /// `M` - metadata, carries no timing
    Metadata,
    /// Any phase code the engine does not model
    Other,
}

impl Phase {
    /// Decode a phase from its wire code. Unknown codes map to `Other`
    /// so they can be skipped instead of failing the whole record.
    pub fn from_code(code: &str) -> Self {
        match code {
            "B" => Phase::Begin,
            "E" => Phase::End,
            "X" => Phase::Complete,
            "I" | "i" => Phase::Instant,
            "R" => Phase::Mark,
            "N" => Phase::ObjectCreate,
            "O" => Phase::ObjectSnapshot,
            "D" => Phase::ObjectDelete,
            "b" => Phase::AsyncBegin,
            "e" => Phase::AsyncEnd,
            "M" => Phase::Metadata,
            _ => Phase::Other,
        }
    }

    /// Wire code for this phase
    pub fn code(&self) -> &'static str {
        match self {
            Phase::Begin => "B",
            Phase::End => "E",
            Phase::Complete => "X",
            Phase::Instant => "I",
            Phase::Mark => "R",
            Phase::ObjectCreate => "N",
            Phase::ObjectSnapshot => "O",
            Phase::ObjectDelete => "D",
            Phase::AsyncBegin => "b",
            Phase::AsyncEnd => "e",
            Phase::Metadata => "M",
            Phase::Other => "?",
        }
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        if code.is_empty() {
            return Err(DeError::custom("empty phase code"));
        }
        Ok(Phase::from_code(&code))
    }
}

impl Serialize for Phase {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

/// A single raw trace event record, as supplied by the tracing subsystem.
///
/// Immutable once parsed. Records missing any of `ph`, `ts`, `pid`, or
/// `tid` fail deserialization and are dropped by the parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event category (comma-separated list in real traces)
    #[serde(rename = "cat", default)]
    pub category: String,

    /// Event name; for object events this is the object type name
    #[serde(default)]
    pub name: String,

    /// Phase code
    #[serde(rename = "ph")]
    pub phase: Phase,

    /// Timestamp in microseconds
    #[serde(rename = "ts")]
    pub timestamp: i64,

    /// Duration in microseconds, for complete (`X`) events
    #[serde(rename = "dur", default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,

    /// Process id
    pub pid: i64,

    /// Thread id
    pub tid: i64,

    /// Object scope; defaults per the object model when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Event id, used to correlate object and async events
    #[serde(
        default,
        deserialize_with = "deserialize_event_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// Arbitrary key-value payload
    #[serde(default)]
    pub args: serde_json::Map<String, serde_json::Value>,
}

/// Producers emit `id` as a string, a number, or a `{"local"/"global": ...}`
/// wrapper. Normalize all of them to a plain string key.
fn deserialize_event_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Object(map) => map
            .get("local")
            .or_else(|| map.get("global"))
            .and_then(|inner| inner.as_str().map(str::to_string)),
        _ => None,
    }))
}
