//! Object instances and snapshots.
//!
//! An instance models one stateful object's lifetime; its snapshots record
//! the object's value at scattered points in time. Snapshots are owned by
//! their instance and hold the owning instance's arena id as a weak
//! back-reference (lookup only, never ownership).

use super::layout_tree::LayoutTreeSnapshot;
use super::visual_progress::VisualProgressSnapshot;

/// Arena index of an object instance within the model
pub type InstanceId = usize;

/// Common fields shared by every instance, regardless of registered type
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceBase {
    /// Declared type name from the object-creation or snapshot event
    pub type_name: String,

    /// Scope the instance id is unique within
    pub scope: String,

    /// Wire id from the object events
    pub id: String,

    /// Start of the lifetime window (µs)
    pub creation_ts: i64,

    /// End of the lifetime window (µs); `None` while the instance is
    /// still alive at end of trace
    pub deletion_ts: Option<i64>,
}

/// Type-specific instance state, selected through the type registry
#[derive(Debug, Clone, PartialEq)]
pub enum InstancePayload {
    /// Fallback for unregistered type names
    Generic,
    LayoutTree,
}

/// Type-specific snapshot state, selected through the type registry
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotPayload {
    /// Fallback for unregistered type names or undecodable args
    Generic,
    LayoutTree(LayoutTreeSnapshot),
    VisualProgress(VisualProgressSnapshot),
}

/// Common fields shared by every snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotBase {
    /// Capture timestamp (µs); strictly increasing within an instance
    pub timestamp: i64,

    /// Raw args payload from the snapshot event
    pub args: serde_json::Map<String, serde_json::Value>,

    /// Weak back-reference to the owning instance
    pub owner: InstanceId,
}

/// One recorded snapshot of an object's value
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSnapshot {
    pub base: SnapshotBase,
    pub payload: SnapshotPayload,
}

/// A lifetime-tracked object with its ordered snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInstance {
    pub base: InstanceBase,
    pub payload: InstancePayload,

    /// Snapshots in strictly increasing timestamp order, all within
    /// `[creation_ts, deletion_ts)`
    pub snapshots: Vec<ObjectSnapshot>,
}

impl ObjectInstance {
    /// Whether the instance's lifetime window contains `ts`
    pub fn is_alive_at(&self, ts: i64) -> bool {
        ts >= self.base.creation_ts && self.base.deletion_ts.map_or(true, |end| ts < end)
    }
}

/// Snapshot events carry their payload under `args["snapshot"]`; some
/// producers inline the payload at the top level instead.
pub fn snapshot_field<'a>(
    args: &'a serde_json::Map<String, serde_json::Value>,
    field: &str,
) -> Option<&'a serde_json::Value> {
    args.get("snapshot")
        .and_then(|snapshot| snapshot.get(field))
        .or_else(|| args.get(field))
}
