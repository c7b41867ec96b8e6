//! Visual-progress frame object type.
//!
//! Frame analyzers upstream of the engine record the page's visual
//! completeness as object snapshots of type `VisualProgress`. The speed
//! index gatherer integrates over these frames.

use super::object_instance::{
    snapshot_field, InstanceBase, InstancePayload, SnapshotBase, SnapshotPayload,
};
use super::type_registry::{TypeRegistration, TypeRegistry, ViewMetadata};

pub const TYPE_NAME: &str = "VisualProgress";

/// One visual-completeness sample
#[derive(Debug, Clone, PartialEq)]
pub struct VisualProgressSnapshot {
    /// Fraction of the final visual state reached, in `[0, 1]`
    pub completeness: f64,
}

/// Register the visual-progress type with the registry
pub fn register(registry: &mut TypeRegistry) {
    registry.register(
        TYPE_NAME,
        TypeRegistration {
            snapshot_factory: make_snapshot,
            instance_factory: make_instance,
            view_metadata: ViewMetadata {
                name: "visualProgress",
                plural_name: "visualProgress",
            },
        },
    );
}

fn make_instance(_base: &InstanceBase) -> InstancePayload {
    InstancePayload::Generic
}

fn make_snapshot(base: &SnapshotBase) -> SnapshotPayload {
    match snapshot_field(&base.args, "completeness").and_then(|v| v.as_f64()) {
        Some(completeness) => SnapshotPayload::VisualProgress(VisualProgressSnapshot {
            completeness: completeness.clamp(0.0, 1.0),
        }),
        // A frame without a completeness value degrades to a generic snapshot
        None => SnapshotPayload::Generic,
    }
}
