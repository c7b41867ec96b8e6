//! Registration table for object model types.
//!
//! Maps a type name to the factories that construct instance and snapshot
//! payloads, plus display metadata. The table is populated by explicit
//! registration calls at startup and holds no trace data itself.

use super::object_instance::{InstanceBase, InstancePayload, SnapshotBase, SnapshotPayload};
use log::warn;
use std::collections::HashMap;

/// Constructs the type-specific snapshot payload from the common base
pub type SnapshotFactory = fn(&SnapshotBase) -> SnapshotPayload;

/// Constructs the type-specific instance payload from the common base
pub type InstanceFactory = fn(&InstanceBase) -> InstancePayload;

/// Display metadata carried alongside the factories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewMetadata {
    pub name: &'static str,
    pub plural_name: &'static str,
}

/// One registered type: factories plus view metadata
pub struct TypeRegistration {
    pub snapshot_factory: SnapshotFactory,
    pub instance_factory: InstanceFactory,
    pub view_metadata: ViewMetadata,
}

/// Registration table keyed by type name.
///
/// Re-registering a name overwrites the previous entry
/// (last-registration-wins) with a warning, so startup registration order
/// is predictable.
#[derive(Default)]
pub struct TypeRegistry {
    entries: HashMap<String, TypeRegistration>,
}

impl TypeRegistry {
    /// Empty registry; builders fall back to generic payloads for
    /// every type name
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in object types
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        super::layout_tree::register(&mut registry);
        super::visual_progress::register(&mut registry);
        registry
    }

    /// Register construction factories for a type name
    pub fn register(&mut self, type_name: &str, registration: TypeRegistration) {
        if self
            .entries
            .insert(type_name.to_string(), registration)
            .is_some()
        {
            warn!(
                "object type '{}' re-registered, keeping the latest registration",
                type_name
            );
        }
    }

    pub fn lookup(&self, type_name: &str) -> Option<&TypeRegistration> {
        self.entries.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic_snapshot(_base: &SnapshotBase) -> SnapshotPayload {
        SnapshotPayload::Generic
    }

    fn generic_instance(_base: &InstanceBase) -> InstancePayload {
        InstancePayload::Generic
    }

    fn layout_instance(_base: &InstanceBase) -> InstancePayload {
        InstancePayload::LayoutTree
    }

    fn registration(instance_factory: InstanceFactory, name: &'static str) -> TypeRegistration {
        TypeRegistration {
            snapshot_factory: generic_snapshot,
            instance_factory,
            view_metadata: ViewMetadata {
                name,
                plural_name: name,
            },
        }
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = TypeRegistry::new();
        registry.register("Widget", registration(generic_instance, "widget"));
        registry.register("Widget", registration(layout_instance, "widgets"));

        assert_eq!(registry.len(), 1);
        let entry = registry.lookup("Widget").unwrap();
        assert_eq!(entry.view_metadata.name, "widgets");

        let base = InstanceBase {
            type_name: "Widget".to_string(),
            scope: "ptr".to_string(),
            id: "0x1".to_string(),
            creation_ts: 0,
            deletion_ts: None,
        };
        assert_eq!((entry.instance_factory)(&base), InstancePayload::LayoutTree);
    }

    #[test]
    fn test_defaults_include_builtin_types() {
        let registry = TypeRegistry::with_defaults();
        assert!(registry.lookup(crate::model::layout_tree::TYPE_NAME).is_some());
        assert!(registry
            .lookup(crate::model::visual_progress::TYPE_NAME)
            .is_some());
        assert!(registry.lookup("NeverRegistered").is_none());
    }
}
