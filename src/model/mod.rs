//! Typed object model built from a trace event stream.
//!
//! This module defines:
//! - Process/Thread containers with per-thread slice forests
//! - Object instances with lifetime-tracked snapshots
//! - The type registry used to construct registered object types
//! - The single-pass builder that assembles a Model from raw events
//!
//! The Model owns everything (arena design): slices and instances are
//! addressed by opaque ids, never by direct references, so the graph is
//! cycle-free and the whole model is cheap to share read-only.

pub mod builder;
pub mod layout_tree;
pub mod object_instance;
pub mod process;
pub mod slice;
pub mod type_registry;
pub mod visual_progress;

// Re-export main types
pub use builder::{build_model, ModelBuilder};
pub use object_instance::{
    InstanceBase, InstanceId, InstancePayload, ObjectInstance, ObjectSnapshot, SnapshotBase,
    SnapshotPayload,
};
pub use process::{AsyncSlice, Process, Thread};
pub use slice::{EventId, Marker, Slice, SliceId};
pub use type_registry::{TypeRegistration, TypeRegistry, ViewMetadata};

use crate::usermodel::expectation::UserExpectation;
use std::collections::BTreeMap;

/// Where a registered top-level event lives inside the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLocation {
    pub pid: i64,
    pub tid: i64,
    pub slice: SliceId,
}

/// The built object model for one trace.
///
/// Constructed once by the builder, read-only thereafter. Metric
/// computation never mutates it; only the classifier appends the
/// expectation sequence.
#[derive(Debug, Default)]
pub struct Model {
    /// Processes keyed by pid
    pub processes: BTreeMap<i64, Process>,

    /// Arena of object instances, addressed by `InstanceId`
    pub instances: Vec<ObjectInstance>,

    /// Classified activity segments, filled in by the classifier
    pub expectations: Vec<UserExpectation>,

    /// Observed timestamp bounds `(min, max)` in µs, if any event was seen
    pub bounds: Option<(i64, i64)>,

    /// Locations of registered top-level events, addressed by `EventId`
    event_index: Vec<EventLocation>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a registered event id to its slice
    pub fn event_slice(&self, event: EventId) -> Option<&Slice> {
        let location = self.event_index.get(event)?;
        self.processes
            .get(&location.pid)?
            .threads
            .get(&location.tid)
            .map(|thread| thread.slice(location.slice))
    }

    /// All registered top-level event ids, in ingestion order
    pub fn top_level_events(&self) -> impl Iterator<Item = EventId> {
        0..self.event_index.len()
    }

    /// Number of registered top-level events
    pub fn event_count(&self) -> usize {
        self.event_index.len()
    }

    /// Look up an object instance by arena id
    pub fn instance(&self, id: InstanceId) -> Option<&ObjectInstance> {
        self.instances.get(id)
    }

    /// Iterate the instances of one registered type name
    pub fn instances_of_type<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = &'a ObjectInstance> {
        self.instances
            .iter()
            .filter(move |instance| instance.base.type_name == type_name)
    }

    /// Total slice count across all threads
    pub fn slice_count(&self) -> usize {
        self.processes
            .values()
            .flat_map(|p| p.threads.values())
            .map(|t| t.slice_count())
            .sum()
    }

    pub(crate) fn thread_mut(&mut self, pid: i64, tid: i64) -> &mut Thread {
        self.processes
            .entry(pid)
            .or_insert_with(|| Process::new(pid))
            .threads
            .entry(tid)
            .or_insert_with(|| Thread::new(tid))
    }

    pub(crate) fn process_mut(&mut self, pid: i64) -> &mut Process {
        self.processes
            .entry(pid)
            .or_insert_with(|| Process::new(pid))
    }

    pub(crate) fn register_event(&mut self, pid: i64, tid: i64, slice: SliceId) -> EventId {
        let event_id = self.event_index.len();
        self.event_index.push(EventLocation { pid, tid, slice });
        event_id
    }
}
