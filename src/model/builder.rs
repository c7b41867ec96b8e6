//! Single-pass model builder.
//!
//! Consumes the raw event stream left-to-right in input order and
//! assembles the Model:
//! - begin/end/complete events are matched into nested slices using a
//!   stack per (pid, tid)
//! - object create/snapshot/delete events drive instance lifetimes keyed
//!   by (scope, id)
//! - async begin/end events are matched into process-scoped async spans
//! - instant events become thread markers for the classifier
//!
//! Nothing here is fatal: unknown phases and type names degrade to
//! generic nodes, malformed records are dropped, and anything left open
//! at end-of-stream is closed at the last observed timestamp.

use super::object_instance::{
    InstanceBase, InstanceId, InstancePayload, ObjectInstance, ObjectSnapshot, SnapshotBase,
    SnapshotPayload,
};
use super::process::AsyncSlice;
use super::slice::{Marker, Slice, SliceId};
use super::type_registry::TypeRegistry;
use super::Model;
use crate::parser::schema::{Phase, RawEvent};
use crate::utils::config::OBJECT_DEFAULT_SCOPE;
use log::{debug, warn};
use std::collections::HashMap;

/// An entry on a thread's open-slice stack. `end` is known for complete
/// events and unknown (`None`) for begins awaiting their end.
#[derive(Debug, Clone, Copy)]
struct OpenSlice {
    id: SliceId,
    end: Option<i64>,
}

/// An async span awaiting its end event
#[derive(Debug, Clone)]
struct PendingAsync {
    name: String,
    start: i64,
}

/// Builds a Model from a raw event stream
///
/// **Public** - construct with a registry, then call `ingest`
pub struct ModelBuilder<'r> {
    registry: &'r TypeRegistry,
    model: Model,

    /// Open slice stacks keyed by (pid, tid)
    open_slices: HashMap<(i64, i64), Vec<OpenSlice>>,

    /// Currently open object instances keyed by (scope, id)
    open_instances: HashMap<(String, String), InstanceId>,

    /// Async spans keyed by (pid, category, id)
    open_async: HashMap<(i64, String, String), PendingAsync>,

    min_ts: Option<i64>,
    max_ts: Option<i64>,
    dropped: usize,
}

/// Build a Model from a raw event stream
///
/// **Public** - convenience wrapper around `ModelBuilder`
pub fn build_model(registry: &TypeRegistry, events: &[RawEvent]) -> Model {
    ModelBuilder::new(registry).ingest(events)
}

impl<'r> ModelBuilder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            model: Model::new(),
            open_slices: HashMap::new(),
            open_instances: HashMap::new(),
            open_async: HashMap::new(),
            min_ts: None,
            max_ts: None,
            dropped: 0,
        }
    }

    /// Consume the event stream and return the built Model
    ///
    /// # Arguments
    /// * `events` - Raw events in their original input order
    pub fn ingest(mut self, events: &[RawEvent]) -> Model {
        debug!("Ingesting {} trace events", events.len());

        for event in events {
            self.process_event(event);
        }

        self.finalize()
    }

    fn process_event(&mut self, event: &RawEvent) {
        // Metadata and unmodeled phases don't stretch the trace bounds
        if !matches!(event.phase, Phase::Metadata | Phase::Other) {
            self.observe_ts(event.timestamp);
        }

        match event.phase {
            Phase::Begin => self.push_open_slice(event, 0, None),
            Phase::End => self.end_slice(event),
            Phase::Complete => {
                let duration = event.duration.unwrap_or(0).max(0);
                self.observe_ts(event.timestamp + duration);
                self.push_open_slice(event, duration, Some(event.timestamp + duration));
            }
            Phase::Instant | Phase::Mark => self.record_marker(event),
            Phase::ObjectCreate => self.create_instance(event),
            Phase::ObjectSnapshot => self.append_snapshot(event),
            Phase::ObjectDelete => self.delete_instance(event),
            Phase::AsyncBegin => self.begin_async(event),
            Phase::AsyncEnd => self.end_async(event),
            // Metadata carries no timing and nothing the model tracks
            Phase::Metadata => {}
            Phase::Other => debug!("skipping unmodeled phase for event '{}'", event.name),
        }
    }

    fn observe_ts(&mut self, ts: i64) {
        self.min_ts = Some(self.min_ts.map_or(ts, |min| min.min(ts)));
        self.max_ts = Some(self.max_ts.map_or(ts, |max| max.max(ts)));
    }

    /// Pop complete slices whose end precedes `ts`; they no longer
    /// contain anything starting at or after `ts`
    fn retire_closed(&mut self, key: (i64, i64), ts: i64) {
        if let Some(stack) = self.open_slices.get_mut(&key) {
            while let Some(open) = stack.last() {
                match open.end {
                    Some(end) if end <= ts => {
                        stack.pop();
                    }
                    _ => break,
                }
            }
        }
    }

    /// Push a slice onto its thread's forest and open stack. Top-level
    /// slices additionally get a model-wide event id.
    fn push_open_slice(&mut self, event: &RawEvent, duration: i64, end: Option<i64>) {
        let key = (event.pid, event.tid);
        self.retire_closed(key, event.timestamp);
        let parent = self
            .open_slices
            .get(&key)
            .and_then(|stack| stack.last())
            .map(|open| open.id);
        let is_top_level = parent.is_none();

        let thread = self.model.thread_mut(event.pid, event.tid);
        let slice_id = thread.push_slice(Slice {
            name: event.name.clone(),
            category: event.category.clone(),
            start: event.timestamp,
            duration,
            is_top_level,
            parent,
            children: Vec::new(),
            event_id: None,
        });
        if let Some(parent_id) = parent {
            thread.slice_mut(parent_id).children.push(slice_id);
        }

        if is_top_level {
            let event_id = self.model.register_event(event.pid, event.tid, slice_id);
            self.model
                .thread_mut(event.pid, event.tid)
                .slice_mut(slice_id)
                .event_id = Some(event_id);
        }

        self.open_slices
            .entry(key)
            .or_default()
            .push(OpenSlice { id: slice_id, end });
    }

    fn end_slice(&mut self, event: &RawEvent) {
        let key = (event.pid, event.tid);
        self.retire_closed(key, event.timestamp);

        let popped = self.open_slices.get_mut(&key).and_then(|stack| stack.pop());
        match popped {
            Some(OpenSlice { id, end: None }) => {
                let slice = self.model.thread_mut(event.pid, event.tid).slice_mut(id);
                slice.duration = (event.timestamp - slice.start).max(0);
            }
            Some(still_open) => {
                // An end inside a still-running complete slice is out of order
                if let Some(stack) = self.open_slices.get_mut(&key) {
                    stack.push(still_open);
                }
                warn!("unmatched end event '{}' dropped", event.name);
                self.dropped += 1;
            }
            None => {
                warn!("unmatched end event '{}' dropped", event.name);
                self.dropped += 1;
            }
        }
    }

    fn record_marker(&mut self, event: &RawEvent) {
        self.model
            .thread_mut(event.pid, event.tid)
            .markers
            .push(Marker {
                name: event.name.clone(),
                category: event.category.clone(),
                timestamp: event.timestamp,
            });
    }

    /// Key object events by (scope, id); association never uses record
    /// identity
    fn object_key(&self, event: &RawEvent) -> Option<(String, String)> {
        let id = event.id.as_deref()?;
        let scope = event
            .scope
            .clone()
            .unwrap_or_else(|| OBJECT_DEFAULT_SCOPE.to_string());
        Some((scope, id.to_string()))
    }

    fn create_instance(&mut self, event: &RawEvent) {
        let Some(key) = self.object_key(event) else {
            warn!("object event '{}' without id dropped", event.name);
            self.dropped += 1;
            return;
        };
        if self.open_instances.contains_key(&key) {
            warn!(
                "object {}/{} re-created while open, closing the previous instance",
                key.0, key.1
            );
        }
        self.open_instance(event, key);
    }

    /// Open a new instance for `key`, implicitly ending any previous
    /// instance with the same key where the new one begins
    fn open_instance(&mut self, event: &RawEvent, key: (String, String)) -> InstanceId {
        let base = InstanceBase {
            type_name: event.name.clone(),
            scope: key.0.clone(),
            id: key.1.clone(),
            creation_ts: event.timestamp,
            deletion_ts: None,
        };
        let payload = match self.registry.lookup(&base.type_name) {
            Some(registration) => (registration.instance_factory)(&base),
            None => InstancePayload::Generic,
        };

        let instance_id = self.model.instances.len();
        self.model.instances.push(ObjectInstance {
            base,
            payload,
            snapshots: Vec::new(),
        });

        if let Some(previous) = self.open_instances.insert(key, instance_id) {
            self.model.instances[previous].base.deletion_ts = Some(event.timestamp);
        }

        instance_id
    }

    fn append_snapshot(&mut self, event: &RawEvent) {
        let Some(key) = self.object_key(event) else {
            warn!("object event '{}' without id dropped", event.name);
            self.dropped += 1;
            return;
        };

        // A snapshot with no open instance lazily creates one
        let instance_id = match self.open_instances.get(&key) {
            Some(&id) => id,
            None => self.open_instance(event, key),
        };

        let type_name = {
            let instance = &self.model.instances[instance_id];
            if let Some(last) = instance.snapshots.last() {
                if event.timestamp <= last.base.timestamp {
                    warn!(
                        "out-of-order snapshot for object {}/{} dropped",
                        instance.base.scope, instance.base.id
                    );
                    self.dropped += 1;
                    return;
                }
            }
            if event.timestamp < instance.base.creation_ts {
                warn!(
                    "snapshot before creation of object {}/{} dropped",
                    instance.base.scope, instance.base.id
                );
                self.dropped += 1;
                return;
            }
            instance.base.type_name.clone()
        };

        let base = SnapshotBase {
            timestamp: event.timestamp,
            args: event.args.clone(),
            owner: instance_id,
        };
        let payload = match self.registry.lookup(&type_name) {
            Some(registration) => (registration.snapshot_factory)(&base),
            None => SnapshotPayload::Generic,
        };

        self.model.instances[instance_id]
            .snapshots
            .push(ObjectSnapshot { base, payload });
    }

    fn delete_instance(&mut self, event: &RawEvent) {
        let Some(key) = self.object_key(event) else {
            warn!("object event '{}' without id dropped", event.name);
            self.dropped += 1;
            return;
        };
        match self.open_instances.remove(&key) {
            Some(instance_id) => {
                self.model.instances[instance_id].base.deletion_ts = Some(event.timestamp);
            }
            None => {
                warn!("delete for unknown object {}/{} dropped", key.0, key.1);
                self.dropped += 1;
            }
        }
    }

    fn begin_async(&mut self, event: &RawEvent) {
        let Some(id) = event.id.as_deref() else {
            warn!("async event '{}' without id dropped", event.name);
            self.dropped += 1;
            return;
        };
        let key = (event.pid, event.category.clone(), id.to_string());
        let pending = PendingAsync {
            name: event.name.clone(),
            start: event.timestamp,
        };
        if let Some(previous) = self.open_async.insert(key, pending) {
            // A second begin for the same span closes the first where the
            // new one starts
            self.model.process_mut(event.pid).async_slices.push(AsyncSlice {
                name: previous.name,
                category: event.category.clone(),
                id: id.to_string(),
                start: previous.start,
                duration: (event.timestamp - previous.start).max(0),
            });
        }
    }

    fn end_async(&mut self, event: &RawEvent) {
        let Some(id) = event.id.as_deref() else {
            warn!("async event '{}' without id dropped", event.name);
            self.dropped += 1;
            return;
        };
        let key = (event.pid, event.category.clone(), id.to_string());
        match self.open_async.remove(&key) {
            Some(pending) => {
                self.model.process_mut(event.pid).async_slices.push(AsyncSlice {
                    name: pending.name,
                    category: event.category.clone(),
                    id: id.to_string(),
                    start: pending.start,
                    duration: (event.timestamp - pending.start).max(0),
                });
            }
            None => {
                warn!("unmatched async end event '{}' dropped", event.name);
                self.dropped += 1;
            }
        }
    }

    /// Close everything still open at end-of-stream and validate
    /// instance lifetime windows
    fn finalize(mut self) -> Model {
        let last_ts = self.max_ts.unwrap_or(0);

        // Unmatched begins are closed at the last observed timestamp
        let mut open_slices: Vec<_> = std::mem::take(&mut self.open_slices).into_iter().collect();
        open_slices.sort_by_key(|(key, _)| *key);
        for ((pid, tid), stack) in open_slices {
            for open in stack {
                if open.end.is_none() {
                    let slice = self.model.thread_mut(pid, tid).slice_mut(open.id);
                    slice.duration = (last_ts - slice.start).max(0);
                    warn!(
                        "slice '{}' never ended, closing at the last observed timestamp",
                        slice.name
                    );
                }
            }
        }

        // Unmatched async spans are closed the same way
        let mut open_async: Vec<_> = std::mem::take(&mut self.open_async).into_iter().collect();
        open_async.sort_by(|(a, _), (b, _)| a.cmp(b));
        for ((pid, category, id), pending) in open_async {
            self.model.process_mut(pid).async_slices.push(AsyncSlice {
                name: pending.name,
                category,
                id,
                start: pending.start,
                duration: (last_ts - pending.start).max(0),
            });
        }

        // Enforce snapshot containment in [creation_ts, deletion_ts)
        for instance in &mut self.model.instances {
            let window_end = instance.base.deletion_ts;
            let before = instance.snapshots.len();
            instance
                .snapshots
                .retain(|snapshot| window_end.map_or(true, |end| snapshot.base.timestamp < end));
            if instance.snapshots.len() != before {
                warn!(
                    "dropped {} snapshot(s) outside the lifetime of object {}/{}",
                    before - instance.snapshots.len(),
                    instance.base.scope,
                    instance.base.id
                );
            }
        }

        self.model.bounds = match (self.min_ts, self.max_ts) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        };

        if self.dropped > 0 {
            debug!("{} events dropped during ingestion", self.dropped);
        }
        debug!(
            "Built model: {} processes, {} slices, {} object instances",
            self.model.processes.len(),
            self.model.slice_count(),
            self.model.instances.len()
        );

        self.model
    }
}
