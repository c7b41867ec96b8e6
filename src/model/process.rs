//! Process and thread containers.

use super::slice::{Marker, Slice, SliceId};
use std::collections::BTreeMap;

/// One thread's share of the model: a slice arena plus instant markers
#[derive(Debug, Default)]
pub struct Thread {
    pub tid: i64,

    /// Slice arena; `SliceId` indexes into this
    slices: Vec<Slice>,

    /// Top-level slices in ingestion order
    pub top_level_slices: Vec<SliceId>,

    /// Instant markers in ingestion order
    pub markers: Vec<Marker>,
}

impl Thread {
    pub fn new(tid: i64) -> Self {
        Self {
            tid,
            ..Self::default()
        }
    }

    /// Append a slice to the arena, returning its id
    pub(crate) fn push_slice(&mut self, slice: Slice) -> SliceId {
        let id = self.slices.len();
        if slice.is_top_level {
            self.top_level_slices.push(id);
        }
        self.slices.push(slice);
        id
    }

    pub fn slice(&self, id: SliceId) -> &Slice {
        &self.slices[id]
    }

    pub(crate) fn slice_mut(&mut self, id: SliceId) -> &mut Slice {
        &mut self.slices[id]
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }
}

/// A span matched from async begin/end events, keyed by (category, id)
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncSlice {
    pub name: String,
    pub category: String,
    pub id: String,
    pub start: i64,
    pub duration: i64,
}

/// One traced process: its threads plus process-scoped async spans
#[derive(Debug, Default)]
pub struct Process {
    pub pid: i64,
    pub threads: BTreeMap<i64, Thread>,
    pub async_slices: Vec<AsyncSlice>,
}

impl Process {
    pub fn new(pid: i64) -> Self {
        Self {
            pid,
            ..Self::default()
        }
    }

    pub fn thread(&self, tid: i64) -> Option<&Thread> {
        self.threads.get(&tid)
    }
}
