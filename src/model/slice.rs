//! Slice and marker types for the per-thread timing model.

/// Arena index of a slice within its owning thread
pub type SliceId = usize;

/// Model-wide id of a registered top-level event
pub type EventId = usize;

/// A named, timed span of work on one thread.
///
/// Slices form a forest per thread: children are owned by id, the parent
/// is a weak back-reference by id. No cycles are possible.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub name: String,
    pub category: String,

    /// Start timestamp in µs
    pub start: i64,

    /// Duration in µs; filled at end-matching time for begin/end pairs
    pub duration: i64,

    /// True when the slice has no parent in its thread's forest
    pub is_top_level: bool,

    /// Weak back-reference to the parent slice, if nested
    pub parent: Option<SliceId>,

    /// Owned children, in start order
    pub children: Vec<SliceId>,

    /// Registered event id; set for top-level slices only
    pub event_id: Option<EventId>,
}

impl Slice {
    /// End timestamp in µs
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }

    /// Duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.duration as f64 / 1000.0
    }
}

/// Zero-duration marker recorded from instant events.
///
/// Navigation, input-dispatch, and frame signals arrive as markers; the
/// classifier scans them to delineate activity windows.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub category: String,
    pub timestamp: i64,
}
