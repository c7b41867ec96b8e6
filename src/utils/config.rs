//! Configuration and constants for the engine and CLI.

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Field names for trace containers (different trace producers wrap the
// event array differently, or emit a bare array)
pub const EVENT_ARRAY_FIELD_NAMES: &[&str] = &["traceEvents", "events"];

/// The default scope of object events, when not explicitly specified
pub const OBJECT_DEFAULT_SCOPE: &str = "ptr";

/// Top-level tasks longer than this are responsiveness hazards (milliseconds)
pub const LONG_TASK_MS: f64 = 50.0;

// The fast-response reference distribution permits a 50ms idle task when a
// scroll response begins, plus 16ms latency between the idle task and the
// first frame of the scroll. Added to every long-task duration before the
// distribution is consulted.
pub const SCROLL_RESPONSE_LATENCY_MS: f64 = 16.0;

// Marker names that open a Load window
pub const NAVIGATION_START_MARKERS: &[&str] = &["navigationStart", "NavigationStart"];

// Marker names that close a Load window
pub const FIRST_PAINT_MARKERS: &[&str] = &[
    "firstContentfulPaint",
    "firstMeaningfulPaint",
    "MarkFirstPaint",
];

/// Input-dispatch markers share this prefix; the suffix names the gesture
pub const INPUT_MARKER_PREFIX: &str = "InputLatency::";

// Marker names scanned by the animation detector
pub const FRAME_MARKER_NAMES: &[&str] = &["BeginMainThreadFrame", "DrawFrame"];

/// Load window length when no paint marker follows the navigation (µs)
pub const LOAD_FALLBACK_WINDOW_US: i64 = 5_000_000;

/// Window after an input marker during which events count as Response (µs)
pub const RESPONSE_WINDOW_US: i64 = 100_000;

/// Frames closer together than this belong to the same animation run (µs)
pub const ANIMATION_MAX_FRAME_GAP_US: i64 = 50_000;

/// Minimum frames for a run to count as an Animation window
pub const MIN_ANIMATION_FRAMES: usize = 3;

/// Nominal frame interval, appended after the last frame of a run (µs)
pub const FRAME_INTERVAL_US: i64 = 16_667;
