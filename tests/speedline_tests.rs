//! Integration tests for the speed-index gatherer boundary.
//!
//! The boundary contract: `after_pass` never fails outward. On any
//! failure the artifact carries a human-readable debug string instead.

use webtrace_studio::gatherer::{LoadData, PassContext, SpeedlineGatherer};

fn run_gatherer(trace_contents: serde_json::Value) -> SpeedlineGatherer {
    let mut gatherer = SpeedlineGatherer::new();
    gatherer.after_pass(&PassContext::default(), &LoadData { trace_contents });
    gatherer
}

#[test]
fn test_faulty_trace_yields_a_debug_string() {
    let gatherer = run_gatherer(serde_json::json!({"boo": "ya"}));

    let artifact = &gatherer.artifact;
    assert!(artifact.speed_index.is_none());
    let debug_string = artifact.debug_string.as_deref().unwrap();
    assert!(!debug_string.is_empty());
}

#[test]
fn test_non_object_trace_yields_a_debug_string() {
    for garbage in [
        serde_json::Value::Null,
        serde_json::json!("not a trace"),
        serde_json::json!(17),
    ] {
        let gatherer = run_gatherer(garbage);
        assert!(gatherer.artifact.speed_index.is_none());
        assert!(!gatherer.artifact.debug_string.as_deref().unwrap().is_empty());
    }
}

#[test]
fn test_empty_trace_yields_a_debug_string() {
    let gatherer = run_gatherer(serde_json::json!({"traceEvents": []}));
    assert!(gatherer.artifact.speed_index.is_none());
    assert!(!gatherer.artifact.debug_string.as_deref().unwrap().is_empty());
}

#[test]
fn test_trace_without_frames_yields_a_debug_string() {
    let gatherer = run_gatherer(serde_json::json!({"traceEvents": [
        {"ph": "X", "name": "MessageLoop::RunTask", "cat": "toplevel", "ts": 100,
         "dur": 50, "pid": 1, "tid": 1}
    ]}));

    assert!(gatherer.artifact.speed_index.is_none());
    assert!(!gatherer.artifact.debug_string.as_deref().unwrap().is_empty());
}

#[test]
fn test_progressive_app_speed_index_is_831() {
    let raw = include_str!("fixtures/progressive-app.json");
    let trace_contents: serde_json::Value = serde_json::from_str(raw).unwrap();

    let gatherer = run_gatherer(trace_contents);

    let artifact = &gatherer.artifact;
    assert!(artifact.debug_string.is_none());
    assert_eq!(artifact.frame_count, 3);
    assert_eq!(artifact.speed_index.unwrap().round() as i64, 831);
}

#[test]
fn test_rerunning_a_failed_pass_recovers() {
    let mut gatherer = SpeedlineGatherer::new();
    gatherer.after_pass(
        &PassContext::default(),
        &LoadData {
            trace_contents: serde_json::json!({"boo": "ya"}),
        },
    );
    assert!(gatherer.artifact.debug_string.is_some());

    let raw = include_str!("fixtures/progressive-app.json");
    gatherer.after_pass(
        &PassContext {
            page_url: Some("https://pwa.rocks/".to_string()),
        },
        &LoadData {
            trace_contents: serde_json::from_str(raw).unwrap(),
        },
    );
    assert!(gatherer.artifact.debug_string.is_none());
    assert_eq!(gatherer.artifact.speed_index.unwrap().round() as i64, 831);
}
