//! Integration tests for trace ingestion and model construction.

use pretty_assertions::assert_eq;
use webtrace_studio::metrics::MetricRegistry;
use webtrace_studio::model::{
    build_model, InstancePayload, Model, SnapshotPayload, TypeRegistry,
};
use webtrace_studio::parser::parse_trace;
use webtrace_studio::usermodel::UserExpectationClassifier;

fn build(trace: serde_json::Value) -> Model {
    let events = parse_trace(&trace).unwrap();
    let registry = TypeRegistry::with_defaults();
    build_model(&registry, &events)
}

#[test]
fn test_begin_end_events_nest() {
    let model = build(serde_json::json!([
        {"ph": "B", "name": "outer", "cat": "toplevel", "ts": 10, "pid": 1, "tid": 1},
        {"ph": "B", "name": "inner", "cat": "toplevel", "ts": 20, "pid": 1, "tid": 1},
        {"ph": "E", "name": "inner", "cat": "toplevel", "ts": 30, "pid": 1, "tid": 1},
        {"ph": "E", "name": "outer", "cat": "toplevel", "ts": 40, "pid": 1, "tid": 1}
    ]));

    let thread = model.processes[&1].thread(1).unwrap();
    assert_eq!(thread.slice_count(), 2);

    let outer = thread.slice(0);
    let inner = thread.slice(1);
    assert_eq!(outer.name, "outer");
    assert_eq!(outer.duration, 30);
    assert!(outer.is_top_level);
    assert_eq!(outer.children, vec![1]);
    assert_eq!(outer.parent, None);

    assert_eq!(inner.name, "inner");
    assert_eq!(inner.duration, 10);
    assert!(!inner.is_top_level);
    assert_eq!(inner.parent, Some(0));
    assert_eq!(inner.event_id, None);

    // Only the top-level slice gets a model-wide event id
    assert_eq!(model.event_count(), 1);
    assert_eq!(outer.event_id, Some(0));
}

#[test]
fn test_complete_events_nest_by_containment() {
    let model = build(serde_json::json!([
        {"ph": "X", "name": "parent", "cat": "toplevel", "ts": 100, "dur": 100, "pid": 1, "tid": 1},
        {"ph": "X", "name": "child", "cat": "toplevel", "ts": 120, "dur": 20, "pid": 1, "tid": 1},
        {"ph": "X", "name": "sibling", "cat": "toplevel", "ts": 250, "dur": 10, "pid": 1, "tid": 1}
    ]));

    let thread = model.processes[&1].thread(1).unwrap();
    let parent = thread.slice(0);
    let child = thread.slice(1);
    let sibling = thread.slice(2);

    assert!(parent.is_top_level);
    assert_eq!(child.parent, Some(0));
    assert!(!child.is_top_level);
    assert!(sibling.is_top_level);
    assert_eq!(model.event_count(), 2);
}

#[test]
fn test_unmatched_begin_is_closed_at_last_timestamp() {
    let model = build(serde_json::json!([
        {"ph": "B", "name": "never-ends", "cat": "toplevel", "ts": 10, "pid": 1, "tid": 1},
        {"ph": "X", "name": "later", "cat": "toplevel", "ts": 50, "dur": 25, "pid": 2, "tid": 2}
    ]));

    let never_ends = model.processes[&1].thread(1).unwrap().slice(0);
    assert_eq!(never_ends.duration, 65);
    assert_eq!(model.bounds, Some((10, 75)));
}

#[test]
fn test_events_stay_on_their_own_thread() {
    let model = build(serde_json::json!([
        {"ph": "X", "name": "a", "cat": "toplevel", "ts": 10, "dur": 100, "pid": 1, "tid": 1},
        {"ph": "X", "name": "b", "cat": "toplevel", "ts": 20, "dur": 10, "pid": 1, "tid": 2}
    ]));

    // Same timing overlap, different tids: no nesting across threads
    assert!(model.processes[&1].thread(1).unwrap().slice(0).is_top_level);
    assert!(model.processes[&1].thread(2).unwrap().slice(0).is_top_level);
}

#[test]
fn test_object_lifecycle() {
    let model = build(serde_json::json!([
        {"ph": "N", "name": "Widget", "cat": "cc", "ts": 100, "pid": 1, "tid": 1, "id": "0x1"},
        {"ph": "O", "name": "Widget", "cat": "cc", "ts": 150, "pid": 1, "tid": 1, "id": "0x1",
         "args": {"snapshot": {"state": "warm"}}},
        {"ph": "O", "name": "Widget", "cat": "cc", "ts": 250, "pid": 1, "tid": 1, "id": "0x1",
         "args": {"snapshot": {"state": "hot"}}},
        {"ph": "D", "name": "Widget", "cat": "cc", "ts": 300, "pid": 1, "tid": 1, "id": "0x1"}
    ]));

    assert_eq!(model.instances.len(), 1);
    let instance = model.instance(0).unwrap();
    assert_eq!(instance.base.type_name, "Widget");
    assert_eq!(instance.base.scope, "ptr");
    assert_eq!(instance.base.creation_ts, 100);
    assert_eq!(instance.base.deletion_ts, Some(300));
    assert_eq!(instance.payload, InstancePayload::Generic);

    // Snapshots are strictly timestamp-ordered within [creation, deletion)
    let timestamps: Vec<i64> = instance
        .snapshots
        .iter()
        .map(|snapshot| snapshot.base.timestamp)
        .collect();
    assert_eq!(timestamps, vec![150, 250]);
    for snapshot in &instance.snapshots {
        assert!(instance.is_alive_at(snapshot.base.timestamp));
        assert_eq!(snapshot.base.owner, 0);
    }
    assert!(!instance.is_alive_at(300));
    assert!(!instance.is_alive_at(50));
}

#[test]
fn test_snapshot_without_create_opens_an_instance() {
    let model = build(serde_json::json!([
        {"ph": "O", "name": "Widget", "cat": "cc", "ts": 500, "pid": 1, "tid": 1, "id": "0x9",
         "args": {"snapshot": {}}}
    ]));

    let instance = model.instance(0).unwrap();
    assert_eq!(instance.base.creation_ts, 500);
    assert_eq!(instance.base.deletion_ts, None);
    assert_eq!(instance.snapshots.len(), 1);
}

#[test]
fn test_out_of_order_snapshot_is_dropped() {
    let model = build(serde_json::json!([
        {"ph": "O", "name": "Widget", "cat": "cc", "ts": 200, "pid": 1, "tid": 1, "id": "0x1",
         "args": {"snapshot": {}}},
        {"ph": "O", "name": "Widget", "cat": "cc", "ts": 150, "pid": 1, "tid": 1, "id": "0x1",
         "args": {"snapshot": {}}}
    ]));

    let instance = model.instance(0).unwrap();
    assert_eq!(instance.snapshots.len(), 1);
    assert_eq!(instance.snapshots[0].base.timestamp, 200);
}

#[test]
fn test_same_id_different_scope_is_a_different_object() {
    let model = build(serde_json::json!([
        {"ph": "N", "name": "Widget", "cat": "cc", "ts": 100, "pid": 1, "tid": 1, "id": "0x1"},
        {"ph": "N", "name": "Widget", "cat": "cc", "ts": 100, "pid": 1, "tid": 1, "id": "0x1",
         "scope": "disk"}
    ]));

    assert_eq!(model.instances.len(), 2);
    assert!(model.instances.iter().all(|i| i.base.deletion_ts.is_none()));
}

#[test]
fn test_registered_layout_tree_type() {
    let model = build(serde_json::json!([
        {"ph": "O", "name": "LayoutTree", "cat": "layout", "ts": 100, "pid": 1, "tid": 1,
         "id": "0x1",
         "args": {"snapshot": {"root": {"name": "LayoutView",
                                        "children": [{"name": "LayoutText"}]}}}}
    ]));

    let instance = model.instance(0).unwrap();
    assert_eq!(instance.payload, InstancePayload::LayoutTree);
    match &instance.snapshots[0].payload {
        SnapshotPayload::LayoutTree(snapshot) => assert_eq!(snapshot.node_count(), 2),
        other => panic!("unexpected payload: {:?}", other),
    }
}

#[test]
fn test_unknown_type_degrades_to_generic() {
    let model = build(serde_json::json!([
        {"ph": "O", "name": "SomethingNeverRegistered", "cat": "gpu", "ts": 100, "pid": 1,
         "tid": 1, "id": "0x1", "args": {"snapshot": {"k": 1}}}
    ]));

    let instance = model.instance(0).unwrap();
    assert_eq!(instance.payload, InstancePayload::Generic);
    assert_eq!(instance.snapshots[0].payload, SnapshotPayload::Generic);
}

#[test]
fn test_malformed_records_do_not_abort_ingestion() {
    let model = build(serde_json::json!([
        {"ph": "X", "name": "good", "cat": "toplevel", "ts": 10, "dur": 5, "pid": 1, "tid": 1},
        {"name": "missing everything else"},
        {"ph": "X", "name": "also-good", "cat": "toplevel", "ts": 30, "dur": 5, "pid": 1, "tid": 1}
    ]));

    assert_eq!(model.slice_count(), 2);
}

#[test]
fn test_async_spans_are_matched_by_category_and_id() {
    let model = build(serde_json::json!([
        {"ph": "b", "name": "navigation", "cat": "nav", "ts": 100, "pid": 1, "tid": 1, "id": "a1"},
        {"ph": "b", "name": "fetch", "cat": "net", "ts": 150, "pid": 1, "tid": 2, "id": "a1"},
        {"ph": "e", "name": "navigation", "cat": "nav", "ts": 400, "pid": 1, "tid": 1, "id": "a1"},
        {"ph": "e", "name": "fetch", "cat": "net", "ts": 500, "pid": 1, "tid": 2, "id": "a1"}
    ]));

    let spans = &model.processes[&1].async_slices;
    assert_eq!(spans.len(), 2);
    let navigation = spans.iter().find(|s| s.name == "navigation").unwrap();
    assert_eq!(navigation.start, 100);
    assert_eq!(navigation.duration, 300);
    let fetch = spans.iter().find(|s| s.name == "fetch").unwrap();
    assert_eq!(fetch.duration, 350);
}

#[test]
fn test_identical_traces_produce_identical_values() {
    let trace = serde_json::json!({"traceEvents": [
        {"ph": "I", "name": "navigationStart", "cat": "blink.user_timing", "ts": 1_000_000,
         "pid": 1, "tid": 1},
        {"ph": "X", "name": "MessageLoop::RunTask", "cat": "toplevel", "ts": 6_100_000,
         "dur": 120_000, "pid": 1, "tid": 1},
        {"ph": "X", "name": "MessageLoop::RunTask", "cat": "toplevel", "ts": 6_300_000,
         "dur": 80_000, "pid": 1, "tid": 1},
        {"ph": "O", "name": "Widget", "cat": "cc", "ts": 6_200_000, "pid": 1, "tid": 1,
         "id": "0x1", "args": {"snapshot": {}}}
    ]});

    let run = |trace: &serde_json::Value| {
        let events = parse_trace(trace).unwrap();
        let registry = TypeRegistry::with_defaults();
        let mut model = build_model(&registry, &events);
        UserExpectationClassifier::with_default_detectors().classify(&mut model);
        let values = MetricRegistry::with_defaults().run_all(&model);
        serde_json::to_value(values).unwrap()
    };

    assert_eq!(run(&trace), run(&trace));
}
