//! Layout-tree object type.
//!
//! Snapshots of type `LayoutTree` carry the page's layout object tree in
//! their args; the registered factory decodes it into typed nodes.

use super::object_instance::{
    snapshot_field, InstanceBase, InstancePayload, SnapshotBase, SnapshotPayload,
};
use super::type_registry::{TypeRegistration, TypeRegistry, ViewMetadata};

pub const TYPE_NAME: &str = "LayoutTree";

/// One node of the decoded layout object tree
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutObjectNode {
    pub name: String,
    pub children: Vec<LayoutObjectNode>,
}

/// Decoded payload of one layout-tree snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTreeSnapshot {
    /// Root layout object; `None` when the snapshot args carried no tree
    pub root: Option<LayoutObjectNode>,
}

impl LayoutTreeSnapshot {
    /// Total node count of the decoded tree
    pub fn node_count(&self) -> usize {
        fn count(node: &LayoutObjectNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        self.root.as_ref().map(count).unwrap_or(0)
    }
}

/// Register the layout-tree type with the registry
pub fn register(registry: &mut TypeRegistry) {
    registry.register(
        TYPE_NAME,
        TypeRegistration {
            snapshot_factory: make_snapshot,
            instance_factory: make_instance,
            view_metadata: ViewMetadata {
                name: "layoutTree",
                plural_name: "layoutTrees",
            },
        },
    );
}

fn make_instance(_base: &InstanceBase) -> InstancePayload {
    InstancePayload::LayoutTree
}

fn make_snapshot(base: &SnapshotBase) -> SnapshotPayload {
    let root = snapshot_field(&base.args, "root").and_then(parse_layout_object);
    SnapshotPayload::LayoutTree(LayoutTreeSnapshot { root })
}

/// Decode one layout object and its children; undecodable nodes are skipped
fn parse_layout_object(value: &serde_json::Value) -> Option<LayoutObjectNode> {
    let obj = value.as_object()?;
    let name = obj
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or("LayoutObject")
        .to_string();
    let children = obj
        .get("children")
        .and_then(|c| c.as_array())
        .map(|arr| arr.iter().filter_map(parse_layout_object).collect())
        .unwrap_or_default();
    Some(LayoutObjectNode { name, children })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_nested_tree() {
        let mut args = serde_json::Map::new();
        args.insert(
            "snapshot".to_string(),
            serde_json::json!({
                "root": {
                    "name": "LayoutView",
                    "children": [
                        {"name": "LayoutBlockFlow", "children": [{"name": "LayoutText"}]},
                        {"name": "LayoutInline"}
                    ]
                }
            }),
        );
        let base = SnapshotBase {
            timestamp: 0,
            args,
            owner: 0,
        };

        match make_snapshot(&base) {
            SnapshotPayload::LayoutTree(snapshot) => {
                assert_eq!(snapshot.node_count(), 4);
                assert_eq!(snapshot.root.unwrap().name, "LayoutView");
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_missing_tree_decodes_to_empty() {
        let base = SnapshotBase {
            timestamp: 0,
            args: serde_json::Map::new(),
            owner: 0,
        };
        match make_snapshot(&base) {
            SnapshotPayload::LayoutTree(snapshot) => assert_eq!(snapshot.node_count(), 0),
            other => panic!("unexpected payload: {:?}", other),
        }
    }
}
