use crate::editor::template::is_temp_id;
use crate::models::{DirtyStatus, Level};
use crate::tracker::DirtyTracker;
use crate::tree::HierarchyTree;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Field snapshot sent for created and updated nodes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeFields {
    pub number: Option<String>,
    pub name: Option<String>,
    /// Leaf body; `null` for every other level.
    pub content: Option<String>,
    pub order_no: usize,
    pub parent_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct CreatedNode {
    pub temp_id: String,
    pub level: Level,
    #[serde(flatten)]
    pub fields: NodeFields,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct UpdatedNode {
    pub id: String,
    pub level: Level,
    #[serde(flatten)]
    pub fields: NodeFields,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct DeletedNode {
    pub id: String,
    pub level: Level,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct OrderEntry {
    pub id: String,
    pub order_no: usize,
}

/// Body of the bulk-save request.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct BulkSavePayload {
    pub created: Vec<CreatedNode>,
    pub updated: Vec<UpdatedNode>,
    pub deleted: Vec<DeletedNode>,
    pub order: Vec<OrderEntry>,
}

impl BulkSavePayload {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.deleted.is_empty()
            && self.order.is_empty()
    }
}

/// Bulk-save success body: temporary id -> persistent id.
pub(crate) type IdRemap = HashMap<String, String>;

fn non_blank(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Diff the tracked nodes against the tree's current shape.
///
/// Walks in document order so a created parent always precedes its children.
/// Tracked ids missing from the tree are skipped, as is everything below a
/// deleted-marked node. New nodes marked deleted are dropped entirely.
pub(crate) fn build_payload(tree: &HierarchyTree, tracker: &DirtyTracker) -> BulkSavePayload {
    let mut out = BulkSavePayload::default();

    for id in tree.preorder() {
        let Some(entry) = tracker.get(&id) else {
            continue;
        };
        let Some(node) = tree.get(&id) else {
            continue;
        };
        if tree.under_deleted(&id) {
            continue;
        }
        if entry.status == DirtyStatus::New && node.marks.deleted {
            continue;
        }

        let fields = NodeFields {
            number: non_blank(&node.number),
            name: non_blank(&node.name),
            content: if node.level.is_leaf() {
                Some(node.content.as_deref().unwrap_or_default().trim().to_string())
            } else {
                None
            },
            order_no: tree.order_no(&id).unwrap_or(1),
            parent_id: node.parent_id.clone(),
        };
        let order_no = fields.order_no;

        match entry.status {
            DirtyStatus::New => out.created.push(CreatedNode {
                temp_id: id.clone(),
                level: node.level,
                fields,
            }),
            DirtyStatus::Edited => out.updated.push(UpdatedNode {
                id: id.clone(),
                level: node.level,
                fields,
            }),
            DirtyStatus::Deleted => {
                if !is_temp_id(&id) {
                    out.deleted.push(DeletedNode {
                        id: id.clone(),
                        level: node.level,
                    });
                }
                continue;
            }
            DirtyStatus::Unchanged => {}
        }

        out.order.push(OrderEntry { id, order_no });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::template::render_template;
    use crate::tree::tests::sample_tree;

    #[test]
    fn test_untracked_tree_is_empty_payload() {
        let p = build_payload(&sample_tree(), &DirtyTracker::new());
        assert!(p.is_empty());
    }

    #[test]
    fn test_template_round_trip_into_created() {
        let mut tree = sample_tree();
        let mut tracker = DirtyTracker::new();
        tree.push(render_template(Level::Chapter, "new-x").into_node(Some("P2")));
        tracker.mark_new("new-x", Level::Chapter, Some("P2"));

        let p = build_payload(&tree, &tracker);
        assert_eq!(
            p.created,
            vec![CreatedNode {
                temp_id: "new-x".to_string(),
                level: Level::Chapter,
                fields: NodeFields {
                    number: None,
                    name: None,
                    content: None,
                    order_no: 1,
                    parent_id: Some("P2".to_string()),
                },
            }]
        );
        assert_eq!(
            p.order,
            vec![OrderEntry {
                id: "new-x".to_string(),
                order_no: 1
            }]
        );
    }

    #[test]
    fn test_statuses_route_to_lists() {
        let mut tree = sample_tree();
        let mut tracker = DirtyTracker::new();
        tree.get_mut("S1").unwrap().name = "  Renamed ".to_string();
        tracker.mark_edited("S1", Level::Set, Some("C1"));
        tree.get_mut("S2").unwrap().marks.deleted = true;
        tracker.toggle_deleted("S2", Level::Set, Some("C1"));
        tracker.seed("P2", Level::Part, None);

        let p = build_payload(&tree, &tracker);
        assert_eq!(p.updated.len(), 1);
        assert_eq!(p.updated[0].fields.name.as_deref(), Some("Renamed"));
        assert_eq!(p.updated[0].fields.parent_id.as_deref(), Some("C1"));
        assert_eq!(
            p.deleted,
            vec![DeletedNode {
                id: "S2".to_string(),
                level: Level::Set
            }]
        );
        let order = p.order.iter().map(|o| o.id.as_str()).collect::<Vec<_>>();
        assert_eq!(order, ["S1", "P2"]);
    }

    #[test]
    fn test_new_then_deleted_is_dropped() {
        let mut tree = sample_tree();
        let mut tracker = DirtyTracker::new();
        tree.push(render_template(Level::Part, "new-p").into_node(None));
        tracker.mark_new("new-p", Level::Part, None);
        tree.get_mut("new-p").unwrap().marks.deleted = true;
        tracker.toggle_deleted("new-p", Level::Part, None);

        let p = build_payload(&tree, &tracker);
        assert!(p.created.is_empty());
        assert!(p.deleted.is_empty());
        assert!(p.order.is_empty());
    }

    #[test]
    fn test_subtree_of_deleted_node_is_skipped() {
        let mut tree = sample_tree();
        let mut tracker = DirtyTracker::new();
        tree.get_mut("C1").unwrap().marks.deleted = true;
        tracker.toggle_deleted("C1", Level::Chapter, Some("P1"));
        tracker.mark_edited("S1", Level::Set, Some("C1"));

        let p = build_payload(&tree, &tracker);
        assert_eq!(p.deleted.len(), 1);
        assert!(p.updated.is_empty());
        assert!(p.order.is_empty());
    }

    #[test]
    fn test_leaf_content_is_trimmed_and_wire_shape_is_flat() {
        let mut tree = sample_tree();
        let mut tracker = DirtyTracker::new();
        tree.push(crate::tree::tests::node("SEC", Level::Section, Some("S1")));
        let mut leaf = render_template(Level::Subsection, "new-l").into_node(Some("SEC"));
        leaf.content = Some("  <p>text</p>\n".to_string());
        leaf.number = "(a)".to_string();
        tree.push(leaf);
        tracker.mark_new("new-l", Level::Subsection, Some("SEC"));

        let p = build_payload(&tree, &tracker);
        let v = serde_json::to_value(&p).unwrap();
        let created = &v["created"][0];
        assert_eq!(created["temp_id"], "new-l");
        assert_eq!(created["level"], "subsection");
        assert_eq!(created["content"], "<p>text</p>");
        assert_eq!(created["number"], "(a)");
        assert!(created["name"].is_null());
        assert_eq!(created["parent_id"], "SEC");
        assert_eq!(created["order_no"], 1);
    }

    #[test]
    fn test_tracked_but_missing_node_is_skipped() {
        let tree = sample_tree();
        let mut tracker = DirtyTracker::new();
        tracker.mark_edited("gone", Level::Part, None);
        assert!(build_payload(&tree, &tracker).is_empty());
    }
}
