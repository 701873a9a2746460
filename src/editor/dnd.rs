//! Drag-and-drop as a capability: sortable lists grouped per hierarchy level.
//!
//! Every child list at one level belongs to the same exchange group, so an item
//! can be dropped into any list of its own level and never into another level.

use crate::models::Level;
use crate::tree::HierarchyTree;

/// A sortable container: the child list owned by one parent (the root list for parts).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SortableList {
    pub parent_id: Option<String>,
    pub level: Level,
}

impl SortableList {
    pub fn root() -> Self {
        Self {
            parent_id: None,
            level: Level::Part,
        }
    }

    /// The list holding `parent_id`'s children. `None` for leaves.
    pub fn children_of(tree: &HierarchyTree, parent_id: &str) -> Option<Self> {
        let parent = tree.get(parent_id)?;
        Some(Self {
            parent_id: Some(parent_id.to_string()),
            level: parent.level.next()?,
        })
    }

    /// The list `id` currently sits in.
    pub fn containing(tree: &HierarchyTree, id: &str) -> Option<Self> {
        let node = tree.get(id)?;
        Some(Self {
            parent_id: node.parent_id.clone(),
            level: node.level,
        })
    }

    pub fn group(&self) -> Level {
        self.level
    }

    pub fn group_name(&self) -> String {
        format!("{}-list", self.level)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DropTarget {
    Before(String),
    After(String),
    /// Append to the end of this node's child list.
    Into(String),
}

/// Where a drop lands: destination list plus index with the item already lifted out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DropPlacement {
    pub list: SortableList,
    pub index: usize,
}

/// Receives the end of every completed drag.
pub(crate) trait SortableHost {
    fn on_sort_end(&mut self, list: &SortableList, item_id: &str, index: usize) -> bool;
}

/// Pick a drop target for a row hovered during a drag of a `dragged` level item.
///
/// Rows of the same level take the item before or after themselves; rows one
/// level up take it as their last child. Anything else refuses the drop, as does
/// any list inside a deleted-marked subtree.
pub(crate) fn target_for(
    tree: &HierarchyTree,
    dragged: Level,
    row_id: &str,
    insert_after: bool,
) -> Option<DropTarget> {
    let row = tree.get(row_id)?;
    if row.level == dragged {
        if tree.list_is_deleted(row.parent_id.as_deref()) {
            return None;
        }
        Some(if insert_after {
            DropTarget::After(row_id.to_string())
        } else {
            DropTarget::Before(row_id.to_string())
        })
    } else if row.level.next() == Some(dragged) {
        if tree.list_is_deleted(Some(row_id)) {
            return None;
        }
        Some(DropTarget::Into(row_id.to_string()))
    } else {
        None
    }
}

/// Resolve a drop. `None` for cross-level drops, drops into a deleted subtree and
/// drops that would not move anything.
pub(crate) fn resolve_drop(
    tree: &HierarchyTree,
    dragged_id: &str,
    target: &DropTarget,
) -> Option<DropPlacement> {
    let dragged = tree.get(dragged_id)?;

    let list = match target {
        DropTarget::Before(t) | DropTarget::After(t) => {
            if t == dragged_id {
                return None;
            }
            SortableList::containing(tree, t)?
        }
        DropTarget::Into(p) => SortableList::children_of(tree, p)?,
    };
    if list.group() != dragged.level || tree.list_is_deleted(list.parent_id.as_deref()) {
        return None;
    }

    let sibs = tree
        .list(list.parent_id.as_deref())?
        .iter()
        .filter(|x| x.as_str() != dragged_id)
        .collect::<Vec<_>>();

    let index = match target {
        DropTarget::Before(t) => sibs.iter().position(|x| *x == t)?,
        DropTarget::After(t) => sibs.iter().position(|x| *x == t)? + 1,
        DropTarget::Into(_) => sibs.len(),
    };

    if dragged.parent_id == list.parent_id && tree.position(dragged_id) == Some(index) {
        return None;
    }

    Some(DropPlacement { list, index })
}
