pub(crate) mod dnd;
pub(crate) mod payload;
pub(crate) mod template;
mod view;

pub use view::HierarchyEditor;

use crate::models::{DirtyStatus, Level};
use crate::tracker::DirtyTracker;
use crate::tree::HierarchyTree;
use dnd::{SortableHost, SortableList};
use leptos::logging::warn;
use payload::{build_payload, BulkSavePayload, IdRemap};
use template::{generate_temp_id, next_level, render_template};

/// Editing session over one statute's hierarchy.
///
/// Every mutation updates the tree and the dirty tracker together. While a save
/// is in flight the editor is locked and all mutations are refused.
#[derive(Clone, Debug, Default)]
pub(crate) struct TreeEditor {
    tree: HierarchyTree,
    tracker: DirtyTracker,
    locked: bool,
}

impl TreeEditor {
    pub fn new(tree: HierarchyTree) -> Self {
        Self {
            tree,
            tracker: DirtyTracker::new(),
            locked: false,
        }
    }

    pub fn tree(&self) -> &HierarchyTree {
        &self.tree
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn has_unsaved(&self) -> bool {
        self.tracker.has_unsaved()
    }

    pub fn status(&self, id: &str) -> DirtyStatus {
        self.tracker.status(id)
    }

    fn mark_edited(&mut self, id: &str) {
        let Some(node) = self.tree.get_mut(id) else {
            return;
        };
        node.marks.edited = true;
        let (level, parent) = (node.level, node.parent_id.clone());
        self.tracker.mark_edited(id, level, parent.as_deref());
    }

    fn insert_new(&mut self, level: Level, parent_id: Option<&str>) -> Option<String> {
        let id = generate_temp_id();
        let mut node = render_template(level, &id).into_node(parent_id);
        node.editable = true;
        node.marks.new = true;
        if !self.tree.push(node) {
            return None;
        }
        self.tracker.mark_new(&id, level, parent_id);
        Some(id)
    }

    /// Append a new part at the root. Returns its temporary id.
    pub fn add_part(&mut self) -> Option<String> {
        if self.locked {
            return None;
        }
        self.insert_new(Level::Part, None)
    }

    /// Append a new node one level below `parent_id`. `None` for leaves.
    pub fn add_child(&mut self, parent_id: &str) -> Option<String> {
        if self.locked {
            return None;
        }
        let level = next_level(self.tree.get(parent_id)?.level)?;
        if self.tree.list_is_deleted(Some(parent_id)) {
            return None;
        }
        let id = self.insert_new(level, Some(parent_id))?;
        if let Some(parent) = self.tree.get_mut(parent_id) {
            parent.expanded = true;
        }
        Some(id)
    }

    /// Unlock the number/name inputs of a non-leaf node.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        if self.locked {
            return false;
        }
        let Some(node) = self.tree.get_mut(id) else {
            return false;
        };
        if node.level.is_leaf() {
            return false;
        }
        node.editable = true;
        self.mark_edited(id);
        true
    }

    pub fn set_number(&mut self, id: &str, value: &str) -> bool {
        self.set_field(id, |n| n.number = value.to_string())
    }

    pub fn set_name(&mut self, id: &str, value: &str) -> bool {
        self.set_field(id, |n| n.name = value.to_string())
    }

    fn set_field(&mut self, id: &str, f: impl FnOnce(&mut crate::tree::TreeNode)) -> bool {
        if self.locked {
            return false;
        }
        let Some(node) = self.tree.get_mut(id) else {
            return false;
        };
        if !node.editable {
            return false;
        }
        f(node);
        self.mark_edited(id);
        true
    }

    /// Current body of a leaf, to prefill the content dialog.
    pub fn content_for_edit(&self, id: &str) -> Option<String> {
        let node = self.tree.get(id)?;
        if !node.level.is_leaf() {
            return None;
        }
        Some(node.content.clone().unwrap_or_default().trim().to_string())
    }

    /// Confirmed content dialog: write the body back and mark the leaf edited.
    pub fn apply_content(&mut self, id: &str, content: &str) -> bool {
        if self.locked {
            return false;
        }
        let Some(node) = self.tree.get_mut(id) else {
            return false;
        };
        if !node.level.is_leaf() {
            return false;
        }
        node.content = Some(content.to_string());
        self.mark_edited(id);
        true
    }

    /// Flip the deleted marker. Returns the resulting tracker status.
    pub fn toggle_delete(&mut self, id: &str) -> Option<DirtyStatus> {
        if self.locked {
            return None;
        }
        let node = self.tree.get_mut(id)?;
        node.marks.deleted = !node.marks.deleted;
        let (level, parent) = (node.level, node.parent_id.clone());
        let status = self.tracker.toggle_deleted(id, level, parent.as_deref());
        if status == DirtyStatus::Edited {
            node.marks.edited = true;
        }
        Some(status)
    }

    pub fn toggle_expanded(&mut self, id: &str) {
        if let Some(node) = self.tree.get_mut(id) {
            node.expanded = !node.expanded;
        }
    }

    pub fn move_up(&mut self, id: &str) -> bool {
        self.move_by_button(id, true)
    }

    pub fn move_down(&mut self, id: &str) -> bool {
        self.move_by_button(id, false)
    }

    fn move_by_button(&mut self, id: &str, up: bool) -> bool {
        if self.locked || !self.tree.swap_with_neighbour(id, up) {
            return false;
        }
        let parent = self.tree.get(id).and_then(|n| n.parent_id.clone());
        self.sweep(parent.as_deref());
        self.mark_edited(id);
        true
    }

    /// Seed a tracker entry for every node of one list so positions are reported.
    fn sweep(&mut self, parent: Option<&str>) {
        let Some(list) = self.tree.list(parent) else {
            return;
        };
        for id in list.to_vec() {
            if let Some(n) = self.tree.get(&id) {
                self.tracker.seed(&id, n.level, parent);
            }
        }
    }

    /// Drop `id` into `list` at `index`, within its own list or into another
    /// parent's list of the same level.
    pub fn drop_node(&mut self, id: &str, list: &SortableList, index: usize) -> bool {
        if self.locked {
            return false;
        }
        let Some(node) = self.tree.get(id) else {
            return false;
        };
        if node.level != list.group() {
            warn!("refused drop of {id}: {} into {}", node.level, list.group_name());
            return false;
        }
        let origin = node.parent_id.clone();
        let dest = list.parent_id.as_deref();
        if self.tree.list_is_deleted(dest) {
            warn!("refused drop of {id}: {} is marked deleted", dest.unwrap_or_default());
            return false;
        }
        if !self.tree.relocate(id, dest, index) {
            return false;
        }

        self.tracker.set_parent(id, dest);
        self.sweep(dest);
        if origin.as_deref() != dest {
            self.sweep(origin.as_deref());
        }
        self.mark_edited(id);
        true
    }

    /// Non-leaf ids whose required name is blank.
    pub fn missing_names(&self) -> Vec<String> {
        self.tree
            .preorder()
            .into_iter()
            .filter(|id| {
                self.tree
                    .get(id)
                    .map(|n| n.missing_name())
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn build_payload(&self) -> BulkSavePayload {
        build_payload(&self.tree, &self.tracker)
    }

    /// Lock the editor and snapshot the payload. `None` while another save is in flight.
    pub fn begin_save(&mut self) -> Option<BulkSavePayload> {
        if self.locked {
            return None;
        }
        self.locked = true;
        Some(self.build_payload())
    }

    /// Failed save: unlock and leave everything as it was.
    pub fn abort_save(&mut self) {
        self.locked = false;
    }

    /// Successful save: adopt server ids, drop deleted rows, forget all pending changes.
    ///
    /// Returns how many nodes were renamed.
    pub fn finish_save(&mut self, remap: &IdRemap) -> usize {
        let mut renamed = 0;
        for (tmp, real) in remap.iter() {
            if self.tree.rename(tmp, real) {
                renamed += 1;
            }
        }

        let deleted = self
            .tree
            .preorder()
            .into_iter()
            .filter(|id| self.tree.get(id).map(|n| n.marks.deleted).unwrap_or(false))
            .collect::<Vec<_>>();
        for id in deleted {
            self.tree.remove_subtree(&id);
        }

        for id in self.tree.preorder() {
            if let Some(n) = self.tree.get_mut(&id) {
                n.marks.new = false;
                n.marks.edited = false;
            }
        }

        self.tracker.clear();
        self.locked = false;
        renamed
    }
}

impl SortableHost for TreeEditor {
    fn on_sort_end(&mut self, list: &SortableList, item_id: &str, index: usize) -> bool {
        self.drop_node(item_id, list, index)
    }
}
