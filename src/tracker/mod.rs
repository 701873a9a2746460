use crate::models::{DirtyEntry, DirtyStatus, Level};
use std::collections::HashMap;

/// Pending-change metadata keyed by node id.
///
/// Entries appear on a node's first mutation and are dropped all at once after a
/// successful save. Absent ids read as [`DirtyStatus::Unchanged`].
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct DirtyTracker {
    entries: HashMap<String, DirtyEntry>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&DirtyEntry> {
        self.entries.get(id)
    }

    pub fn status(&self, id: &str) -> DirtyStatus {
        self.entries
            .get(id)
            .map(|e| e.status)
            .unwrap_or(DirtyStatus::Unchanged)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&mut self, id: &str, level: Level, parent_id: Option<&str>) -> &mut DirtyEntry {
        self.entries
            .entry(id.to_string())
            .or_insert_with(|| DirtyEntry {
                status: DirtyStatus::Unchanged,
                level,
                parent_id: parent_id.map(str::to_string),
            })
    }

    pub fn mark_new(&mut self, id: &str, level: Level, parent_id: Option<&str>) {
        self.entries.insert(
            id.to_string(),
            DirtyEntry {
                status: DirtyStatus::New,
                level,
                parent_id: parent_id.map(str::to_string),
            },
        );
    }

    /// Escalate to `edited`. `new` and `deleted` entries keep their status.
    pub fn mark_edited(&mut self, id: &str, level: Level, parent_id: Option<&str>) -> DirtyStatus {
        let e = self.entry(id, level, parent_id);
        if matches!(e.status, DirtyStatus::Unchanged | DirtyStatus::Edited) {
            e.status = DirtyStatus::Edited;
        }
        e.status
    }

    /// Make sure `id` has an entry so its position is reported; never changes a status.
    pub fn seed(&mut self, id: &str, level: Level, parent_id: Option<&str>) {
        self.entry(id, level, parent_id);
    }

    pub fn set_parent(&mut self, id: &str, parent_id: Option<&str>) {
        if let Some(e) = self.entries.get_mut(id) {
            e.parent_id = parent_id.map(str::to_string);
        }
    }

    /// Flip between `deleted` and `edited`. A `new` entry stays `new`.
    pub fn toggle_deleted(&mut self, id: &str, level: Level, parent_id: Option<&str>) -> DirtyStatus {
        let e = self.entry(id, level, parent_id);
        e.status = match e.status {
            DirtyStatus::New => DirtyStatus::New,
            DirtyStatus::Deleted => DirtyStatus::Edited,
            DirtyStatus::Edited | DirtyStatus::Unchanged => DirtyStatus::Deleted,
        };
        e.status
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn has_unsaved(&self) -> bool {
        self.entries
            .values()
            .any(|e| e.status != DirtyStatus::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_reads_unchanged() {
        let t = DirtyTracker::new();
        assert_eq!(t.status("x"), DirtyStatus::Unchanged);
        assert!(!t.has_unsaved());
    }

    #[test]
    fn test_new_is_sticky() {
        let mut t = DirtyTracker::new();
        t.mark_new("new-1", Level::Part, None);
        assert_eq!(t.mark_edited("new-1", Level::Part, None), DirtyStatus::New);
        t.seed("new-1", Level::Part, None);
        assert_eq!(t.toggle_deleted("new-1", Level::Part, None), DirtyStatus::New);
        assert_eq!(t.status("new-1"), DirtyStatus::New);
    }

    #[test]
    fn test_delete_toggle_flips_and_is_reversible() {
        let mut t = DirtyTracker::new();
        assert_eq!(t.toggle_deleted("7", Level::Chapter, Some("1")), DirtyStatus::Deleted);
        assert_eq!(t.toggle_deleted("7", Level::Chapter, Some("1")), DirtyStatus::Edited);
        assert_eq!(t.toggle_deleted("7", Level::Chapter, Some("1")), DirtyStatus::Deleted);

        t.mark_edited("8", Level::Chapter, Some("1"));
        assert_eq!(t.toggle_deleted("8", Level::Chapter, Some("1")), DirtyStatus::Deleted);
        assert_eq!(t.toggle_deleted("8", Level::Chapter, Some("1")), DirtyStatus::Edited);
    }

    #[test]
    fn test_edit_keeps_deleted() {
        let mut t = DirtyTracker::new();
        t.toggle_deleted("7", Level::Set, Some("2"));
        assert_eq!(t.mark_edited("7", Level::Set, Some("2")), DirtyStatus::Deleted);
    }

    #[test]
    fn test_seed_is_not_unsaved() {
        let mut t = DirtyTracker::new();
        t.seed("3", Level::Part, None);
        assert_eq!(t.len(), 1);
        assert!(!t.has_unsaved());
        t.mark_edited("3", Level::Part, None);
        assert!(t.has_unsaved());
        t.clear();
        assert!(t.is_empty());
        assert!(!t.has_unsaved());
    }

    #[test]
    fn test_set_parent_only_touches_existing() {
        let mut t = DirtyTracker::new();
        t.set_parent("9", Some("1"));
        assert!(t.get("9").is_none());
        t.seed("9", Level::Chapter, Some("1"));
        t.set_parent("9", Some("2"));
        assert_eq!(t.get("9").unwrap().parent_id.as_deref(), Some("2"));
    }
}
