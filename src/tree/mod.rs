use crate::models::{Level, NodeMarks};
use std::collections::HashMap;

/// One node of the statute hierarchy as the editor holds it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TreeNode {
    pub id: String,
    pub level: Level,
    pub parent_id: Option<String>,
    pub number: String,
    pub name: String,
    /// Rich-text body. Only subsections carry one.
    pub content: Option<String>,
    pub children: Vec<String>,
    /// Whether the number/name inputs accept typing.
    pub editable: bool,
    pub expanded: bool,
    pub marks: NodeMarks,
}

impl TreeNode {
    /// Non-leaf row still carrying a blank required name.
    pub fn missing_name(&self) -> bool {
        !self.level.is_leaf() && !self.marks.deleted && self.name.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TreeLoadError {
    MissingData,
    InvalidJson(String),
}

impl std::fmt::Display for TreeLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeLoadError::MissingData => write!(f, "hierarchy data is missing from the page"),
            TreeLoadError::InvalidJson(e) => write!(f, "hierarchy data is not valid JSON: {e}"),
        }
    }
}

/// Arena of hierarchy nodes indexed by id.
///
/// Sibling order lives in `roots` and in each node's `children`; a node's
/// `order_no` is always derived from its position there.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct HierarchyTree {
    nodes: HashMap<String, TreeNode>,
    roots: Vec<String>,
}

impl HierarchyTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Child list of `parent` (the root list for `None`).
    pub fn list(&self, parent: Option<&str>) -> Option<&[String]> {
        match parent {
            None => Some(&self.roots),
            Some(p) => self.nodes.get(p).map(|n| n.children.as_slice()),
        }
    }

    fn list_mut(&mut self, parent: Option<&str>) -> Option<&mut Vec<String>> {
        match parent {
            None => Some(&mut self.roots),
            Some(p) => self.nodes.get_mut(p).map(|n| &mut n.children),
        }
    }

    /// The list `id` currently sits in.
    pub fn siblings_of(&self, id: &str) -> Option<&[String]> {
        let node = self.nodes.get(id)?;
        self.list(node.parent_id.as_deref())
    }

    /// 0-based position among siblings.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.siblings_of(id)?.iter().position(|x| x == id)
    }

    /// 1-based position among siblings, as reported to the server.
    pub fn order_no(&self, id: &str) -> Option<usize> {
        self.position(id).map(|i| i + 1)
    }

    /// Whether `level` may be placed in the list owned by `parent`.
    pub fn accepts(&self, parent: Option<&str>, level: Level) -> bool {
        match parent {
            None => level.parent().is_none(),
            Some(p) => self
                .nodes
                .get(p)
                .map(|n| level.parent() == Some(n.level))
                .unwrap_or(false),
        }
    }

    /// Append `node` to the end of its parent's list.
    pub fn push(&mut self, node: TreeNode) -> bool {
        if self.nodes.contains_key(&node.id) || !self.accepts(node.parent_id.as_deref(), node.level)
        {
            return false;
        }
        let id = node.id.clone();
        let parent = node.parent_id.clone();
        self.nodes.insert(id.clone(), node);
        if let Some(list) = self.list_mut(parent.as_deref()) {
            list.push(id);
        }
        true
    }

    /// Swap `id` with its previous (`up`) or next sibling. No-op at a list boundary.
    pub fn swap_with_neighbour(&mut self, id: &str, up: bool) -> bool {
        let Some(parent) = self.nodes.get(id).map(|n| n.parent_id.clone()) else {
            return false;
        };
        let Some(list) = self.list_mut(parent.as_deref()) else {
            return false;
        };
        let Some(idx) = list.iter().position(|x| x == id) else {
            return false;
        };
        let swap = if up { idx.checked_sub(1) } else { Some(idx + 1) };
        match swap {
            Some(j) if j < list.len() => {
                list.swap(idx, j);
                true
            }
            _ => false,
        }
    }

    /// Move `id` into the list owned by `parent` at `index` (clamped).
    ///
    /// `index` is counted with `id` already removed from its origin list.
    pub fn relocate(&mut self, id: &str, parent: Option<&str>, index: usize) -> bool {
        let Some(level) = self.nodes.get(id).map(|n| n.level) else {
            return false;
        };
        if !self.accepts(parent, level) {
            return false;
        }
        let origin = self.nodes.get(id).and_then(|n| n.parent_id.clone());
        if let Some(list) = self.list_mut(origin.as_deref()) {
            list.retain(|x| x != id);
        }
        let Some(dest) = self.list_mut(parent) else {
            return false;
        };
        let at = index.min(dest.len());
        dest.insert(at, id.to_string());
        if let Some(n) = self.nodes.get_mut(id) {
            n.parent_id = parent.map(str::to_string);
        }
        true
    }

    /// Re-key a node, keeping its list slot and its children's back-references.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if old == new || self.nodes.contains_key(new) {
            return false;
        }
        let Some(mut node) = self.nodes.remove(old) else {
            return false;
        };
        node.id = new.to_string();
        let parent = node.parent_id.clone();
        for c in node.children.iter() {
            if let Some(child) = self.nodes.get_mut(c) {
                child.parent_id = Some(new.to_string());
            }
        }
        self.nodes.insert(new.to_string(), node);
        if let Some(list) = self.list_mut(parent.as_deref()) {
            for x in list.iter_mut() {
                if x == old {
                    *x = new.to_string();
                }
            }
        }
        true
    }

    /// Remove a node and everything below it. Returns the removed ids.
    pub fn remove_subtree(&mut self, id: &str) -> Vec<String> {
        let Some(parent) = self.nodes.get(id).map(|n| n.parent_id.clone()) else {
            return vec![];
        };
        if let Some(list) = self.list_mut(parent.as_deref()) {
            list.retain(|x| x != id);
        }

        let mut removed = vec![];
        let mut stack = vec![id.to_string()];
        while let Some(cur) = stack.pop() {
            if let Some(n) = self.nodes.remove(&cur) {
                stack.extend(n.children);
                removed.push(cur);
            }
        }
        removed
    }

    /// True when some ancestor of `id` (not `id` itself) carries the deleted marker.
    pub fn under_deleted(&self, id: &str) -> bool {
        let mut cur = self.nodes.get(id).and_then(|n| n.parent_id.clone());
        while let Some(p) = cur {
            let Some(n) = self.nodes.get(&p) else {
                return false;
            };
            if n.marks.deleted {
                return true;
            }
            cur = n.parent_id.clone();
        }
        false
    }

    /// Whether the list owned by `parent` lies inside a deleted-marked subtree.
    /// Such lists take no new or moved nodes; the root list never is.
    pub fn list_is_deleted(&self, parent: Option<&str>) -> bool {
        let Some(p) = parent else {
            return false;
        };
        self.nodes.get(p).map(|n| n.marks.deleted).unwrap_or(false) || self.under_deleted(p)
    }

    /// Ids in document order (parents before children, siblings in list order).
    pub fn preorder(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = self.roots.iter().rev().cloned().collect::<Vec<_>>();
        while let Some(id) = stack.pop() {
            if let Some(n) = self.nodes.get(&id) {
                stack.extend(n.children.iter().rev().cloned());
            }
            out.push(id);
        }
        out
    }

    /// Build a tree from the server-rendered hierarchy (`{"parts": [...]}`).
    ///
    /// Ids may be numbers or strings. Items without an id are dropped along with
    /// their subtree; siblings are sorted by `order_no` when present.
    pub fn from_hierarchy_json(data: &serde_json::Value) -> Self {
        let mut tree = Self::new();
        let parts = data
            .get("parts")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        tree.load_level(&parts, Level::Part, None);
        tree
    }

    pub fn from_hierarchy_str(json: &str) -> Result<Self, TreeLoadError> {
        if json.trim().is_empty() {
            return Err(TreeLoadError::MissingData);
        }
        let data: serde_json::Value =
            serde_json::from_str(json).map_err(|e| TreeLoadError::InvalidJson(e.to_string()))?;
        Ok(Self::from_hierarchy_json(&data))
    }

    fn load_level(&mut self, items: &[serde_json::Value], level: Level, parent: Option<&str>) {
        let mut items = items.to_vec();
        items.sort_by_key(|item| item.get("order_no").and_then(|v| v.as_i64()).unwrap_or(i64::MAX));

        for item in items {
            let get_s = |k: &str| match item.get(k) {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(serde_json::Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };

            let Some(id) = get_s("id").filter(|s| !s.trim().is_empty()) else {
                continue;
            };

            let node = TreeNode {
                id: id.clone(),
                level,
                parent_id: parent.map(str::to_string),
                number: get_s(&level.number_key())
                    .or_else(|| get_s("number"))
                    .unwrap_or_default(),
                name: get_s("name").unwrap_or_default(),
                content: level
                    .is_leaf()
                    .then(|| get_s("content").unwrap_or_default()),
                children: vec![],
                editable: false,
                expanded: false,
                marks: NodeMarks::default(),
            };
            if !self.push(node) {
                continue;
            }

            if let (Some(key), Some(next)) = (level.children_key(), level.next()) {
                let kids = item
                    .get(key)
                    .and_then(|v| v.as_array())
                    .cloned()
                    .unwrap_or_default();
                self.load_level(&kids, next, Some(&id));
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn node(id: &str, level: Level, parent: Option<&str>) -> TreeNode {
        TreeNode {
            id: id.to_string(),
            level,
            parent_id: parent.map(str::to_string),
            number: String::new(),
            name: format!("name {id}"),
            content: level.is_leaf().then(String::new),
            children: vec![],
            editable: false,
            expanded: true,
            marks: NodeMarks::default(),
        }
    }

    /// P1 > C1 > {S1, S2}; P2.
    pub(crate) fn sample_tree() -> HierarchyTree {
        let mut t = HierarchyTree::new();
        assert!(t.push(node("P1", Level::Part, None)));
        assert!(t.push(node("P2", Level::Part, None)));
        assert!(t.push(node("C1", Level::Chapter, Some("P1"))));
        assert!(t.push(node("S1", Level::Set, Some("C1"))));
        assert!(t.push(node("S2", Level::Set, Some("C1"))));
        t
    }

    #[test]
    fn test_push_rejects_level_mismatch() {
        let mut t = sample_tree();
        assert!(!t.push(node("X", Level::Section, Some("P1"))));
        assert!(!t.push(node("Y", Level::Chapter, None)));
        assert!(!t.push(node("P1", Level::Part, None)));
        assert!(!t.push(node("Z", Level::Chapter, Some("missing"))));
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn test_order_no_is_one_based_position() {
        let t = sample_tree();
        assert_eq!(t.order_no("P1"), Some(1));
        assert_eq!(t.order_no("P2"), Some(2));
        assert_eq!(t.order_no("S2"), Some(2));
        assert_eq!(t.order_no("nope"), None);
    }

    #[test]
    fn test_swap_is_noop_at_boundaries() {
        let mut t = sample_tree();
        assert!(!t.swap_with_neighbour("S1", true));
        assert!(!t.swap_with_neighbour("S2", false));
        assert!(t.swap_with_neighbour("S2", true));
        assert_eq!(t.list(Some("C1")).unwrap(), ["S2", "S1"]);
    }

    #[test]
    fn test_relocate_across_parents() {
        let mut t = sample_tree();
        assert!(t.push(node("C2", Level::Chapter, Some("P2"))));
        assert!(t.relocate("S1", Some("C2"), 0));
        assert_eq!(t.list(Some("C1")).unwrap(), ["S2"]);
        assert_eq!(t.list(Some("C2")).unwrap(), ["S1"]);
        assert_eq!(t.get("S1").unwrap().parent_id.as_deref(), Some("C2"));

        // Never across levels.
        assert!(!t.relocate("S1", Some("P1"), 0));
        assert!(!t.relocate("C1", None, 0));
    }

    #[test]
    fn test_rename_rewrites_list_and_children() {
        let mut t = sample_tree();
        assert!(t.rename("C1", "C9"));
        assert_eq!(t.list(Some("P1")).unwrap(), ["C9"]);
        assert_eq!(t.get("S1").unwrap().parent_id.as_deref(), Some("C9"));
        assert!(t.get("C1").is_none());
        assert!(!t.rename("C9", "P2"));
    }

    #[test]
    fn test_remove_subtree() {
        let mut t = sample_tree();
        let mut removed = t.remove_subtree("P1");
        removed.sort();
        assert_eq!(removed, ["C1", "P1", "S1", "S2"]);
        assert_eq!(t.roots(), ["P2"]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_preorder_and_under_deleted() {
        let mut t = sample_tree();
        assert_eq!(t.preorder(), ["P1", "C1", "S1", "S2", "P2"]);
        t.get_mut("C1").unwrap().marks.deleted = true;
        assert!(t.under_deleted("S1"));
        assert!(!t.under_deleted("C1"));
        assert!(!t.under_deleted("P2"));
    }

    #[test]
    fn test_from_hierarchy_json() {
        let data = serde_json::json!({
            "parts": [
                {"id": 2, "name": "Second", "part_no": "II", "order_no": 2, "chapters": []},
                {"id": 1, "name": "First", "part_no": "I", "order_no": 1, "chapters": [
                    {"id": 10, "name": "Ch", "chapter_no": "1", "order_no": 1, "sets": [
                        {"id": 20, "name": "Set", "order_no": 1, "sections": [
                            {"id": 30, "name": "Sec", "section_no": "3", "order_no": 1, "subsections": [
                                {"id": 40, "name": null, "subsection_no": "(a)", "content": "<p>x</p>", "order_no": 1}
                            ]}
                        ]}
                    ]}
                ]},
                {"name": "no id"}
            ]
        });
        let t = HierarchyTree::from_hierarchy_json(&data);
        assert_eq!(t.roots(), ["1", "2"]);
        assert_eq!(t.len(), 6);
        let leaf = t.get("40").unwrap();
        assert_eq!(leaf.level, Level::Subsection);
        assert_eq!(leaf.parent_id.as_deref(), Some("30"));
        assert_eq!(leaf.number, "(a)");
        assert_eq!(leaf.content.as_deref(), Some("<p>x</p>"));
        assert_eq!(t.get("10").unwrap().content, None);
        assert_eq!(t.get("1").unwrap().number, "I");
    }

    #[test]
    fn test_list_is_deleted_covers_whole_subtree() {
        let mut t = sample_tree();
        assert!(!t.list_is_deleted(None));
        assert!(!t.list_is_deleted(Some("C1")));

        t.get_mut("P1").unwrap().marks.deleted = true;
        assert!(t.list_is_deleted(Some("P1")));
        assert!(t.list_is_deleted(Some("C1")));
        assert!(t.list_is_deleted(Some("S1")));
        assert!(!t.list_is_deleted(Some("P2")));
        assert!(!t.list_is_deleted(None));
    }

    #[test]
    fn test_from_hierarchy_str_errors() {
        assert_eq!(
            HierarchyTree::from_hierarchy_str("  "),
            Err(TreeLoadError::MissingData)
        );
        assert!(matches!(
            HierarchyTree::from_hierarchy_str("{"),
            Err(TreeLoadError::InvalidJson(_))
        ));
        assert!(HierarchyTree::from_hierarchy_str(r#"{"parts": []}"#)
            .unwrap()
            .is_empty());
    }
}
