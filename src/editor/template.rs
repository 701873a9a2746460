use crate::models::{Level, NodeMarks};
use crate::tree::TreeNode;
use leptos::logging::warn;
use std::sync::atomic::{AtomicU64, Ordering};

/// Marks ids that exist only client-side. Server ids are numeric, so they can't collide.
pub(crate) const TEMP_ID_PREFIX: &str = "new-";

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Fresh temporary id for a node that has not been persisted yet.
pub(crate) fn generate_temp_id() -> String {
    let mut buf = [0u8; 8];
    if let Err(e) = getrandom::getrandom(&mut buf) {
        warn!("temp id entropy unavailable, falling back to counter only: {e}");
    }
    let rand = u64::from_le_bytes(buf);
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{TEMP_ID_PREFIX}{rand:016x}-{counter}")
}

pub(crate) fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

pub(crate) fn next_level(level: Level) -> Option<Level> {
    level.next()
}

/// Row controls. `class` names are part of the page's DOM contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeAction {
    AddChild(Level),
    EditContent,
    Delete,
    MoveUp,
    MoveDown,
}

impl NodeAction {
    pub fn class(&self) -> &'static str {
        match self {
            NodeAction::AddChild(_) => "btn-small btn-add",
            NodeAction::EditContent => "btn-small btn-edit",
            NodeAction::Delete => "btn-small btn-delete",
            NodeAction::MoveUp => "btn-small btn-up",
            NodeAction::MoveDown => "btn-small btn-down",
        }
    }

    pub fn label(&self) -> String {
        match self {
            NodeAction::AddChild(level) => format!("+ Add {}", level.label()),
            NodeAction::EditContent => "✎ Edit".to_string(),
            NodeAction::Delete => "× Delete".to_string(),
            NodeAction::MoveUp => "▲".to_string(),
            NodeAction::MoveDown => "▼".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FieldTemplate {
    pub class: &'static str,
    pub placeholder: &'static str,
    pub value: String,
    pub disabled: bool,
}

/// Structural fragment for one tree row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeTemplate {
    pub id: String,
    pub level: Level,
    pub label: &'static str,
    pub number: FieldTemplate,
    pub name: FieldTemplate,
    pub actions: Vec<NodeAction>,
    /// Non-leaf rows get an expand/collapse toggle; leaves a spacer.
    pub collapsible: bool,
    /// Hidden content holder, leaf rows only.
    pub content_holder: Option<String>,
}

pub(crate) fn render_template(level: Level, id: &str) -> NodeTemplate {
    let primary = match next_level(level) {
        Some(next) => NodeAction::AddChild(next),
        None => NodeAction::EditContent,
    };

    NodeTemplate {
        id: id.to_string(),
        level,
        label: level.label(),
        number: FieldTemplate {
            class: "num-input item-number",
            placeholder: "#",
            value: String::new(),
            disabled: true,
        },
        name: FieldTemplate {
            class: "name-input item-name",
            placeholder: "Name…",
            value: String::new(),
            disabled: true,
        },
        actions: vec![
            primary,
            NodeAction::Delete,
            NodeAction::MoveUp,
            NodeAction::MoveDown,
        ],
        collapsible: !level.is_leaf(),
        content_holder: level.is_leaf().then(String::new),
    }
}

impl NodeTemplate {
    pub fn css_class(&self) -> String {
        format!("tree-node {}-node", self.level)
    }

    /// Materialize the fragment as a tree node under `parent_id`.
    pub fn into_node(self, parent_id: Option<&str>) -> TreeNode {
        TreeNode {
            id: self.id,
            level: self.level,
            parent_id: parent_id.map(str::to_string),
            number: self.number.value,
            name: self.name.value,
            content: self.content_holder,
            children: vec![],
            editable: !(self.number.disabled && self.name.disabled),
            expanded: true,
            marks: NodeMarks::default(),
        }
    }
}
