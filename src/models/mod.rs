use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Rank of a node in the statute hierarchy, outermost first.
///
/// The wire format (bulk save, component endpoint) uses the lowercase names.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Level {
    Part,
    Chapter,
    Set,
    Section,
    Subsection,
}

impl Level {
    /// Level of the children a node at this level may hold. `None` for the leaf level.
    pub fn next(self) -> Option<Level> {
        match self {
            Level::Part => Some(Level::Chapter),
            Level::Chapter => Some(Level::Set),
            Level::Set => Some(Level::Section),
            Level::Section => Some(Level::Subsection),
            Level::Subsection => None,
        }
    }

    /// Level of the enclosing node. `None` for parts, which sit at the root.
    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Part => None,
            Level::Chapter => Some(Level::Part),
            Level::Set => Some(Level::Chapter),
            Level::Section => Some(Level::Set),
            Level::Subsection => Some(Level::Section),
        }
    }

    pub fn is_leaf(self) -> bool {
        self.next().is_none()
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Part => "PART",
            Level::Chapter => "CHAPTER",
            Level::Set => "SET",
            Level::Section => "SECTION",
            Level::Subsection => "SUBSECTION",
        }
    }

    /// Key holding this level's children in the server-rendered hierarchy JSON.
    pub(crate) fn children_key(self) -> Option<&'static str> {
        match self.next()? {
            Level::Part => None,
            Level::Chapter => Some("chapters"),
            Level::Set => Some("sets"),
            Level::Section => Some("sections"),
            Level::Subsection => Some("subsections"),
        }
    }

    /// Column carrying the display number (`part_no`, `chapter_no`, ...).
    pub(crate) fn number_key(self) -> String {
        format!("{}_no", self.as_ref())
    }
}

/// Pending-change status of a tracked node.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum DirtyStatus {
    New,
    Edited,
    Deleted,
    #[default]
    Unchanged,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct DirtyEntry {
    pub status: DirtyStatus,
    pub level: Level,
    pub parent_id: Option<String>,
}

/// Visual state classes carried by a rendered row (`new`, `edited`, `deleted`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct NodeMarks {
    pub new: bool,
    pub edited: bool,
    pub deleted: bool,
}

impl NodeMarks {
    pub fn css_classes(&self) -> String {
        let mut out = Vec::new();
        if self.new {
            out.push("new");
        }
        if self.edited {
            out.push("edited");
        }
        if self.deleted {
            out.push("deleted");
        }
        out.join(" ")
    }
}
