pub(crate) mod save;

use crate::api::ApiClient;
use crate::editor::TreeEditor;
use crate::tree::{HierarchyTree, TreeLoadError};
use leptos::logging::{error, log};
use leptos::prelude::*;

pub(crate) use save::SaveController;

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// From the route; the bulk-save endpoint is keyed by it.
    pub statute_id: RwSignal<Option<String>>,

    pub editor: RwSignal<TreeEditor>,

    /// Set when the embedded hierarchy could not be read; the page shows it instead of the tree.
    pub load_error: RwSignal<Option<String>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_client(ApiClient::from_page())
    }

    pub fn with_client(api_client: ApiClient) -> Self {
        Self {
            api_client: RwSignal::new(api_client),
            statute_id: RwSignal::new(None),
            editor: RwSignal::new(TreeEditor::default()),
            load_error: RwSignal::new(None),
        }
    }

    /// Replace the editing session with a freshly loaded tree.
    pub fn load_tree(&self, source: Result<String, TreeLoadError>) {
        match source.and_then(|json| HierarchyTree::from_hierarchy_str(&json)) {
            Ok(tree) => {
                log!("loaded hierarchy: {} nodes", tree.len());
                self.editor.set(TreeEditor::new(tree));
                self.load_error.set(None);
            }
            Err(e) => {
                error!("hierarchy load failed: {e}");
                self.load_error.set(Some(e.to_string()));
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::with_client(ApiClient::new(String::new()))
    }

    #[test]
    fn test_load_tree_replaces_editor() {
        let owner = Owner::new();
        owner.set();
        let s = state();
        s.load_tree(Ok(
            r#"{"parts":[{"id":1,"name":"General","part_no":"I","order_no":1,"chapters":[]}]}"#
                .to_string(),
        ));
        assert!(s.load_error.get_untracked().is_none());
        s.editor.with_untracked(|e| {
            assert_eq!(e.tree().roots(), ["1".to_string()]);
            assert!(!e.has_unsaved());
        });
    }

    #[test]
    fn test_load_tree_reports_errors() {
        let owner = Owner::new();
        owner.set();
        let s = state();
        s.load_tree(Err(TreeLoadError::MissingData));
        assert!(s.load_error.get_untracked().is_some());

        s.load_tree(Ok("{not json".to_string()));
        let msg = s.load_error.get_untracked().unwrap_or_default();
        assert!(msg.contains("not valid JSON"), "{msg}");
        assert!(s.editor.with_untracked(|e| e.tree().is_empty()));
    }
}
