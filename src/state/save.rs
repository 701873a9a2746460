use crate::api::ApiResult;
use crate::editor::payload::IdRemap;
use crate::editor::TreeEditor;
use crate::state::AppContext;
use crate::util::{
    blocking_alert, reload_page, save_failed_message, SAVE_OK_MESSAGE, UNSAVED_WARNING,
};
use leptos::ev;
use leptos::logging::{error, log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::{set_timeout, window_event_listener, WindowListenerHandle};
use std::time::Duration;

/// How a finished bulk save left the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SaveOutcome {
    Saved { renamed: usize },
    Failed(String),
}

/// Apply a bulk-save response to a locked editor.
///
/// Success adopts server ids and clears all pending changes; failure only unlocks,
/// so every change is still there for the next attempt.
pub(crate) fn settle(editor: &mut TreeEditor, result: ApiResult<IdRemap>) -> SaveOutcome {
    match result {
        Ok(remap) => SaveOutcome::Saved {
            renamed: editor.finish_save(&remap),
        },
        Err(e) => {
            editor.abort_save();
            SaveOutcome::Failed(e.to_string())
        }
    }
}

/// Page-level save orchestration: one bulk request at a time, result notices,
/// and the leave-page guard.
#[derive(Clone)]
pub(crate) struct SaveController {
    app_state: AppContext,

    saving: RwSignal<bool>,

    /// Transient status line ("Save successful").
    notice: RwSignal<Option<String>>,
    notice_ms: u64,

    last_error: RwSignal<Option<String>>,

    /// Global listener (keep handle alive).
    _beforeunload_handle: StoredValue<Option<WindowListenerHandle>>,
}

impl SaveController {
    pub fn new(app_state: AppContext) -> Self {
        let s = Self {
            app_state,
            saving: RwSignal::new(false),
            notice: RwSignal::new(None),
            notice_ms: 3000,
            last_error: RwSignal::new(None),
            _beforeunload_handle: StoredValue::new(None),
        };
        s.start_unload_guard();
        s
    }

    pub fn is_saving(&self) -> bool {
        self.saving.get()
    }

    pub fn notice(&self) -> Option<String> {
        self.notice.get()
    }

    /// Reason of the latest failed save; cleared by the next successful one.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.get()
    }

    /// Tracked: drives the save bar's enabled state.
    pub fn can_save(&self) -> bool {
        !self.saving.get() && self.app_state.0.editor.with(|e| e.has_unsaved())
    }

    pub fn save_all(&self) {
        if self.saving.get_untracked() {
            return;
        }
        let Some(statute_id) = self.app_state.0.statute_id.get_untracked() else {
            warn!("save requested without a statute id");
            return;
        };

        let editor = self.app_state.0.editor;
        if !editor.with_untracked(|e| e.has_unsaved()) {
            return;
        }
        let Some(payload) = editor.try_update(|e| e.begin_save()).flatten() else {
            return;
        };

        log!(
            "bulk save {statute_id}: {} created, {} updated, {} deleted, {} reordered",
            payload.created.len(),
            payload.updated.len(),
            payload.deleted.len(),
            payload.order.len()
        );

        self.saving.set(true);
        self.notice.set(None);

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            let result = api_client.bulk_save(&statute_id, &payload).await;
            let outcome = editor
                .try_update(|e| settle(e, result))
                .unwrap_or_else(|| SaveOutcome::Failed("editor is gone".to_string()));
            s2.saving.set(false);
            s2.report(outcome);
        });
    }

    fn report(&self, outcome: SaveOutcome) {
        match outcome {
            SaveOutcome::Saved { renamed } => {
                log!("bulk save ok: {renamed} ids adopted");
                self.last_error.set(None);
                self.notice.set(Some(SAVE_OK_MESSAGE.to_string()));

                let notice = self.notice;
                set_timeout(
                    move || notice.set(None),
                    Duration::from_millis(self.notice_ms),
                );
            }
            SaveOutcome::Failed(msg) => {
                error!("bulk save failed: {msg}");
                self.last_error.set(Some(msg.clone()));
                blocking_alert(&save_failed_message(&msg));
            }
        }
    }

    /// Discard local changes by reloading the page.
    pub fn cancel(&self) {
        if self.saving.get_untracked() {
            return;
        }
        reload_page();
    }

    fn start_unload_guard(&self) {
        let editor = self.app_state.0.editor;
        let handle = window_event_listener(ev::beforeunload, move |ev: web_sys::BeforeUnloadEvent| {
            if editor.with_untracked(|e| e.has_unsaved()) {
                ev.prevent_default();
                ev.set_return_value(UNSAVED_WARNING);
            }
        });
        self._beforeunload_handle.set_value(Some(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::DirtyStatus;
    use crate::tree::tests::sample_tree;

    #[test]
    fn test_settle_success_clears_pending_changes() {
        let mut editor = TreeEditor::new(sample_tree());
        let tmp = editor.add_part().unwrap();
        let payload = editor.begin_save().unwrap();
        assert_eq!(payload.created.len(), 1);

        let remap = IdRemap::from([(tmp.clone(), "P9".to_string())]);
        assert_eq!(settle(&mut editor, Ok(remap)), SaveOutcome::Saved { renamed: 1 });
        assert!(!editor.is_locked());
        assert!(!editor.has_unsaved());
        assert!(editor.tree().contains("P9"));
        assert!(!editor.tree().contains(&tmp));
    }

    #[test]
    fn test_settle_failure_keeps_changes_and_unlocks() {
        let mut editor = TreeEditor::new(sample_tree());
        let tmp = editor.add_part().unwrap();
        editor.begin_save().unwrap();

        let err = ApiError {
            kind: crate::api::ApiErrorKind::Http,
            message: "db locked".to_string(),
        };
        assert_eq!(
            settle(&mut editor, Err(err)),
            SaveOutcome::Failed("db locked".to_string())
        );
        assert!(!editor.is_locked());
        assert_eq!(editor.status(&tmp), DirtyStatus::New);
        assert!(editor.begin_save().is_some());
    }
}
