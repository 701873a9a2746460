use crate::tree::TreeLoadError;
use wasm_bindgen::JsCast;

/// `<meta name="csrf-token">` as rendered by the server.
pub(crate) const CSRF_META_SELECTOR: &str = "meta[name=csrf-token]";

/// Inline JSON holding the statute's hierarchy at page load.
pub(crate) const HIERARCHY_DATA_ID: &str = "hierarchy-data";

pub(crate) const SAVE_OK_MESSAGE: &str = "Save successful";

pub(crate) const UNSAVED_WARNING: &str = "Unsaved changes";

pub(crate) fn save_failed_message(reason: &str) -> String {
    format!("Save failed:\n{reason}")
}

pub(crate) fn csrf_token() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let meta = document
        .query_selector(CSRF_META_SELECTOR)
        .ok()
        .flatten()?
        .dyn_into::<web_sys::HtmlMetaElement>()
        .ok()?;
    let token = meta.content();
    (!token.trim().is_empty()).then_some(token)
}

/// Raw JSON text of the embedded hierarchy.
pub(crate) fn read_hierarchy_json() -> Result<String, TreeLoadError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(TreeLoadError::MissingData)?;
    let el = document
        .get_element_by_id(HIERARCHY_DATA_ID)
        .ok_or(TreeLoadError::MissingData)?;
    el.text_content().ok_or(TreeLoadError::MissingData)
}

/// Throw away every local change.
pub(crate) fn reload_page() {
    if let Some(win) = web_sys::window() {
        let _ = win.location().reload();
    }
}

pub(crate) fn blocking_alert(message: &str) {
    if let Some(win) = web_sys::window() {
        let _ = win.alert_with_message(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_failed_message_keeps_reason_on_its_own_line() {
        assert_eq!(save_failed_message("db locked"), "Save failed:\ndb locked");
    }
}
