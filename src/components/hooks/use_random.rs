use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

const PREFIX: &str = "statute_ui"; // Must NOT contain "/" or "-"

/// Unique DOM id for one mounted widget, e.g. `dialog_statute_ui_...`.
pub fn use_random_id_for(element: &str) -> String {
    format!("{}_{PREFIX}_{}", element, generate_hash())
}

static COUNTER: AtomicUsize = AtomicUsize::new(1);

fn generate_hash() -> u64 {
    let mut hasher = DefaultHasher::new();
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
    counter.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_unique_and_dom_safe() {
        let a = use_random_id_for("dialog");
        let b = use_random_id_for("dialog");
        assert_ne!(a, b);
        assert!(a.starts_with("dialog_statute_ui_"));
        assert!(!a.contains('/') && !a.contains('-'));
    }
}
