use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Alert, div, "relative w-full rounded-lg border px-4 py-3 text-sm"}
    clx! {AlertTitle, h4, "mb-1 font-medium tracking-tight leading-none"}
    clx! {AlertDescription, p, "text-sm [&_p]:leading-relaxed whitespace-pre-wrap"}
    // Transient status line in the save bar.
    clx! {Notice, span, "text-sm text-success"}
}

#[allow(unused_imports)]
pub use components::*;
