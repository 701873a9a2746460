use icons::X;
use leptos::ev;
use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::*;

use crate::components::hooks::use_random::use_random_id_for;

mod components {
    use super::*;
    clx! {DialogBody, div, "flex flex-col gap-4"}
    clx! {DialogHeader, div, "flex flex-col gap-2 text-center sm:text-left"}
    clx! {DialogTitle, h3, "text-lg leading-none font-semibold"}
    clx! {DialogDescription, p, "text-muted-foreground text-sm"}
    clx! {DialogFooter, footer, "flex flex-col-reverse gap-2 sm:flex-row sm:justify-end"}
}

#[allow(unused_imports)]
pub use components::*;

/* ========================================================== */
/*                     ✨ FUNCTIONS ✨                        */
/* ========================================================== */

/// Modal dialog driven by the caller's `open` signal.
///
/// Escape, the close button and (optionally) a backdrop click all go through
/// `on_close`; the dialog never closes itself.
#[component]
pub fn Dialog(
    children: ChildrenFn,
    #[prop(into)] open: Signal<bool>,
    on_close: Callback<()>,
    #[prop(optional, into)] class: String,
    #[prop(default = true)] close_on_backdrop_click: bool,
) -> impl IntoView {
    let dialog_id = use_random_id_for("dialog");
    let merged_class = tw_merge!(
        "bg-background border rounded-2xl shadow-lg p-6 w-full max-w-[calc(100%-2rem)] sm:max-w-lg max-h-[85vh] fixed top-[50%] left-[50%] translate-x-[-50%] translate-y-[-50%] z-100",
        class
    );

    let esc = window_event_listener(ev::keydown, move |e: web_sys::KeyboardEvent| {
        if e.key() == "Escape" && open.get_untracked() {
            e.prevent_default();
            on_close.run(());
        }
    });
    on_cleanup(move || esc.remove());

    view! {
        <Show when=move || open.get()>
            <div
                data-name="DialogBackdrop"
                class="fixed inset-0 z-60 bg-black/50"
                on:click=move |_| {
                    if close_on_backdrop_click {
                        on_close.run(());
                    }
                }
            />
            <div
                data-name="DialogContent"
                class=merged_class.clone()
                id=dialog_id.clone()
                role="dialog"
                aria-modal="true"
                data-state="open"
            >
                <button
                    type="button"
                    class="absolute top-4 right-4 p-1 rounded-sm focus:ring-2 focus:ring-offset-2 focus:outline-none [&_svg:not([class*='size-'])]:size-4 focus:ring-ring"
                    aria-label="Close dialog"
                    on:click=move |_| on_close.run(())
                >
                    <X />
                </button>
                {children()}
            </div>
        </Show>
    }
}
