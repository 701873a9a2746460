use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

/// Controlled text input.
///
/// The value is owned by the caller; every keystroke is reported through
/// `on_input` and the caller decides whether it sticks.
#[component]
pub fn Input(
    // Styling
    #[prop(into, optional)] class: String,

    // Common HTML attributes
    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] name: String,

    #[prop(into)] value: Signal<String>,
    #[prop(into, optional)] disabled: MaybeProp<bool>,
    /// Renders `aria-invalid="true"` while set.
    #[prop(into, optional)] invalid: MaybeProp<bool>,
    #[prop(into, optional)] on_input: Option<Callback<String>>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "placeholder:text-muted-foreground selection:bg-primary selection:text-primary-foreground dark:bg-input/30 border-input flex h-8 min-w-0 rounded-md border bg-transparent px-2 py-1 text-sm shadow-xs transition-[color,box-shadow] outline-none disabled:cursor-not-allowed disabled:opacity-60",
        "focus-visible:border-ring focus-visible:ring-ring/50",
        "focus-visible:ring-2",
        "aria-invalid:ring-destructive/20 dark:aria-invalid:ring-destructive/40 aria-invalid:border-destructive",
        class
    );

    let handle_input = move |ev: web_sys::Event| {
        let Some(cb) = on_input else {
            return;
        };
        if let Some(target) = ev.target() {
            if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
                cb.run(input.value());
            }
        }
    };

    view! {
        <input
            data-name="Input"
            type=r#type
            class=merged_class
            placeholder=placeholder
            name=name
            prop:disabled=move || disabled.get().unwrap_or(false)
            aria-invalid=move || invalid.get().unwrap_or(false).then_some("true")
            prop:value=move || value.get()
            on:input=handle_input
        />
    }
    .into_any()
}
