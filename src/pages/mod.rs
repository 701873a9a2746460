use crate::components::ui::{
    Alert, AlertDescription, AlertTitle, Button, ButtonSize, ButtonVariant, Notice, Spinner,
};
use crate::editor::HierarchyEditor;
use crate::state::{AppContext, SaveController};
use crate::util::{read_hierarchy_json, UNSAVED_WARNING};
use leptos::prelude::*;
use leptos_router::params::Params;

#[derive(Params, PartialEq, Clone, Debug)]
pub struct StatuteRouteParams {
    pub statute_id: Option<String>,
}

#[component]
pub fn StatuteEditPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = leptos_router::hooks::use_params::<StatuteRouteParams>();

    // Use closures so params access happens inside a reactive tracking context.
    let statute_id = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.statute_id)
            .unwrap_or_default()
    };

    // The hierarchy is embedded in the page once; load it when the route settles.
    let st = app_state.clone();
    Effect::new(move |_| {
        let id = statute_id();
        if id.trim().is_empty() {
            return;
        }
        if st.0.statute_id.get_untracked().as_deref() == Some(id.as_str()) {
            return;
        }
        st.0.statute_id.set(Some(id));
        st.0.load_tree(read_hierarchy_json());
    });

    let saver = StoredValue::new(SaveController::new(app_state.clone()));
    let editor = app_state.0.editor;
    let load_error = app_state.0.load_error;

    let can_save = Memo::new(move |_| saver.with_value(|s| s.can_save()));
    let saving = Memo::new(move |_| saver.with_value(|s| s.is_saving()));
    let unsaved = Memo::new(move |_| editor.with(|e| e.has_unsaved()));

    view! {
        <div class="statute-edit mx-auto flex max-w-5xl flex-col gap-4 px-4 py-6">
            <div class="save-bar sticky top-0 z-10 flex items-center gap-2 border-b bg-background py-2">
                <Button
                    variant=ButtonVariant::Success
                    size=ButtonSize::Sm
                    class="btn-save"
                    attr:disabled=move || !can_save.get()
                    on:click=move |_| saver.with_value(|s| s.save_all())
                >
                    <Show when=move || saving.get()>
                        <Spinner />
                    </Show>
                    "Save"
                </Button>
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    class="btn-cancel"
                    attr:disabled=move || !can_save.get()
                    on:click=move |_| saver.with_value(|s| s.cancel())
                >
                    "Cancel"
                </Button>

                <Show when=move || unsaved.get() && !saving.get()>
                    <span class="text-xs text-muted-foreground">{UNSAVED_WARNING}</span>
                </Show>
                {move || saver.with_value(|s| s.notice()).map(|msg| view! { <Notice>{msg}</Notice> })}
                {move || {
                    saver
                        .with_value(|s| s.last_error())
                        .map(|msg| {
                            view! {
                                <span class="save-error truncate text-xs text-destructive" title=msg.clone()>
                                    {format!("Last save failed: {msg}")}
                                </span>
                            }
                        })
                }}
            </div>

            <Show
                when=move || load_error.get().is_some()
                fallback=move || view! { <HierarchyEditor editor=editor /> }
            >
                <Alert class="border-destructive/50 text-destructive">
                    <AlertTitle>"Could not load the hierarchy"</AlertTitle>
                    <AlertDescription>{move || load_error.get().unwrap_or_default()}</AlertDescription>
                </Alert>
            </Show>
        </div>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="px-4 py-8 text-xs text-muted-foreground">
            "Not found. Statutes are edited at /statute/<id>/edit."
        </div>
    }
}
