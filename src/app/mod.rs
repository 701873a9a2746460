use crate::pages::{NotFoundPage, StatuteEditPage};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=NotFoundPage>
                <Route path=path!("statute/:statute_id/edit") view=StatuteEditPage />
            </Routes>
        </Router>
    }
}
