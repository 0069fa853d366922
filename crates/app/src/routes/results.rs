use crate::auth::use_session;
use crate::routes::result_editor::ResultEditor;
use dioxus::prelude::*;

/// Every result in the school. Admins can enter results for any student
/// and correct or remove existing ones.
#[component]
pub fn Results() -> Element {
    let Some(session) = use_session() else {
        return rsx! {};
    };
    rsx! {
        div { class: "page-header",
            h1 { class: "page-title", "Results" }
            p { class: "page-subtitle", "Filter by subject or student, or enter a new result" }
        }
        ResultEditor { session }
    }
}
