use crate::auth::use_session;
use crate::routes::result_editor::ResultEditor;
use dioxus::prelude::*;

/// Teacher grading: add, correct and remove results for assigned students.
#[component]
pub fn GiveResults() -> Element {
    let Some(session) = use_session() else {
        return rsx! {};
    };
    rsx! {
        div { class: "page-header",
            h1 { class: "page-title", "Give Results" }
            p { class: "page-subtitle", "Grades are computed from marks: 90+ A+, 80+ A, 70+ B, 60+ C, 50+ D" }
        }
        ResultEditor { session }
    }
}
