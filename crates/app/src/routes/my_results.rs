use crate::auth::{use_api, use_session};
use crate::components::{ResultsTable, SummaryPanel};
use crate::fetch::{use_fetch_scope, use_initial_load, use_list};
use dioxus::prelude::*;
use shared_types::{summarize, ResultRecord, Session};

#[component]
pub fn MyResults() -> Element {
    let Some(session) = use_session() else {
        return rsx! {};
    };
    rsx! { MyResultsView { session } }
}

/// The signed-in student's own results. Records belonging to anyone else
/// are dropped client-side as well.
#[component]
fn MyResultsView(session: Session) -> Element {
    let api = use_api();
    let scope = use_fetch_scope();
    let list = use_list::<ResultRecord>();

    let role = session.role;
    use_initial_load(list, scope, move || async move { api.results_for(&session).await });

    let rows = list.items();
    let summary = summarize(&rows);
    let loaded = list.is_loaded();

    rsx! {
        div { class: "page-header",
            h1 { class: "page-title", "My Results" }
            if summary.count > 0 {
                p { class: "page-subtitle",
                    "Average {summary.average_label()}, {summary.passing} of {summary.count} passing"
                }
            }
        }

        ResultsTable { results: rows, loaded }

        if loaded {
            SummaryPanel { summary, role }
        }
    }
}
