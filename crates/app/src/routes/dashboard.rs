use crate::auth::{use_api, use_session};
use crate::components::SummaryPanel;
use crate::fetch::use_fetch_scope;
use crate::notify::use_toasts;
use crate::routes::Route;
use client::ApiClient;
use dioxus::prelude::*;
use shared_types::{role_view, summarize, AppError, Notifier, ResultSummary, Role, Session};

/// Numbers shown on the dashboard. Counts that the role cannot see are
/// left out.
#[derive(Debug, Clone, PartialEq, Default)]
struct Overview {
    users: Option<usize>,
    teachers: Option<usize>,
    students: Option<usize>,
    summary: Option<ResultSummary>,
}

async fn load_overview(api: &ApiClient, session: &Session) -> Result<Overview, AppError> {
    let mut overview = Overview::default();
    match session.role {
        Role::Admin => {
            let users = api.list_users().await?;
            overview.users = Some(users.len());
            overview.teachers = Some(users.iter().filter(|u| u.role() == Role::Teacher).count());
            overview.students = Some(users.iter().filter(|u| u.role() == Role::Student).count());
        }
        Role::Teacher => {
            overview.students = Some(api.reachable_students(session).await?.len());
        }
        Role::Student => {}
    }
    let results = api.results_for(session).await?;
    overview.summary = Some(summarize(&results));
    Ok(overview)
}

#[component]
pub fn Dashboard() -> Element {
    let Some(session) = use_session() else {
        return rsx! {};
    };
    rsx! { DashboardView { session } }
}

#[component]
fn DashboardView(session: Session) -> Element {
    let api = use_api();
    let toasts = use_toasts();
    let scope = use_fetch_scope();

    let overview = use_resource({
        let session = session.clone();
        move || {
            let api = api.clone();
            let scope = scope.clone();
            let session = session.clone();
            async move {
                let result = scope.guard(load_overview(&api, &session)).await;
                if let Err(err) = &result {
                    toasts.report(err);
                }
                result
            }
        }
    });

    let greeting = match session.role {
        Role::Admin => "School overview",
        Role::Teacher => "Your classes at a glance",
        Role::Student => "Your progress",
    };
    let data = overview.read().clone();

    rsx! {
        div { class: "page-header",
            h1 { class: "page-title", "Welcome, {session.name}" }
            p { class: "page-subtitle", "{greeting}" }
        }

        {match data {
            None => rsx! { p { class: "muted", "Loading..." } },
            Some(Err(err)) if err.is_cancelled() => rsx! {},
            Some(Err(err)) => rsx! {
                div { class: "panel-error", "{err.friendly_message()}" }
            },
            Some(Ok(data)) => rsx! {
                div { class: "stat-grid",
                    if let Some(n) = data.users {
                        StatCard { label: "Users", value: n.to_string() }
                    }
                    if let Some(n) = data.teachers {
                        StatCard { label: "Teachers", value: n.to_string() }
                    }
                    if let Some(n) = data.students {
                        StatCard {
                            label: if session.role == Role::Teacher { "My students" } else { "Students" },
                            value: n.to_string(),
                        }
                    }
                    if let Some(summary) = &data.summary {
                        StatCard { label: "Results", value: summary.count.to_string() }
                        StatCard { label: "Average", value: summary.average_label() }
                        StatCard { label: "Passing", value: format!("{}/{}", summary.passing, summary.count) }
                    }
                }
                if let Some(summary) = data.summary.clone() {
                    SummaryPanel { summary, role: session.role }
                }
            },
        }}

        div { class: "quick-links",
            for page in role_view(session.role).nav.iter().copied().skip(1) {
                Link { key: "{page.path()}", to: Route::from(page), class: "button button-outline", "{page.label()}" }
            }
        }
    }
}

#[component]
fn StatCard(#[props(into)] label: String, value: String) -> Element {
    rsx! {
        div { class: "stat-card",
            span { class: "stat-label", "{label}" }
            span { class: "stat-value", "{value}" }
        }
    }
}
