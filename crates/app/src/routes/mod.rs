pub mod classes;
pub mod dashboard;
pub mod give_results;
pub mod login;
pub mod messages;
pub mod my_results;
pub mod not_found;
pub mod register;
pub mod result_editor;
pub mod results;
pub mod users;

use crate::auth::{use_api, use_session_state};
use dioxus::prelude::*;
use dioxus_free_icons::icons::ld_icons::{
    LdBookOpen, LdClipboardList, LdFileText, LdGraduationCap, LdLayoutDashboard, LdLogOut,
    LdMessageSquare, LdUsers,
};
use dioxus_free_icons::Icon;
use shared_types::{gate, role_view, Gate, Page, SessionState};

use classes::Classes;
use dashboard::Dashboard;
use give_results::GiveResults;
use login::Login;
use messages::Messages;
use my_results::MyResults;
use not_found::NotFound;
use register::Register;
use results::Results;
use users::Users;

/// Application routes.
#[derive(Clone, Routable, Debug, PartialEq)]
pub enum Route {
    #[route("/login")]
    Login {},
    #[route("/register")]
    Register {},
    #[layout(AuthGuard)]
    #[layout(AppLayout)]
    #[route("/")]
    Dashboard {},
    #[route("/users")]
    Users {},
    #[route("/classes")]
    Classes {},
    #[route("/results")]
    Results {},
    #[route("/give-results")]
    GiveResults {},
    #[route("/my-results")]
    MyResults {},
    #[route("/messages")]
    Messages {},
    #[end_layout]
    #[end_layout]
    #[route("/:..route")]
    NotFound { route: Vec<String> },
}

impl Route {
    pub fn page(&self) -> Option<Page> {
        Page::from_path(&self.to_string())
    }
}

impl From<Page> for Route {
    fn from(page: Page) -> Self {
        match page {
            Page::Dashboard => Route::Dashboard {},
            Page::Users => Route::Users {},
            Page::Classes => Route::Classes {},
            Page::Results => Route::Results {},
            Page::GiveResults => Route::GiveResults {},
            Page::MyResults => Route::MyResults {},
            Page::Messages => Route::Messages {},
        }
    }
}

/// Redirects to /login unless the stored credential resolves to a session.
/// A stale or unreadable credential is removed on the way out.
#[component]
fn AuthGuard() -> Element {
    let session = use_session_state();
    let api = use_api();
    let route: Route = use_route();

    // A token can expire while the tab stays open; re-check it on every
    // navigation so a stale session is sent to login.
    use_effect(use_reactive((&route,), {
        let api = api.clone();
        move |(route,)| {
            let state = api.session().revalidate();
            tracing::trace!(%route, authenticated = state.is_authenticated(), "session re-checked");
        }
    }));

    use_effect(move || {
        let state = session.read().clone();
        match state {
            SessionState::Authenticated(_) => {}
            SessionState::Invalid(reason) => {
                tracing::info!(%reason, "discarding stored credential");
                api.logout();
                navigator().replace(Route::Login {});
            }
            SessionState::Unauthenticated => {
                navigator().replace(Route::Login {});
            }
        }
    });

    if session.read().is_authenticated() {
        rsx! { Outlet::<Route> {} }
    } else {
        rsx! {
            div { class: "auth-guard-loading",
                p { "Redirecting to login..." }
            }
        }
    }
}

#[component]
fn NavIcon(page: Page) -> Element {
    match page {
        Page::Dashboard => rsx! { Icon::<LdLayoutDashboard> { icon: LdLayoutDashboard, width: 18, height: 18 } },
        Page::Users => rsx! { Icon::<LdUsers> { icon: LdUsers, width: 18, height: 18 } },
        Page::Classes => rsx! { Icon::<LdGraduationCap> { icon: LdGraduationCap, width: 18, height: 18 } },
        Page::Results => rsx! { Icon::<LdFileText> { icon: LdFileText, width: 18, height: 18 } },
        Page::GiveResults => rsx! { Icon::<LdClipboardList> { icon: LdClipboardList, width: 18, height: 18 } },
        Page::MyResults => rsx! { Icon::<LdBookOpen> { icon: LdBookOpen, width: 18, height: 18 } },
        Page::Messages => rsx! { Icon::<LdMessageSquare> { icon: LdMessageSquare, width: 18, height: 18 } },
    }
}

/// Sidebar and top bar around every protected page. The sidebar lists only
/// the pages the role may open, and a page outside that list renders an
/// access notice instead of its content.
#[component]
fn AppLayout() -> Element {
    let route: Route = use_route();
    let session = use_session_state();
    let api = use_api();

    let state = session.read().clone();
    let Some(current) = state.session().cloned() else {
        return rsx! {};
    };
    let view = role_view(current.role);
    let page = route.page();
    let page_title = page.map(|p| p.label()).unwrap_or_default();

    let content = match page.map(|p| gate(&state, p)) {
        Some(Gate::Denied { landing }) => rsx! {
            AccessDenied { landing }
        },
        _ => rsx! { Outlet::<Route> {} },
    };

    rsx! {
        div { class: "app-shell",
            aside { class: "sidebar",
                div { class: "sidebar-brand",
                    span { class: "sidebar-brand-name", "School Portal" }
                    span { class: "sidebar-brand-role", "{current.role.label()}" }
                }
                nav { class: "sidebar-menu",
                    for item in view.nav.iter().copied() {
                        Link {
                            key: "{item.path()}",
                            to: Route::from(item),
                            class: "sidebar-link",
                            active_class: "active",
                            NavIcon { page: item }
                            span { "{item.label()}" }
                        }
                    }
                }
            }

            div { class: "app-main",
                header { class: "navbar",
                    span { class: "navbar-title", "{page_title}" }
                    div { class: "navbar-spacer" }
                    div { class: "navbar-user",
                        span { class: "avatar", "{current.initial()}" }
                        div { class: "navbar-user-text",
                            span { class: "navbar-user-name", "{current.name}" }
                            span { class: "navbar-user-email", "{current.email}" }
                        }
                        button {
                            class: "button button-ghost",
                            onclick: move |_| {
                                api.logout();
                                navigator().replace(Route::Login {});
                            },
                            Icon::<LdLogOut> { icon: LdLogOut, width: 16, height: 16 }
                            "Sign Out"
                        }
                    }
                }

                main { class: "page-content", {content} }
            }
        }
    }
}

#[component]
fn AccessDenied(landing: Page) -> Element {
    rsx! {
        div { class: "access-denied",
            h2 { "Access denied" }
            p { "You do not have permission to view this page." }
            Link { to: Route::from(landing), class: "button", "Go to {landing.label()}" }
        }
    }
}
