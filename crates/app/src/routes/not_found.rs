use crate::auth::use_role;
use crate::routes::Route;
use dioxus::prelude::*;
use shared_types::role_view;

#[component]
pub fn NotFound(route: Vec<String>) -> Element {
    let path = format!("/{}", route.join("/"));
    let home = match use_role() {
        Some(role) => Route::from(role_view(role).landing),
        None => Route::Login {},
    };
    rsx! {
        div { class: "auth-page",
            div { class: "card auth-card",
                div { class: "card-header",
                    h1 { class: "card-title", "Page not found" }
                    p { class: "card-description", "Nothing lives at {path}." }
                }
                div { class: "card-content",
                    Link { to: home, class: "button", "Go back" }
                }
            }
        }
    }
}
