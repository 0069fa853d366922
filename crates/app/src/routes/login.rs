use crate::auth::{use_api, use_session_state};
use crate::components::FieldError;
use crate::fetch::use_fetch_scope;
use crate::routes::Route;
use dioxus::prelude::*;
use shared_types::{role_view, AppError, FeatureFlags, LoginRequest};

/// Email and password sign-in. On success the actor lands on their role's
/// landing page.
#[component]
pub fn Login() -> Element {
    let api = use_api();
    let session = use_session_state();
    let flags: FeatureFlags = use_context();
    let scope = use_fetch_scope();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error: Signal<Option<AppError>> = use_signal(|| None);
    let mut loading = use_signal(|| false);

    // Already signed in (e.g. in another tab): skip the form.
    use_effect(move || {
        if let Some(role) = session.read().role() {
            navigator().replace(Route::from(role_view(role).landing));
        }
    });

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        let api = api.clone();
        let scope = scope.clone();
        async move {
            loading.set(true);
            error.set(None);
            let req = LoginRequest {
                email: email().trim().to_string(),
                password: password(),
            };
            match scope.guard(api.login(&req)).await {
                Ok(session) => {
                    navigator().replace(Route::from(role_view(session.role).landing));
                }
                Err(err) if err.is_cancelled() => return,
                Err(err) => error.set(Some(err)),
            }
            loading.set(false);
        }
    };

    let banner = error()
        .filter(|e| !e.is_validation())
        .map(|e| e.friendly_message());

    rsx! {
        div { class: "auth-page",
            div { class: "card auth-card",
                div { class: "card-header",
                    h1 { class: "card-title", "Sign In" }
                    p { class: "card-description", "Enter your school account credentials" }
                }

                div { class: "card-content",
                    if let Some(msg) = banner {
                        div { class: "auth-error", "{msg}" }
                    }

                    form { onsubmit: handle_login,
                        div { class: "auth-field",
                            label { r#for: "email", "Email" }
                            input {
                                r#type: "email",
                                id: "email",
                                class: "input",
                                placeholder: "you@school.edu",
                                value: email(),
                                oninput: move |e: FormEvent| email.set(e.value()),
                            }
                            FieldError { error: error(), field: "email" }
                        }
                        div { class: "auth-field",
                            label { r#for: "password", "Password" }
                            input {
                                r#type: "password",
                                id: "password",
                                class: "input",
                                placeholder: "Enter your password",
                                value: password(),
                                oninput: move |e: FormEvent| password.set(e.value()),
                            }
                            FieldError { error: error(), field: "password" }
                        }
                        button {
                            r#type: "submit",
                            class: "button auth-submit",
                            disabled: loading(),
                            if loading() { "Signing in..." } else { "Sign In" }
                        }
                    }
                }

                if flags.registration {
                    div { class: "card-footer",
                        p { class: "auth-link",
                            "New student? "
                            Link { to: Route::Register {}, "Create an account" }
                        }
                    }
                }
            }
        }
    }
}
