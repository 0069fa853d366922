use crate::auth::use_api;
use crate::components::{GuardianFields, TextField};
use crate::fetch::use_fetch_scope;
use crate::notify::use_toasts;
use crate::routes::Route;
use dioxus::prelude::*;
use shared_types::{
    role_view, AppError, FeatureFlags, Guardian, Notice, Notifier, RegisterStudentRequest,
};

/// Student self-registration. Hidden unless the `registration` flag is on.
#[component]
pub fn Register() -> Element {
    let flags: FeatureFlags = use_context();
    if !flags.registration {
        return rsx! {
            div { class: "auth-page",
                div { class: "card auth-card",
                    div { class: "card-content",
                        p { "Registration is closed. Ask the school office for an account." }
                        Link { to: Route::Login {}, "Back to sign in" }
                    }
                }
            }
        };
    }
    rsx! { RegisterForm {} }
}

#[component]
fn RegisterForm() -> Element {
    let api = use_api();
    let toasts = use_toasts();
    let scope = use_fetch_scope();

    let mut form = use_signal(RegisterStudentRequest::default);
    let mut error: Signal<Option<AppError>> = use_signal(|| None);
    let mut loading = use_signal(|| false);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let api = api.clone();
        let scope = scope.clone();
        async move {
            loading.set(true);
            error.set(None);
            let req = form();
            match scope.guard(api.register_student(&req)).await {
                Ok(session) => {
                    toasts.notify(Notice::success(format!("Welcome, {}", session.name)));
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
    let values = form();

    rsx! {
        div { class: "auth-page",
            div { class: "card auth-card auth-card-wide",
                div { class: "card-header",
                    h1 { class: "card-title", "Student Registration" }
                    p { class: "card-description", "Create your account and add a guardian contact" }
                }

                div { class: "card-content",
                    if let Some(msg) = banner {
                        div { class: "auth-error", "{msg}" }
                    }

                    form { class: "form-grid", onsubmit: handle_submit,
                        TextField {
                            id: "name", label: "Full name", value: values.name.clone(),
                            error: error(), field: "name",
                            on_input: move |v: String| form.write().name = v,
                        }
                        TextField {
                            id: "email", label: "Email", value: values.email.clone(), input_type: "email",
                            error: error(), field: "email",
                            on_input: move |v: String| form.write().email = v,
                        }
                        TextField {
                            id: "password", label: "Password", value: values.password.clone(), input_type: "password",
                            error: error(), field: "password",
                            on_input: move |v: String| form.write().password = v,
                        }
                        TextField {
                            id: "class", label: "Class", value: values.class_name.clone(),
                            error: error(), field: "class_name",
                            on_input: move |v: String| form.write().class_name = v,
                        }
                        TextField {
                            id: "roll", label: "Roll number", value: values.roll_number.clone(),
                            error: error(), field: "roll_number",
                            on_input: move |v: String| form.write().roll_number = v,
                        }
                        TextField {
                            id: "address", label: "Address", value: values.address.clone(),
                            error: error(), field: "address",
                            on_input: move |v: String| form.write().address = v,
                        }

                        fieldset { class: "form-section",
                            legend { "Guardian" }
                            GuardianFields {
                                guardian: values.guardian.clone(),
                                error: error(),
                                on_change: move |g: Guardian| form.write().guardian = g,
                            }
                        }

                        button {
                            r#type: "submit",
                            class: "button auth-submit",
                            disabled: loading(),
                            if loading() { "Creating account..." } else { "Register" }
                        }
                    }
                }

                div { class: "card-footer",
                    p { class: "auth-link",
                        "Already registered? "
                        Link { to: Route::Login {}, "Sign in" }
                    }
                }
            }
        }
    }
}
