use crate::auth::{use_api, use_session};
use crate::components::FieldError;
use crate::fetch::use_fetch_scope;
use crate::notify::use_toasts;
use dioxus::prelude::*;
use dioxus_free_icons::icons::ld_icons::LdSend;
use dioxus_free_icons::Icon;
use shared_types::{
    AppError, Contact, FeatureFlags, MessageForm, Notice, Notifier, RecipientKind, Session,
    MAX_SMS_LENGTH,
};

fn segment_class(active: bool) -> &'static str {
    if active {
        "segment active"
    } else {
        "segment"
    }
}

#[component]
pub fn Messages() -> Element {
    let flags: FeatureFlags = use_context();
    let Some(session) = use_session() else {
        return rsx! {};
    };
    if !flags.sms_alerts {
        return rsx! {
            div { class: "page-header",
                h1 { class: "page-title", "Messages" }
            }
            p { class: "muted", "Progress alerts are turned off for this school." }
        };
    }
    rsx! { MessagesView { session } }
}

/// Progress alerts to students and guardians.
#[component]
fn MessagesView(session: Session) -> Element {
    let api = use_api();
    let toasts = use_toasts();
    let scope = use_fetch_scope();

    let contacts = use_resource({
        let api = api.clone();
        let scope = scope.clone();
        move || {
            let api = api.clone();
            let scope = scope.clone();
            let session = session.clone();
            async move {
                let result = scope.guard(api.contacts_for(&session)).await;
                if let Err(err) = &result {
                    toasts.report(err);
                }
                result
            }
        }
    });

    let mut form = use_signal(MessageForm::default);
    let mut error: Signal<Option<AppError>> = use_signal(|| None);
    let mut sending = use_signal(|| false);

    let loaded: Option<Vec<Contact>> = match &*contacts.read() {
        Some(Ok(list)) => Some(list.clone()),
        Some(Err(_)) => Some(Vec::new()),
        None => None,
    };
    let list = loaded.clone().unwrap_or_default();

    let handle_send = {
        let list = list.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let request = match form.read().validate(&list) {
                Ok(request) => request,
                Err(err) => {
                    error.set(Some(err));
                    return;
                }
            };
            error.set(None);
            sending.set(true);
            let api = api.clone();
            let scope = scope.clone();
            spawn(async move {
                match scope.guard(api.progress_alert(&request)).await {
                    Ok(response) => {
                        toasts.notify(Notice::success(format!(
                            "Alert sent to {} recipient(s)",
                            response.sent
                        )));
                        form.write().clear();
                    }
                    Err(err) if err.is_cancelled() => return,
                    Err(err) => {
                        toasts.report(&err);
                        error.set(Some(err));
                    }
                }
                sending.set(false);
            });
        }
    };

    let current = form();
    let preview = current.recipients(&list);
    let show_students = current.kind != RecipientKind::Guardian;
    let show_guardians = current.kind != RecipientKind::Student;
    let count_class = if current.remaining() == 0 {
        "char-count char-count-full"
    } else {
        "char-count"
    };

    rsx! {
        div { class: "page-header",
            h1 { class: "page-title", "Messages" }
            p { class: "page-subtitle", "Send progress alerts by SMS" }
        }

        form { class: "panel form-grid", onsubmit: handle_send,
            div { class: "segmented",
                for kind in RecipientKind::ALL {
                    button {
                        key: "{kind.as_str()}",
                        r#type: "button",
                        class: segment_class(kind == current.kind),
                        onclick: move |_| form.write().set_kind(kind),
                        "{kind.label()}"
                    }
                }
            }

            {match loaded {
                None => rsx! { p { class: "muted", "Loading contacts..." } },
                Some(ref contacts) if contacts.is_empty() => rsx! {
                    p { class: "muted", "No students to message." }
                },
                Some(contacts) => rsx! {
                    div { class: "contact-list",
                        for contact in contacts {
                            ContactRow {
                                key: "{contact.student_id}",
                                contact: contact.clone(),
                                form: current.clone(),
                                show_student: show_students,
                                show_guardians,
                                on_toggle_student: move |id: String| form.write().toggle_student(&id),
                                on_toggle_guardian: move |phone: String| form.write().toggle_guardian(&phone),
                            }
                        }
                    }
                },
            }}
            FieldError { error: error(), field: "recipients" }

            div { class: "form-field",
                label { r#for: "message", "Message" }
                textarea {
                    id: "message",
                    class: "input",
                    rows: "4",
                    maxlength: "{MAX_SMS_LENGTH}",
                    value: "{current.body}",
                    oninput: move |e: FormEvent| form.write().set_body(&e.value()),
                }
                span { class: count_class,
                    "{current.char_count()}/{MAX_SMS_LENGTH}"
                }
                FieldError { error: error(), field: "message" }
            }

            div { class: "form-actions",
                span { class: "muted", "{preview.len()} recipient(s)" }
                button {
                    r#type: "submit",
                    class: "button",
                    disabled: sending(),
                    Icon::<LdSend> { icon: LdSend, width: 16, height: 16 }
                    if sending() { "Sending..." } else { "Send alert" }
                }
            }
        }
    }
}

#[component]
fn ContactRow(
    contact: Contact,
    form: MessageForm,
    show_student: bool,
    show_guardians: bool,
    on_toggle_student: EventHandler<String>,
    on_toggle_guardian: EventHandler<String>,
) -> Element {
    let student_id = contact.student_id.clone();
    let student_checked = form.selected_students.contains(&contact.student_id);
    let phone_label = contact.phone.clone().unwrap_or_else(|| "no phone".to_string());

    rsx! {
        div { class: "contact",
            if show_student {
                label { class: "checkbox",
                    input {
                        r#type: "checkbox",
                        checked: student_checked,
                        onchange: move |_| on_toggle_student.call(student_id.clone()),
                    }
                    strong { "{contact.name}" }
                    span { class: "muted", " {phone_label}" }
                }
            } else {
                strong { "{contact.name}" }
            }
            if show_guardians {
                for guardian in contact.guardians.iter().cloned() {
                    label { key: "{guardian.phone}", class: "checkbox contact-guardian",
                        input {
                            r#type: "checkbox",
                            checked: form.selected_guardians.contains(&guardian.phone),
                            onchange: {
                                let phone = guardian.phone.clone();
                                move |_| on_toggle_guardian.call(phone.clone())
                            },
                        }
                        "{guardian.name} ({guardian.relation})"
                        span { class: "muted", " {guardian.phone}" }
                    }
                }
            }
        }
    }
}
