use crate::auth::use_api;
use crate::components::{
    AlertDialogAction, AlertDialogActions, AlertDialogCancel, AlertDialogContent,
    AlertDialogDescription, AlertDialogRoot, AlertDialogTitle, DialogContent, DialogDescription,
    DialogRoot, DialogTitle, GuardianFields, LoadingRow, TextField,
};
use crate::fetch::{use_fetch_scope, use_initial_load, use_list};
use crate::notify::use_toasts;
use client::collection::run;
use client::Change;
use dioxus::prelude::*;
use dioxus_free_icons::icons::ld_icons::{LdPencil, LdPlus, LdTrash2};
use dioxus_free_icons::Icon;
use shared_types::{AppError, Guardian, Notice, Role, User, UserForm, SUBJECTS};
use uuid::Uuid;

fn matches_search(user: &User, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty()
        || user.name().to_lowercase().contains(&query)
        || user.email().to_lowercase().contains(&query)
}

/// Admin user management: list, filter, create, edit, delete.
#[component]
pub fn Users() -> Element {
    let api = use_api();
    let toasts = use_toasts();
    let scope = use_fetch_scope();
    let list = use_list::<User>();

    use_initial_load(list, scope.clone(), {
        let api = api.clone();
        move || async move { api.list_users().await }
    });

    let mut role_filter: Signal<Option<Role>> = use_signal(|| None);
    let mut search = use_signal(String::new);
    let mut form: Signal<Option<UserForm>> = use_signal(|| None);
    let mut form_error: Signal<Option<AppError>> = use_signal(|| None);
    let mut saving = use_signal(|| false);
    let mut confirm_delete: Signal<Option<User>> = use_signal(|| None);
    let mut show_delete = use_signal(|| false);

    let handle_save = {
        let api = api.clone();
        let scope = scope.clone();
        move |_: MouseEvent| {
            let Some(current) = form() else {
                return;
            };
            let payload = match current.validate() {
                Ok(payload) => payload,
                Err(err) => {
                    form_error.set(Some(err));
                    return;
                }
            };
            form_error.set(None);
            saving.set(true);
            let api = api.clone();
            let scope = scope.clone();
            spawn(async move {
                let result = match current.editing.clone() {
                    Some(id) => {
                        run(
                            &list,
                            Change::Replace(payload.preview(id.as_str())),
                            scope.guard(async { api.update_user(&id, &payload).await.map(|_| ()) }),
                            scope.guard(api.list_users()),
                            &toasts,
                            Notice::success("User updated"),
                        )
                        .await
                    }
                    None => {
                        let pending = format!("pending-{}", Uuid::new_v4());
                        run(
                            &list,
                            Change::Insert(payload.preview(pending)),
                            scope.guard(async { api.create_user(&payload).await.map(|_| ()) }),
                            scope.guard(api.list_users()),
                            &toasts,
                            Notice::success("User created"),
                        )
                        .await
                    }
                };
                match result {
                    Err(err) if err.is_cancelled() => return,
                    Ok(()) => form.set(None),
                    Err(_) => {}
                }
                saving.set(false);
            });
        }
    };

    let handle_delete = {
        let api = api.clone();
        let scope = scope.clone();
        move |_: MouseEvent| {
            show_delete.set(false);
            let Some(user) = confirm_delete.write().take() else {
                return;
            };
            let api = api.clone();
            let scope = scope.clone();
            spawn(async move {
                let id = user.id().to_string();
                let _ = run(
                    &list,
                    Change::Remove(id.clone()),
                    scope.guard(api.delete_user(&id)),
                    scope.guard(api.list_users()),
                    &toasts,
                    Notice::success(format!("{} deleted", user.name())),
                )
                .await;
            });
        }
    };

    let rows: Vec<User> = list
        .items()
        .into_iter()
        .filter(|u| role_filter().map_or(true, |r| u.role() == r))
        .filter(|u| matches_search(u, &search.read()))
        .collect();
    let loaded = list.is_loaded();

    rsx! {
        div { class: "page-header",
            h1 { class: "page-title", "Users" }
            button {
                class: "button",
                onclick: move |_| {
                    form_error.set(None);
                    form.set(Some(UserForm::default()));
                },
                Icon::<LdPlus> { icon: LdPlus, width: 16, height: 16 }
                "Add user"
            }
        }

        div { class: "toolbar",
            input {
                class: "input",
                r#type: "search",
                placeholder: "Search by name or email",
                value: search(),
                oninput: move |e: FormEvent| search.set(e.value()),
            }
            select {
                class: "input",
                onchange: move |e: FormEvent| role_filter.set(Role::parse(&e.value())),
                option { value: "all", "All roles" }
                for role in Role::ALL {
                    option { key: "{role.as_str()}", value: "{role.as_str()}", "{role.label()}" }
                }
            }
        }

        table { class: "table",
            thead {
                tr {
                    th { "Name" }
                    th { "Email" }
                    th { "Role" }
                    th { "Details" }
                    th { class: "table-actions", "" }
                }
            }
            tbody {
                if !loaded {
                    LoadingRow { colspan: 5 }
                } else if rows.is_empty() {
                    tr {
                        td { colspan: "5", class: "table-empty", "No users match." }
                    }
                }
                for user in rows {
                    UserRow {
                        key: "{user.id()}",
                        user: user.clone(),
                        on_edit: move |u: User| {
                            form_error.set(None);
                            form.set(Some(UserForm::edit(&u)));
                        },
                        on_delete: move |u: User| {
                            confirm_delete.set(Some(u));
                            show_delete.set(true);
                        },
                    }
                }
            }
        }

        DialogRoot {
            open: form().is_some(),
            on_open_change: move |open: bool| {
                if !open {
                    form.set(None);
                }
            },
            DialogContent {
                if let Some(current) = form() {
                    UserFormBody {
                        form: current,
                        error: form_error(),
                        saving: saving(),
                        on_change: move |f: UserForm| form.set(Some(f)),
                        on_save: handle_save,
                        on_cancel: move |_: MouseEvent| form.set(None),
                    }
                }
            }
        }

        AlertDialogRoot {
            open: show_delete(),
            on_open_change: move |open: bool| show_delete.set(open),
            AlertDialogContent {
                AlertDialogTitle { "Delete user" }
                AlertDialogDescription {
                    if let Some(user) = confirm_delete() {
                        "Delete {user.name()} ({user.email()})? This cannot be undone."
                    }
                }
                AlertDialogActions {
                    AlertDialogCancel { "Cancel" }
                    AlertDialogAction { on_click: handle_delete, "Delete" }
                }
            }
        }
    }
}

#[component]
fn UserRow(user: User, on_edit: EventHandler<User>, on_delete: EventHandler<User>) -> Element {
    let pending = user.id().starts_with("pending-");
    let edit_target = user.clone();
    let delete_target = user.clone();
    let row_class = if pending { "row-pending" } else { "" };
    rsx! {
        tr { class: row_class,
            td { "{user.name()}" }
            td { "{user.email()}" }
            td {
                span { class: "role-badge role-{user.role().as_str()}", "{user.role().label()}" }
            }
            td { class: "muted", "{user.detail()}" }
            td { class: "table-actions",
                button {
                    class: "icon-button",
                    title: "Edit",
                    disabled: pending,
                    onclick: move |_| on_edit.call(edit_target.clone()),
                    Icon::<LdPencil> { icon: LdPencil, width: 16, height: 16 }
                }
                button {
                    class: "icon-button icon-button-danger",
                    title: "Delete",
                    disabled: pending,
                    onclick: move |_| on_delete.call(delete_target.clone()),
                    Icon::<LdTrash2> { icon: LdTrash2, width: 16, height: 16 }
                }
            }
        }
    }
}

#[component]
fn UserFormBody(
    form: UserForm,
    #[props(!optional)] error: Option<AppError>,
    saving: bool,
    on_change: EventHandler<UserForm>,
    on_save: EventHandler<MouseEvent>,
    on_cancel: EventHandler<MouseEvent>,
) -> Element {
    let title = if form.is_edit() { "Edit user" } else { "New user" };
    let description = if form.is_edit() {
        "Update the details below."
    } else {
        "Fill in the details to create a new user."
    };
    let password_label = if form.is_edit() {
        "Password (leave blank to keep)"
    } else {
        "Password"
    };
    let banner = error
        .as_ref()
        .filter(|e| !e.is_validation())
        .map(|e| e.friendly_message());

    let f = form.clone();
    let set_name = move |v: String| on_change.call(UserForm { name: v, ..f.clone() });
    let f = form.clone();
    let set_email = move |v: String| on_change.call(UserForm { email: v, ..f.clone() });
    let f = form.clone();
    let set_password = move |v: String| on_change.call(UserForm { password: v, ..f.clone() });
    let f = form.clone();
    let set_role = move |e: FormEvent| {
        let role = Role::parse(&e.value()).unwrap_or(f.role);
        on_change.call(UserForm { role, ..f.clone() })
    };
    let f = form.clone();
    let set_class = move |v: String| on_change.call(UserForm { class_name: v, ..f.clone() });
    let f = form.clone();
    let set_guardian = move |g: Guardian| on_change.call(UserForm { guardian: g, ..f.clone() });

    rsx! {
        DialogTitle { "{title}" }
        DialogDescription { "{description}" }
        if let Some(msg) = banner {
            div { class: "auth-error", "{msg}" }
        }

        div { class: "form-grid",
            TextField { id: "user-name", label: "Name", value: form.name.clone(), error: error.clone(), field: "name", on_input: set_name }
            TextField { id: "user-email", label: "Email", value: form.email.clone(), input_type: "email", error: error.clone(), field: "email", on_input: set_email }
            TextField { id: "user-password", label: password_label, value: form.password.clone(), input_type: "password", error: error.clone(), field: "password", on_input: set_password }

            div { class: "form-field",
                label { r#for: "user-role", "Role" }
                select {
                    id: "user-role",
                    class: "input",
                    disabled: form.is_edit(),
                    value: "{form.role.as_str()}",
                    onchange: set_role,
                    for role in Role::ALL {
                        option { key: "{role.as_str()}", value: "{role.as_str()}", selected: role == form.role, "{role.label()}" }
                    }
                }
            }

            if form.role == Role::Student {
                TextField { id: "user-class", label: "Class", value: form.class_name.clone(), error: error.clone(), field: "class", on_input: set_class }
                fieldset { class: "form-section",
                    legend { "Guardian" }
                    GuardianFields { guardian: form.guardian.clone(), error: error.clone(), on_change: set_guardian }
                }
            }

            if form.role == Role::Teacher {
                fieldset { class: "form-section",
                    legend { "Subjects" }
                    for subject in SUBJECTS {
                        SubjectToggle { key: "{subject}", form: form.clone(), subject, on_change }
                    }
                    if let Some(msg) = error.as_ref().and_then(|e| e.field_error("subjects")) {
                        div { class: "field-error", "{msg}" }
                    }
                }
            }
        }

        div { class: "dialog-actions",
            button { class: "button button-ghost", onclick: move |e| on_cancel.call(e), "Cancel" }
            button {
                class: "button",
                disabled: saving,
                onclick: move |e| on_save.call(e),
                if saving { "Saving..." } else { "Save" }
            }
        }
    }
}

#[component]
fn SubjectToggle(form: UserForm, subject: &'static str, on_change: EventHandler<UserForm>) -> Element {
    let checked = form.subjects.iter().any(|s| s == subject);
    rsx! {
        label { class: "checkbox",
            input {
                r#type: "checkbox",
                checked,
                onchange: move |_| {
                    let mut next = form.clone();
                    next.toggle_subject(subject);
                    on_change.call(next);
                },
            }
            "{subject}"
        }
    }
}
