//! Result entry shared by the admin results page and teacher grading.

use crate::auth::use_api;
use crate::components::{
    AlertDialogAction, AlertDialogActions, AlertDialogCancel, AlertDialogContent,
    AlertDialogDescription, AlertDialogRoot, AlertDialogTitle, FieldError, GradeBadge, LoadingRow,
    SummaryPanel,
};
use crate::fetch::{use_fetch_scope, use_initial_load, use_list};
use crate::notify::use_toasts;
use client::collection::run;
use client::Change;
use dioxus::prelude::*;
use dioxus_free_icons::icons::ld_icons::{LdPencil, LdTrash2};
use dioxus_free_icons::Icon;
use shared_types::{
    summarize, AppError, Notice, Notifier, ResultForm, ResultRecord, Role, Session, UserSummary,
    SUBJECTS,
};
use uuid::Uuid;

fn row_matches(record: &ResultRecord, subject: &str, query: &str) -> bool {
    (subject.is_empty() || record.subject == subject)
        && (query.is_empty() || record.student.name.to_lowercase().contains(query))
}

/// Add, correct and remove results. Admins grade any student; teachers only
/// their assigned ones, and their entries carry them as the teacher.
#[component]
pub fn ResultEditor(session: Session) -> Element {
    let api = use_api();
    let toasts = use_toasts();
    let scope = use_fetch_scope();
    let list = use_list::<ResultRecord>();
    let role = session.role;

    use_initial_load(list, scope.clone(), {
        let api = api.clone();
        let session = session.clone();
        move || async move { api.results_for(&session).await }
    });

    let students = use_resource({
        let api = api.clone();
        let scope = scope.clone();
        let session = session.clone();
        move || {
            let api = api.clone();
            let scope = scope.clone();
            let session = session.clone();
            async move {
                let result = scope.guard(api.gradable_students(&session)).await;
                if let Err(err) = &result {
                    toasts.report(err);
                }
                result
            }
        }
    });

    let mut form = use_signal(ResultForm::default);
    let mut editing: Signal<Option<String>> = use_signal(|| None);
    let mut error: Signal<Option<AppError>> = use_signal(|| None);
    let mut saving = use_signal(|| false);
    let mut subject_filter = use_signal(String::new);
    let mut search = use_signal(String::new);
    let mut confirm_delete: Signal<Option<ResultRecord>> = use_signal(|| None);
    let mut show_delete = use_signal(|| false);

    // Admin entries are not attributed to a teacher.
    let me = (role == Role::Teacher).then(|| UserSummary {
        id: session.user_id.clone().unwrap_or_default(),
        name: session.name.clone(),
        email: session.email.clone(),
    });
    let roster: Vec<UserSummary> = match &*students.read() {
        Some(Ok(list)) => list.clone(),
        _ => Vec::new(),
    };

    let handle_submit = {
        let api = api.clone();
        let scope = scope.clone();
        let session = session.clone();
        let roster = roster.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let payload = match form.read().validate() {
                Ok(payload) => payload,
                Err(err) => {
                    error.set(Some(err));
                    return;
                }
            };
            error.set(None);
            saving.set(true);
            let student = roster
                .iter()
                .find(|s| s.id == payload.student_id)
                .cloned()
                .unwrap_or_else(|| UserSummary {
                    id: payload.student_id.clone(),
                    name: payload.student_id.clone(),
                    email: String::new(),
                });
            let api = api.clone();
            let scope = scope.clone();
            let session = session.clone();
            let me = me.clone();
            spawn(async move {
                let result = match editing() {
                    Some(id) => {
                        let record = payload.preview(id.as_str(), student, me);
                        run(
                            &list,
                            Change::Replace(record),
                            scope.guard(api.update_result(&id, &payload)),
                            scope.guard(api.results_for(&session)),
                            &toasts,
                            Notice::success(format!("{} updated", payload.subject)),
                        )
                        .await
                    }
                    None => {
                        let pending = format!("pending-{}", Uuid::new_v4());
                        let grade = payload.marks.grade();
                        run(
                            &list,
                            Change::Insert(payload.preview(pending, student, me)),
                            scope.guard(api.add_result(&payload)),
                            scope.guard(api.results_for(&session)),
                            &toasts,
                            Notice::success(format!("Result saved: {} ({grade})", payload.subject)),
                        )
                        .await
                    }
                };
                match result {
                    Err(err) if err.is_cancelled() => return,
                    Ok(()) => {
                        form.set(ResultForm::default());
                        editing.set(None);
                    }
                    Err(err) => error.set(Some(err)),
                }
                saving.set(false);
            });
        }
    };

    let handle_delete = {
        let api = api.clone();
        let scope = scope.clone();
        let session = session.clone();
        move |_: MouseEvent| {
            show_delete.set(false);
            let Some(record) = confirm_delete.write().take() else {
                return;
            };
            let api = api.clone();
            let scope = scope.clone();
            let session = session.clone();
            spawn(async move {
                let _ = run(
                    &list,
                    Change::Remove(record.id.clone()),
                    scope.guard(api.delete_result(&record.id)),
                    scope.guard(api.results_for(&session)),
                    &toasts,
                    Notice::success(format!("Removed {} for {}", record.subject, record.student.name)),
                )
                .await;
            });
        }
    };

    let current = form();
    let preview = current.preview_grade();
    let banner = error()
        .filter(|e| !e.is_validation())
        .map(|e| e.friendly_message());
    let query = search.read().trim().to_lowercase();
    let rows: Vec<ResultRecord> = list
        .items()
        .into_iter()
        .filter(|r| row_matches(r, &subject_filter.read(), &query))
        .collect();
    let summary = summarize(&rows);
    let loaded = list.is_loaded();
    let students_loading = students.read().is_none();

    rsx! {
        div { class: "panel",
            h2 { class: "panel-title",
                if editing().is_some() { "Edit result" } else { "New result" }
            }
            if let Some(msg) = banner {
                div { class: "auth-error", "{msg}" }
            }
            form { class: "form-grid", onsubmit: handle_submit,
                div { class: "form-field",
                    label { r#for: "student", "Student" }
                    select {
                        id: "student",
                        class: "input",
                        disabled: editing().is_some(),
                        value: "{current.student_id}",
                        onchange: move |e: FormEvent| form.write().student_id = e.value(),
                        option { value: "",
                            if students_loading { "Loading students..." } else { "Select a student" }
                        }
                        for student in roster.iter() {
                            option {
                                key: "{student.id}",
                                value: "{student.id}",
                                selected: student.id == current.student_id,
                                "{student.name}"
                            }
                        }
                    }
                    FieldError { error: error(), field: "student_id" }
                }

                div { class: "form-field",
                    label { r#for: "subject", "Subject" }
                    select {
                        id: "subject",
                        class: "input",
                        value: "{current.subject}",
                        onchange: move |e: FormEvent| form.write().subject = e.value(),
                        option { value: "", "Select a subject" }
                        for s in SUBJECTS {
                            option { key: "{s}", value: "{s}", selected: s == current.subject, "{s}" }
                        }
                    }
                    FieldError { error: error(), field: "subject" }
                }

                div { class: "form-field",
                    label { r#for: "marks", "Marks (0-100)" }
                    div { class: "marks-input",
                        input {
                            id: "marks",
                            class: "input",
                            r#type: "number",
                            min: "0",
                            max: "100",
                            value: "{current.marks}",
                            oninput: move |e: FormEvent| form.write().marks = e.value(),
                        }
                        if let Some(grade) = preview {
                            GradeBadge { grade }
                        }
                    }
                    FieldError { error: error(), field: "marks" }
                }

                div { class: "form-actions",
                    if editing().is_some() {
                        button {
                            r#type: "button",
                            class: "button button-ghost",
                            onclick: move |_| {
                                editing.set(None);
                                error.set(None);
                                form.set(ResultForm::default());
                            },
                            "Cancel"
                        }
                    }
                    button {
                        r#type: "submit",
                        class: "button",
                        disabled: saving(),
                        if saving() { "Saving..." } else { "Save result" }
                    }
                }
            }
        }

        div { class: "toolbar",
            input {
                class: "input",
                r#type: "search",
                placeholder: "Search by student",
                value: search(),
                oninput: move |e: FormEvent| search.set(e.value()),
            }
            select {
                class: "input",
                onchange: move |e: FormEvent| subject_filter.set(e.value()),
                option { value: "", "All subjects" }
                for s in SUBJECTS {
                    option { key: "{s}", value: "{s}", "{s}" }
                }
            }
        }

        table { class: "table",
            thead {
                tr {
                    th { "Student" }
                    th { "Subject" }
                    th { "Marks" }
                    th { "Grade" }
                    th { "Date" }
                    th { class: "table-actions", "" }
                }
            }
            tbody {
                if !loaded {
                    LoadingRow { colspan: 6 }
                } else if rows.is_empty() {
                    tr {
                        td { colspan: "6", class: "table-empty", "No results yet." }
                    }
                }
                for record in rows {
                    EditableResultRow {
                        key: "{record.id}",
                        record: record.clone(),
                        on_edit: move |r: ResultRecord| {
                            error.set(None);
                            editing.set(Some(r.id.clone()));
                            form.set(ResultForm {
                                student_id: r.student.id.clone(),
                                subject: r.subject.clone(),
                                marks: r.marks.to_string(),
                            });
                        },
                        on_delete: move |r: ResultRecord| {
                            confirm_delete.set(Some(r));
                            show_delete.set(true);
                        },
                    }
                }
            }
        }

        if loaded {
            SummaryPanel { summary, role }
        }

        AlertDialogRoot {
            open: show_delete(),
            on_open_change: move |open: bool| show_delete.set(open),
            AlertDialogContent {
                AlertDialogTitle { "Delete result" }
                AlertDialogDescription {
                    if let Some(r) = confirm_delete() {
                        "Remove {r.subject} ({r.marks}) for {r.student.name}?"
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
fn EditableResultRow(
    record: ResultRecord,
    on_edit: EventHandler<ResultRecord>,
    on_delete: EventHandler<ResultRecord>,
) -> Element {
    let pending = record.id.starts_with("pending-");
    let row_class = if pending { "row-pending" } else { "" };
    let edit_target = record.clone();
    let delete_target = record.clone();
    rsx! {
        tr { class: row_class,
            td { "{record.student.name}" }
            td { "{record.subject}" }
            td { "{record.marks}" }
            td {
                GradeBadge { grade: record.grade() }
            }
            td { "{record.date_label()}" }
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
