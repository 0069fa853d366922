use crate::auth::use_api;
use crate::components::{FieldError, LoadingRow};
use crate::fetch::{use_fetch_scope, use_initial_load, use_list};
use crate::notify::use_toasts;
use client::collection::run;
use client::{Change, ListHandle};
use dioxus::prelude::*;
use dioxus_free_icons::icons::ld_icons::LdUserMinus;
use dioxus_free_icons::Icon;
use shared_types::{assignable_students, AppError, AssignForm, Assignment, Notice, Notifier, User};

/// Teacher/student assignments: bulk assign and unassign.
#[component]
pub fn Classes() -> Element {
    let api = use_api();
    let toasts = use_toasts();
    let scope = use_fetch_scope();

    let assignments = use_list::<Assignment>();
    let teachers = use_list::<User>();
    let students = use_list::<User>();

    use_initial_load(assignments, scope.clone(), {
        let api = api.clone();
        move || async move { api.list_assignments().await }
    });
    use_initial_load(teachers, scope.clone(), {
        let api = api.clone();
        move || async move { api.list_teachers().await }
    });
    use_initial_load(students, scope.clone(), {
        let api = api.clone();
        move || async move { api.list_students().await }
    });

    let mut form = use_signal(AssignForm::default);
    let mut error: Signal<Option<AppError>> = use_signal(|| None);
    let mut assigning = use_signal(|| false);

    let handle_assign = {
        let api = api.clone();
        let scope = scope.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let request = match form.read().validate() {
                Ok(request) => request,
                Err(err) => {
                    error.set(Some(err));
                    return;
                }
            };
            error.set(None);
            assigning.set(true);
            let api = api.clone();
            let scope = scope.clone();
            spawn(async move {
                match scope.guard(api.bulk_assign(&request)).await {
                    Ok(response) => {
                        let requested = request.student_ids.len();
                        let assigned = response.assigned_count as usize;
                        let notice = if assigned == requested {
                            Notice::success(format!("Assigned {requested} student(s)"))
                        } else {
                            Notice::warning(
                                response
                                    .message
                                    .clone()
                                    .unwrap_or_else(|| format!("{assigned} of {requested} assigned")),
                            )
                            .with_detail("The others were already assigned to this teacher.")
                        };
                        toasts.notify(notice);
                        form.write().student_ids.clear();
                        match scope.guard(api.list_assignments()).await {
                            Ok(fresh) => assignments.with_mut(|l| l.replace_all(fresh)),
                            Err(err) if err.is_cancelled() => return,
                            Err(err) => toasts.report(&err),
                        }
                    }
                    Err(err) if err.is_cancelled() => return,
                    Err(err) => {
                        toasts.report(&err);
                        error.set(Some(err));
                    }
                }
                assigning.set(false);
            });
        }
    };

    let unassign = {
        let api = api.clone();
        let scope = scope.clone();
        move |assignment: Assignment| {
            let api = api.clone();
            let scope = scope.clone();
            spawn(async move {
                let _ = run(
                    &assignments,
                    Change::Remove(assignment.id.clone()),
                    scope.guard(api.unassign(&assignment.id)),
                    scope.guard(api.list_assignments()),
                    &toasts,
                    Notice::success(format!("{} unassigned", assignment.student.name)),
                )
                .await;
            });
        }
    };

    let current = form();
    let rows = assignments.items();
    let all_students = students.items();
    let offered: Vec<User> = assignable_students(&all_students).into_iter().cloned().collect();

    rsx! {
        div { class: "page-header",
            h1 { class: "page-title", "Classes" }
            p { class: "page-subtitle", "Assign students to teachers" }
        }

        div { class: "panel",
            h2 { class: "panel-title", "Bulk assign" }
            form { class: "form-grid", onsubmit: handle_assign,
                div { class: "form-field",
                    label { r#for: "teacher", "Teacher" }
                    select {
                        id: "teacher",
                        class: "input",
                        value: "{current.teacher_id}",
                        onchange: move |e: FormEvent| form.write().teacher_id = e.value(),
                        option { value: "", "Select a teacher" }
                        for teacher in teachers.items() {
                            option {
                                key: "{teacher.id()}",
                                value: "{teacher.id()}",
                                selected: teacher.id() == current.teacher_id,
                                "{teacher.name()} ({teacher.detail()})"
                            }
                        }
                    }
                    FieldError { error: error(), field: "teacher_id" }
                }

                div { class: "form-field",
                    span { class: "form-label", "Students ({current.student_ids.len()} selected)" }
                    div { class: "checkbox-list",
                        if !students.is_loaded() {
                            p { class: "muted", "Loading..." }
                        }
                        if students.is_loaded() && offered.is_empty() {
                            p { class: "muted", "No students available to assign." }
                        }
                        for student in offered.iter() {
                            StudentCheckbox {
                                key: "{student.id()}",
                                checked: current.student_ids.iter().any(|id| id == student.id()),
                                student: student.clone(),
                                on_toggle: move |id: String| form.write().toggle_student(&id),
                            }
                        }
                    }
                    FieldError { error: error(), field: "student_ids" }
                }

                button {
                    r#type: "submit",
                    class: "button",
                    disabled: assigning(),
                    if assigning() { "Assigning..." } else { "Assign" }
                }
            }
        }

        table { class: "table",
            thead {
                tr {
                    th { "Teacher" }
                    th { "Student" }
                    th { "Assigned" }
                    th { class: "table-actions", "" }
                }
            }
            tbody {
                if !assignments.is_loaded() {
                    LoadingRow { colspan: 4 }
                } else if rows.is_empty() {
                    tr {
                        td { colspan: "4", class: "table-empty", "No assignments yet." }
                    }
                }
                for assignment in rows {
                    tr { key: "{assignment.id}",
                        td {
                            {assignment.teacher.as_ref().map(|t| t.name.clone()).unwrap_or_else(|| "-".to_string())}
                        }
                        td { "{assignment.student.name}" }
                        td { class: "muted",
                            {assignment.assigned_at.as_deref().and_then(|d| d.split('T').next()).unwrap_or("-").to_string()}
                        }
                        td { class: "table-actions",
                            button {
                                class: "icon-button icon-button-danger",
                                title: "Unassign",
                                onclick: {
                                    let unassign = unassign.clone();
                                    let assignment = assignment.clone();
                                    move |_| unassign(assignment.clone())
                                },
                                Icon::<LdUserMinus> { icon: LdUserMinus, width: 16, height: 16 }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn StudentCheckbox(student: User, checked: bool, on_toggle: EventHandler<String>) -> Element {
    let id = student.id().to_string();
    let group = student.detail();
    rsx! {
        label { class: "checkbox",
            input {
                r#type: "checkbox",
                checked,
                onchange: move |_| on_toggle.call(id.clone()),
            }
            "{student.name()}"
            if !group.is_empty() {
                span { class: "muted", " ({group})" }
            }
        }
    }
}
