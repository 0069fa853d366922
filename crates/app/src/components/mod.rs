//! Small pieces shared by several pages.

mod dialog;

pub use dialog::*;

use dioxus::prelude::*;
use shared_types::{AppError, Grade, Guardian, Relation, ResultRecord, ResultSummary, Role};

#[component]
pub fn GradeBadge(grade: Grade) -> Element {
    rsx! {
        span { class: "grade-badge grade-{grade.tone()}", "{grade.label()}" }
    }
}

/// Inline message under a form field, if `error` names it.
#[component]
pub fn FieldError(
    #[props(!optional)] error: Option<AppError>,
    #[props(into)] field: String,
) -> Element {
    let message = error
        .as_ref()
        .and_then(|e| e.field_error(&field))
        .map(str::to_string);
    rsx! {
        if let Some(message) = message {
            div { class: "field-error", "{message}" }
        }
    }
}

#[component]
pub fn LoadingRow(colspan: u8) -> Element {
    rsx! {
        tr {
            td { colspan: "{colspan}", class: "table-empty", "Loading..." }
        }
    }
}

/// Read-only results table for a single student.
#[component]
pub fn ResultsTable(results: Vec<ResultRecord>, loaded: bool) -> Element {
    rsx! {
        table { class: "table",
            thead {
                tr {
                    th { "Subject" }
                    th { "Marks" }
                    th { "Grade" }
                    th { "Date" }
                }
            }
            tbody {
                if !loaded {
                    LoadingRow { colspan: 4 }
                } else if results.is_empty() {
                    tr {
                        td { colspan: "4", class: "table-empty", "No results yet." }
                    }
                }
                for record in results {
                    tr { key: "{record.id}",
                        td { "{record.subject}" }
                        td { "{record.marks}" }
                        td {
                            GradeBadge { grade: record.grade() }
                        }
                        td { "{record.date_label()}" }
                    }
                }
            }
        }
    }
}

#[component]
pub fn TextField(
    #[props(into)] id: String,
    #[props(into)] label: String,
    value: String,
    #[props(into, default = "text".to_string())] input_type: String,
    #[props(!optional)] error: Option<AppError>,
    #[props(into)] field: String,
    on_input: EventHandler<String>,
) -> Element {
    rsx! {
        div { class: "form-field",
            label { r#for: "{id}", "{label}" }
            input {
                id: "{id}",
                class: "input",
                r#type: "{input_type}",
                value: "{value}",
                oninput: move |e: FormEvent| on_input.call(e.value()),
            }
            FieldError { error, field }
        }
    }
}

/// Guardian name, relation and phones. Field errors use the
/// `guardian.<field>` paths produced by validation.
#[component]
pub fn GuardianFields(
    guardian: Guardian,
    #[props(!optional)] error: Option<AppError>,
    on_change: EventHandler<Guardian>,
) -> Element {
    let name = guardian.clone();
    let relation = guardian.clone();
    let primary = guardian.clone();
    let secondary = guardian.clone();

    rsx! {
        TextField {
            id: "guardian-name", label: "Guardian name", value: guardian.name.clone(),
            error: error.clone(), field: "guardian.name",
            on_input: move |v: String| on_change.call(Guardian { name: v, ..name.clone() }),
        }
        div { class: "form-field",
            label { r#for: "guardian-relation", "Relation" }
            select {
                id: "guardian-relation",
                class: "input",
                value: "{guardian.relation.as_str()}",
                onchange: move |e: FormEvent| {
                    on_change.call(Guardian { relation: Relation::parse(&e.value()), ..relation.clone() })
                },
                for r in Relation::ALL {
                    option { key: "{r.as_str()}", value: "{r.as_str()}", selected: r == guardian.relation, "{r.label()}" }
                }
            }
        }
        TextField {
            id: "guardian-primary", label: "Primary contact", value: guardian.primary_contact.clone(), input_type: "tel",
            error: error.clone(), field: "guardian.primary_contact",
            on_input: move |v: String| on_change.call(Guardian { primary_contact: v, ..primary.clone() }),
        }
        TextField {
            id: "guardian-secondary", label: "Secondary contact (optional)",
            value: guardian.secondary_contact.clone().unwrap_or_default(), input_type: "tel",
            error: error.clone(), field: "guardian.secondary_contact",
            on_input: move |v: String| {
                let secondary_contact = Some(v).filter(|s| !s.trim().is_empty());
                on_change.call(Guardian { secondary_contact, ..secondary.clone() })
            },
        }
    }
}

/// Grade distribution, average grade and best subject for a result set.
#[component]
pub fn SummaryPanel(summary: ResultSummary, role: Role) -> Element {
    if summary.count == 0 {
        let hint = match role {
            Role::Teacher => "No results given yet.",
            _ => "No results recorded yet.",
        };
        return rsx! { p { class: "muted", "{hint}" } };
    }
    rsx! {
        div { class: "panel",
            h2 { class: "panel-title", "Grade distribution" }
            div { class: "distribution",
                for (grade, count) in summary.distribution.iter().copied() {
                    div { key: "{grade.label()}", class: "distribution-row",
                        GradeBadge { grade }
                        span { class: "distribution-count", "{count}" }
                    }
                }
            }
            if let Some(grade) = summary.average_grade() {
                p { class: "muted",
                    "Average grade: "
                    GradeBadge { grade }
                }
            }
            if let Some((subject, marks)) = &summary.best {
                p { class: "muted", "Best: {subject} ({marks})" }
            }
        }
    }
}
