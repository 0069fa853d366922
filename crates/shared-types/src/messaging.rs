//! Progress alerts: recipient selection and resolution.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::StudentProfile;
use crate::requests::{ProgressAlertRequest, Recipient, RecipientType};

/// SMS length limit.
pub const MAX_SMS_LENGTH: usize = 160;

pub const NO_RECIPIENT: &str = "Please select at least one recipient";
pub const EMPTY_MESSAGE: &str = "Message cannot be empty";

/// Which audience the form targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientKind {
    #[default]
    Student,
    Guardian,
    Bulk,
}

impl RecipientKind {
    pub const ALL: [RecipientKind; 3] = [
        RecipientKind::Student,
        RecipientKind::Guardian,
        RecipientKind::Bulk,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RecipientKind::Student => "Students",
            RecipientKind::Guardian => "Guardians",
            RecipientKind::Bulk => "Students & guardians",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "guardian" => RecipientKind::Guardian,
            "bulk" => RecipientKind::Bulk,
            _ => RecipientKind::Student,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientKind::Student => "student",
            RecipientKind::Guardian => "guardian",
            RecipientKind::Bulk => "bulk",
        }
    }
}

/// A guardian phone that can be picked as a recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardianContact {
    pub name: String,
    pub phone: String,
    pub relation: String,
}

/// A student with the phones reachable through them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub student_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub guardians: Vec<GuardianContact>,
}

impl Contact {
    pub fn from_student(student: &StudentProfile) -> Self {
        let mut guardians = Vec::new();
        if let Some(g) = &student.guardian {
            let phones = std::iter::once(g.primary_contact.as_str())
                .chain(g.secondary_contact.as_deref());
            for phone in phones.filter(|p| !p.trim().is_empty()) {
                guardians.push(GuardianContact {
                    name: g.name.clone(),
                    phone: phone.trim().to_string(),
                    relation: g.relation.label().to_string(),
                });
            }
        }
        Self {
            student_id: student.id.clone(),
            name: student.name.clone(),
            phone: student
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            guardians,
        }
    }
}

/// Message form state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageForm {
    pub kind: RecipientKind,
    pub selected_students: Vec<String>,
    pub selected_guardians: Vec<String>,
    pub body: String,
}

impl MessageForm {
    /// Switching audience clears both selections.
    pub fn set_kind(&mut self, kind: RecipientKind) {
        self.kind = kind;
        self.selected_students.clear();
        self.selected_guardians.clear();
    }

    pub fn toggle_student(&mut self, id: &str) {
        toggle(&mut self.selected_students, id);
    }

    pub fn toggle_guardian(&mut self, phone: &str) {
        toggle(&mut self.selected_guardians, phone);
    }

    /// Replace the body, keeping at most [`MAX_SMS_LENGTH`] characters.
    pub fn set_body(&mut self, body: &str) {
        self.body = body.chars().take(MAX_SMS_LENGTH).collect();
    }

    pub fn char_count(&self) -> usize {
        self.body.chars().count()
    }

    pub fn remaining(&self) -> usize {
        MAX_SMS_LENGTH.saturating_sub(self.char_count())
    }

    pub fn clear(&mut self) {
        self.body.clear();
        self.selected_students.clear();
        self.selected_guardians.clear();
    }

    fn has_selection(&self) -> bool {
        match self.kind {
            RecipientKind::Student => !self.selected_students.is_empty(),
            RecipientKind::Guardian => !self.selected_guardians.is_empty(),
            RecipientKind::Bulk => {
                !self.selected_students.is_empty() || !self.selected_guardians.is_empty()
            }
        }
    }

    /// Resolve selections against `contacts`, deduplicated by phone.
    /// Guardians are only reachable through a selected student, except for
    /// the guardian audience where the guardian selection alone counts.
    pub fn recipients(&self, contacts: &[Contact]) -> Vec<Recipient> {
        let selected: Vec<&Contact> = contacts
            .iter()
            .filter(|c| self.selected_students.contains(&c.student_id))
            .collect();

        let students = || {
            selected.iter().filter_map(|c| {
                c.phone.as_ref().map(|phone| Recipient {
                    name: c.name.clone(),
                    phone: phone.clone(),
                    kind: RecipientType::Student,
                })
            })
        };
        let guardians = |pool: Vec<&Contact>| {
            pool.into_iter()
                .flat_map(|c| c.guardians.iter())
                .filter(|g| self.selected_guardians.contains(&g.phone))
                .map(|g| Recipient {
                    name: g.name.clone(),
                    phone: g.phone.clone(),
                    kind: RecipientType::Guardian,
                })
                .collect::<Vec<_>>()
        };

        let all: Vec<Recipient> = match self.kind {
            RecipientKind::Student => students().collect(),
            RecipientKind::Guardian => guardians(contacts.iter().collect()),
            RecipientKind::Bulk => {
                let mut out: Vec<Recipient> = students().collect();
                out.extend(guardians(selected.clone()));
                out
            }
        };

        let mut seen = HashSet::new();
        all.into_iter()
            .filter(|r| seen.insert(r.phone.clone()))
            .collect()
    }

    /// Check the form and build the request. Nothing is sent on error.
    pub fn validate(&self, contacts: &[Contact]) -> Result<ProgressAlertRequest, AppError> {
        if !self.has_selection() {
            return Err(AppError::invalid_field("recipients", NO_RECIPIENT));
        }
        let body = self.body.trim();
        if body.is_empty() {
            return Err(AppError::invalid_field("message", EMPTY_MESSAGE));
        }
        if body.chars().count() > MAX_SMS_LENGTH {
            return Err(AppError::invalid_field(
                "message",
                format!("Message must be at most {MAX_SMS_LENGTH} characters"),
            ));
        }
        let recipients = self.recipients(contacts);
        if recipients.is_empty() {
            return Err(AppError::invalid_field("recipients", NO_RECIPIENT));
        }
        Ok(ProgressAlertRequest {
            recipients,
            message: body.to_string(),
        })
    }
}

fn toggle(list: &mut Vec<String>, value: &str) {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
    } else {
        list.push(value.to_string());
    }
}
