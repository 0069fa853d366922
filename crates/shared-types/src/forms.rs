//! Form state for the data-entry views and the checks that run before any
//! request is built. A form that fails validation never yields a payload.

use std::borrow::Cow;
use std::collections::HashSet;

use validator::{Validate, ValidationError};

use crate::error::AppError;
use crate::grade::Marks;
use crate::models::{Guardian, User, SUBJECTS};
use crate::requests::{BulkAssignRequest, ResultPayload, UserPayload};
use crate::role::Role;

pub const FILL_ALL_FIELDS: &str = "Please fill all fields";

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn filled(value: &str) -> Result<(), ValidationError> {
    if blank(value) {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed(FILL_ALL_FIELDS));
        return Err(err);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Result form
// ---------------------------------------------------------------------------

/// Raw input of the result entry form.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ResultForm {
    #[validate(custom(function = "filled"))]
    pub student_id: String,
    #[validate(custom(function = "filled"))]
    pub subject: String,
    #[validate(custom(function = "filled"))]
    pub marks: String,
}

impl ResultForm {
    pub fn validate(&self) -> Result<ResultPayload, AppError> {
        Validate::validate(self)?;

        let subject = self.subject.trim();
        if !SUBJECTS.contains(&subject) {
            return Err(AppError::invalid_field("subject", "Please choose a listed subject"));
        }
        let marks = Marks::parse(&self.marks)?;

        Ok(ResultPayload {
            student_id: self.student_id.trim().to_string(),
            subject: subject.to_string(),
            marks,
        })
    }

    /// Live preview shown next to the marks input.
    pub fn preview_grade(&self) -> Option<crate::grade::Grade> {
        Marks::parse(&self.marks).ok().map(Marks::grade)
    }
}

// ---------------------------------------------------------------------------
// User form
// ---------------------------------------------------------------------------

/// Raw input of the admin user form. `editing` holds the id of the user
/// being edited, `None` when creating.
#[derive(Debug, Clone, PartialEq)]
pub struct UserForm {
    pub editing: Option<String>,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
    pub class_name: String,
    pub subjects: Vec<String>,
    pub guardian: Guardian,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            editing: None,
            name: String::new(),
            email: String::new(),
            role: Role::Student,
            password: String::new(),
            class_name: String::new(),
            subjects: Vec::new(),
            guardian: Guardian::default(),
        }
    }
}

impl UserForm {
    /// Prefill the form for editing an existing user. The password is left
    /// blank, which keeps the current one.
    pub fn edit(user: &User) -> Self {
        let mut form = Self {
            editing: Some(user.id().to_string()),
            name: user.name().to_string(),
            email: user.email().to_string(),
            role: user.role(),
            ..Self::default()
        };
        match user {
            User::Teacher(t) => form.subjects = t.subjects.clone(),
            User::Student(s) => {
                form.class_name = s.class_name.clone().unwrap_or_default();
                form.guardian = s.guardian.clone().unwrap_or_default();
            }
            User::Admin(_) => {}
        }
        form
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn toggle_subject(&mut self, subject: &str) {
        if let Some(pos) = self.subjects.iter().position(|s| s == subject) {
            self.subjects.remove(pos);
        } else {
            self.subjects.push(subject.to_string());
        }
    }

    /// The payload this form describes, with fields the role does not use
    /// left out.
    pub fn payload(&self) -> UserPayload {
        let password = Some(self.password.clone()).filter(|p| !blank(p));
        let (class_name, subjects, guardian) = match self.role {
            Role::Student => (
                Some(self.class_name.trim().to_string()),
                Vec::new(),
                Some(self.guardian.clone()),
            ),
            Role::Teacher => (None, self.subjects.clone(), None),
            Role::Admin => (None, Vec::new(), None),
        };

        UserPayload {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            role: self.role,
            password,
            class_name,
            subjects,
            guardian,
        }
    }

    /// Validate the payload; a new user also needs a password.
    pub fn validate(&self) -> Result<UserPayload, AppError> {
        let payload = self.payload();
        let mut errors = match payload.validate() {
            Ok(()) => Default::default(),
            Err(err) => AppError::from(err).field_errors,
        };
        if !self.is_edit() && payload.password.is_none() {
            errors.insert("password".to_string(), "Password is required".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::from_field_errors(errors));
        }
        Ok(payload)
    }
}

// ---------------------------------------------------------------------------
// Class assignment form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct AssignForm {
    #[validate(length(min = 1, message = "Please select a teacher"))]
    pub teacher_id: String,
    #[validate(length(min = 1, message = "Please select at least one student"))]
    pub student_ids: Vec<String>,
}

impl AssignForm {
    pub fn toggle_student(&mut self, id: &str) {
        if let Some(pos) = self.student_ids.iter().position(|s| s == id) {
            self.student_ids.remove(pos);
        } else {
            self.student_ids.push(id.to_string());
        }
    }

    pub fn validate(&self) -> Result<BulkAssignRequest, AppError> {
        Validate::validate(self)?;
        let mut seen = HashSet::new();
        let student_ids = self
            .student_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();
        Ok(BulkAssignRequest {
            teacher_id: self.teacher_id.clone(),
            student_ids,
        })
    }
}
