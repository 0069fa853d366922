use serde::{Deserialize, Serialize};

#[cfg(feature = "validation")]
use validator::{Validate, ValidationError};

use crate::models::{
    AdminProfile, Guardian, ResultRecord, StudentProfile, TeacherProfile, User, UserSummary,
};
use crate::role::Role;

/// Request DTO for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct LoginRequest {
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Valid email is required"))
    )]
    pub email: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Password is required"))
    )]
    pub password: String,
}

/// Response returned after successful authentication (login or register).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    /// Display hint only. Access decisions come from the token claims.
    #[serde(default)]
    pub role: Option<String>,
}

/// Request DTO for `POST /auth/register/student`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Name is required"))
    )]
    pub name: String,
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Valid email is required"))
    )]
    pub email: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 6, message = "Password must be at least 6 characters"))
    )]
    pub password: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Class is required"))
    )]
    #[serde(rename = "class")]
    pub class_name: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Roll number is required"))
    )]
    pub roll_number: String,
    #[cfg_attr(feature = "validation", validate(nested))]
    pub guardian: Guardian,
    #[serde(default)]
    pub address: String,
}

/// Body of `POST /users` and `PUT /users/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
#[cfg_attr(
    feature = "validation",
    validate(schema(function = "validate_role_fields", skip_on_field_errors = false))
)]
pub struct UserPayload {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Name is required"))
    )]
    pub name: String,
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Valid email is required"))
    )]
    pub email: String,
    pub role: Role,
    /// Omitted on edit when left blank, which keeps the current password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Password is required"))
    )]
    pub password: Option<String>,
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", validate(nested))]
    pub guardian: Option<Guardian>,
}

/// Fields that only some roles require. The error code is the field name.
#[cfg(feature = "validation")]
fn validate_role_fields(payload: &UserPayload) -> Result<(), ValidationError> {
    fn missing(field: &'static str, message: &'static str) -> ValidationError {
        let mut err = ValidationError::new(field);
        err.message = Some(message.into());
        err
    }

    match payload.role {
        Role::Teacher if payload.subjects.is_empty() => {
            Err(missing("subjects", "Select at least one subject"))
        }
        Role::Student if payload.class_name.as_deref().map_or(true, |c| c.trim().is_empty()) => {
            Err(missing("class", "Class is required"))
        }
        Role::Student if payload.guardian.is_none() => {
            Err(missing("guardian.name", "Guardian name is required"))
        }
        _ => Ok(()),
    }
}

impl UserPayload {
    /// The user this payload describes, shown in lists until the server
    /// copy arrives.
    pub fn preview(&self, id: impl Into<String>) -> User {
        let id = id.into();
        let name = self.name.clone();
        let email = self.email.clone();
        match self.role {
            Role::Admin => User::Admin(AdminProfile { id, name, email }),
            Role::Teacher => User::Teacher(TeacherProfile {
                id,
                name,
                email,
                subjects: self.subjects.clone(),
            }),
            Role::Student => User::Student(StudentProfile {
                id,
                name,
                email,
                class_name: self.class_name.clone(),
                roll_number: None,
                phone: None,
                guardian: self.guardian.clone(),
                address: None,
                is_blocked: false,
            }),
        }
    }
}

/// Body of `POST /add-result` and `PATCH /results/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    pub student_id: String,
    pub subject: String,
    pub marks: crate::grade::Marks,
}

impl ResultPayload {
    /// Record shown while the request is in flight. `student` is the
    /// summary for `student_id`; the date stays empty until the server
    /// stamps it.
    pub fn preview(
        &self,
        id: impl Into<String>,
        student: UserSummary,
        teacher: Option<UserSummary>,
    ) -> ResultRecord {
        ResultRecord {
            id: id.into(),
            student,
            teacher,
            subject: self.subject.clone(),
            marks: self.marks,
            date: None,
        }
    }
}

/// Body of `POST /assign/bulk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignRequest {
    pub teacher_id: String,
    pub student_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub assigned_count: u32,
    #[serde(default)]
    pub message: Option<String>,
}

/// Who a progress alert is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    Student,
    Guardian,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub kind: RecipientType,
}

/// Body of `POST /progress-alert`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAlertRequest {
    pub recipients: Vec<Recipient>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAlertResponse {
    #[serde(default)]
    pub sent: u32,
}
