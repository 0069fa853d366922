use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "validation")]
use validator::Validate;

use crate::grade::{Grade, Marks};
use crate::role::Role;

/// Subjects a teacher can grade.
pub const SUBJECTS: [&str; 4] = ["Math", "Science", "English", "History"];

// ---------------------------------------------------------------------------
// Guardian
// ---------------------------------------------------------------------------

/// How a guardian is related to the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Relation {
    #[default]
    Father,
    Mother,
    Sister,
    Brother,
    Uncle,
    Aunt,
    Grandfather,
    Grandmother,
    Guardian,
    Other,
}

impl Relation {
    pub const ALL: [Relation; 10] = [
        Relation::Father,
        Relation::Mother,
        Relation::Sister,
        Relation::Brother,
        Relation::Uncle,
        Relation::Aunt,
        Relation::Grandfather,
        Relation::Grandmother,
        Relation::Guardian,
        Relation::Other,
    ];

    /// Case-insensitive; anything unrecognised is `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "father" => Relation::Father,
            "mother" => Relation::Mother,
            "sister" => Relation::Sister,
            "brother" => Relation::Brother,
            "uncle" => Relation::Uncle,
            "aunt" => Relation::Aunt,
            "grandfather" => Relation::Grandfather,
            "grandmother" => Relation::Grandmother,
            "guardian" => Relation::Guardian,
            _ => Relation::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Father => "father",
            Relation::Mother => "mother",
            Relation::Sister => "sister",
            Relation::Brother => "brother",
            Relation::Uncle => "uncle",
            Relation::Aunt => "aunt",
            Relation::Grandfather => "grandfather",
            Relation::Grandmother => "grandmother",
            Relation::Guardian => "guardian",
            Relation::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Relation::Father => "Father",
            Relation::Mother => "Mother",
            Relation::Sister => "Sister",
            Relation::Brother => "Brother",
            Relation::Uncle => "Uncle",
            Relation::Aunt => "Aunt",
            Relation::Grandfather => "Grandfather",
            Relation::Grandmother => "Grandmother",
            Relation::Guardian => "Guardian",
            Relation::Other => "Other",
        }
    }
}

impl From<String> for Relation {
    fn from(s: String) -> Self {
        Relation::parse(&s)
    }
}

impl From<Relation> for String {
    fn from(r: Relation) -> String {
        r.as_str().to_string()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Contact person for a student.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
#[serde(rename_all = "camelCase")]
pub struct Guardian {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Guardian name is required"))
    )]
    pub name: String,
    #[serde(default)]
    pub relation: Relation,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Guardian contact is required"))
    )]
    pub primary_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_contact: Option<String>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian: Option<Guardian>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub is_blocked: bool,
}

/// A backend user, tagged by `role` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum User {
    #[serde(rename = "admin", alias = "Admin", alias = "ADMIN")]
    Admin(AdminProfile),
    #[serde(rename = "teacher", alias = "Teacher", alias = "TEACHER")]
    Teacher(TeacherProfile),
    #[serde(rename = "student", alias = "Student", alias = "STUDENT")]
    Student(StudentProfile),
}

impl User {
    pub fn id(&self) -> &str {
        match self {
            User::Admin(u) => &u.id,
            User::Teacher(u) => &u.id,
            User::Student(u) => &u.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            User::Admin(u) => &u.name,
            User::Teacher(u) => &u.name,
            User::Student(u) => &u.name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            User::Admin(u) => &u.email,
            User::Teacher(u) => &u.email,
            User::Student(u) => &u.email,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            User::Admin(_) => Role::Admin,
            User::Teacher(_) => Role::Teacher,
            User::Student(_) => Role::Student,
        }
    }

    pub fn as_student(&self) -> Option<&StudentProfile> {
        match self {
            User::Student(s) => Some(s),
            _ => None,
        }
    }

    /// Only students can be blocked.
    pub fn is_blocked(&self) -> bool {
        self.as_student().is_some_and(|s| s.is_blocked)
    }

    /// Short role-specific detail for list rows.
    pub fn detail(&self) -> String {
        match self {
            User::Admin(_) => String::new(),
            User::Teacher(t) => t.subjects.join(", "),
            User::Student(s) => s.class_name.clone().unwrap_or_default(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id().to_string(),
            name: self.name().to_string(),
            email: self.email().to_string(),
        }
    }
}

/// A user reference embedded in other records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

// ---------------------------------------------------------------------------
// Assignments and results
// ---------------------------------------------------------------------------

/// One teacher/student pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub teacher: Option<UserSummary>,
    pub student: UserSummary,
    #[serde(default)]
    pub assigned_at: Option<String>,
}

/// A mark awarded to a student in one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub student: UserSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<UserSummary>,
    pub subject: String,
    pub marks: Marks,
    #[serde(default)]
    pub date: Option<String>,
}

impl ResultRecord {
    pub fn grade(&self) -> Grade {
        self.marks.grade()
    }

    /// Date part of the ISO timestamp, if any.
    pub fn date_label(&self) -> String {
        self.date
            .as_deref()
            .map(|d| d.split('T').next().unwrap_or(d).to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}
