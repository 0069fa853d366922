//! Client-side narrowing of fetched collections to what the actor may see.
//!
//! The backend already scopes its responses; these filters make sure a
//! response that is broader than expected never reaches the screen.

use std::collections::HashSet;

use crate::models::{Assignment, ResultRecord, User, UserSummary};
use crate::role::Role;
use crate::session::Session;

fn owned_by(session: &Session, who: &UserSummary) -> bool {
    session.owns(&who.id, &who.email)
}

/// Results visible to `session`: all for admins, own entries for teachers
/// (records without a teacher reference come from the teacher-scoped
/// endpoint and are kept), own marks for students.
pub fn visible_results(session: &Session, results: Vec<ResultRecord>) -> Vec<ResultRecord> {
    match session.role {
        Role::Admin => results,
        Role::Teacher => results
            .into_iter()
            .filter(|r| r.teacher.as_ref().map_or(true, |t| owned_by(session, t)))
            .collect(),
        Role::Student => results
            .into_iter()
            .filter(|r| owned_by(session, &r.student))
            .collect(),
    }
}

/// Distinct students reachable through `assignments`. Teachers only see
/// students assigned to them; students see nobody.
pub fn visible_students(session: &Session, assignments: &[Assignment]) -> Vec<UserSummary> {
    let keep = |a: &&Assignment| match session.role {
        Role::Admin => true,
        Role::Teacher => a.teacher.as_ref().map_or(true, |t| owned_by(session, t)),
        Role::Student => false,
    };
    let mut seen = HashSet::new();
    assignments
        .iter()
        .filter(keep)
        .filter(|a| seen.insert(a.student.id.clone()))
        .map(|a| a.student.clone())
        .collect()
}

/// Students that may be offered for assignment to a teacher. Blocked
/// accounts stay listed on the users page but cannot be assigned.
pub fn assignable_students(users: &[User]) -> Vec<&User> {
    users
        .iter()
        .filter(|u| u.role() == Role::Student && !u.is_blocked())
        .collect()
}
