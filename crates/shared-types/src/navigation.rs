//! Role to page mapping used by the sidebar and the page gates.
//!
//! This is UI gating only. The backend authorizes every request on its own.

use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::session::{Session, SessionState};

/// Protected pages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    Dashboard,
    Users,
    Classes,
    Results,
    GiveResults,
    MyResults,
    Messages,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Dashboard,
        Page::Users,
        Page::Classes,
        Page::Results,
        Page::GiveResults,
        Page::MyResults,
        Page::Messages,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Users => "Users",
            Page::Classes => "Classes",
            Page::Results => "Results",
            Page::GiveResults => "Give Results",
            Page::MyResults => "My Results",
            Page::Messages => "Messages",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Page::Dashboard => "/",
            Page::Users => "/users",
            Page::Classes => "/classes",
            Page::Results => "/results",
            Page::GiveResults => "/give-results",
            Page::MyResults => "/my-results",
            Page::Messages => "/messages",
        }
    }

    /// Inverse of [`Page::path`], ignoring a trailing slash.
    pub fn from_path(path: &str) -> Option<Page> {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
        Page::ALL.into_iter().find(|p| p.path() == trimmed)
    }
}

const ADMIN_NAV: &[Page] = &[
    Page::Dashboard,
    Page::Users,
    Page::Classes,
    Page::Results,
    Page::Messages,
];
const TEACHER_NAV: &[Page] = &[Page::Dashboard, Page::GiveResults, Page::Messages];
const STUDENT_NAV: &[Page] = &[Page::Dashboard, Page::MyResults];

/// What an actor of a given role may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleView {
    pub role: Role,
    pub landing: Page,
    pub nav: &'static [Page],
}

pub fn role_view(role: Role) -> RoleView {
    let nav = match role {
        Role::Admin => ADMIN_NAV,
        Role::Teacher => TEACHER_NAV,
        Role::Student => STUDENT_NAV,
    };
    RoleView {
        role,
        landing: Page::Dashboard,
        nav,
    }
}

pub fn allows(role: Role, page: Page) -> bool {
    role_view(role).nav.contains(&page)
}

/// Outcome of gating a page on the current session.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    Render(Session),
    RedirectToLogin,
    Denied { landing: Page },
}

pub fn gate(state: &SessionState, page: Page) -> Gate {
    match state {
        SessionState::Authenticated(session) => {
            if allows(session.role, page) {
                Gate::Render(session.clone())
            } else {
                Gate::Denied {
                    landing: role_view(session.role).landing,
                }
            }
        }
        SessionState::Unauthenticated | SessionState::Invalid(_) => Gate::RedirectToLogin,
    }
}
