use client::ApiClient;
use dioxus::prelude::*;
use shared_types::{Role, Session, SessionState};

/// Current session, kept in sync with the [`client::SessionStore`].
pub type SessionSignal = Signal<SessionState, SyncStorage>;

pub fn use_session_state() -> SessionSignal {
    use_context::<SessionSignal>()
}

/// The signed-in session. Only meaningful below the auth guard, which
/// never renders its children without one.
pub fn use_session() -> Option<Session> {
    let state = use_session_state();
    let session = state.read().session().cloned();
    session
}

pub fn use_role() -> Option<Role> {
    let state = use_session_state();
    let role = state.read().role();
    role
}

pub fn use_api() -> ApiClient {
    use_context::<ApiClient>()
}
