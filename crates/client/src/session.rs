//! Process-wide session store.
//!
//! Views never read the credential storage directly. They read the store,
//! or subscribe to it and re-render when it changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use shared_types::{resolve, AppError, AuthResponse, Role, Session, SessionState};

use crate::storage::{CredentialStorage, ROLE_KEY, TOKEN_KEY};

type Listener = Arc<dyn Fn(&SessionState) + Send + Sync>;

struct Inner {
    storage: Arc<dyn CredentialStorage>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

/// Shared handle to the credential and its subscribers.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl PartialEq for SessionStore {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.read())
            .finish()
    }
}

/// Keeps a listener registered. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            if let Ok(mut listeners) = inner.listeners.lock() {
                listeners.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn CredentialStorage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage,
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Resolve the stored credential now.
    pub fn read(&self) -> SessionState {
        resolve(self.token().as_deref())
    }

    pub fn session(&self) -> Option<Session> {
        self.read().session().cloned()
    }

    /// Raw bearer token, if one is stored.
    pub fn token(&self) -> Option<String> {
        self.inner
            .storage
            .get(TOKEN_KEY)
            .filter(|t| !t.trim().is_empty())
    }

    /// The stored role hint. Display only.
    pub fn role_hint(&self) -> Option<Role> {
        self.inner.storage.get(ROLE_KEY).as_deref().and_then(Role::parse)
    }

    /// Store a freshly issued credential. A token that does not resolve to
    /// a session is refused and nothing is stored.
    pub fn sign_in(&self, auth: &AuthResponse) -> Result<Session, AppError> {
        let session = match resolve(Some(&auth.token)) {
            SessionState::Authenticated(session) => session,
            SessionState::Invalid(reason) => {
                tracing::warn!(%reason, "refusing credential");
                return Err(AppError::unauthorized(
                    "The server returned an unusable session. Please try again.",
                ));
            }
            SessionState::Unauthenticated => {
                return Err(AppError::unauthorized("The server returned no session."));
            }
        };

        self.inner.storage.set(TOKEN_KEY, &auth.token);
        let hint = auth
            .role
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or(session.role);
        self.inner.storage.set(ROLE_KEY, hint.as_str());
        tracing::info!(role = %session.role, "signed in");
        self.notify();
        Ok(session)
    }

    /// Remove the credential and notify subscribers.
    pub fn clear(&self) {
        self.inner.storage.remove(TOKEN_KEY);
        self.inner.storage.remove(ROLE_KEY);
        tracing::info!("signed out");
        self.notify();
    }

    /// Re-resolve after the credential changed outside this store, e.g.
    /// another browser tab logging in or out.
    pub fn refresh(&self) {
        tracing::debug!("credential changed externally");
        self.notify();
    }

    /// Re-resolve the stored credential, e.g. on navigation. A token that
    /// has expired since it was stored is reported to subscribers; a valid
    /// one is left alone.
    pub fn revalidate(&self) -> SessionState {
        let state = self.read();
        if !state.is_authenticated() && self.token().is_some() {
            tracing::info!("stored credential no longer valid");
            self.notify();
        }
        state
    }

    /// Call `listener` with the new state on every change.
    pub fn subscribe(&self, listener: impl Fn(&SessionState) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    fn notify(&self) {
        let state = self.read();
        // Listeners run outside the lock so they may subscribe or read.
        let listeners: Vec<Listener> = match self.inner.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| l.clone()).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(&state);
        }
    }
}

/// Forward the browser `storage` event for the credential keys to `store`.
#[cfg(target_arch = "wasm32")]
pub fn watch_browser_storage(store: SessionStore) {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let Some(window) = web_sys::window() else {
        return;
    };
    let handler = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(move |event: web_sys::StorageEvent| {
        // A `None` key means the whole storage was cleared.
        let relevant = match event.key() {
            None => true,
            Some(key) => key == TOKEN_KEY || key == ROLE_KEY,
        };
        if relevant {
            store.refresh();
        }
    });
    if window
        .add_event_listener_with_callback("storage", handler.as_ref().unchecked_ref())
        .is_err()
    {
        tracing::warn!("could not listen for storage events");
    }
    // The listener lives for the whole page.
    handler.forget();
}
