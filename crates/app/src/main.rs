use std::rc::Rc;
use std::sync::Arc;

use client::{ApiClient, CredentialStorage, SessionStore};
use dioxus::prelude::*;
use shared_types::FeatureFlags;

mod auth;
mod components;
mod fetch;
mod notify;
mod routes;

use auth::SessionSignal;
use notify::ToastProvider;
use routes::Route;

const MAIN_CSS: Asset = asset!("/assets/main.css");

/// Compiled in so web builds, which cannot read files, get the same
/// defaults as native ones.
const EMBEDDED_CONFIG: &str = include_str!("../../../config.toml");

fn main() {
    client::telemetry::init_tracing();

    #[cfg(not(target_arch = "wasm32"))]
    client::config::load();
    client::config::init_embedded(EMBEDDED_CONFIG);

    dioxus::launch(App);
}

fn credential_storage() -> Arc<dyn CredentialStorage> {
    #[cfg(target_arch = "wasm32")]
    {
        Arc::new(client::storage::BrowserStorage)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Arc::new(client::MemoryStorage::new())
    }
}

#[component]
fn App() -> Element {
    let store = use_hook(|| SessionStore::new(credential_storage()));
    let flags: FeatureFlags = use_context_provider(client::config::feature_flags);

    let api = use_hook({
        let store = store.clone();
        move || {
            let settings = client::config::app_config().api;
            ApiClient::new(&settings, store.clone()).unwrap_or_else(|err| {
                tracing::error!(error = %err, "http client setup failed, using defaults");
                ApiClient::with_http(Default::default(), &settings.base_url, store)
            })
        }
    });
    use_context_provider(|| api.clone());

    // Mirror the store into a signal so every view re-renders on login,
    // logout, or a credential change in another tab.
    let session: SessionSignal = use_signal_sync({
        let store = store.clone();
        move || store.read()
    });
    use_hook({
        let store = store.clone();
        move || {
            #[cfg(target_arch = "wasm32")]
            client::session::watch_browser_storage(store.clone());
            Rc::new(store.subscribe(move |state| {
                let mut session = session;
                session.set(state.clone());
            }))
        }
    });
    use_context_provider(|| session);

    tracing::debug!(registration = flags.registration, sms = flags.sms_alerts, "app mounted");

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        ToastProvider {
            Router::<Route> {}
        }
    }
}
