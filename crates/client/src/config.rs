use shared_types::{AppConfig, FeatureFlags};
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Path to the config file, relative to the project root.
#[cfg(not(target_arch = "wasm32"))]
const CONFIG_PATH: &str = "config.toml";

/// Environment variable overriding `api.base_url`.
pub const BASE_URL_ENV: &str = "SCHOOL_API_BASE_URL";

/// Parse a config body, falling back to defaults when it is unparsable.
pub fn parse_or_default(contents: &str) -> AppConfig {
    AppConfig::from_toml(contents).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to parse config, using defaults");
        AppConfig::default()
    })
}

/// Apply an optional base URL override. Blank overrides are ignored and a
/// trailing slash is dropped so paths can be appended directly.
pub fn with_base_url_override(mut config: AppConfig, base_url: Option<String>) -> AppConfig {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        config.api.base_url = url.trim().to_string();
    }
    config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();
    config
}

/// Read `config.toml` and `.env` once and store the result. Safe to call
/// multiple times; only the first call has effect.
///
/// If the file is missing or unparsable, defaults are used.
#[cfg(not(target_arch = "wasm32"))]
pub fn load() -> &'static AppConfig {
    CONFIG.get_or_init(|| {
        let _ = dotenvy::dotenv();
        let config = match std::fs::read_to_string(CONFIG_PATH) {
            Ok(contents) => parse_or_default(&contents),
            Err(e) => {
                tracing::warn!(path = CONFIG_PATH, error = %e, "config file not found, using defaults");
                AppConfig::default()
            }
        };
        let config = with_base_url_override(config, std::env::var(BASE_URL_ENV).ok());
        tracing::info!(base_url = %config.api.base_url, features = ?config.features, "config loaded");
        config
    })
}

/// Store a config body embedded at compile time (web builds).
pub fn init_embedded(contents: &str) -> &'static AppConfig {
    CONFIG.get_or_init(|| with_base_url_override(parse_or_default(contents), None))
}

/// The loaded config, or defaults if nothing has been loaded yet.
pub fn app_config() -> AppConfig {
    CONFIG.get().cloned().unwrap_or_default()
}

pub fn feature_flags() -> FeatureFlags {
    app_config().features
}
