//! HTTP boundary and process-wide session for the school front end.

pub mod api;
pub mod cancel;
pub mod collection;
pub mod config;
pub mod error_convert;
pub mod session;
pub mod storage;
pub mod telemetry;

pub use api::ApiClient;
pub use cancel::FetchScope;
pub use collection::{Change, Keyed, ListHandle, OptimisticList, Undo};
pub use session::{SessionStore, Subscription};
pub use storage::{CredentialStorage, MemoryStorage, ROLE_KEY, TOKEN_KEY};
