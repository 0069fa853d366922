pub mod config;
pub mod error;
#[cfg(feature = "validation")]
pub mod forms;
pub mod grade;
pub mod messaging;
pub mod models;
pub mod navigation;
pub mod notice;
pub mod requests;
pub mod role;
pub mod scope;
pub mod session;
pub mod stats;

pub use config::*;
pub use error::*;
#[cfg(feature = "validation")]
pub use forms::*;
pub use grade::*;
pub use messaging::*;
pub use models::*;
pub use navigation::*;
pub use notice::*;
pub use requests::*;
pub use role::*;
pub use scope::*;
pub use session::*;
pub use stats::*;
