//! Convenience re-exports for app and slice crates.

pub use crate::config::{ConfigError, ConfigErrorExt, load_config};
pub use crate::server::state::{AppState, AppStateError};
pub use mdesk_domain::config::AppConfig;
pub use mdesk_domain::registry::{FeatureSlice, InitializedSlice};
