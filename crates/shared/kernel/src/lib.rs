//! Kernel utilities shared across slices.
//! Keep this crate lightweight; it re-exports ergonomic helpers for config loading and the shared server state.
//!
//! ## Config loading
//! ```rust
//! use mdesk_kernel::config::load_config;
//! use mdesk_kernel::domain::config::AppConfig;
//!
//! let config: AppConfig = load_config(Some("server")).unwrap();
//! assert_eq!(config.server.port, 5000);
//! ```

pub mod config;
pub mod prelude;
pub mod server;

pub use mdesk_domain as domain;
