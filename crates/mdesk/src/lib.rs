//! Facade crate for `MailDesk` features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Call `mdesk::init` during bootstrap to bind feature slices in order; extend as new slices appear.

pub use mdesk_domain as domain;
use mdesk_domain::config::AppConfig;
use mdesk_domain::features::FeatureSet;
pub use mdesk_kernel as kernel;

pub mod server {
    pub mod router {
        pub use mdesk_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use mdesk_auth as auth;
    pub use mdesk_theme as theme;

    use mdesk_domain::features::FeatureSet;

    /// Features compiled into this build.
    #[must_use]
    pub const fn enabled() -> FeatureSet {
        FeatureSet::ALL
    }

    /// Whether `name` identifies a feature present in this build.
    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        let feature = FeatureSet::from(name);
        !feature.is_empty() && enabled().contains(feature)
    }
}

/// Initialize all enabled features, in binding order.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &AppConfig,
) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error>> {
    let enabled = features::enabled();
    let mut slices = Vec::new();

    // Theme (template styling)
    if enabled.contains(FeatureSet::THEME) {
        slices.push(features::theme::init(&config.theme)?);
    }

    // Auth (login-session manager)
    if enabled.contains(FeatureSet::AUTH) {
        slices.push(features::auth::init(&config.auth)?);
    }

    Ok(slices)
}
