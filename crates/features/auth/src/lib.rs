//! Auth feature slice: login-session management.
//!
//! Holds the session-manager state, most importantly the name of the
//! view unauthenticated requests are redirected to.

mod error;

pub use crate::error::{AuthError, AuthErrorExt};
use mdesk_domain::config::AuthConfig;
use mdesk_kernel::domain::registry::{FeatureSlice, InitializedSlice};

/// Login-session manager state.
#[derive(Debug, Clone)]
pub struct AuthInner {
    pub login_view: String,
}

/// Shared handle to the session-manager state.
#[derive(Debug, Clone)]
pub struct Auth {
    inner: std::sync::Arc<AuthInner>,
}

impl Auth {
    #[must_use]
    pub fn new(inner: AuthInner) -> Self {
        Self { inner: std::sync::Arc::new(inner) }
    }
}

impl std::ops::Deref for Auth {
    type Target = AuthInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FeatureSlice for Auth {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Initialize the auth feature.
///
/// # Errors
/// Returns [`AuthError::Config`] when no fallback login view is named.
pub fn init(config: &AuthConfig) -> Result<InitializedSlice, AuthError> {
    if config.login_view.is_empty() {
        return Err(AuthError::Config {
            message: "Login view cannot be empty".into(),
            context: None,
        });
    }

    tracing::info!(login_view = %config.login_view, "Auth slice initialized");

    let inner = AuthInner { login_view: config.login_view.clone() };

    let slice = Auth::new(inner);

    Ok(InitializedSlice::new(slice))
}
