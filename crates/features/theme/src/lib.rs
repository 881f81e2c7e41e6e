//! Theme feature slice: template styling and the static asset mount.

mod error;

pub use crate::error::{ThemeError, ThemeErrorExt};
use mdesk_domain::config::ThemeConfig;
use mdesk_kernel::domain::registry::{FeatureSlice, InitializedSlice};
use std::path::PathBuf;

/// Theme feature state.
#[derive(Debug, Clone)]
pub struct ThemeInner {
    pub asset_dir: PathBuf,
}

/// Shared handle to the theme state.
#[derive(Debug, Clone)]
pub struct Theme {
    inner: std::sync::Arc<ThemeInner>,
}

impl Theme {
    #[must_use]
    pub fn new(inner: ThemeInner) -> Self {
        Self { inner: std::sync::Arc::new(inner) }
    }
}

impl std::ops::Deref for Theme {
    type Target = ThemeInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FeatureSlice for Theme {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Initialize the theme feature.
///
/// # Errors
/// Returns [`ThemeError::Config`] when the asset directory is unset.
pub fn init(config: &ThemeConfig) -> Result<InitializedSlice, ThemeError> {
    if config.asset_dir.as_os_str().is_empty() {
        return Err(ThemeError::Config {
            message: "Asset directory cannot be empty".into(),
            context: None,
        });
    }

    tracing::info!(assets = %config.asset_dir.display(), "Theme slice initialized");

    let inner = ThemeInner { asset_dir: config.asset_dir.clone() };

    let slice = Theme::new(inner);

    Ok(InitializedSlice::new(slice))
}
