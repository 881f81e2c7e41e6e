use axum::extract::FromRef;
use fxhash::FxHashMap;
use mdesk_database::Database;
use mdesk_domain::config::AppConfig;
use mdesk_domain::registry::{FeatureSlice, InitializedSlice};
use mdesk_mailer::Mailer;
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("State validation error{}: {message}", format_context(context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Attaches call-site context to state errors.
pub trait AppStateErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, AppStateError>;
}

impl<T> AppStateErrorExt<T> for Result<T, AppStateError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                AppStateError::Validation { context: c, .. }
                | AppStateError::MissingSlice { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

/// Everything the bound extensions produced, shared with request handlers.
#[derive(Debug)]
pub struct AppStateInner {
    pub config: AppConfig,
    pub database: Database,
    pub mailer: Option<Mailer>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner
            .slices
            .get(&TypeId::of::<T>())
            .and_then(|initialized| initialized.downcast_ref::<T>())
    }

    /// Returns a reference to the slice if it is registered.
    ///
    /// # Errors
    /// Returns an error if the slice is not registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, AppStateError> {
        self.get_slice::<T>().ok_or_else(|| AppStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Iterates over registered slice type IDs (for diagnostics).
    pub fn slice_ids(&self) -> impl Iterator<Item = &TypeId> {
        self.inner.slices.keys()
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.inner.database.clone()
    }
}

impl FromRef<AppState> for Option<Mailer> {
    fn from_ref(state: &AppState) -> Self {
        state.inner.mailer.clone()
    }
}

#[derive(Debug, Default)]
pub struct AppStateBuilder {
    config: Option<AppConfig>,
    database: Option<Database>,
    mailer: Option<Mailer>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Registers the mail-dispatch extension, absent when no mail server is configured.
    #[must_use]
    pub fn mailer(mut self, mailer: Option<Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id, slice);
        self
    }

    /// Registers multiple slices at once.
    #[must_use]
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        for slice in slices {
            self.slices.insert(slice.id, slice);
        }
        self
    }

    /// Finishes the state, requiring the config and database extensions.
    ///
    /// # Errors
    /// Returns a validation error when a required extension is missing.
    pub fn build(self) -> Result<AppState, AppStateError> {
        let config = self.config.ok_or_else(|| AppStateError::Validation {
            message: "AppConfig not provided".into(),
            context: None,
        })?;
        let database = self.database.ok_or_else(|| AppStateError::Validation {
            message: "Database not provided".into(),
            context: None,
        })?;

        Ok(AppState {
            inner: Arc::new(AppStateInner {
                config,
                database,
                mailer: self.mailer,
                slices: self.slices,
            }),
        })
    }
}
