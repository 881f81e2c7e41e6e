use std::borrow::Cow;

/// A specialized [`ThemeError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// Invalid styling settings.
    #[error("Configuration error{}: {message}", format_context(context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal theme error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<&'static str> for ThemeError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for ThemeError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

/// Attaches call-site context to theme errors.
pub trait ThemeErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ThemeError>;
}

impl<T> ThemeErrorExt<T> for Result<T, ThemeError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                ThemeError::Config { context: c, .. } | ThemeError::Internal { context: c, .. } => {
                    *c = Some(context.into());
                }
            }
            e
        })
    }
}

pub(crate) fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
