use std::borrow::Cow;

/// A specialized [`AuthError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Invalid session-manager settings.
    #[error("Configuration error{}: {message}", format_context(context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal auth error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<&'static str> for AuthError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for AuthError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

/// Attaches call-site context to auth errors.
pub trait AuthErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, AuthError>;
}

impl<T> AuthErrorExt<T> for Result<T, AuthError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                AuthError::Config { context: c, .. } | AuthError::Internal { context: c, .. } => {
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
