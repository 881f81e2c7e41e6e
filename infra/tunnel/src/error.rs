use std::borrow::Cow;

/// A specialized [`TunnelError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    /// Failures launching or terminating the agent process.
    #[error("Tunnel agent error{}: {source}", format_context(context))]
    Agent {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Failures talking to the agent introspection API.
    #[error("Tunnel API error{}: {source}", format_context(context))]
    Http {
        #[source]
        source: reqwest::Error,
        context: Option<Cow<'static, str>>,
    },

    /// No matching tunnel appeared within the polling budget.
    #[error("Tunnel unavailable{}: {message}", format_context(context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal tunnel error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<std::io::Error> for TunnelError {
    #[inline]
    fn from(source: std::io::Error) -> Self {
        Self::Agent { source, context: None }
    }
}

impl From<reqwest::Error> for TunnelError {
    #[inline]
    fn from(source: reqwest::Error) -> Self {
        Self::Http { source, context: None }
    }
}

impl From<&'static str> for TunnelError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for TunnelError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

/// Attaches call-site context to tunnel errors.
pub trait TunnelErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, TunnelError>;
}

impl<T> TunnelErrorExt<T> for Result<T, TunnelError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                TunnelError::Agent { context: c, .. }
                | TunnelError::Http { context: c, .. }
                | TunnelError::Unavailable { context: c, .. }
                | TunnelError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> TunnelErrorExt<T> for Result<T, std::io::Error> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, TunnelError> {
        self.map_err(|source| TunnelError::Agent { source, context: Some(context.into()) })
    }
}

impl<T> TunnelErrorExt<T> for Result<T, reqwest::Error> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, TunnelError> {
        self.map_err(|source| TunnelError::Http { source, context: Some(context.into()) })
    }
}

pub(crate) fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
