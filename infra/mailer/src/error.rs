use std::borrow::Cow;

/// A specialized [`MailerError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// Validation errors.
    #[error("Validation error{}: {message}", format_context(context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Malformed mail addresses.
    #[error("Address error{}: {source}", format_context(context))]
    Address {
        #[source]
        source: lettre::address::AddressError,
        context: Option<Cow<'static, str>>,
    },

    /// Failures while assembling a message.
    #[error("Message error{}: {source}", format_context(context))]
    Message {
        #[source]
        source: lettre::error::Error,
        context: Option<Cow<'static, str>>,
    },

    /// SMTP transport failures, both setup and delivery.
    #[error("SMTP error{}: {source}", format_context(context))]
    Smtp {
        #[source]
        source: lettre::transport::smtp::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal mailer error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<lettre::address::AddressError> for MailerError {
    #[inline]
    fn from(source: lettre::address::AddressError) -> Self {
        Self::Address { source, context: None }
    }
}

impl From<lettre::error::Error> for MailerError {
    #[inline]
    fn from(source: lettre::error::Error) -> Self {
        Self::Message { source, context: None }
    }
}

impl From<lettre::transport::smtp::Error> for MailerError {
    #[inline]
    fn from(source: lettre::transport::smtp::Error) -> Self {
        Self::Smtp { source, context: None }
    }
}

impl From<&'static str> for MailerError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for MailerError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

/// Attaches call-site context to mailer errors.
pub trait MailerErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, MailerError>;
}

impl<T> MailerErrorExt<T> for Result<T, MailerError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                MailerError::Validation { context: c, .. }
                | MailerError::Address { context: c, .. }
                | MailerError::Message { context: c, .. }
                | MailerError::Smtp { context: c, .. }
                | MailerError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> MailerErrorExt<T> for Result<T, lettre::address::AddressError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, MailerError> {
        self.map_err(|source| MailerError::Address { source, context: Some(context.into()) })
    }
}

impl<T> MailerErrorExt<T> for Result<T, lettre::transport::smtp::Error> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, MailerError> {
        self.map_err(|source| MailerError::Smtp { source, context: Some(context.into()) })
    }
}

pub(crate) fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
