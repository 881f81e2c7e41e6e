//! # Mailer Infrastructure
//!
//! This crate provides outbound SMTP dispatch for the workspace, wrapping
//! the async [lettre](https://lettre.rs) transport.
//!
//! ## Key Features
//! - **Lazy Transport**: No connection is opened until the first send.
//! - **STARTTLS Aware**: Plain SMTP for local relays, STARTTLS when enabled.
//! - **Builder Pattern**: Fluent API mirroring the other infrastructure crates.
//!
//! ## Example
//!
//! ```rust
//! use mdesk_mailer::{Mailer, MailerError};
//!
//! fn main() -> Result<(), MailerError> {
//!     let _mailer = Mailer::builder()
//!         .host("localhost")
//!         .sender("support@example.com")
//!         .init()?;
//!     Ok(())
//! }
//! ```

mod error;

pub use error::{MailerError, MailerErrorExt};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const DEFAULT_SMTP_PORT: u16 = 25;

/// Inner state of the [`Mailer`] wrapper.
#[derive(Debug)]
pub struct MailerInner {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

/// Outbound mail dispatcher, cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct Mailer {
    inner: Arc<MailerInner>,
}

impl Mailer {
    /// Creates a new [`MailerBuilder`].
    pub fn builder() -> MailerBuilder {
        MailerBuilder::new()
    }

    /// Returns the configured sender mailbox.
    #[must_use]
    pub fn sender(&self) -> &Mailbox {
        &self.inner.sender
    }

    /// Sends a plain-text message to a single recipient.
    ///
    /// # Errors
    /// * [`MailerError::Address`] if the recipient address does not parse.
    /// * [`MailerError::Message`] if the message cannot be assembled.
    /// * [`MailerError::Smtp`] if the relay rejects the delivery.
    #[instrument(skip(self, body))]
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        body: impl Into<String>,
    ) -> Result<(), MailerError> {
        let recipient: Mailbox = to.parse().context("Parsing the recipient address")?;

        let message = Message::builder()
            .from(self.inner.sender.clone())
            .to(recipient)
            .subject(subject)
            .body(body.into())?;

        self.inner.transport.send(message).await.context("Delivering via SMTP")?;
        debug!(to, subject, "Mail dispatched");

        Ok(())
    }
}

impl Deref for Mailer {
    type Target = AsyncSmtpTransport<Tokio1Executor>;

    fn deref(&self) -> &Self::Target {
        &self.inner.transport
    }
}

/// A fluent builder for configuring the SMTP transport.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct MailerBuilder {
    host: Option<String>,
    port: Option<u16>,
    use_tls: bool,
    credentials: Option<(String, String)>,
    sender: Option<String>,
}

impl MailerBuilder {
    /// Creates a new [`MailerBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the SMTP relay host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the SMTP relay port. Defaults to 25.
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Upgrades the session via STARTTLS before authenticating.
    pub const fn use_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Adds relay credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the sender address placed on outgoing messages.
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Consumes the builder and sets up the SMTP transport.
    ///
    /// The transport is lazy: nothing is connected until the first
    /// [`Mailer::send`].
    ///
    /// # Errors
    /// * [`MailerError::Validation`] if the host or the sender are missing.
    /// * [`MailerError::Address`] if the sender address does not parse.
    /// * [`MailerError::Smtp`] if the relay parameters are rejected.
    pub fn init(self) -> Result<Mailer, MailerError> {
        let host = self.host.ok_or(MailerError::Validation {
            message: "SMTP host is required".into(),
            context: None,
        })?;
        let sender = self.sender.ok_or(MailerError::Validation {
            message: "Sender address is required".into(),
            context: None,
        })?;
        let sender: Mailbox = sender.parse().context("Parsing the sender address")?;

        let builder = if self.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
                .context("Configuring the STARTTLS relay")?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host)
        };

        let mut builder = builder.port(self.port.unwrap_or(DEFAULT_SMTP_PORT));
        if let Some((username, password)) = self.credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }

        info!(%host, tls = self.use_tls, "Mail transport configured");

        Ok(Mailer { inner: Arc::new(MailerInner { transport: builder.build(), sender }) })
    }
}
