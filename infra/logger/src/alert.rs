use crate::error::LoggerError;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::fmt::{self, Debug, Write as _};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Alerts queued beyond this depth are dropped instead of blocking the
/// thread that emitted the event.
const ALERT_QUEUE_DEPTH: usize = 64;

/// SMTP settings plus the envelope for the alert recipient.
#[derive(Debug, Clone)]
pub struct MailAlertConfig {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    pub credentials: Option<(String, String)>,
    pub from: String,
    pub to: String,
    pub subject: String,
}

/// One formatted alert, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub from: String,
    pub to: String,
    pub body: String,
}

/// Delivery backend for alert messages. Implemented by the SMTP transport
/// here and by recording fakes in tests.
pub trait AlertTransport: Debug + Send + 'static {
    /// Delivers one alert.
    ///
    /// # Errors
    /// Returns an error when the backend rejects or fails to send the alert.
    fn deliver(&self, alert: &AlertMessage) -> Result<(), LoggerError>;
}

/// Blocking SMTP delivery via `lettre`.
#[derive(Debug)]
pub struct SmtpAlertTransport {
    transport: SmtpTransport,
}

impl SmtpAlertTransport {
    /// Builds the transport from the alert config: STARTTLS relay when the
    /// TLS flag is set, plain SMTP otherwise, credentials when present.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] when the relay cannot be configured.
    pub fn from_config(config: &MailAlertConfig) -> Result<Self, LoggerError> {
        let builder = if config.use_tls {
            SmtpTransport::starttls_relay(&config.host).map_err(|e| {
                LoggerError::InvalidConfiguration {
                    message: format!("SMTP relay {}: {e}", config.host).into(),
                    context: None,
                }
            })?
        } else {
            SmtpTransport::builder_dangerous(&config.host)
        };

        let mut builder = builder.port(config.port);
        if let Some((username, password)) = config.credentials.clone() {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self { transport: builder.build() })
    }
}

impl AlertTransport for SmtpAlertTransport {
    fn deliver(&self, alert: &AlertMessage) -> Result<(), LoggerError> {
        let from = parse_mailbox(&alert.from)?;
        let to = parse_mailbox(&alert.to)?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&alert.subject)
            .body(alert.body.clone())
            .map_err(|e| LoggerError::Alert {
                message: format!("Building alert message: {e}").into(),
                context: None,
            })?;

        self.transport.send(&message).map_err(|e| LoggerError::Alert {
            message: format!("SMTP delivery failed: {e}").into(),
            context: None,
        })?;

        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, LoggerError> {
    address.parse::<Mailbox>().map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("Invalid mail address '{address}': {e}").into(),
        context: None,
    })
}

enum WorkerCommand {
    Deliver(AlertMessage),
    Shutdown,
}

/// Turns error-level events into mail alerts, delivered on a background
/// worker thread so the event path never waits on SMTP.
#[derive(Debug)]
pub(crate) struct MailAlertLayer {
    tx: SyncSender<WorkerCommand>,
    from: String,
    to: String,
    subject: String,
    dropped: Arc<AtomicU64>,
}

impl MailAlertLayer {
    /// Spawns the delivery worker and returns the layer plus the guard that
    /// stops the worker on drop.
    #[must_use]
    pub(crate) fn new(
        config: &MailAlertConfig,
        transport: Box<dyn AlertTransport>,
    ) -> (Self, AlertWorkerGuard) {
        let (tx, rx) = sync_channel(ALERT_QUEUE_DEPTH);
        let handle = std::thread::spawn(move || worker_loop(&rx, &*transport));
        let dropped = Arc::new(AtomicU64::new(0));

        let layer = Self {
            tx: tx.clone(),
            from: config.from.clone(),
            to: config.to.clone(),
            subject: config.subject.clone(),
            dropped: Arc::clone(&dropped),
        };
        let guard = AlertWorkerGuard { tx, handle: Some(handle), dropped };

        (layer, guard)
    }
}

impl<S: Subscriber> Layer<S> for MailAlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // Alerts are error-level only.
        if event.metadata().level() != &Level::ERROR {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let alert = AlertMessage {
            subject: self.subject.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            body: visitor.message,
        };

        if let Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) =
            self.tx.try_send(WorkerCommand::Deliver(alert))
        {
            // Never block the event path.
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[allow(clippy::print_stderr)]
fn worker_loop(rx: &Receiver<WorkerCommand>, transport: &dyn AlertTransport) {
    while let Ok(command) = rx.recv() {
        match command {
            WorkerCommand::Deliver(alert) => {
                if let Err(error) = transport.deliver(&alert) {
                    // Never re-enter tracing from the delivery path.
                    eprintln!("mdesk-logger: alert delivery failed: {error}");
                }
            }
            WorkerCommand::Shutdown => break,
        }
    }
}

/// Stops the alert worker when dropped, after draining queued alerts.
#[must_use = "Dropping this handle stops the alert delivery worker."]
pub(crate) struct AlertWorkerGuard {
    tx: SyncSender<WorkerCommand>,
    handle: Option<JoinHandle<()>>,
    dropped: Arc<AtomicU64>,
}

impl AlertWorkerGuard {
    /// Number of alerts dropped because the delivery queue was full.
    #[must_use]
    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Debug for AlertWorkerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertWorkerGuard")
            .field("dropped", &self.dropped())
            .finish_non_exhaustive()
    }
}

impl Drop for AlertWorkerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        }
    }
}
