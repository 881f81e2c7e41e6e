//! # Logger
//!
//! A centralized logging utility for the project.
//! It wires up the single runtime log sink: mail alerts for failures,
//! console output, or a size-rotated log file with non-blocking I/O and
//! environment-based filtering.
//!
//! * At most one sink is attached per process. [`resolve`] maps the runtime
//!   context onto the sink to use; the builder rejects conflicting
//!   selections.
//! * With no sink selected, [`LoggerBuilder::init`] returns an inert handle
//!   and leaves the global dispatcher untouched, so bootstrap can run
//!   repeatedly inside one test process.
//! * Use [`LoggerBuilder::env_filter`] to set module-directed filters
//!   (e.g., `"myapp=debug,hyper=info"`), in addition to `RUST_LOG`.
//!
//! ## Example
//!
//! ```rust
//! # use mdesk_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("my-app")
//!     .stdout(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod alert;
mod error;
mod format;
mod plan;
mod rotate;

pub use crate::alert::{AlertMessage, AlertTransport, MailAlertConfig, SmtpAlertTransport};
pub use crate::error::{LoggerError, LoggerErrorExt};
pub use crate::plan::{SinkContext, SinkKind, resolve};
pub use tracing::level_filters::LevelFilter;

use crate::alert::{AlertWorkerGuard, MailAlertLayer};
use crate::format::SupportFormat;
use crate::rotate::SizeRotatingWriter;
use private::Sealed;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_BYTES: u64 = 10_240;
const DEFAULT_BACKUP_COUNT: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
pub struct LoggerConfig {
    stdout: bool,
    file_dir: Option<PathBuf>,
    mail_alert: Option<MailAlertConfig>,
    alert_transport: Option<Box<dyn AlertTransport>>,
    level: LevelFilter,
    max_bytes: u64,
    backup_count: usize,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            stdout: false,
            file_dir: None,
            mail_alert: None,
            alert_transport: None,
            level: LevelFilter::INFO,
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// A builder for configuring and initializing the global tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    config: LoggerConfig,
    name: N,
    file_state: std::marker::PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Sets the name of the logger.
    ///
    /// The name doubles as the log file stem when the file sink is selected
    /// (e.g., `logs/my-app.log`).
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder {
            name: WithName(name.into()),
            config: self.config,
            file_state: std::marker::PhantomData,
        }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    /// Configures the size threshold at which the log file rolls over.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.config.max_bytes = max_bytes;
        self
    }

    /// Configures how many rotated log files to keep.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn backup_count(mut self, backup_count: usize) -> Self {
        self.config.backup_count = backup_count;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Configures the minimum log level to be emitted.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `myapp=debug,hyper=info`).
    ///
    /// Environment variables still override via `RUST_LOG`; this is a programmatic default.
    /// Invalid filters will cause [`LoggerBuilder::init`] to return an error.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Selects the console sink, writing compact records to stdout.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn stdout(mut self, enabled: bool) -> Self {
        self.config.stdout = enabled;
        self
    }

    /// Selects the mail alert sink. Error-level events are delivered as
    /// mail messages; everything below is ignored.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn mail_alert(mut self, config: MailAlertConfig) -> Self {
        self.config.mail_alert = Some(config);
        self
    }

    /// Replaces SMTP delivery with a custom [`AlertTransport`].
    ///
    /// Used by tests and local tooling that need to observe alerts without
    /// a mail relay.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn alert_transport(mut self, transport: Box<dyn AlertTransport>) -> Self {
        self.config.alert_transport = Some(transport);
        self
    }

    /// Selects the rotating file sink, writing to `<dir>/<name>.log`.
    pub fn file(self, dir: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut config = self.config;
        config.file_dir = Some(dir.into());
        LoggerBuilder { config, name: self.name, file_state: std::marker::PhantomData }
    }

    /// Consumes the builder and initializes the global tracing subscriber.
    ///
    /// With no sink selected this returns an inert handle and leaves the
    /// global dispatcher untouched, so a later bootstrap in the same process
    /// can still install one.
    ///
    /// # Returns
    /// A [`Logger`] handle. **Note:** This handle contains the background
    /// worker guards and must be kept alive for the duration of the program
    /// to ensure that non-blocking logs and queued alerts are flushed.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has already been set.
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        validate_config(&self.config, &self.name.0)?;

        let env_filter = build_env_filter(&self.config)?;

        let mut layers = Vec::new();
        let mut guard = None;
        let mut alert_guard = None;
        let mut attached = None;

        if let Some(mail) = self.config.mail_alert {
            let transport = match self.config.alert_transport {
                Some(transport) => transport,
                None => Box::new(SmtpAlertTransport::from_config(&mail)?),
            };
            let (alert_layer, g) = MailAlertLayer::new(&mail, transport);
            layers.push(alert_layer.boxed());
            alert_guard = Some(g);
            attached = Some(SinkKind::MailAlert);
        } else if self.config.stdout {
            layers.push(layer().compact().with_ansi(true).with_filter(LevelFilter::INFO).boxed());
            attached = Some(SinkKind::Stdout);
        } else if let Some(dir) = self.config.file_dir {
            fs::create_dir_all(&dir).context(format!("Creating log directory {}", dir.display()))?;

            let path = dir.join(format!("{}.{LOG_FILE_SUFFIX}", self.name.0));
            let writer =
                SizeRotatingWriter::new(path, self.config.max_bytes, self.config.backup_count)
                    .context("Opening the rotating log file")?;
            let (non_blocking, g) = tracing_appender::non_blocking(writer);

            layers.push(
                layer()
                    .event_format(SupportFormat)
                    .with_ansi(false)
                    .with_writer(non_blocking)
                    .with_filter(LevelFilter::INFO)
                    .boxed(),
            );
            guard = Some(g);
            attached = Some(SinkKind::RotatingFile);
        }

        if layers.is_empty() {
            return Ok(Logger { guard: None, alert_guard: None, attached: None });
        }

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

        Ok(Logger { guard, alert_guard, attached })
    }
}

/// A handle to the initialized logging system.
///
/// This struct holds the background worker guards. Drop this struct only
/// when the application is shutting down.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
    alert_guard: Option<AlertWorkerGuard>,
    attached: Option<SinkKind>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`] to configure the global tracing subscriber.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mdesk_logger::{LevelFilter, Logger};
    ///
    /// let _logger = Logger::builder()
    ///     .name("my-app")
    ///     .stdout(true)
    ///     .level(LevelFilter::DEBUG)
    ///     .init()
    ///     .unwrap();
    /// ```
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder {
            config: LoggerConfig::default(),
            name: NoName,
            file_state: std::marker::PhantomData,
        }
    }

    /// Manually triggers a flush of all pending logs in the non-blocking worker.
    ///
    /// While flushing happens automatically when this handle is dropped, this
    /// method acts as a best-effort synchronization point before shutdown.
    pub fn flush(&self) {
        tracing::debug!("Logger flushed");
    }

    /// Returns a reference to the underlying file worker guard, if present.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }

    /// Reports which sink this handle attached, if any.
    #[must_use]
    pub const fn attached(&self) -> Option<SinkKind> {
        self.attached
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.attached.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    let selected = usize::from(config.mail_alert.is_some())
        + usize::from(config.stdout)
        + usize::from(config.file_dir.is_some());
    if selected > 1 {
        return Err(LoggerError::InvalidConfiguration {
            message: "More than one sink selected. Pick mail alerts, stdout, or the log file."
                .into(),
            context: None,
        });
    }

    if config.file_dir.is_some() {
        if config.max_bytes == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_bytes must be greater than zero".into(),
                context: None,
            });
        }
        if config.backup_count == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "backup_count must be greater than zero".into(),
                context: None,
            });
        }
    }

    Ok(())
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::time::Duration;
    use tempfile::tempdir;

    fn alert_config() -> MailAlertConfig {
        MailAlertConfig {
            host: "localhost".to_owned(),
            port: 2525,
            use_tls: false,
            credentials: None,
            from: "server@example.com".to_owned(),
            to: "admin@example.com".to_owned(),
            subject: "Application Failure".to_owned(),
        }
    }

    #[test]
    #[serial]
    fn test_logger_builder_initial_state() {
        let logger_builder = Logger::builder().name("test-app").env_filter("mdesk=debug");
        assert!(!logger_builder.config.stdout);
        assert_eq!(logger_builder.config.level, LevelFilter::INFO);
        assert_eq!(logger_builder.config.max_bytes, DEFAULT_MAX_BYTES);
        assert_eq!(logger_builder.config.backup_count, DEFAULT_BACKUP_COUNT);
        assert_eq!(logger_builder.config.env_filter.as_deref(), Some("mdesk=debug"));
        assert!(logger_builder.config.file_dir.is_none());
        assert!(logger_builder.config.mail_alert.is_none());
    }

    #[test]
    #[serial]
    fn test_logger_builder_configuration() -> Result<(), LoggerError> {
        let tmp_dir = tempdir().map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some("Failed to create temp dir".into()),
        })?;
        let log_dir = tmp_dir.path().join("logs");
        let logger_builder = Logger::builder()
            .name("test-app")
            .env_filter("mdesk=info")
            .file(log_dir.clone())
            .max_bytes(2_048)
            .backup_count(5)
            .level(LevelFilter::DEBUG);

        assert!(!logger_builder.config.stdout);
        assert_eq!(logger_builder.config.level, LevelFilter::DEBUG);
        assert_eq!(logger_builder.config.max_bytes, 2_048);
        assert_eq!(logger_builder.config.backup_count, 5);
        assert_eq!(logger_builder.config.env_filter.as_deref(), Some("mdesk=info"));
        assert_eq!(logger_builder.config.file_dir.as_deref(), Some(log_dir.as_path()));

        Ok(())
    }

    #[test]
    #[serial]
    fn test_conflicting_sinks_are_rejected() {
        let result =
            Logger::builder().name("test-app").stdout(true).mail_alert(alert_config()).init();

        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    #[serial]
    fn test_no_sink_init_is_repeatable() -> Result<(), LoggerError> {
        for _ in 0..2 {
            let logger = Logger::builder().name("test-app").init()?;
            assert!(logger.attached().is_none());
            assert!(logger.guard().is_none());
        }
        Ok(())
    }

    #[test]
    #[serial]
    fn test_file_logging_setup() -> Result<(), LoggerError> {
        let tmp_dir = tempdir().map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some("Failed to create temp dir".into()),
        })?;
        let log_dir = tmp_dir.path().join("logs");

        let logger =
            Logger::builder().name("test-app").level(LevelFilter::INFO).file(&log_dir).init()?;
        assert_eq!(logger.attached(), Some(SinkKind::RotatingFile));

        tracing::info!("hello world");
        // Give the background worker a moment, then flush explicitly.
        std::thread::sleep(Duration::from_millis(20));
        logger.flush();

        assert!(log_dir.exists(), "log directory should be created by logger init");
        assert!(
            log_dir.join("test-app.log").exists(),
            "the log file should be named after the logger"
        );
        Ok(())
    }
}
