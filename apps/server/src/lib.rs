//! # MailDesk Server
//!
//! The application bootstrapper: reads configuration, binds the
//! persistence, mail, theme, and auth extensions to one shared state, opens
//! the development tunnel when asked to, and attaches the error-report
//! sink that matches the runtime mode.
//!
//! ## Example
//! ```no_run
//! use mdesk_server::App;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     App::builder()
//!         .port(4583)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result, anyhow};
use axum_server::Handle;
use mdesk::domain::config::AppConfig;
use mdesk::domain::constants::APP_NAME;
use mdesk::kernel::server::AppState;
use mdesk_database::Database;
use mdesk_logger::{Logger, MailAlertConfig, SinkContext, SinkKind, resolve};
use mdesk_mailer::Mailer;
use mdesk_tunnel::DevTunnel;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

/// Decides whether the bootstrap opens a public tunnel: development
/// environment with the tunnel flag set, nothing else.
#[must_use]
pub fn tunnel_requested(config: &AppConfig) -> bool {
    config.env.is_development() && config.tunnel.enabled
}

/// Derives the failure-alert envelope from the mail settings: reports go
/// from `noreply@<mail.server>` to `mail.default_sender` under a fixed
/// subject, over the same transport settings the mail extension uses.
///
/// # Errors
/// Returns an error when no mail server is configured.
pub fn alert_envelope(config: &AppConfig) -> Result<MailAlertConfig> {
    let host =
        config.mail.host().ok_or_else(|| anyhow!("Mail sink selected without a mail server"))?;

    Ok(MailAlertConfig {
        host: host.to_owned(),
        port: config.mail.port,
        use_tls: config.mail.use_tls,
        credentials: config.mail.credentials(),
        from: format!("noreply@{host}"),
        to: config.mail.default_sender.clone(),
        subject: "MailDesk Failure".to_owned(),
    })
}

/// A fluent builder for configuring and initializing the [`App`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct AppBuilder {
    cfg: AppConfig,
}

impl AppBuilder {
    /// Set up the application's configuration.
    pub fn config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    fn validate_config(&self) -> Result<()> {
        if self.cfg.log.backup_count == 0 {
            anyhow::bail!("log.backup_count must be at least 1");
        }
        if self.cfg.mail.host().is_some() && self.cfg.mail.default_sender.is_empty() {
            anyhow::bail!("mail.default_sender is required when mail.server is set");
        }
        Ok(())
    }

    async fn init_database(&self) -> Result<Database> {
        let db_cfg = &self.cfg.database;
        let mut builder =
            Database::builder().url(&db_cfg.url).session(&db_cfg.namespace, &db_cfg.database);

        if let Some(creds) = &db_cfg.credentials {
            builder = builder.auth(&creds.username, &creds.password);
        }

        builder.init().await.context("Failed to establish database connection")
    }

    fn init_mailer(&self) -> Result<Option<Mailer>> {
        let Some(host) = self.cfg.mail.host() else {
            return Ok(None);
        };

        let mut builder = Mailer::builder()
            .host(host)
            .port(self.cfg.mail.port)
            .use_tls(self.cfg.mail.use_tls)
            .sender(&self.cfg.mail.default_sender);

        if let Some((username, password)) = self.cfg.mail.credentials() {
            builder = builder.credentials(username, password);
        }

        builder.init().map(Some).context("Failed to configure the mail extension")
    }

    async fn open_tunnel(&self) -> Result<Option<DevTunnel>> {
        if !tunnel_requested(&self.cfg) {
            return Ok(None);
        }

        let tunnel = DevTunnel::open(self.cfg.server.port, &self.cfg.tunnel.agent_api)
            .await
            .context("Failed to open the development tunnel")?;

        // The address must reach stdout even before any log sink exists.
        #[allow(clippy::print_stdout)]
        {
            println!(" * Tunnel URL: {}", tunnel.public_url());
        }

        Ok(Some(tunnel))
    }

    fn init_logger(&self) -> Result<Logger> {
        let context = SinkContext {
            debug: self.cfg.debug,
            testing: self.cfg.testing,
            mail_configured: self.cfg.mail.host().is_some(),
            log_to_stdout: self.cfg.log.to_stdout,
        };

        let logger = match resolve(context) {
            None => Logger::builder().name(APP_NAME).init()?,
            Some(SinkKind::MailAlert) => {
                Logger::builder().name(APP_NAME).mail_alert(alert_envelope(&self.cfg)?).init()?
            }
            Some(SinkKind::Stdout) => Logger::builder().name(APP_NAME).stdout(true).init()?,
            Some(SinkKind::RotatingFile) => {
                let logger = Logger::builder()
                    .name(APP_NAME)
                    .file(&self.cfg.log.dir)
                    .max_bytes(self.cfg.log.max_bytes)
                    .backup_count(self.cfg.log.backup_count)
                    .init()?;

                info!("MailDesk startup");

                logger
            }
        };

        Ok(logger)
    }

    /// Consumes the builder and initializes the application.
    ///
    /// # Process
    /// 1. Validates the configuration bounds
    /// 2. Establishes the database connection (migrations apply inside)
    /// 3. Builds the mail extension when a mail server is configured
    /// 4. Binds the feature slices in order via the `mdesk` facade
    /// 5. Folds everything into the shared [`AppState`]
    /// 6. Opens the development tunnel when requested
    /// 7. Resolves and attaches the error-report sink
    ///
    /// # Errors
    /// Returns an error if:
    /// * The configuration fails validation
    /// * Database connection or migration fails
    /// * The mail transport cannot be configured
    /// * The tunnel agent cannot be spawned or never reports a tunnel
    /// * Sink installation fails (e.g. the log directory is not writable)
    pub async fn build(self) -> Result<App> {
        // 1. Validate configuration
        self.validate_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);

        info!(
            address = %address,
            "Initializing application"
        );

        // 2. Bind persistence (schema migrations run during init)
        let db = self.init_database().await?;

        // 3. Bind mail dispatch, absent without a configured server
        let mailer = self.init_mailer()?;

        // 4. Bind feature slices (theme, then auth)
        let slices = mdesk::init(&self.cfg).map_err(|e| anyhow!("Feature bootstrap failed: {e}"))?;

        // 5. Construct state using functional folding
        let state = slices
            .into_iter()
            .fold(
                AppState::builder().config(self.cfg.clone()).db(db).mailer(mailer),
                |builder, slice| builder.register_slice(slice),
            )
            .build()
            .context("Failed to finalize the application state registry")?;

        // 6. Development tunnel (development environment + flag only)
        let tunnel = self.open_tunnel().await?;

        // 7. Attach the sink the runtime mode calls for
        let logger = self.init_logger()?;

        Ok(App { state, tunnel, logger })
    }
}

/// A fully initialized application instance ready to run.
///
/// This struct is returned by [`AppBuilder::build`] and owns the runtime
/// state, the tunnel handle, and the logging worker guards.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct App {
    state: AppState,
    tunnel: Option<DevTunnel>,
    logger: Logger,
}

impl App {
    /// Returns a new [`AppBuilder`] to configure the application.
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// The attached error-report sink, `None` in debug/testing runs.
    #[must_use]
    pub const fn sink(&self) -> Option<SinkKind> {
        self.logger.attached()
    }

    /// Public address of the development tunnel when one is open.
    #[must_use]
    pub fn tunnel_url(&self) -> Option<&str> {
        self.tunnel.as_ref().map(DevTunnel::public_url)
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured
    /// address or if the router cannot be assembled.
    pub async fn run(self) -> Result<()> {
        let App { state, tunnel, logger } = self;

        let address = SocketAddr::new(state.config.server.address, state.config.server.port);

        info!(
            address = %address,
            "Starting server"
        );

        let app = router::init(state).context("Failed to assemble the router")?;

        // Graceful shutdown plumbing
        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
        });

        info!("Starting HTTP server on http://{address}");

        axum_server::bind(address)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("HTTP server failed")?;

        if let Some(tunnel) = tunnel {
            tunnel.close().await.context("Failed to stop the tunnel agent")?;
        }

        info!("Server shutdown complete");
        logger.flush();

        Ok(())
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
