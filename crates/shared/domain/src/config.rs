use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level application configuration shared across subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub env: Environment,
    pub debug: bool,
    pub testing: bool,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub log: LogConfig,
    pub tunnel: TunnelConfig,
    pub theme: ThemeConfig,
    pub auth: AuthConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Deployment environment. Defaults to `production`; the development
/// tunnel only ever opens under `development`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

/// `SurrealDB` connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<DatabaseCredentials>,
}

/// `SurrealDB` root credentials (optional when using unauthenticated engines like mem://).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

/// Outbound mail (SMTP) settings. Both the mail-dispatch extension and
/// the error alert sink read from here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub server: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    pub default_sender: String,
}

impl MailConfig {
    /// Configured SMTP host. An empty string counts as unset.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.server.as_deref().filter(|s| !s.is_empty())
    }

    /// Username/password pair, present when at least one half is non-empty.
    /// The missing half is carried as an empty string so the pair stays usable.
    #[must_use]
    pub fn credentials(&self) -> Option<(String, String)> {
        let user = self.username.as_deref().unwrap_or_default();
        let pass = self.password.as_deref().unwrap_or_default();
        if user.is_empty() && pass.is_empty() {
            return None;
        }
        Some((user.to_owned(), pass.to_owned()))
    }
}

/// Error-report log sizing. The file sink keeps `backup_count` rotated
/// files of at most `max_bytes` each.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub to_stdout: bool,
    pub dir: PathBuf,
    pub max_bytes: u64,
    pub backup_count: usize,
}

/// Development tunnel settings. `agent_api` is the local introspection
/// endpoint of the tunnel agent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TunnelConfig {
    pub enabled: bool,
    pub agent_api: String,
}

/// Template styling assets served by the theme slice.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub asset_dir: PathBuf,
}

/// Login-session settings. `login_view` names the view unauthenticated
/// requests are redirected to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub login_view: String,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 5000 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_owned(),
            namespace: "mdesk".to_owned(),
            database: "core".to_owned(),
            credentials: Some(DatabaseCredentials::default()),
        }
    }
}

impl Default for DatabaseCredentials {
    fn default() -> Self {
        Self { username: "root".to_owned(), password: "root".to_owned() }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            server: None,
            port: 25,
            username: None,
            password: None,
            use_tls: false,
            default_sender: String::new(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { to_stdout: false, dir: PathBuf::from("logs"), max_bytes: 10_240, backup_count: 10 }
    }
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self { enabled: false, agent_api: "http://127.0.0.1:4040".to_owned() }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self { asset_dir: PathBuf::from("public") }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { login_view: "login".to_owned() }
    }
}
