//! # Development Tunnel
//!
//! This crate drives the [ngrok](https://ngrok.com) agent for local
//! development: it spawns `ngrok http <port>` as a child process, waits on
//! the agent's local introspection API until the tunnel is registered, and
//! reports the public URL.
//!
//! The agent process is tied to the [`DevTunnel`] handle and is terminated
//! when the handle drops.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mdesk_tunnel::{DevTunnel, TunnelError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), TunnelError> {
//!     let tunnel = DevTunnel::open(5000, "http://127.0.0.1:4040").await?;
//!     tracing::info!(url = tunnel.public_url(), "tunnel ready");
//!     Ok(())
//! }
//! ```

mod error;

pub use error::{TunnelError, TunnelErrorExt};
use reqwest::Client;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, instrument};

const POLL_ATTEMPTS: u32 = 6;
const POLL_DELAY: Duration = Duration::from_millis(200);
const POLL_DELAY_CAP: Duration = Duration::from_millis(1_600);
const POLL_TIMEOUT: Duration = Duration::from_secs(2);

/// A running development tunnel.
///
/// Owns the agent child process; dropping the handle terminates it.
#[must_use = "Dropping this handle terminates the tunnel agent."]
#[derive(Debug)]
pub struct DevTunnel {
    child: Child,
    public_url: String,
    port: u16,
}

impl DevTunnel {
    /// Spawns the ngrok agent for `port` and waits until its tunnel is
    /// registered with the local agent API at `agent_api`.
    ///
    /// # Errors
    /// * [`TunnelError::Agent`] if the agent binary cannot be spawned.
    /// * [`TunnelError::Unavailable`] if no tunnel appears within the
    ///   polling budget. The spawned agent is terminated in that case.
    #[instrument]
    pub async fn open(port: u16, agent_api: &str) -> Result<Self, TunnelError> {
        let child = Command::new("ngrok")
            .arg("http")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("Spawning the ngrok agent")?;

        // The agent dies with `child` if discovery gives up.
        let public_url = discover(agent_api, port).await?;
        info!(%public_url, port, "Development tunnel established");

        Ok(Self { child, public_url, port })
    }

    /// The public URL forwarding to the tunnelled port.
    #[must_use]
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    /// The local port the tunnel forwards to.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Terminates the agent process.
    ///
    /// # Errors
    /// Returns [`TunnelError::Agent`] if the process cannot be killed.
    pub async fn close(mut self) -> Result<(), TunnelError> {
        self.child.kill().await.context("Terminating the ngrok agent")?;
        Ok(())
    }
}

impl Drop for DevTunnel {
    fn drop(&mut self) {
        info!(public_url = %self.public_url, "Development tunnel closed");
    }
}

/// Polls the agent introspection API until a tunnel forwarding to `port`
/// shows up, returning its public URL.
///
/// Separated from [`DevTunnel::open`] so it can run against any agent,
/// including stub APIs in tests.
///
/// # Errors
/// * [`TunnelError::Http`] if the API client cannot be built.
/// * [`TunnelError::Unavailable`] if the polling budget runs out.
pub async fn discover(agent_api: &str, port: u16) -> Result<String, TunnelError> {
    let client = Client::builder()
        .timeout(POLL_TIMEOUT)
        .build()
        .context("Building the agent API client")?;
    let endpoint = format!("{}/api/tunnels", agent_api.trim_end_matches('/'));

    let mut delay = POLL_DELAY;
    for attempt in 1..=POLL_ATTEMPTS {
        match fetch_tunnels(&client, &endpoint).await {
            Ok(tunnels) => {
                if let Some(url) = select_tunnel(&tunnels, port) {
                    return Ok(url);
                }
                debug!(attempt, "Agent is up, tunnel not registered yet");
            }
            Err(error) => debug!(attempt, %error, "Agent API not reachable yet"),
        }

        if attempt < POLL_ATTEMPTS {
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(POLL_DELAY_CAP);
        }
    }

    Err(TunnelError::Unavailable {
        message: format!("No tunnel forwarding to port {port} appeared").into(),
        context: Some(endpoint.into()),
    })
}

async fn fetch_tunnels(client: &Client, endpoint: &str) -> Result<Vec<TunnelInfo>, reqwest::Error> {
    let list: TunnelList = client.get(endpoint).send().await?.error_for_status()?.json().await?;
    Ok(list.tunnels)
}

/// Picks the tunnel forwarding to `port`, preferring the https entry when
/// the agent registered several protocols.
fn select_tunnel(tunnels: &[TunnelInfo], port: u16) -> Option<String> {
    let suffix = format!(":{port}");
    let forwarding = |t: &&TunnelInfo| t.config.addr.ends_with(suffix.as_str());

    tunnels
        .iter()
        .filter(forwarding)
        .find(|t| t.proto == "https")
        .or_else(|| tunnels.iter().find(forwarding))
        .map(|t| t.public_url.clone())
}

#[derive(Debug, Deserialize)]
struct TunnelList {
    tunnels: Vec<TunnelInfo>,
}

#[derive(Debug, Deserialize)]
struct TunnelInfo {
    public_url: String,
    #[serde(default)]
    proto: String,
    config: TunnelTarget,
}

#[derive(Debug, Deserialize)]
struct TunnelTarget {
    addr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tunnel(public_url: &str, proto: &str, addr: &str) -> TunnelInfo {
        TunnelInfo {
            public_url: public_url.to_owned(),
            proto: proto.to_owned(),
            config: TunnelTarget { addr: addr.to_owned() },
        }
    }

    #[test]
    fn selects_the_tunnel_forwarding_to_the_port() {
        let tunnels = vec![
            tunnel("tcp://0.tcp.ngrok.io:10022", "tcp", "localhost:22"),
            tunnel("https://example.ngrok-free.app", "https", "http://localhost:5000"),
        ];

        assert_eq!(
            select_tunnel(&tunnels, 5000).as_deref(),
            Some("https://example.ngrok-free.app")
        );
        assert_eq!(select_tunnel(&tunnels, 8080), None);
    }

    #[test]
    fn prefers_https_when_both_protocols_are_registered() {
        let tunnels = vec![
            tunnel("http://example.ngrok-free.app", "http", "http://localhost:5000"),
            tunnel("https://example.ngrok-free.app", "https", "http://localhost:5000"),
        ];

        assert_eq!(
            select_tunnel(&tunnels, 5000).as_deref(),
            Some("https://example.ngrok-free.app")
        );
    }

    #[test]
    fn falls_back_to_the_only_registered_protocol() {
        let tunnels = vec![tunnel("http://example.ngrok-free.app", "http", "http://localhost:5000")];

        assert_eq!(
            select_tunnel(&tunnels, 5000).as_deref(),
            Some("http://example.ngrok-free.app")
        );
    }
}
