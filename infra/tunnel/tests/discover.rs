use axum::routing::get;
use axum::{Json, Router};
use mdesk_tunnel::TunnelError;
use serde_json::json;
use std::net::SocketAddr;

async fn spawn_agent_stub(tunnels: serde_json::Value) -> SocketAddr {
    let app = Router::new().route("/api/tunnels", get(move || async move { Json(tunnels) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub agent");
    let addr = listener.local_addr().expect("stub agent address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub agent");
    });

    addr
}

#[tokio::test]
async fn discover_returns_the_public_url_for_the_requested_port() {
    let addr = spawn_agent_stub(json!({
        "tunnels": [
            {
                "public_url": "tcp://0.tcp.ngrok.io:10022",
                "proto": "tcp",
                "config": { "addr": "localhost:22", "inspect": false }
            },
            {
                "public_url": "https://example.ngrok-free.app",
                "proto": "https",
                "config": { "addr": "http://localhost:5000", "inspect": true }
            }
        ],
        "uri": "/api/tunnels"
    }))
    .await;

    let url = mdesk_tunnel::discover(&format!("http://{addr}"), 5000)
        .await
        .expect("tunnel should be discovered");

    assert_eq!(url, "https://example.ngrok-free.app");
}

#[tokio::test]
async fn discover_gives_up_when_no_tunnel_forwards_to_the_port() {
    let addr = spawn_agent_stub(json!({ "tunnels": [], "uri": "/api/tunnels" })).await;

    let err = mdesk_tunnel::discover(&format!("http://{addr}"), 5000)
        .await
        .expect_err("an empty agent should exhaust the polling budget");

    assert!(matches!(err, TunnelError::Unavailable { .. }));
}
