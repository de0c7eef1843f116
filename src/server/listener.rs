// src/server/listener.rs
// Low-level TCP bind, kept apart from the accept loop.
use anyhow::{Context, Result};
use tokio::net::TcpListener;

/// Bind `addr` (`host:port`), resolving host names first.
pub async fn bind_tcp(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind http listener on {addr}"))?;
    Ok(listener)
}
