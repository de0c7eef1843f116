// src/server/builder.rs
use crate::server::listener::bind_tcp;
use anyhow::{anyhow, Result};
use hyper::{server::conn::Http, Body, Request, Response};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::Service;
use tracing::Instrument;

/// Binds the listener and hands every connection to a clone of the handler.
pub struct ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    addr: String,
    delay: Duration,
    handler: Option<H>,
}

impl<H> ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            delay: Duration::ZERO,
            handler: None,
        }
    }

    pub fn with_handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Sleep this long before binding.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Wait out the delay, bind, then accept forever.
    pub async fn serve(self) -> Result<()> {
        let handler = self
            .handler
            .ok_or_else(|| anyhow!("handler must be set via with_handler()"))?;

        if !self.delay.is_zero() {
            tracing::info!(delay = ?self.delay, "delaying http listener");
            tokio::time::sleep(self.delay).await;
        }

        let listener = bind_tcp(&self.addr).await?;
        tracing::info!(addr = %self.addr, "listen");

        accept_loop(listener, handler).await
    }
}

/// Accept connections on an already bound listener, one task per connection.
async fn accept_loop<H>(listener: TcpListener, handler: H) -> Result<()>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    loop {
        let (stream, peer) = listener.accept().await?;
        let svc = handler.clone();

        tokio::spawn(async move {
            let http = Http::new();
            if let Err(err) = http.serve_connection(stream, svc).await {
                tracing::warn!(%peer, %err, "connection error");
            }
        }
        .in_current_span());
    }
}
