// src/server/handler.rs
use hyper::{header, Body, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tower::Service;
use tracing::{info, Instrument};

use crate::config::DEFAULT_EXIT_CODE;
use crate::cpu_load::available_parallelism;
use crate::lifecycle::ProcessExit;
use crate::metrics::{MetricsCollector, MetricsRegistry};

/// Time given to hyper to flush the `/exit/` response before the process goes.
pub const EXIT_FLUSH_GRACE: Duration = Duration::from_millis(50);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct RequestHandler {
    exiter: Arc<dyn ProcessExit>,
    registry: Option<Arc<MetricsRegistry>>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RequestHandler {
    pub fn new(exiter: Arc<dyn ProcessExit>) -> Self {
        Self {
            exiter,
            registry: None,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, registry: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(registry.collector());
        self.registry = Some(registry);
        self
    }

    async fn handle(self, req: Request<Body>) -> Result<Response<Body>, BoxError> {
        let route = match (Route::of(req.uri().path()), &self.registry) {
            (Route::Metrics, None) => Route::Root,
            (route, _) => route,
        };
        if let Some(metrics) = &self.metrics {
            metrics.record_request(route.label());
        }

        match (route, &self.registry) {
            (Route::Exit, _) => self.exit(req.uri().query()),
            (Route::Metrics, Some(registry)) => metrics_text(registry),
            _ => self.root(),
        }
    }

    fn root(&self) -> Result<Response<Body>, BoxError> {
        info!("/ requested");
        let workers = tokio::runtime::Handle::try_current()
            .map(|handle| handle.metrics().num_workers())
            .unwrap_or(1);
        let body = format!(
            "numcpu: {}\nmaxprocs: {}\n",
            available_parallelism(),
            workers
        );

        Ok(Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::from(body))?)
    }

    fn exit(&self, query: Option<&str>) -> Result<Response<Body>, BoxError> {
        let code = exit_code_from_query(query);
        info!(code, "exit on http request");

        let exiter = self.exiter.clone();
        tokio::spawn(async move {
            tokio::time::sleep(EXIT_FLUSH_GRACE).await;
            exiter.exit(code);
        }
        .in_current_span());

        Ok(Response::builder()
            .status(StatusCode::OK)
            .body(Body::from(format!("exit {code}\n")))?)
    }
}

fn metrics_text(registry: &MetricsRegistry) -> Result<Response<Body>, BoxError> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
        .body(Body::from(registry.gather()?))?)
}

/// Mux-style routing: `/exit/` is a subtree and anything unmatched is `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Root,
    Exit,
    Metrics,
}

impl Route {
    fn of(path: &str) -> Self {
        if path == "/exit" || path.starts_with("/exit/") {
            Route::Exit
        } else if path == "/metrics" {
            Route::Metrics
        } else {
            Route::Root
        }
    }

    fn label(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Exit => "/exit/",
            Route::Metrics => "/metrics",
        }
    }
}

/// `code` query parameter if it is an integer in `0..=127`, else the default.
pub fn exit_code_from_query(query: Option<&str>) -> i32 {
    query
        .into_iter()
        .flat_map(|q| url::form_urlencoded::parse(q.as_bytes()))
        .find(|(key, _)| key == "code")
        .and_then(|(_, value)| value.parse::<i64>().ok())
        .filter(|code| (0..=127).contains(code))
        .map(|code| code as i32)
        .unwrap_or(DEFAULT_EXIT_CODE)
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = BoxError;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move {
            handler.handle(req).await.map_err(|e| {
                tracing::error!(%e, "request error");
                e
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_like_a_serve_mux() {
        for (path, expected) in [
            ("/", Route::Root),
            ("/healthz", Route::Root),
            ("/ready/deep", Route::Root),
            ("/exited", Route::Root),
            ("/exit", Route::Exit),
            ("/exit/", Route::Exit),
            ("/exit/now", Route::Exit),
            ("/metrics", Route::Metrics),
            ("/metrics/x", Route::Root),
        ] {
            assert_eq!(Route::of(path), expected, "path: {path}");
        }
    }

    #[test]
    fn exit_code_parsing() {
        for (query, expected) in [
            (Some("code=42"), 42),
            (Some("code=0"), 0),
            (Some("code=127"), 127),
            (Some("code=128"), DEFAULT_EXIT_CODE),
            (Some("code=200"), DEFAULT_EXIT_CODE),
            (Some("code=-1"), DEFAULT_EXIT_CODE),
            (Some("code=abc"), DEFAULT_EXIT_CODE),
            (Some("code="), DEFAULT_EXIT_CODE),
            (Some("other=5"), DEFAULT_EXIT_CODE),
            (Some("other=5&code=9"), 9),
            (None, DEFAULT_EXIT_CODE),
        ] {
            assert_eq!(exit_code_from_query(query), expected, "query: {query:?}");
        }
    }
}
