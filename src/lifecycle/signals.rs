// src/lifecycle/signals.rs
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{info, Instrument};

use crate::metrics::MetricsCollector;

/// Take over the shutdown signals so they no longer terminate the process;
/// each one is only logged.
///
/// Handlers are installed before this returns. The listening task runs until
/// the process exits.
#[cfg(unix)]
pub fn ignore_signals(
    started: Instant,
    metrics: Option<Arc<MetricsCollector>>,
) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut abort = signal(SignalKind::from_raw(libc::SIGABRT))?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut pipe = signal(SignalKind::pipe())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            let name = tokio::select! {
                _ = abort.recv() => "SIGABRT",
                _ = hangup.recv() => "SIGHUP",
                _ = interrupt.recv() => "SIGINT",
                _ = pipe.recv() => "SIGPIPE",
                _ = terminate.recv() => "SIGTERM",
            };
            record(name, started, metrics.as_deref());
        }
    }
    .in_current_span()))
}

#[cfg(not(unix))]
pub fn ignore_signals(
    started: Instant,
    metrics: Option<Arc<MetricsCollector>>,
) -> std::io::Result<JoinHandle<()>> {
    let mut ctrl_c = tokio::signal::windows::ctrl_c()?;

    Ok(tokio::spawn(async move {
        while ctrl_c.recv().await.is_some() {
            record("CTRL_C", started, metrics.as_deref());
        }
    }
    .in_current_span()))
}

fn record(name: &str, started: Instant, metrics: Option<&MetricsCollector>) {
    info!(signal = name, after = ?started.elapsed(), "ignore signal");
    if let Some(metrics) = metrics {
        metrics.record_ignored_signal(name);
    }
}
