// src/cpu_load/pool.rs
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, info_span, Span};

use super::{LoadPhase, PhaseScheduler, PhaseStats};
use crate::metrics::MetricsCollector;

/// Logical CPUs this process may run on; 1 if unknown.
pub fn available_parallelism() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Clamp a configured worker count into `1..=available`.
pub fn worker_count(requested: i64, available: usize) -> usize {
    let available = i64::try_from(available.max(1)).unwrap_or(i64::MAX);
    requested.clamp(1, available) as usize
}

/// Start one OS thread per worker, each running its own copy of `script`.
///
/// The threads are detached in practice: nothing joins or cancels them, they
/// live until the script ends or the process exits. Handles are returned for
/// callers (tests) that want to wait.
pub fn spawn_workers(
    requested: i64,
    script: &[LoadPhase],
    metrics: Option<Arc<MetricsCollector>>,
) -> std::io::Result<Vec<JoinHandle<Vec<PhaseStats>>>> {
    let workers = worker_count(requested, available_parallelism());
    info!(requested, workers, phases = script.len(), "starting cpu load");

    let parent = Span::current();
    (0..workers)
        .map(|id| {
            let mut scheduler = PhaseScheduler::new(id, script.to_vec());
            if let Some(metrics) = &metrics {
                scheduler = scheduler.with_metrics(metrics.clone());
            }
            let span = info_span!(parent: &parent, "worker", id);

            thread::Builder::new()
                .name(format!("cpu-load-{id}"))
                .spawn(move || span.in_scope(|| scheduler.run()))
        })
        .collect()
}
