// src/cpu_load/scheduler.rs
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span};

use super::LoadPhase;
use crate::metrics::MetricsCollector;

/// Length of one work/sleep duty cycle.
pub const DEFAULT_CYCLE: Duration = Duration::from_millis(100);

/// Inner loop length between deadline checks.
const SPIN_BATCH: u64 = 1_000;

/// What a single phase actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    pub elapsed: Duration,
    pub cycles: u64,
    pub busy_iterations: u64,
}

/// Runs a load script from the first phase to the last, blocking the caller.
///
/// Meant to own a dedicated OS thread: busy slices never yield, so running
/// this on an async executor would starve it.
pub struct PhaseScheduler {
    worker: usize,
    script: Vec<LoadPhase>,
    cycle: Duration,
    metrics: Option<Arc<MetricsCollector>>,
}

impl PhaseScheduler {
    pub fn new(worker: usize, script: impl Into<Vec<LoadPhase>>) -> Self {
        Self {
            worker,
            script: script.into(),
            cycle: DEFAULT_CYCLE,
            metrics: None,
        }
    }

    pub fn with_cycle(mut self, cycle: Duration) -> Self {
        if !cycle.is_zero() {
            self.cycle = cycle;
        }
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn cycle(&self) -> Duration {
        self.cycle
    }

    /// Execute every phase in order. Each call starts again at phase 0.
    pub fn run(&self) -> Vec<PhaseStats> {
        let mut all = Vec::with_capacity(self.script.len());

        for (index, phase) in self.script.iter().enumerate() {
            let span = info_span!("phase", index, percent = phase.target_percent());
            let _enter = span.enter();

            info!(duration = ?phase.duration, "load phase started");
            if let Some(metrics) = &self.metrics {
                metrics.update_target_percent(self.worker, phase.target_percent());
            }

            let stats = self.run_phase(*phase);

            debug!(
                elapsed = ?stats.elapsed,
                cycles = stats.cycles,
                busy_iterations = stats.busy_iterations,
                "load phase finished"
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_phase_completed(self.worker);
            }
            all.push(stats);
        }

        if let Some(metrics) = &self.metrics {
            metrics.update_target_percent(self.worker, 0);
        }
        info!(phases = all.len(), "load script finished");
        all
    }

    /// Duty-cycle one phase until its wall-clock deadline.
    pub fn run_phase(&self, phase: LoadPhase) -> PhaseStats {
        let start = Instant::now();
        let deadline = start + phase.duration;
        let mut stats = PhaseStats::default();

        if phase.is_idle() {
            thread::sleep(phase.duration);
            stats.elapsed = start.elapsed();
            return stats;
        }

        let busy = self
            .cycle
            .mul_f64(f64::from(phase.target_percent()) / 100.0);

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            stats.cycles += 1;

            let cycle_end = (now + self.cycle).min(deadline);
            let busy_until = (now + busy).min(cycle_end);
            stats.busy_iterations += spin_until(busy_until);

            let now = Instant::now();
            if now < cycle_end {
                thread::sleep(cycle_end - now);
            }
        }

        stats.elapsed = start.elapsed();
        stats
    }
}

/// Burn CPU until `deadline`; returns the number of batches executed.
fn spin_until(deadline: Instant) -> u64 {
    let mut batches = 0u64;
    let mut acc = 0u64;

    while Instant::now() < deadline {
        for i in 0..SPIN_BATCH {
            acc = black_box(acc.wrapping_mul(31).wrapping_add(i));
        }
        batches += 1;
    }

    black_box(acc);
    batches
}
