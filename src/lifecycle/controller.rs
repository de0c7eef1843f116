// src/lifecycle/controller.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, Instrument};

use crate::decision::EffectiveSettings;
use crate::metrics::MetricsCollector;

/// An exit delay of exactly this long means "exit at startup".
pub const IMMEDIATE_EXIT: Duration = Duration::from_nanos(1);

/// Ends the process. Abstracted so tests can observe the requested code.
pub trait ProcessExit: Send + Sync {
    fn exit(&self, code: i32);
}

/// Terminates the whole process via [`std::process::exit`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdProcessExit;

impl ProcessExit for StdProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPlan {
    Never,
    Immediately,
    After(Duration),
}

impl From<&EffectiveSettings> for ExitPlan {
    fn from(settings: &EffectiveSettings) -> Self {
        if !settings.should_exit {
            ExitPlan::Never
        } else if settings.exit_after == IMMEDIATE_EXIT {
            ExitPlan::Immediately
        } else {
            ExitPlan::After(settings.exit_after)
        }
    }
}

/// Turns the resolved exit decision into an actual process exit.
pub struct LifecycleController {
    exit_code: i32,
    exiter: Arc<dyn ProcessExit>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl LifecycleController {
    pub fn new(exit_code: i32, exiter: Arc<dyn ProcessExit>) -> Self {
        Self {
            exit_code,
            exiter,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Act on `settings`. Call before starting any other subsystem: an
    /// immediate exit happens synchronously right here.
    ///
    /// A delayed exit runs as a detached task that cannot be cancelled; the
    /// returned handle only exists so callers may await it.
    pub fn apply(&self, settings: &EffectiveSettings) -> Option<JoinHandle<()>> {
        match ExitPlan::from(settings) {
            ExitPlan::Never => None,
            ExitPlan::Immediately => {
                info!(code = self.exit_code, "exit at startup");
                self.exiter.exit(self.exit_code);
                None
            }
            ExitPlan::After(delay) => {
                info!(after = ?delay, code = self.exit_code, "exit scheduled");
                if let Some(metrics) = &self.metrics {
                    metrics.update_exit_scheduled(true);
                }

                let exiter = self.exiter.clone();
                let code = self.exit_code;
                Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    info!(code, "exit after sleep");
                    exiter.exit(code);
                }
                .in_current_span()))
            }
        }
    }
}
