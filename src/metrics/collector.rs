// src/metrics/collector.rs
use anyhow::Result;
use prometheus::{Encoder, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    /// Text exposition of everything registered.
    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    // HTTP
    pub http_requests_total: IntCounterVec,

    // CPU load
    pub cpu_load_target_percent: IntGaugeVec,
    pub cpu_load_phases_total: IntCounterVec,

    // Lifecycle
    pub ignored_signals_total: IntCounterVec,
    pub exit_scheduled: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let http_requests_total = IntCounterVec::new(
            Opts::new("troublemaker_http_requests_total", "Total HTTP requests"),
            &["path"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let cpu_load_target_percent = IntGaugeVec::new(
            Opts::new(
                "troublemaker_cpu_load_target_percent",
                "Target CPU percent of the phase each worker is running",
            ),
            &["worker"],
        )?;
        registry.register(Box::new(cpu_load_target_percent.clone()))?;

        let cpu_load_phases_total = IntCounterVec::new(
            Opts::new(
                "troublemaker_cpu_load_phases_total",
                "Completed CPU load phases",
            ),
            &["worker"],
        )?;
        registry.register(Box::new(cpu_load_phases_total.clone()))?;

        let ignored_signals_total = IntCounterVec::new(
            Opts::new(
                "troublemaker_ignored_signals_total",
                "Shutdown signals received and ignored",
            ),
            &["signal"],
        )?;
        registry.register(Box::new(ignored_signals_total.clone()))?;

        let exit_scheduled = IntGauge::new(
            "troublemaker_exit_scheduled",
            "Delayed exit pending (1=scheduled, 0=none)",
        )?;
        registry.register(Box::new(exit_scheduled.clone()))?;

        Ok(Self {
            http_requests_total,
            cpu_load_target_percent,
            cpu_load_phases_total,
            ignored_signals_total,
            exit_scheduled,
        })
    }

    pub fn record_request(&self, path: &str) {
        self.http_requests_total.with_label_values(&[path]).inc();
    }

    pub fn update_target_percent(&self, worker: usize, percent: u8) {
        self.cpu_load_target_percent
            .with_label_values(&[&worker.to_string()])
            .set(i64::from(percent));
    }

    pub fn record_phase_completed(&self, worker: usize) {
        self.cpu_load_phases_total
            .with_label_values(&[&worker.to_string()])
            .inc();
    }

    pub fn record_ignored_signal(&self, signal: &str) {
        self.ignored_signals_total.with_label_values(&[signal]).inc();
    }

    pub fn update_exit_scheduled(&self, scheduled: bool) {
        self.exit_scheduled.set(if scheduled { 1 } else { 0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_exposes_recorded_values() {
        let registry = MetricsRegistry::new().unwrap();
        let metrics = registry.collector();

        metrics.record_request("/");
        metrics.record_request("/");
        metrics.update_target_percent(0, 75);
        metrics.record_ignored_signal("SIGTERM");
        metrics.update_exit_scheduled(true);

        let text = String::from_utf8(registry.gather().unwrap()).unwrap();
        assert!(text.contains(r#"troublemaker_http_requests_total{path="/"} 2"#));
        assert!(text.contains(r#"troublemaker_cpu_load_target_percent{worker="0"} 75"#));
        assert!(text.contains(r#"troublemaker_ignored_signals_total{signal="SIGTERM"} 1"#));
        assert!(text.contains("troublemaker_exit_scheduled 1"));
    }
}
