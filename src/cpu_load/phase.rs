// src/cpu_load/phase.rs
use std::time::Duration;

/// One step of the load script: hold `percent` CPU for `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPhase {
    pub percent: u8,
    pub duration: Duration,
}

impl LoadPhase {
    pub const fn new(percent: u8, duration: Duration) -> Self {
        Self { percent, duration }
    }

    /// Percent clamped into `0..=100`.
    pub fn target_percent(&self) -> u8 {
        self.percent.min(100)
    }

    pub fn is_idle(&self) -> bool {
        self.target_percent() == 0
    }
}

/// Warm up, ramp to full load, step back down, then stay idle.
pub const DEFAULT_SCRIPT: &[LoadPhase] = &[
    LoadPhase::new(0, Duration::from_secs(10)),
    LoadPhase::new(25, Duration::from_secs(30)),
    LoadPhase::new(50, Duration::from_secs(30)),
    LoadPhase::new(75, Duration::from_secs(30)),
    LoadPhase::new(100, Duration::from_secs(60)),
    LoadPhase::new(50, Duration::from_secs(30)),
    LoadPhase::new(0, Duration::from_secs(60)),
    LoadPhase::new(100, Duration::from_secs(30)),
    LoadPhase::new(0, Duration::from_secs(30)),
];
