// src/cpu_load/mod.rs
mod phase;
mod pool;
mod scheduler;

pub use phase::{LoadPhase, DEFAULT_SCRIPT};
pub use pool::{available_parallelism, spawn_workers, worker_count};
pub use scheduler::{PhaseScheduler, PhaseStats, DEFAULT_CYCLE};
