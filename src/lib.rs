// src/lib.rs
pub mod config;
pub mod cpu_load;
pub mod decision;
pub mod jitter;
pub mod lifecycle;
pub mod metrics;
pub mod server;
