// src/lifecycle/mod.rs
mod command;
mod controller;
mod signals;

pub use command::{Command, CommandError};
pub use controller::{ExitPlan, LifecycleController, ProcessExit, StdProcessExit, IMMEDIATE_EXIT};
pub use signals::ignore_signals;
