// src/config/mod.rs
mod cli;
mod models;
mod plain;

pub use cli::Args;
pub use models::*;

use std::time::Duration;

/// Layer defaults, the optional config file and the command line / environment
/// into a validated [`Settings`].
///
/// Precedence, lowest first: built-in defaults, config file, environment, flags.
pub fn load_settings(args: &Args) -> Result<Settings, ConfigError> {
    let mut builder = ::config::Config::builder()
        .set_default("web.enable", true)?
        .set_default("web.listen", DEFAULT_WEB_LISTEN)?
        .set_default("web.delay", "0s")?
        .set_default("web.delay_jitter", "0s")?
        .set_default("exit.after", "0s")?
        .set_default("exit.after_jitter", "0s")?
        .set_default("exit.percent", 100i64)?
        .set_default("exit.code", i64::from(DEFAULT_EXIT_CODE))?
        .set_default("signals.ignore", false)?
        .set_default("cpu_load.enable", false)?
        .set_default("cpu_load.workers", 1i64)?;

    if let Some(path) = &args.config {
        builder = if path.extension().is_some() {
            builder.add_source(::config::File::from(path.as_path()).required(true))
        } else {
            plain::apply(builder, path)?
        };
    }

    let settings: Settings = args.apply_overrides(builder)?.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

/// Human-friendly duration parser: `250ms`, `1h 30m`, `1ns`, or a bare `0`.
pub fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    let s = s.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(s)
}
