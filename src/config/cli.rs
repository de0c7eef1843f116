// src/config/cli.rs
use ::config::builder::{ConfigBuilder, DefaultState};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use super::parse_duration;

/// Chaos helper: exits on schedule or on request, delays its listener and
/// burns CPU in a fixed pattern.
///
/// Every flag can also be given through the environment variable named
/// after it or through the `--config` file.
#[derive(Debug, Clone, Parser)]
#[command(name = "troublemaker")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// config file; format follows the extension (toml, yaml, json, ini),
    /// files without one hold `flag.name value` lines
    #[arg(long, env = "CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// enable http server
    #[arg(
        long = "web.enable",
        env = "WEB_ENABLE",
        value_name = "BOOL",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub web_enable: Option<bool>,

    /// http server bind addr [default: 0.0.0.0:8092]
    #[arg(long = "web.listen", env = "WEB_LISTEN", value_name = "ADDR")]
    pub web_listen: Option<String>,

    /// sleep duration before starting http server
    #[arg(long = "web.delay", env = "WEB_DELAY", value_parser = parse_duration)]
    pub web_delay: Option<Duration>,

    /// web delay +/- jitter
    #[arg(long = "web.delay.jitter", env = "WEB_DELAY_JITTER", value_parser = parse_duration)]
    pub web_delay_jitter: Option<Duration>,

    /// exit with exit.code once elapsed if > 0; 1ns exits asap
    #[arg(long = "exit.after", env = "EXIT_AFTER", value_parser = parse_duration)]
    pub exit_after: Option<Duration>,

    /// exit after +/- jitter
    #[arg(long = "exit.after.jitter", env = "EXIT_AFTER_JITTER", value_parser = parse_duration)]
    pub exit_after_jitter: Option<Duration>,

    /// % chance to exit if exit.after is set [default: 100]
    #[arg(long = "exit.percent", env = "EXIT_PERCENT", allow_negative_numbers = true)]
    pub exit_percent: Option<i64>,

    /// exit code when exiting [default: 1]
    #[arg(long = "exit.code", env = "EXIT_CODE", allow_negative_numbers = true)]
    pub exit_code: Option<i32>,

    /// ignore shutdown signals
    #[arg(
        long = "signals.ignore",
        env = "SIGNALS_IGNORE",
        value_name = "BOOL",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub signals_ignore: Option<bool>,

    /// run the cpu load script
    #[arg(
        long = "cpu-load.enable",
        env = "CPU_LOAD_ENABLE",
        value_name = "BOOL",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub cpu_load_enable: Option<bool>,

    /// cpu load workers, clamped to 1..=available cores [default: 1]
    #[arg(long = "cpu-load.workers", env = "CPU_LOAD_WORKERS", allow_negative_numbers = true)]
    pub cpu_load_workers: Option<i64>,

    /// seed1 for random generator [default: random]
    #[arg(long = "rand.seed1", env = "RAND_SEED1")]
    pub rand_seed1: Option<u64>,

    /// seed2 for random generator [default: random]
    #[arg(long = "rand.seed2", env = "RAND_SEED2")]
    pub rand_seed2: Option<u64>,

    /// optional subcommand: `sleep <duration>`
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Flag names and the settings keys they set.
pub(super) const FLAG_KEYS: &[(&str, &str)] = &[
    ("web.enable", "web.enable"),
    ("web.listen", "web.listen"),
    ("web.delay", "web.delay"),
    ("web.delay.jitter", "web.delay_jitter"),
    ("exit.after", "exit.after"),
    ("exit.after.jitter", "exit.after_jitter"),
    ("exit.percent", "exit.percent"),
    ("exit.code", "exit.code"),
    ("signals.ignore", "signals.ignore"),
    ("cpu-load.enable", "cpu_load.enable"),
    ("cpu-load.workers", "cpu_load.workers"),
    ("rand.seed1", "rand.seed1"),
    ("rand.seed2", "rand.seed2"),
];

impl Args {
    /// Push every flag (or env var) that was actually given on top of `builder`.
    pub(super) fn apply_overrides(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ::config::ConfigError> {
        let human = |d: Option<Duration>| d.map(|d| humantime::format_duration(d).to_string());

        builder
            .set_override_option("web.enable", self.web_enable)?
            .set_override_option("web.listen", self.web_listen.clone())?
            .set_override_option("web.delay", human(self.web_delay))?
            .set_override_option("web.delay_jitter", human(self.web_delay_jitter))?
            .set_override_option("exit.after", human(self.exit_after))?
            .set_override_option("exit.after_jitter", human(self.exit_after_jitter))?
            .set_override_option("exit.percent", self.exit_percent)?
            .set_override_option("exit.code", self.exit_code.map(i64::from))?
            .set_override_option("signals.ignore", self.signals_ignore)?
            .set_override_option("cpu_load.enable", self.cpu_load_enable)?
            .set_override_option("cpu_load.workers", self.cpu_load_workers)?
            .set_override_option("rand.seed1", self.rand_seed1)?
            .set_override_option("rand.seed2", self.rand_seed2)
    }
}
