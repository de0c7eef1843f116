// src/decision/resolver.rs
use serde::Serialize;
use std::time::Duration;

use crate::config::Settings;
use crate::jitter::JitterSource;

/// Bases shorter than this are returned untouched by [`jittered`].
pub const MIN_JITTER_BASE: Duration = Duration::from_nanos(2);

/// The concrete decisions for this run, computed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectiveSettings {
    #[serde(serialize_with = "as_human")]
    pub exit_after: Duration,
    #[serde(serialize_with = "as_human")]
    pub web_delay: Duration,
    pub should_exit: bool,
}

/// Resolve the jittered delays and the exit decision.
///
/// Draw order is fixed: exit-after jitter, web-delay jitter, exit probability.
pub fn resolve(settings: &Settings, jitter: &mut impl JitterSource) -> EffectiveSettings {
    let exit_after = jittered(settings.exit.after, settings.exit.after_jitter, jitter);
    let web_delay = jittered(settings.web.delay, settings.web.delay_jitter, jitter);
    let should_exit = !settings.exit.after.is_zero()
        && (settings.exit.percent == 100
            || jitter.next_unit_f64() <= settings.exit.percent as f64 / 100.0);

    EffectiveSettings {
        exit_after,
        web_delay,
        should_exit,
    }
}

/// `base` moved uniformly within `[-bound, +bound)`, never below zero.
pub fn jittered(base: Duration, bound: Duration, jitter: &mut impl JitterSource) -> Duration {
    if bound.is_zero() || base < MIN_JITTER_BASE {
        return base;
    }

    let base = nanos(base);
    let bound = nanos(bound);
    let offset = jitter.next_i64_below(bound.saturating_mul(2)) - bound;
    let value = base.saturating_add(offset).max(0);

    Duration::from_nanos(value as u64)
}

fn nanos(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}

fn as_human<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&humantime::format_duration(*value))
}
