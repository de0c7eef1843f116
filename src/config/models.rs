// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_WEB_LISTEN: &str = "0.0.0.0:8092";
pub const DEFAULT_EXIT_CODE: i32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("exit.percent must be within 0..=100, got {0}")]
    ExitPercent(i64),

    #[error("exit.code must be within 0..=255, got {0}")]
    ExitCode(i32),

    #[error("web.listen must be [host]:port, got {0}")]
    WebListen(String),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config file line {line}: unknown setting '{name}'")]
    UnknownSetting { line: usize, name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub web: WebConfig,
    pub exit: ExitConfig,
    pub signals: SignalsConfig,
    pub cpu_load: CpuLoadConfig,
    #[serde(default)]
    pub rand: RandConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub enable: bool,
    pub listen: String,
    /// Sleep before binding the listener.
    #[serde(with = "duration_str")]
    pub delay: Duration,
    #[serde(with = "duration_str")]
    pub delay_jitter: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitConfig {
    /// Exit once this has elapsed; zero disables, 1ns exits at startup.
    #[serde(with = "duration_str")]
    pub after: Duration,
    #[serde(with = "duration_str")]
    pub after_jitter: Duration,
    /// Chance, in percent, that a configured exit actually happens.
    pub percent: i64,
    pub code: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsConfig {
    pub ignore: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuLoadConfig {
    pub enable: bool,
    /// Requested worker count; clamped at spawn time.
    pub workers: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RandConfig {
    #[serde(default)]
    pub seed1: Option<u64>,
    #[serde(default)]
    pub seed2: Option<u64>,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=100).contains(&self.exit.percent) {
            return Err(ConfigError::ExitPercent(self.exit.percent));
        }
        if !(0..=255).contains(&self.exit.code) {
            return Err(ConfigError::ExitCode(self.exit.code));
        }
        self.web.bind_addr()?;
        Ok(())
    }
}

impl WebConfig {
    /// `listen` ready for binding; an empty host means every interface.
    ///
    /// Host names are resolved later, when the listener binds.
    pub fn bind_addr(&self) -> Result<String, ConfigError> {
        let invalid = || ConfigError::WebListen(self.listen.clone());

        let (host, port) = self.listen.rsplit_once(':').ok_or_else(invalid)?;
        port.parse::<u16>().map_err(|_| invalid())?;

        let host = if host.is_empty() { "0.0.0.0" } else { host };
        Ok(format!("{host}:{port}"))
    }
}

mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        crate::config::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            web: WebConfig {
                enable: true,
                listen: DEFAULT_WEB_LISTEN.to_owned(),
                delay: Duration::ZERO,
                delay_jitter: Duration::ZERO,
            },
            exit: ExitConfig {
                after: Duration::ZERO,
                after_jitter: Duration::ZERO,
                percent: 100,
                code: DEFAULT_EXIT_CODE,
            },
            signals: SignalsConfig { ignore: false },
            cpu_load: CpuLoadConfig {
                enable: false,
                workers: 1,
            },
            rand: RandConfig::default(),
        }
    }

    #[test]
    fn default_shaped_settings_validate() {
        assert!(settings().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut s = settings();
        s.exit.percent = -1;
        assert!(matches!(s.validate(), Err(ConfigError::ExitPercent(-1))));

        let mut s = settings();
        s.exit.code = 256;
        assert!(matches!(s.validate(), Err(ConfigError::ExitCode(256))));

        let mut s = settings();
        s.web.listen = "not-an-addr".to_owned();
        assert!(matches!(s.validate(), Err(ConfigError::WebListen(_))));
    }

    #[test]
    fn bind_addr_accepts_what_a_listener_can_bind() {
        for (listen, expected) in [
            (":8092", "0.0.0.0:8092"),
            ("localhost:8092", "localhost:8092"),
            ("127.0.0.1:0", "127.0.0.1:0"),
            ("[::1]:8092", "[::1]:8092"),
        ] {
            let mut s = settings();
            s.web.listen = listen.to_owned();
            assert!(s.validate().is_ok(), "listen: {listen}");
            assert_eq!(s.web.bind_addr().unwrap(), expected, "listen: {listen}");
        }

        for listen in ["localhost", "localhost:", "localhost:http", "host:99999"] {
            let mut s = settings();
            s.web.listen = listen.to_owned();
            assert!(
                matches!(s.validate(), Err(ConfigError::WebListen(_))),
                "listen: {listen}"
            );
        }
    }

    #[test]
    fn durations_serialize_human_readable() {
        let mut s = settings();
        s.exit.after = Duration::from_millis(1500);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["exit"]["after"], "1s 500ms");
        assert_eq!(json["web"]["delay"], "0s");
    }
}
