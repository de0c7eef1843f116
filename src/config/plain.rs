// src/config/plain.rs
// Extensionless config files: one `flag.name value` per line, `#` comments.
use ::config::builder::{ConfigBuilder, DefaultState};
use std::path::Path;

use super::cli::FLAG_KEYS;
use super::ConfigError;

/// Settings keys and raw values, in file order. A bare flag name means `true`.
pub(super) fn parse(text: &str) -> Result<Vec<(&'static str, String)>, ConfigError> {
    let mut entries = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, value) = match line.split_once(char::is_whitespace) {
            Some((name, value)) => (name, value.trim()),
            None => (line, "true"),
        };
        let name = name.trim_start_matches('-');
        let key = FLAG_KEYS
            .iter()
            .find(|(flag, _)| *flag == name)
            .map(|(_, key)| *key)
            .ok_or_else(|| ConfigError::UnknownSetting {
                line: index + 1,
                name: name.to_owned(),
            })?;

        entries.push((key, value.to_owned()));
    }

    Ok(entries)
}

/// Layer the file's values over the built-in defaults.
pub(super) fn apply(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    parse(&text)?
        .into_iter()
        .try_fold(builder, |builder, (key, value)| {
            builder.set_default(key, value).map_err(ConfigError::from)
        })
}
