//! Runtime configuration read from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::retry::RetryPolicy;

pub const ENV_DB_URL: &str = "STYLE_DB_URL";
pub const ENV_FALLBACK_DB_URL: &str = "STYLE_FALLBACK_DB_URL";
pub const ENV_RETRY_ATTEMPTS: &str = "STYLE_RETRY_ATTEMPTS";
pub const ENV_RETRY_BACKOFF_MS: &str = "STYLE_RETRY_BACKOFF_MS";
pub const ENV_QUESTION_BANK: &str = "STYLE_QUESTION_BANK";

pub const DEFAULT_DB_URL: &str = "sqlite:style.sqlite3";

/// Settings needed to assemble the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    /// Secondary store for quiz results when the primary keeps failing.
    pub fallback_database_url: Option<String>,
    pub retry: RetryPolicy,
    /// JSON question bank to use instead of the standard one.
    pub question_bank_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DB_URL.to_owned(),
            fallback_database_url: None,
            retry: RetryPolicy::default(),
            question_bank_path: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// missing keys.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is present but empty or unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_DB_URL) {
            if url.trim().is_empty() {
                return Err(ConfigError::Empty { key: ENV_DB_URL });
            }
            config.database_url = url.trim().to_owned();
        }

        config.fallback_database_url = lookup(ENV_FALLBACK_DB_URL)
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());

        config.question_bank_path = lookup(ENV_QUESTION_BANK)
            .map(|path| path.trim().to_owned())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        if let Some(raw) = lookup(ENV_RETRY_ATTEMPTS) {
            let attempts = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(ConfigError::Invalid {
                    key: ENV_RETRY_ATTEMPTS,
                    raw: raw.clone(),
                })?;
            config.retry.max_attempts = attempts;
        }

        if let Some(raw) = lookup(ENV_RETRY_BACKOFF_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: ENV_RETRY_BACKOFF_MS,
                raw: raw.clone(),
            })?;
            config.retry.initial_backoff = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database_url, DEFAULT_DB_URL);
    }

    #[test]
    fn reads_every_key() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DB_URL, "sqlite:main.db"),
            (ENV_FALLBACK_DB_URL, " sqlite:spool.db "),
            (ENV_RETRY_ATTEMPTS, "5"),
            (ENV_RETRY_BACKOFF_MS, "50"),
            (ENV_QUESTION_BANK, "banks/short.json"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite:main.db");
        assert_eq!(config.fallback_database_url.as_deref(), Some("sqlite:spool.db"));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(50));
        assert_eq!(
            config.question_bank_path,
            Some(PathBuf::from("banks/short.json"))
        );
    }

    #[test]
    fn blank_fallback_is_ignored() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_FALLBACK_DB_URL, "  ")])).unwrap();
        assert!(config.fallback_database_url.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[(ENV_DB_URL, " ")])).unwrap_err(),
            ConfigError::Empty { key: ENV_DB_URL }
        );
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(ENV_RETRY_ATTEMPTS, "0")])),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(ENV_RETRY_BACKOFF_MS, "soon")])),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
