use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// JSON file overriding the built-in glyph-width tables.
    pub font_metrics_path: Option<PathBuf>,
    /// Base seed used when a request does not carry one.
    pub shuffle_seed: Option<u64>,
    /// Max generated batches kept in memory for download.
    pub batch_retention: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT")?.unwrap_or(8080),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            font_metrics_path: optional_env("FONT_METRICS_PATH").map(PathBuf::from),
            shuffle_seed: parse_env("SHUFFLE_SEED")?,
            batch_retention: parse_env("BATCH_RETENTION")?.unwrap_or(32),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional_env(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_reads_and_rejects() {
        std::env::set_var("PAPERSET_TEST_PORT", "9090");
        assert_eq!(parse_env::<u16>("PAPERSET_TEST_PORT").unwrap(), Some(9090));

        std::env::set_var("PAPERSET_TEST_BAD", "not-a-number");
        assert!(parse_env::<u64>("PAPERSET_TEST_BAD").is_err());

        assert_eq!(parse_env::<u64>("PAPERSET_TEST_UNSET").unwrap(), None);
    }

    #[test]
    fn test_blank_value_counts_as_unset() {
        std::env::set_var("PAPERSET_TEST_BLANK", "  ");
        assert!(optional_env("PAPERSET_TEST_BLANK").is_none());
    }
}
