use anyhow::{bail, Context, Result};

use crate::engine::aggregator::GroupBy;
use crate::engine::synthesizer::{DEFAULT_JITTER_RATIO, DEFAULT_SEED};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub port: u16,
    pub rust_log: String,
    pub engine: EngineSettings,
}

/// Defaults for profile builds and ranking. Build requests may override the
/// grouping and seed per call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub group_by: GroupBy,
    pub jitter_ratio: f64,
    pub seed: u64,
    pub standardize_queries: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            group_by: GroupBy::default(),
            jitter_ratio: DEFAULT_JITTER_RATIO,
            seed: DEFAULT_SEED,
            standardize_queries: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            engine: EngineSettings::from_vars(|key| std::env::var(key).ok())?,
        })
    }
}

impl EngineSettings {
    /// Reads the optional engine variables through `lookup`, falling back to
    /// defaults for anything unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let group_by = match lookup("PROFILE_GROUP_BY") {
            Some(raw) => raw
                .parse::<GroupBy>()
                .map_err(|e| anyhow::anyhow!("PROFILE_GROUP_BY: {e}"))?,
            None => defaults.group_by,
        };

        let jitter_ratio = match lookup("SYNTHESIS_JITTER") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .context("SYNTHESIS_JITTER must be a number")?,
            None => defaults.jitter_ratio,
        };
        if !(0.0..=1.0).contains(&jitter_ratio) {
            bail!("SYNTHESIS_JITTER must be between 0 and 1, got {jitter_ratio}");
        }

        let seed = match lookup("SYNTHESIS_SEED") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("SYNTHESIS_SEED must be a non-negative integer")?,
            None => defaults.seed,
        };

        let standardize_queries = match lookup("STANDARDIZE_QUERIES") {
            Some(raw) => parse_flag(&raw).context("STANDARDIZE_QUERIES must be true or false")?,
            None => defaults.standardize_queries,
        };

        Ok(Self {
            group_by,
            jitter_ratio,
            seed,
            standardize_queries,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognized flag value '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<EngineSettings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineSettings::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(settings(&[]).unwrap(), EngineSettings::default());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let s = settings(&[
            ("PROFILE_GROUP_BY", "form"),
            ("SYNTHESIS_JITTER", "0.5"),
            ("SYNTHESIS_SEED", "7"),
            ("STANDARDIZE_QUERIES", "TRUE"),
        ])
        .unwrap();
        assert_eq!(s.group_by, GroupBy::Form);
        assert_eq!(s.jitter_ratio, 0.5);
        assert_eq!(s.seed, 7);
        assert!(s.standardize_queries);
    }

    #[test]
    fn test_malformed_values_fail() {
        assert!(settings(&[("PROFILE_GROUP_BY", "agency")]).is_err());
        assert!(settings(&[("SYNTHESIS_JITTER", "1.5")]).is_err());
        assert!(settings(&[("SYNTHESIS_SEED", "-1")]).is_err());
        assert!(settings(&[("STANDARDIZE_QUERIES", "maybe")]).is_err());
    }
}
