use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::persistence::kv::validate_key;
use crate::persistence::StorageKeys;

pub const MIN_IDEAS: u32 = 1;
pub const MAX_IDEAS: u32 = 10;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub generator_url: String,
    pub generator_timeout_secs: u64,
    pub num_ideas: u32,
    /// `None` keeps the session in memory only.
    pub storage_dir: Option<PathBuf>,
    pub storage_quota_bytes: u64,
    pub storage_keys: StorageKeys,
    pub clipboard_command: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            generator_url: require_env("GENERATOR_URL")?,
            generator_timeout_secs: parse_env("GENERATOR_TIMEOUT_SECS", 120)?,
            num_ideas: parse_env("NUM_IDEAS", 3)?,
            storage_dir: optional_env("STORAGE_DIR").map(PathBuf::from),
            storage_quota_bytes: parse_env("STORAGE_QUOTA_BYTES", 5 * 1024 * 1024)?,
            storage_keys: StorageKeys {
                ideas_key: optional_env("IDEAS_KEY").unwrap_or_else(|| "binko_ideas".to_string()),
                profile_key: optional_env("PROFILE_KEY")
                    .unwrap_or_else(|| "binko_profile".to_string()),
            },
            clipboard_command: optional_env("CLIPBOARD_COMMAND"),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_IDEAS..=MAX_IDEAS).contains(&self.num_ideas) {
            bail!(
                "NUM_IDEAS must be between {MIN_IDEAS} and {MAX_IDEAS}, got {}",
                self.num_ideas
            );
        }
        if self.storage_keys.ideas_key == self.storage_keys.profile_key {
            bail!("IDEAS_KEY and PROFILE_KEY must differ");
        }
        validate_key(&self.storage_keys.ideas_key).context("IDEAS_KEY")?;
        validate_key(&self.storage_keys.profile_key).context("PROFILE_KEY")?;
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}
