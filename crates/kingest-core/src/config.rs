use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (3 = up to 4 attempts).
    pub max_retries: u32,
    /// Total wall-clock budget in seconds for one operation, retries included.
    pub max_timeout_secs: u64,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Optional cap on a single backoff delay, in seconds. Unset = uncapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_secs: Option<f64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let p = RetryPolicy::default();
        Self {
            max_retries: p.max_retries,
            max_timeout_secs: p.max_timeout.as_secs(),
            base_delay_secs: p.base_delay.as_secs_f64(),
            max_delay_secs: p.max_delay.map(|d| d.as_secs_f64()),
        }
    }
}

impl RetryConfig {
    /// Convert to a validated [`RetryPolicy`].
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        let base = secs_to_duration("base_delay_secs", self.base_delay_secs)?;
        let mut policy = RetryPolicy::new(self.max_retries, self.max_timeout_secs, base);
        if let Some(max) = self.max_delay_secs {
            policy = policy.with_max_delay(secs_to_duration("max_delay_secs", max)?);
        }
        policy.validate().context("invalid retry policy")?;
        Ok(policy)
    }
}

fn secs_to_duration(field: &str, secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        anyhow::bail!("{} must be a positive number of seconds, got {}", field, secs);
    }
    Duration::try_from_secs_f64(secs).with_context(|| format!("{} out of range: {}", field, secs))
}

/// Global configuration loaded from `~/.config/kingest/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KingestConfig {
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Also write logs to `~/.local/state/kingest/kingest.log`.
    #[serde(default)]
    pub log_to_file: bool,
}

impl KingestConfig {
    /// Effective retry policy: the `[retry]` section, or defaults.
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        match &self.retry {
            Some(retry) => retry.to_policy(),
            None => RetryConfig::default().to_policy(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("kingest")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<KingestConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = KingestConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<KingestConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: KingestConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
