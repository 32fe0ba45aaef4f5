//! Pacing configuration loaded from the environment.

use anyhow::{Context, Result};
use std::env;

/// Delays that make bots look like people: a "reading" pause before the typing indicator,
/// then a jitter plus a per-character "typing" time before the final text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingConfig {
    /// CHORUS_PACING; false disables every delay
    pub enabled: bool,
    /// CHORUS_TYPING_MIN_MS
    pub typing_min_ms: u64,
    /// CHORUS_TYPING_MAX_MS (exclusive)
    pub typing_max_ms: u64,
    /// CHORUS_TEXT_JITTER_MS (exclusive upper bound of the random part)
    pub text_jitter_max_ms: u64,
    /// CHORUS_PER_CHAR_MS
    pub per_char_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            typing_min_ms: 1000,
            typing_max_ms: 3000,
            text_jitter_max_ms: 1000,
            per_char_ms: 40,
        }
    }
}

impl PacingConfig {
    /// Load from environment variables; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let enabled = match env::var("CHORUS_PACING") {
            Ok(v) => !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "off" | "no"),
            Err(_) => defaults.enabled,
        };
        let config = Self {
            enabled,
            typing_min_ms: env_ms("CHORUS_TYPING_MIN_MS", defaults.typing_min_ms)?,
            typing_max_ms: env_ms("CHORUS_TYPING_MAX_MS", defaults.typing_max_ms)?,
            text_jitter_max_ms: env_ms("CHORUS_TEXT_JITTER_MS", defaults.text_jitter_max_ms)?,
            per_char_ms: env_ms("CHORUS_PER_CHAR_MS", defaults.per_char_ms)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.typing_min_ms > self.typing_max_ms {
            anyhow::bail!(
                "CHORUS_TYPING_MIN_MS ({}) must not exceed CHORUS_TYPING_MAX_MS ({})",
                self.typing_min_ms,
                self.typing_max_ms
            );
        }
        Ok(())
    }
}

fn env_ms(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number of milliseconds, got {:?}", key, v)),
        Err(_) => Ok(default),
    }
}
