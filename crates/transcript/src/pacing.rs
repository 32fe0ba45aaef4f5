//! Human-like pacing between reading, typing and sending.
//!
//! [`Pacing`] only computes delays; [`suspend`] does the waiting, so tests can swap in
//! [`NoPacing`] without touching interpretation or dispatch.

use std::time::Duration;

use chorus_core::{ChorusError, Result};
use rand::RngExt;
use tokio_util::sync::CancellationToken;

use crate::config::PacingConfig;

/// Source of the delays before the typing indicator and before the final text.
pub trait Pacing: Send + Sync {
    /// "Reading" time before the bot starts typing.
    fn delay_before_typing(&self) -> Duration;
    /// "Typing" time for a message of `content_len` characters.
    fn delay_before_text(&self, content_len: usize) -> Duration;
}

/// Random delays drawn from a [`PacingConfig`].
#[derive(Debug, Clone, Default)]
pub struct HumanPacing {
    config: PacingConfig,
}

impl HumanPacing {
    pub fn new(config: PacingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }
}

impl Pacing for HumanPacing {
    fn delay_before_typing(&self) -> Duration {
        if !self.config.enabled {
            return Duration::ZERO;
        }
        let ms = random_below(self.config.typing_min_ms, self.config.typing_max_ms);
        Duration::from_millis(ms)
    }

    fn delay_before_text(&self, content_len: usize) -> Duration {
        if !self.config.enabled {
            return Duration::ZERO;
        }
        let jitter = random_below(0, self.config.text_jitter_max_ms);
        let typing = self.config.per_char_ms.saturating_mul(content_len as u64);
        Duration::from_millis(jitter.saturating_add(typing))
    }
}

/// Uniform in `[low, high)`; `low` when the range is empty.
fn random_below(low: u64, high: u64) -> u64 {
    if high <= low {
        return low;
    }
    rand::rng().random_range(low..high)
}

/// Zero delays everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl Pacing for NoPacing {
    fn delay_before_typing(&self) -> Duration {
        Duration::ZERO
    }

    fn delay_before_text(&self, _content_len: usize) -> Duration {
        Duration::ZERO
    }
}

/// Sleeps for `delay` unless `cancel` fires first, in which case returns
/// [`ChorusError::Cancelled`].
pub async fn suspend(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ChorusError::Cancelled);
    }
    if delay.is_zero() {
        return Ok(());
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(ChorusError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
