//! # Message bus
//!
//! Defines the [`Topic`] trait the transcript dispatcher publishes [`BotResponse`] envelopes to,
//! and [`InMemoryTopic`], a fan-out implementation backed by tokio channels.
//!
//! Delivery is at-least-once from the consumer's point of view: consumers that need
//! exactly-once must deduplicate on [`Delivery::id`] or on message content.

use async_trait::async_trait;
use chorus_core::{BotResponse, Result};

mod in_memory;

pub use in_memory::{Delivery, InMemoryTopic, Subscription};

/// Outbound topic for bot responses. Implementations map to a transport (pub/sub, queue,
/// in-memory).
#[async_trait]
pub trait Topic: Send + Sync {
    /// Publishes one envelope and returns the transport's message id.
    async fn publish(&self, response: &BotResponse) -> Result<String>;
}
