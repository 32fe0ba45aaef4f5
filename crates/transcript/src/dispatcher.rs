//! Publishes the typing indicator and then the final text for each attributed line.

use std::sync::Arc;

use chorus_core::{BotMessage, BotResponse, Channel, Result, TaskType};
use message_bus::Topic;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::pacing::{suspend, Pacing};

/// Routing context shared by every envelope of one request.
#[derive(Debug, Clone)]
pub struct Route {
    pub task_type: TaskType,
    pub channel: Channel,
}

/// Paces and publishes bot messages onto a [`Topic`].
#[derive(Clone)]
pub struct EventDispatcher {
    topic: Arc<dyn Topic>,
    pacing: Arc<dyn Pacing>,
    cancel: CancellationToken,
}

impl EventDispatcher {
    pub fn new(topic: Arc<dyn Topic>, pacing: Arc<dyn Pacing>, cancel: CancellationToken) -> Self {
        Self {
            topic,
            pacing,
            cancel,
        }
    }

    pub fn with_pacing(mut self, pacing: Arc<dyn Pacing>) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Publishes one envelope. Failures are logged and reported as `false`, never raised.
    pub async fn publish(&self, envelope: &BotResponse) -> bool {
        match self.topic.publish(envelope).await {
            Ok(message_id) => {
                debug!(
                    message_id = %message_id,
                    channel = %envelope.channel.name,
                    messages = envelope.messages.len(),
                    "envelope published"
                );
                true
            }
            Err(e) => {
                warn!(error = %e, channel = %envelope.channel.name, "publish message");
                false
            }
        }
    }

    /// Reading pause, typing envelope, typing pause, text envelope.
    ///
    /// A failed typing publish does not stop the text publish. Returns how many of the two
    /// envelopes the topic accepted; only cancellation is an error.
    pub async fn dispatch(&self, route: &Route, bot: Uuid, content: &str) -> Result<usize> {
        suspend(self.pacing.delay_before_typing(), &self.cancel).await?;
        let typing_sent = self
            .publish(&BotResponse::single(
                route.task_type,
                route.channel.clone(),
                BotMessage::typing(bot, content),
            ))
            .await;

        let content_len = content.chars().count();
        suspend(self.pacing.delay_before_text(content_len), &self.cancel).await?;
        let text_sent = self
            .publish(&BotResponse::single(
                route.task_type,
                route.channel.clone(),
                BotMessage::text(bot, content),
            ))
            .await;

        let delivered = usize::from(typing_sent) + usize::from(text_sent);
        info!(bot = %bot, content = %content, delivered, "message");
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoPacing;
    use async_trait::async_trait;
    use chorus_core::{BotMessageType, ChorusError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fails the first `fail_first` publishes, records the rest.
    struct FlakyTopic {
        fail_first: usize,
        attempts: AtomicUsize,
        accepted: Mutex<Vec<BotMessageType>>,
    }

    impl FlakyTopic {
        fn new(fail_first: usize) -> Self {
            Self {
                fail_first,
                attempts: AtomicUsize::new(0),
                accepted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Topic for FlakyTopic {
        async fn publish(&self, response: &BotResponse) -> Result<String> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) < self.fail_first {
                return Err(ChorusError::Bus("unavailable".to_string()));
            }
            let mut accepted = self.accepted.lock().unwrap();
            accepted.extend(response.messages.iter().map(|m| m.kind));
            Ok("id".to_string())
        }
    }

    fn route() -> Route {
        Route {
            task_type: TaskType::Continue,
            channel: Channel {
                id: Uuid::new_v4(),
                name: "general".to_string(),
            },
        }
    }

    fn dispatcher(topic: Arc<FlakyTopic>) -> EventDispatcher {
        EventDispatcher::new(topic, Arc::new(NoPacing), CancellationToken::new())
    }

    #[tokio::test]
    async fn test_dispatch_counts_delivered_envelopes() {
        let topic = Arc::new(FlakyTopic::new(0));
        let delivered = dispatcher(topic.clone())
            .dispatch(&route(), Uuid::new_v4(), "hi")
            .await
            .unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(
            *topic.accepted.lock().unwrap(),
            vec![BotMessageType::Typing, BotMessageType::Text]
        );
    }

    #[tokio::test]
    async fn test_dispatch_reports_failed_typing_and_still_sends_text() {
        let topic = Arc::new(FlakyTopic::new(1));
        let delivered = dispatcher(topic.clone())
            .dispatch(&route(), Uuid::new_v4(), "hi")
            .await
            .unwrap();

        assert_eq!(delivered, 1);
        assert_eq!(topic.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(*topic.accepted.lock().unwrap(), vec![BotMessageType::Text]);
    }

    #[tokio::test]
    async fn test_publish_reports_failure() {
        let topic = Arc::new(FlakyTopic::new(1));
        let d = dispatcher(topic);
        let envelope = BotResponse::single(
            TaskType::Join,
            route().channel,
            BotMessage::text(Uuid::nil(), "x"),
        );
        assert!(!d.publish(&envelope).await);
        assert!(d.publish(&envelope).await);
    }
}
