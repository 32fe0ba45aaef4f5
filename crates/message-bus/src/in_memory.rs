//! In-memory [`Topic`]: every live subscriber receives every envelope published after it
//! subscribed.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chorus_core::{BotResponse, ChorusError, Result};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::Topic;

/// One envelope as seen by a subscriber.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub id: String,
    pub response: Arc<BotResponse>,
}

/// Receiving end of a subscription; ends when the topic is closed or dropped.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Delivery>,
}

impl Subscription {
    /// Waits for the next delivery. Returns `None` once the topic is closed and drained.
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }

    /// Returns a delivery if one is already queued.
    pub fn try_recv(&mut self) -> Option<Delivery> {
        self.rx.try_recv().ok()
    }
}

#[derive(Default)]
struct TopicState {
    subscribers: Vec<mpsc::UnboundedSender<Delivery>>,
    closed: bool,
}

/// Fan-out topic kept in process memory. Cloning shares the same subscriber set.
#[derive(Clone)]
pub struct InMemoryTopic {
    name: String,
    state: Arc<Mutex<TopicState>>,
}

impl InMemoryTopic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(TopicState::default())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a new subscriber.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        if !state.closed {
            state.subscribers.push(tx);
        }
        Subscription { rx }
    }

    /// Closes the topic: subscribers drain what is queued and then see `None`; later publishes
    /// fail.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TopicState> {
        // A poisoned lock only means a publisher panicked mid-send; the subscriber list is still
        // valid.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Topic for InMemoryTopic {
    async fn publish(&self, response: &BotResponse) -> Result<String> {
        let mut state = self.lock();
        if state.closed {
            return Err(ChorusError::Bus(format!("topic {} is closed", self.name)));
        }

        let id = Uuid::new_v4().to_string();
        let delivery = Delivery {
            id: id.clone(),
            response: Arc::new(response.clone()),
        };
        state
            .subscribers
            .retain(|tx| tx.send(delivery.clone()).is_ok());

        debug!(
            topic = %self.name,
            message_id = %id,
            subscribers = state.subscribers.len(),
            "published"
        );
        Ok(id)
    }
}
