//! Shared fixtures: a recording [`Topic`] and request builders.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chorus_core::{Bot, BotMessageType, BotResponse, Channel, ChorusError, TaskType, User};
use message_bus::Topic;
use transcript::{ChatRequest, NoPacing};
use uuid::Uuid;

/// In-memory topic that records every envelope. Can be told to fail the next N publishes.
#[derive(Default, Clone)]
pub struct RecordingTopic {
    published: Arc<Mutex<Vec<BotResponse>>>,
    fail_next: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
}

impl RecordingTopic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<BotResponse> {
        self.published.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// (bot id, content, kind) for every published message, in order.
    pub fn messages(&self) -> Vec<(Uuid, String, BotMessageType)> {
        self.published()
            .iter()
            .flat_map(|r| r.messages.iter())
            .map(|m| (m.bot, m.content.clone(), m.kind))
            .collect()
    }

    /// Contents of text messages only, in order.
    pub fn texts(&self) -> Vec<(Uuid, String)> {
        self.messages()
            .into_iter()
            .filter(|(_, _, kind)| *kind == BotMessageType::Text)
            .map(|(bot, content, _)| (bot, content))
            .collect()
    }
}

#[async_trait]
impl Topic for RecordingTopic {
    async fn publish(&self, response: &BotResponse) -> chorus_core::Result<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let should_fail = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(ChorusError::Bus("injected failure".to_string()));
        }
        self.published.lock().unwrap().push(response.clone());
        Ok(Uuid::new_v4().to_string())
    }
}

pub fn create_test_bots(count: usize) -> Vec<Bot> {
    ["Ada", "Grace", "Linus", "Ken", "Barbara"]
        .iter()
        .take(count)
        .map(|name| Bot::new(Uuid::new_v4(), *name))
        .collect()
}

pub fn create_test_channel() -> Channel {
    Channel {
        id: Uuid::new_v4(),
        name: "general".to_string(),
    }
}

/// Request with `bot_count` bots (each with its own user), no pacing, recording topic.
pub fn create_test_request(bot_count: usize) -> (ChatRequest, RecordingTopic) {
    let topic = RecordingTopic::new();
    let bots = create_test_bots(bot_count);
    let users: Vec<User> = bots
        .iter()
        .map(|b| User::for_bot(Uuid::new_v4(), b))
        .collect();
    let request = ChatRequest::new(
        bots,
        users,
        create_test_channel(),
        TaskType::Continue,
        Arc::new(topic.clone()),
    )
    .with_pacing(Arc::new(NoPacing));
    (request, topic)
}
