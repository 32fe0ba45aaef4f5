//! Core types: bots, users, stored messages, channels, and the outbound bot response envelope.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ChorusError;

/// A configured bot. Its position in a request's bot list is the index the model uses to
/// address it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bot {
    pub id: Uuid,
    pub name: String,
}

impl Bot {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A chat participant. `bot_id` is set when the user is the chat identity of a bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub bot_id: Option<Uuid>,
}

impl User {
    /// A human (or admin) participant.
    pub fn human(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            bot_id: None,
        }
    }

    /// The chat identity of `bot`.
    pub fn for_bot(id: Uuid, bot: &Bot) -> Self {
        Self {
            id,
            name: bot.name.clone(),
            bot_id: Some(bot.id),
        }
    }
}

/// A stored chat message. A nil `author_id` marks an admin message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_admin(&self) -> bool {
        self.author_id.is_nil()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub name: String,
}

/// Why the model was asked to generate: routes the response on the consumer side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Join,
    Leave,
    Continue,
    Instruct,
    Prepopulate,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Join => "join",
            TaskType::Leave => "leave",
            TaskType::Continue => "continue",
            TaskType::Instruct => "instruct",
            TaskType::Prepopulate => "prepopulate",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = ChorusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "join" => Ok(TaskType::Join),
            "leave" => Ok(TaskType::Leave),
            "continue" => Ok(TaskType::Continue),
            "instruct" => Ok(TaskType::Instruct),
            "prepopulate" => Ok(TaskType::Prepopulate),
            other => Err(ChorusError::Config(format!("unknown task type: {}", other))),
        }
    }
}

/// Kind of a generated bot message: the "is typing" indicator or the final text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotMessageType {
    Typing,
    Text,
}

/// A message generated for a bot by the model.
///
/// The typing message carries the same content as the text message that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMessage {
    pub bot: Uuid,
    pub content: String,
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: BotMessageType,
}

impl BotMessage {
    pub fn typing(bot: Uuid, content: impl Into<String>) -> Self {
        Self {
            bot,
            content: content.into(),
            time: Utc::now(),
            kind: BotMessageType::Typing,
        }
    }

    pub fn text(bot: Uuid, content: impl Into<String>) -> Self {
        Self {
            bot,
            content: content.into(),
            time: Utc::now(),
            kind: BotMessageType::Text,
        }
    }
}

/// Outbound envelope published to the bus: routing context plus one or more bot messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotResponse {
    pub task_type: TaskType,
    pub channel: Channel,
    pub messages: Vec<BotMessage>,
}

impl BotResponse {
    /// Envelope carrying exactly one message.
    pub fn single(task_type: TaskType, channel: Channel, message: BotMessage) -> Self {
        Self {
            task_type,
            channel,
            messages: vec![message],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_type_round_trips_through_str() {
        for t in [
            TaskType::Join,
            TaskType::Leave,
            TaskType::Continue,
            TaskType::Instruct,
            TaskType::Prepopulate,
        ] {
            assert_eq!(t.as_str().parse::<TaskType>().unwrap(), t);
        }
        assert_eq!(" Continue ".parse::<TaskType>().unwrap(), TaskType::Continue);
        assert!("chat".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_bot_response_serializes_lowercase_enums() {
        let bot = Uuid::new_v4();
        let channel = Channel {
            id: Uuid::new_v4(),
            name: "general".to_string(),
        };
        let response =
            BotResponse::single(TaskType::Instruct, channel, BotMessage::typing(bot, "hi"));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["task_type"], "instruct");
        assert_eq!(json["messages"][0]["type"], "typing");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["messages"][0]["bot"], bot.to_string());
    }

    #[test]
    fn test_user_for_bot_links_back() {
        let bot = Bot::new(Uuid::new_v4(), "Ada");
        let user = User::for_bot(Uuid::new_v4(), &bot);
        assert_eq!(user.bot_id, Some(bot.id));
        assert_eq!(user.name, "Ada");
        assert!(User::human(Uuid::new_v4(), "Bob").bot_id.is_none());
    }

    #[test]
    fn test_nil_author_is_admin() {
        let msg = Message {
            id: Uuid::new_v4(),
            author_id: Uuid::nil(),
            content: "hello".to_string(),
            timestamp: Utc::now(),
        };
        assert!(msg.is_admin());
    }
}
