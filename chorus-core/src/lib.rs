//! # chorus-core
//!
//! Core types for a chat channel where several bots are voiced by one language model:
//! [`Bot`], [`User`], [`Message`], [`Channel`], the outbound [`BotResponse`] envelope,
//! error types, and tracing initialization. Transport-agnostic; used by message-bus,
//! transcript and chorus-cli.

pub mod error;
pub mod logger;
pub mod types;

pub use error::{ChorusError, Result};
pub use logger::init_tracing;
pub use types::{
    Bot, BotMessage, BotMessageType, BotResponse, Channel, Message, TaskType, User,
};
