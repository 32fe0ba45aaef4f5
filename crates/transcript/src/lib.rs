//! # Transcript
//!
//! Turns a language model's streamed transcript, in which it speaks for several bots at once,
//! into paced, per-bot chat messages on a [`message_bus::Topic`].
//!
//! ## Line format
//!
//! One turn per line: `[channel/]<bot index>: "<escaped message>"`. The index points into the
//! request's bot list; `none` marks a line nobody speaks.
//!
//! ## Flow
//!
//! chunk → [`LineReassembler`] → line → [`interpret`] → [`Pacing`] delay → typing envelope →
//! [`Pacing`] delay → text envelope, all driven by [`ChatRequest::feed`].

pub mod config;
pub mod dispatcher;
pub mod interpreter;
pub mod pacing;
pub mod participants;
pub mod reassembler;
pub mod request;
pub mod unquote;

pub use config::PacingConfig;
pub use dispatcher::{EventDispatcher, Route};
pub use interpreter::{interpret, LineOutcome, ParsedLine, SkipReason};
pub use pacing::{suspend, HumanPacing, NoPacing, Pacing};
pub use participants::{unknown_user, ParticipantIndex};
pub use reassembler::LineReassembler;
pub use request::ChatRequest;
pub use unquote::{unquote, UnquoteError};
