//! # chorus-cli
//!
//! Argument parsing and input helpers for the `chorus` binary, which replays a multi-bot
//! transcript through a [`transcript::ChatRequest`] and prints the published envelopes.

pub mod cli;

pub use cli::{build_participants, load_pacing, split_chunks, Cli, Commands, ReplayArgs};
