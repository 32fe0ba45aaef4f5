//! CLI parser, pacing config loading, and input helpers.

use std::path::PathBuf;

use anyhow::Result;
use chorus_core::{Bot, TaskType, User};
use clap::{Args, Parser, Subcommand};
use transcript::PacingConfig;
use uuid::Uuid;

/// Bot names used when none are given on the command line.
pub const DEFAULT_BOTS: [&str; 2] = ["Ada", "Grace"];

#[derive(Parser)]
#[command(name = "chorus")]
#[command(about = "Replay a multi-bot model transcript as paced chat events", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Feed a transcript (file or stdin) through a session and print each envelope as JSON.
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Transcript file; reads stdin when absent.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Bot name, in index order. Repeat for each bot.
    #[arg(short, long = "bot")]
    pub bots: Vec<String>,

    #[arg(short, long, default_value = "general")]
    pub channel: String,

    #[arg(short, long, default_value = "continue", value_parser = parse_task_type)]
    pub task_type: TaskType,

    /// Feed the transcript in chunks of about this many bytes to mimic streaming.
    #[arg(long, default_value = "16")]
    pub chunk_size: usize,

    /// Disable reading/typing delays (overrides CHORUS_PACING).
    #[arg(long)]
    pub no_pacing: bool,

    /// Also append logs to this file.
    #[arg(long)]
    pub log_file: Option<String>,
}

fn parse_task_type(s: &str) -> std::result::Result<TaskType, String> {
    s.parse().map_err(|e: chorus_core::ChorusError| e.to_string())
}

/// Pacing config from env (`CHORUS_*`), with `--no-pacing` applied on top.
pub fn load_pacing(no_pacing: bool) -> Result<PacingConfig> {
    let mut config = PacingConfig::from_env()?;
    if no_pacing {
        config.enabled = false;
    }
    Ok(config)
}

/// One bot per name, each with a linked user identity.
pub fn build_participants(names: &[String]) -> (Vec<Bot>, Vec<User>) {
    let names: Vec<String> = if names.is_empty() {
        DEFAULT_BOTS.iter().map(|s| s.to_string()).collect()
    } else {
        names.to_vec()
    };
    let bots: Vec<Bot> = names
        .into_iter()
        .map(|name| Bot::new(Uuid::new_v4(), name))
        .collect();
    let users = bots
        .iter()
        .map(|bot| User::for_bot(Uuid::new_v4(), bot))
        .collect();
    (bots, users)
}

/// Splits `text` into pieces of at least `size` bytes (the last may be shorter), never inside
/// a UTF-8 character.
pub fn split_chunks(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end += 1;
        }
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_chunks_respects_char_boundaries() {
        let text = "0: \"héllo\"\n";
        for size in 1..=text.len() {
            let chunks = split_chunks(text, size);
            assert_eq!(chunks.concat(), text);
        }
        assert_eq!(split_chunks("abcdef", 4), vec!["abcd", "ef"]);
        assert!(split_chunks("", 4).is_empty());
        assert_eq!(split_chunks("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_build_participants_defaults_and_links() {
        let (bots, users) = build_participants(&[]);
        assert_eq!(bots.len(), DEFAULT_BOTS.len());
        assert_eq!(bots[0].name, "Ada");

        let (bots, users_custom) = build_participants(&["Linus".to_string()]);
        assert_eq!(bots.len(), 1);
        assert_eq!(users_custom[0].bot_id, Some(bots[0].id));
        assert_eq!(users.len(), 2);
    }

    #[test]
    fn test_parse_replay_args() {
        let cli = Cli::try_parse_from([
            "chorus", "replay", "--bot", "Ada", "--bot", "Grace", "--task-type", "join",
            "--no-pacing",
        ])
        .unwrap();
        let Commands::Replay(args) = cli.command;
        assert_eq!(args.bots, vec!["Ada", "Grace"]);
        assert_eq!(args.task_type, TaskType::Join);
        assert_eq!(args.channel, "general");
        assert_eq!(args.chunk_size, 16);
        assert!(args.no_pacing);
        assert!(args.input.is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_task_type() {
        assert!(Cli::try_parse_from(["chorus", "replay", "--task-type", "chat"]).is_err());
    }
}
