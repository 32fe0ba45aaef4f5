//! chorus CLI: replay a transcript through a chat session, printing each published envelope
//! as one JSON line. Config from env (`.env` loaded first) and CLI args.

use std::sync::Arc;

use anyhow::{Context, Result};
use chorus_core::Channel;
use chorus_cli::{build_participants, load_pacing, split_chunks, Cli, Commands, ReplayArgs};
use clap::Parser;
use message_bus::InMemoryTopic;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use transcript::{ChatRequest, HumanPacing};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay(args) => handle_replay(args).await,
    }
}

async fn read_input(args: &ReplayArgs) -> Result<String> {
    match &args.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Read transcript from {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Read transcript from stdin")?;
            Ok(text)
        }
    }
}

/// Handle the replay command.
///
/// Builds bots from `--bot`, subscribes a printer to an in-memory topic, feeds the transcript
/// in chunks, then flushes the unterminated tail. Ctrl-C cancels pending delays.
async fn handle_replay(args: ReplayArgs) -> Result<()> {
    chorus_core::init_tracing(args.log_file.as_deref())?;

    let pacing = load_pacing(args.no_pacing)
        .context("Load pacing config from env (CHORUS_PACING, CHORUS_TYPING_MIN_MS, ...)")?;
    let text = read_input(&args).await?;
    let (bots, users) = build_participants(&args.bots);
    for (ix, bot) in bots.iter().enumerate() {
        info!(index = ix, name = %bot.name, id = %bot.id, "bot");
    }

    let topic = InMemoryTopic::new("llm-messages");
    let mut subscription = topic.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(delivery) = subscription.recv().await {
            println!("{}", serde_json::to_string(delivery.response.as_ref())?);
        }
        anyhow::Ok(())
    });

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling replay");
            ctrl_c.cancel();
        }
    });

    let channel = Channel {
        id: Uuid::new_v4(),
        name: args.channel.clone(),
    };
    let topic_handle = Arc::new(topic.clone());
    let mut request = ChatRequest::new(bots, users, channel, args.task_type, topic_handle)
        .with_pacing(Arc::new(HumanPacing::new(pacing)))
        .with_cancellation(cancel);

    let chunks = split_chunks(&text, args.chunk_size);
    let outcome = match request.feed_stream(futures::stream::iter(chunks)).await {
        Ok(()) => request.finish().await,
        Err(e) => Err(e),
    };
    topic.close();

    match outcome {
        Ok(()) => info!("replay finished"),
        Err(e) if e.is_cancelled() => warn!("replay cancelled"),
        Err(e) => return Err(e).context("Replay transcript"),
    }

    printer.await.context("Join printer task")??;
    Ok(())
}
