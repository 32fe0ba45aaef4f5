//! [`ChatRequest`]: one generation session. Owns the participants, the routing context, the
//! line buffer and the dispatcher, and turns streamed model output into bot messages.

use std::collections::HashMap;
use std::sync::Arc;

use chorus_core::{Bot, Channel, ChorusError, Message, Result, TaskType, User};
use futures::{Stream, StreamExt};
use message_bus::Topic;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::dispatcher::{EventDispatcher, Route};
use crate::interpreter::interpret;
use crate::pacing::{HumanPacing, Pacing};
use crate::participants::ParticipantIndex;
use crate::reassembler::LineReassembler;

/// A request to the model to continue the conversation in one channel, and the parsing
/// session for its streamed reply.
///
/// Not reentrant: chunks must be fed in generation order from a single task. The session is
/// `Send`, so a host can move it into its own `tokio::spawn`.
pub struct ChatRequest {
    participants: ParticipantIndex,
    messages: Vec<Message>,
    route: Route,
    system_msg: String,
    provider: String,
    buffer: LineReassembler,
    dispatcher: EventDispatcher,
}

impl ChatRequest {
    /// Creates a session with [`HumanPacing`] defaults and its own cancellation token.
    pub fn new(
        bots: Vec<Bot>,
        users: Vec<User>,
        channel: Channel,
        task_type: TaskType,
        topic: Arc<dyn Topic>,
    ) -> Self {
        Self {
            participants: ParticipantIndex::new(bots, users),
            messages: Vec::new(),
            route: Route { task_type, channel },
            system_msg: String::new(),
            provider: String::new(),
            buffer: LineReassembler::new(),
            dispatcher: EventDispatcher::new(
                topic,
                Arc::new(HumanPacing::default()),
                CancellationToken::new(),
            ),
        }
    }

    /// Prior conversation, used by [`format`](Self::format) when rendering the prompt.
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_system_msg(mut self, system_msg: impl Into<String>) -> Self {
        self.system_msg = system_msg.into();
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_pacing(mut self, pacing: Arc<dyn Pacing>) -> Self {
        self.dispatcher = self.dispatcher.with_pacing(pacing);
        self
    }

    /// Cancelling `cancel` aborts pending delays and stops further publishing.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.dispatcher = self.dispatcher.with_cancellation(cancel);
        self
    }

    pub fn bots(&self) -> &[Bot] {
        self.participants.bots()
    }

    pub fn users(&self) -> &[User] {
        self.participants.users()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn channel(&self) -> &Channel {
        &self.route.channel
    }

    pub fn task_type(&self) -> TaskType {
        self.route.task_type
    }

    pub fn system_msg(&self) -> &str {
        &self.system_msg
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn participants(&self) -> &ParticipantIndex {
        &self.participants
    }

    pub fn bots_by_id(&self) -> &HashMap<Uuid, Bot> {
        self.participants.bots_by_id()
    }

    pub fn bots_by_name(&self) -> &HashMap<String, Bot> {
        self.participants.bots_by_name()
    }

    pub fn users_by_id(&self) -> &HashMap<Uuid, User> {
        self.participants.users_by_id()
    }

    pub fn user_for_message(&self, msg: &Message) -> (&User, Option<&Bot>) {
        self.participants.user_for_message(msg)
    }

    /// True if the message was sent by a bot.
    pub fn from_bot(&self, msg: &Message) -> bool {
        self.user_for_message(msg).1.is_some()
    }

    /// Renders a stored message as a transcript line for the prompt.
    ///
    /// Admin messages are `Admin: <content>`; everything else is
    /// `MM-DD HH:MM <channel>/<name>: <content>`, preferring the bot name over the user name.
    pub fn format(&self, msg: &Message) -> String {
        if msg.is_admin() {
            return format!("Admin: {}", msg.content);
        }
        let (user, bot) = self.user_for_message(msg);
        let name = bot.map_or(user.name.as_str(), |b| b.name.as_str());
        format!(
            "{} {}/{}: {}",
            msg.timestamp.format("%m-%d %H:%M"),
            self.route.channel.name,
            name,
            msg.content
        )
    }

    /// Renders all prior messages, one line each.
    pub fn format_history(&self) -> Vec<String> {
        self.messages.iter().map(|m| self.format(m)).collect()
    }

    /// Text received after the last newline, not yet interpreted.
    pub fn pending(&self) -> &str {
        self.buffer.pending()
    }

    pub fn is_cancelled(&self) -> bool {
        self.dispatcher.cancel_token().is_cancelled()
    }

    /// Feeds the next chunk of model output. Every line the chunk completes is interpreted
    /// and dispatched before this returns; an unterminated tail waits for the next chunk.
    pub async fn feed(&mut self, chunk: &str) -> Result<()> {
        if self.is_cancelled() {
            return Err(ChorusError::Cancelled);
        }
        for line in self.buffer.push(chunk) {
            self.process_line(&line)
                .await
                .map_err(|e| e.context("process line"))?;
        }
        Ok(())
    }

    /// Feeds every chunk of `stream` in order. Does not flush the unterminated tail; call
    /// [`finish`](Self::finish) for that.
    pub async fn feed_stream<S>(&mut self, stream: S) -> Result<()>
    where
        S: Stream,
        S::Item: AsRef<str>,
    {
        futures::pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            self.feed(chunk.as_ref()).await?;
        }
        Ok(())
    }

    /// Ends the stream: interprets the unterminated tail as a final line, if there is one.
    ///
    /// Without this call a reply that does not end in a newline loses its last line.
    pub async fn finish(&mut self) -> Result<()> {
        let Some(rest) = self.buffer.take_remainder() else {
            return Ok(());
        };
        if self.is_cancelled() {
            return Err(ChorusError::Cancelled);
        }
        self.process_line(&rest)
            .await
            .map_err(|e| e.context("process final line"))
    }

    #[instrument(level = "debug", skip(self, line), fields(channel = %self.route.channel.name))]
    async fn process_line(&self, line: &str) -> Result<()> {
        let Some(parsed) = interpret(line, self.bots().len()).accepted() else {
            return Ok(());
        };
        let bot = &self.bots()[parsed.bot_index];
        debug!(
            bot_index = parsed.bot_index,
            bot = %bot.name,
            unquoted = parsed.unquoted,
            "line attributed"
        );
        self.dispatcher
            .dispatch(&self.route, bot.id, &parsed.content)
            .await?;
        Ok(())
    }
}
