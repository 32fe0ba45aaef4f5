//! Participant lookups for one request: bots by id, bots by lowercased name, users by id.
//!
//! Each map is built on first access and kept for the lifetime of the index.

use std::collections::HashMap;
use std::sync::{LazyLock, OnceLock};

use chorus_core::{Bot, Message, User};
use uuid::Uuid;

/// Placeholder author for messages whose author is not in the request's user list.
static UNKNOWN_USER: LazyLock<User> = LazyLock::new(|| User {
    id: Uuid::nil(),
    name: "Unknown User".to_string(),
    bot_id: None,
});

pub fn unknown_user() -> &'static User {
    &UNKNOWN_USER
}

/// Immutable participant lists plus lazily built lookup maps.
#[derive(Debug, Default)]
pub struct ParticipantIndex {
    bots: Vec<Bot>,
    users: Vec<User>,
    bots_by_id: OnceLock<HashMap<Uuid, Bot>>,
    bots_by_name: OnceLock<HashMap<String, Bot>>,
    users_by_id: OnceLock<HashMap<Uuid, User>>,
}

impl ParticipantIndex {
    pub fn new(bots: Vec<Bot>, users: Vec<User>) -> Self {
        Self {
            bots,
            users,
            ..Self::default()
        }
    }

    pub fn bots(&self) -> &[Bot] {
        &self.bots
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn bots_by_id(&self) -> &HashMap<Uuid, Bot> {
        self.bots_by_id
            .get_or_init(|| self.bots.iter().map(|b| (b.id, b.clone())).collect())
    }

    /// Keys are lowercased bot names. On duplicate names the later bot wins.
    pub fn bots_by_name(&self) -> &HashMap<String, Bot> {
        self.bots_by_name.get_or_init(|| {
            self.bots
                .iter()
                .map(|b| (b.name.to_lowercase(), b.clone()))
                .collect()
        })
    }

    pub fn users_by_id(&self) -> &HashMap<Uuid, User> {
        self.users_by_id
            .get_or_init(|| self.users.iter().map(|u| (u.id, u.clone())).collect())
    }

    /// Case-insensitive bot lookup by name.
    pub fn bot_named(&self, name: &str) -> Option<&Bot> {
        self.bots_by_name().get(&name.to_lowercase())
    }

    /// Resolves the author of a stored message to its user and, if the user is a bot, the bot.
    ///
    /// Unknown authors resolve to [`unknown_user`]. A user whose bot is missing from the
    /// request resolves to the plain user.
    pub fn user_for_message(&self, msg: &Message) -> (&User, Option<&Bot>) {
        let Some(user) = self.users_by_id().get(&msg.author_id) else {
            return (unknown_user(), None);
        };
        let bot = user.bot_id.and_then(|id| self.bots_by_id().get(&id));
        (user, bot)
    }
}
