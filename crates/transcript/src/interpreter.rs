//! Interpretation of one transcript line: `[channel/]<bot index>: <quoted message>`.
//!
//! Every step is fail-soft. Lines that cannot be attributed to a bot come back as
//! [`LineOutcome::Skipped`] with the reason; they never become errors.

use tracing::warn;

use crate::unquote::unquote;

/// Bare code-fence line the model sometimes wraps the transcript in.
const CODE_FENCE: &str = "```";

/// Bot segment the model uses when nobody is speaking (stage directions and the like).
const NO_BOT_MARKER: &str = "none";

/// A line attributed to a bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Position of the speaking bot in the request's bot list.
    pub bot_index: usize,
    pub content: String,
    /// False when the message was not a valid quoted literal and the raw text was kept.
    pub unquoted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    CodeFence,
    MissingSeparator,
    NoneMarker,
    InvalidBotIndex(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Accepted(ParsedLine),
    Skipped(SkipReason),
}

impl LineOutcome {
    pub fn accepted(self) -> Option<ParsedLine> {
        match self {
            LineOutcome::Accepted(parsed) => Some(parsed),
            LineOutcome::Skipped(_) => None,
        }
    }
}

/// Interprets one complete line against a request with `bot_count` bots.
pub fn interpret(line: &str, bot_count: usize) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::Skipped(SkipReason::Blank);
    }
    if line == CODE_FENCE {
        warn!("skipping code fence");
        return LineOutcome::Skipped(SkipReason::CodeFence);
    }

    let Some((author, msg)) = line.split_once(':') else {
        warn!(line = %line, "invalid line");
        return LineOutcome::Skipped(SkipReason::MissingSeparator);
    };

    // `rsplit` always yields at least one segment.
    let bot_id = author
        .rsplit('/')
        .next()
        .unwrap_or(author)
        .trim()
        .to_lowercase();
    if bot_id == NO_BOT_MARKER {
        warn!(line = %line, "no bot speaking");
        return LineOutcome::Skipped(SkipReason::NoneMarker);
    }

    let bot_index = match bot_id.parse::<i64>() {
        Ok(ix) if ix >= 0 && (ix as u64) < bot_count as u64 => ix as usize,
        Ok(ix) => {
            warn!(bot_id = %bot_id, bot_count, "bot index out of range: {}", ix);
            return LineOutcome::Skipped(SkipReason::InvalidBotIndex(bot_id));
        }
        Err(e) => {
            warn!(error = %e, bot_id = %bot_id, "parse bot ID");
            return LineOutcome::Skipped(SkipReason::InvalidBotIndex(bot_id));
        }
    };

    let msg = msg.trim();
    let (content, unquoted) = match unquote(msg) {
        Ok(content) => (content, true),
        Err(e) => {
            warn!(error = %e, msg = %msg, "unquote message");
            (msg.to_string(), false)
        }
    };

    LineOutcome::Accepted(ParsedLine {
        bot_index,
        content,
        unquoted,
    })
}
