//! Message records and the append-only conversation that holds them.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Who produced a message. Decides styling and whether the reveal animation applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
    System,
}

impl Sender {
    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "you",
            Sender::Bot => "bot",
            Sender::System => "system",
        }
    }
}

/// Opaque message identifier, used as render key and reveal scope key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One immutable line of conversation.
///
/// Fields are private so a message cannot be edited once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    sender: Sender,
    text: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Ordered, append-only sequence of messages.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new message stamped with the current time.
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> &Message {
        self.push_at(sender, text, Utc::now())
    }

    /// Append a new message with an explicit creation time.
    ///
    /// Timestamps never go backwards within a conversation: a time earlier than
    /// the previous message is clamped up to it.
    pub fn push_at(
        &mut self,
        sender: Sender,
        text: impl Into<String>,
        at: DateTime<Utc>,
    ) -> &Message {
        let timestamp = match self.last_timestamp {
            Some(last) if last > at => last,
            _ => at,
        };
        self.last_timestamp = Some(timestamp);

        self.messages.push(Message {
            id: MessageId::new(),
            sender,
            text: text.into(),
            timestamp,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Reset the sequence to empty.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
