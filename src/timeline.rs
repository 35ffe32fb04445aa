//! Message timeline
//!
//! The ordered message list for the currently selected conversation.
//! Entries keep arrival/append order, not `created_at` order, and no two
//! entries share an id once the reconciler has processed an event.

use crate::protocol::Message;

/// Ordered, duplicate-free message list for the active conversation
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    messages: Vec<Message>,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the timeline contents with fetched history
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Append a message unless an entry with the same id already exists
    ///
    /// Returns true when the message was appended. Idempotent under
    /// redelivery from the push channel.
    pub fn append_unique(&mut self, message: Message) -> bool {
        if self.contains(&message.id) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Check whether an entry with the given id exists
    pub fn contains(&self, message_id: &str) -> bool {
        self.messages.iter().any(|m| m.id == message_id)
    }

    /// The current entries in append order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the timeline is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
