//! Wire protocol module
//!
//! This module defines the data model shared with the backend:
//! - Peer and message structures
//! - Fetch response envelopes (users, history, send)
//! - Push-channel event payloads
//!
//! Field names follow the backend's camelCase JSON.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A conversable counterparty
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    /// Unique peer identifier
    pub id: String,

    /// Human-readable display name
    pub display_name: String,

    /// Reference to the peer's avatar, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,

    /// Presence flag, derived from a presence collaborator and carried
    /// opaquely; this core never mutates it
    #[serde(default)]
    pub online: bool,
}

impl Peer {
    /// Create a new peer with the given id and display name
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            avatar_ref: None,
            online: false,
        }
    }
}

/// Message payload: exactly one of `text` / `image_ref` is populated
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Reference to an image payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl MessageBody {
    /// Create a text body
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image_ref: None,
        }
    }

    /// Create an image body
    pub fn image(image_ref: impl Into<String>) -> Self {
        Self {
            text: None,
            image_ref: Some(image_ref.into()),
        }
    }

    /// Check that exactly one variant is populated
    pub fn is_well_formed(&self) -> bool {
        self.text.is_some() != self.image_ref.is_some()
    }
}

/// A message as held in a timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Globally unique identifier, assigned by the backend
    pub id: String,

    /// The peer whose conversation this message belongs to
    pub conversation_peer_id: String,

    /// The sender's peer id
    pub sender_id: String,

    /// Message payload
    #[serde(flatten)]
    pub body: MessageBody,

    /// Creation timestamp assigned by the backend
    pub created_at: DateTime<Utc>,

    /// Whether the operator has observed this message
    #[serde(default)]
    pub seen: bool,
}

/// A `newMessage` push payload
///
/// Attribution fields are optional because the push channel is an external
/// collaborator: an event that cannot name its sender is dropped by the
/// reconciler rather than crashing decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushedMessage {
    /// Globally unique identifier, assigned by the backend
    pub id: String,

    /// The conversation this message belongs to; defaults to the sender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_peer_id: Option<String>,

    /// The sender's peer id; absent on a malformed event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,

    /// Message payload
    #[serde(flatten)]
    pub body: MessageBody,

    /// Creation timestamp assigned by the backend
    pub created_at: DateTime<Utc>,
}

impl PushedMessage {
    /// Validate attribution and convert into a timeline [`Message`]
    ///
    /// The `seen` flag defaults to false until the reconciler decides
    /// otherwise. A pushed message with no conversation id belongs to the
    /// sender's conversation.
    pub fn into_message(self) -> Result<Message> {
        let sender_id = self
            .sender_id
            .ok_or_else(|| Error::Malformed(format!("push event {} has no senderId", self.id)))?;
        let conversation_peer_id = self.conversation_peer_id.unwrap_or_else(|| sender_id.clone());

        Ok(Message {
            id: self.id,
            conversation_peer_id,
            sender_id,
            body: self.body,
            created_at: self.created_at,
            seen: false,
        })
    }
}

/// Events delivered by the push channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum PushEvent {
    /// A new message was stored by the backend
    NewMessage(PushedMessage),
}

/// Response envelope for `GET /messages/users`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    /// Whether the request succeeded
    pub success: bool,

    /// Peer roster
    #[serde(default)]
    pub users: Vec<Peer>,

    /// Unseen-count snapshot keyed by peer id
    #[serde(default)]
    pub unseen_messages: HashMap<String, u32>,

    /// Rejection message when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response envelope for `GET /messages/{peerId}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    /// Whether the request succeeded
    pub success: bool,

    /// Ordered message history
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Rejection message when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response envelope for `POST /messages/send/{peerId}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    /// Whether the request succeeded
    pub success: bool,

    /// The stored message with its server-assigned id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_message: Option<Message>,

    /// Rejection message when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
