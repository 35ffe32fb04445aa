//! Shared test helpers
//!
//! `MockFetch` is a scripted in-memory fetch collaborator: tests queue
//! per-endpoint outcomes up front and assert on the calls it recorded.
//! A history response can be gated on a oneshot so interleavings (like the
//! stale-selection race) are forced deterministically.

use crate::fetch::{DirectorySnapshot, FetchService};
use crate::protocol::{Message, MessageBody, Peer, PushedMessage};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

/// Fixed timestamp for test messages
pub fn test_created_at() -> DateTime<Utc> {
    "2026-08-27T12:00:00Z".parse().expect("valid timestamp")
}

/// Build a timeline message for tests
pub fn test_message(id: &str, peer_id: &str, sender_id: &str, text: &str) -> Message {
    Message {
        id: id.to_string(),
        conversation_peer_id: peer_id.to_string(),
        sender_id: sender_id.to_string(),
        body: MessageBody::text(text),
        created_at: test_created_at(),
        seen: false,
    }
}

/// Build a push payload (conversation defaults to the sender)
pub fn test_pushed(id: &str, sender_id: &str, text: &str) -> PushedMessage {
    PushedMessage {
        id: id.to_string(),
        conversation_peer_id: None,
        sender_id: Some(sender_id.to_string()),
        body: MessageBody::text(text),
        created_at: test_created_at(),
    }
}

/// Build a directory snapshot for tests
pub fn test_snapshot(peer_ids: &[&str], unseen: &[(&str, u32)]) -> DirectorySnapshot {
    DirectorySnapshot {
        peers: peer_ids.iter().map(|id| Peer::new(*id, *id)).collect(),
        unseen: unseen
            .iter()
            .map(|(id, count)| (id.to_string(), *count))
            .collect(),
    }
}

/// One recorded call against the mock fetch service
#[derive(Debug, Clone, PartialEq)]
pub enum FetchCall {
    /// `users()` was invoked
    Users,
    /// `history(peer_id)` was invoked
    History(String),
    /// `send(peer_id, body)` was invoked
    Send(String, MessageBody),
    /// `mark_seen(message_id)` was invoked
    MarkSeen(String),
}

#[derive(Default)]
struct MockInner {
    calls: Vec<FetchCall>,
    users_responses: VecDeque<Result<DirectorySnapshot>>,
    history_responses: VecDeque<Result<Vec<Message>>>,
    send_responses: VecDeque<Result<Message>>,
    mark_seen_responses: VecDeque<Result<()>>,
    history_gate: Option<oneshot::Receiver<()>>,
}

/// Scripted fetch collaborator
#[derive(Clone, Default)]
pub struct MockFetch {
    inner: Arc<Mutex<MockInner>>,
}

impl MockFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn queue_users(&self, response: Result<DirectorySnapshot>) {
        self.inner.lock().await.users_responses.push_back(response);
    }

    pub async fn queue_history(&self, response: Result<Vec<Message>>) {
        self.inner.lock().await.history_responses.push_back(response);
    }

    pub async fn queue_send(&self, response: Result<Message>) {
        self.inner.lock().await.send_responses.push_back(response);
    }

    pub async fn queue_mark_seen(&self, response: Result<()>) {
        self.inner.lock().await.mark_seen_responses.push_back(response);
    }

    /// Block the next `history` call until the returned sender fires
    pub async fn gate_next_history(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().await.history_gate = Some(rx);
        tx
    }

    /// Calls recorded so far, in order
    pub async fn calls(&self) -> Vec<FetchCall> {
        self.inner.lock().await.calls.clone()
    }

    /// Count of recorded calls matching a predicate
    pub async fn count_calls(&self, pred: impl Fn(&FetchCall) -> bool) -> usize {
        self.inner.lock().await.calls.iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl FetchService for MockFetch {
    async fn users(&self) -> Result<DirectorySnapshot> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(FetchCall::Users);
        inner.users_responses.pop_front().unwrap_or_else(|| {
            Ok(DirectorySnapshot {
                peers: Vec::new(),
                unseen: HashMap::new(),
            })
        })
    }

    async fn history(&self, peer_id: &str) -> Result<Vec<Message>> {
        let gate = {
            let mut inner = self.inner.lock().await;
            inner.calls.push(FetchCall::History(peer_id.to_string()));
            inner.history_gate.take()
        };

        // Suspend here (lock released) until the test opens the gate.
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let mut inner = self.inner.lock().await;
        inner.history_responses.pop_front().unwrap_or(Ok(Vec::new()))
    }

    async fn send(&self, peer_id: &str, body: &MessageBody) -> Result<Message> {
        let mut inner = self.inner.lock().await;
        inner
            .calls
            .push(FetchCall::Send(peer_id.to_string(), body.clone()));
        inner.send_responses.pop_front().unwrap_or_else(|| {
            Err(Error::Transport("no scripted send response".to_string()))
        })
    }

    async fn mark_seen(&self, message_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(FetchCall::MarkSeen(message_id.to_string()));
        inner.mark_seen_responses.pop_front().unwrap_or(Ok(()))
    }
}
