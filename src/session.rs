//! Conversation session
//!
//! One owned session object per authenticated identity: it holds the
//! directory, the active timeline, and the selection, wires the fetch and
//! push collaborators together, and exposes the operations the
//! presentation layer invokes. All state mutation goes through this module;
//! the collaborators never touch the state directly.

use crate::directory::Directory;
use crate::fetch::FetchService;
use crate::protocol::{Message, MessageBody, Peer, PushEvent};
use crate::push::PushSource;
use crate::reconciler::{route_push, Routing};
use crate::timeline::Timeline;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Non-fatal, user-visible notifications
///
/// The presentation layer drains these; the session never blocks on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A fetch or push call failed at the transport level; state was left
    /// at its last-known-good value
    Transport(String),
    /// The backend rejected a request; the message is surfaced verbatim
    Rejected(String),
}

/// Receiving side of the session's notice stream
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// State owned by the session, mutated under one lock
struct SessionState {
    directory: Directory,
    timeline: Timeline,
    selection: Option<String>,
    /// Bumped on every selection change; an in-flight history load whose
    /// captured generation no longer matches is discarded on completion.
    load_generation: u64,
}

/// Guard for the push drain task: dropping it (teardown or replacement)
/// aborts the task, so release happens on every exit path.
struct Subscription {
    handle: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A live conversation-synchronization session
///
/// Constructed at login with the operator's identity and a fetch handle,
/// torn down on logout by dropping it (which also aborts the push drain
/// task).
pub struct ChatSession {
    identity: String,
    fetch: Arc<dyn FetchService>,
    state: Arc<Mutex<SessionState>>,
    notices: mpsc::UnboundedSender<Notice>,
    subscription: Mutex<Option<Subscription>>,
}

impl ChatSession {
    /// Create a session for the given operator identity
    ///
    /// Returns the session and the notice stream the presentation layer
    /// should drain.
    ///
    /// # Example
    /// ```rust,no_run
    /// use chatsync::config::ClientConfig;
    /// use chatsync::fetch::HttpFetch;
    /// use chatsync::session::ChatSession;
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> chatsync::Result<()> {
    /// let config = ClientConfig::load("chatsync.json")?;
    /// let fetch = Arc::new(HttpFetch::new(&config));
    /// let (session, mut notices) = ChatSession::new(fetch, "my_user_id");
    ///
    /// session.refresh_directory().await?;
    /// session.select_peer(Some("peer_x")).await;
    /// session.load_history("peer_x").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(fetch: Arc<dyn FetchService>, identity: impl Into<String>) -> (Self, NoticeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            identity: identity.into(),
            fetch,
            state: Arc::new(Mutex::new(SessionState {
                directory: Directory::new(),
                timeline: Timeline::new(),
                selection: None,
                load_generation: 0,
            })),
            notices: tx,
            subscription: Mutex::new(None),
        };
        (session, rx)
    }

    /// Refresh the peer roster and unseen-count snapshot
    ///
    /// On success both collections are replaced atomically; on failure the
    /// prior state is left untouched and a [`Notice`] is emitted. Safe to
    /// call repeatedly.
    pub async fn refresh_directory(&self) -> Result<()> {
        match self.fetch.users().await {
            Ok(snapshot) => {
                let mut state = self.state.lock().await;
                state.directory.replace(snapshot.peers, snapshot.unseen);
                // The snapshot may carry a nonzero count for the open
                // conversation; the selected peer's counter stays 0.
                if let Some(selected) = state.selection.clone() {
                    state.directory.clear_unseen(&selected);
                }
                Ok(())
            }
            Err(e) => {
                self.surface("Directory refresh", &e);
                Err(e)
            }
        }
    }

    /// Set the active conversation
    ///
    /// Zeroes the unseen counter for the newly selected peer, discards the
    /// previous timeline contents, and cancels interest in any in-flight
    /// history load. Selecting `None` leaves the previous peer's counter
    /// as last set.
    pub async fn select_peer(&self, peer_id: Option<&str>) {
        let mut state = self.state.lock().await;
        state.load_generation += 1;
        state.selection = peer_id.map(str::to_string);
        state.timeline.clear();

        if let Some(id) = peer_id {
            state.directory.clear_unseen(id);
            info!("Selected conversation with {}", id);
        } else {
            info!("Conversation deselected");
        }
    }

    /// Load message history for a conversation
    ///
    /// The result is applied only if `peer_id` is still the active
    /// selection and no selection change happened while the request was in
    /// flight; a superseded response is discarded, not an error.
    pub async fn load_history(&self, peer_id: &str) -> Result<()> {
        let generation = {
            let state = self.state.lock().await;
            state.load_generation
        };

        match self.fetch.history(peer_id).await {
            Ok(messages) => {
                let mut state = self.state.lock().await;
                if state.selection.as_deref() != Some(peer_id)
                    || state.load_generation != generation
                {
                    debug!("Discarding stale history response for {}", peer_id);
                    return Ok(());
                }
                state.timeline.replace(messages);
                Ok(())
            }
            Err(e) => {
                self.surface("History load", &e);
                Err(e)
            }
        }
    }

    /// Send a message to the active conversation
    ///
    /// No-op when nothing is selected. On success the server-confirmed
    /// message (with its server-assigned id) is appended to the timeline;
    /// on failure a [`Notice`] is emitted and nothing is appended.
    ///
    /// # Arguments
    /// * `body` - Message payload; exactly one of text/imageRef populated
    ///
    /// # Returns
    /// * `Ok(())` - Message stored and appended, or ignored (no selection)
    /// * `Err(Error)` - Send failed; the failure was surfaced as a notice
    ///   and the timeline is unchanged
    pub async fn append_local(&self, body: MessageBody) -> Result<()> {
        if !body.is_well_formed() {
            return Err(Error::Malformed(
                "message body must carry exactly one of text/imageRef".to_string(),
            ));
        }

        let target = {
            let state = self.state.lock().await;
            state.selection.clone()
        };
        let Some(peer_id) = target else {
            debug!("Send ignored: no conversation selected");
            return Ok(());
        };

        match self.fetch.send(&peer_id, &body).await {
            Ok(message) => {
                let mut state = self.state.lock().await;
                // The selection may have moved while the send was in
                // flight; the confirmed message belongs to the
                // conversation it was sent to, not the current one.
                if state.selection.as_deref() == Some(peer_id.as_str()) {
                    state.timeline.append_unique(message);
                }
                Ok(())
            }
            Err(e) => {
                self.surface("Send", &e);
                Err(e)
            }
        }
    }

    /// Attach the push channel and start draining it
    ///
    /// Any previous subscription is torn down first, so at most one
    /// consumer is ever live. Events are reconciled strictly in delivery
    /// order; seen acknowledgments for appended messages are issued
    /// fire-and-forget.
    pub async fn attach_push(&self, source: PushSource) {
        let mut slot = self.subscription.lock().await;
        // Drop the previous drain task before the new one goes live.
        slot.take();

        let state = self.state.clone();
        let fetch = self.fetch.clone();

        let handle = tokio::spawn(async move {
            let mut rx = source.rx;
            while let Some(event) = rx.recv().await {
                let PushEvent::NewMessage(pushed) = event;

                let outcome = {
                    let mut locked = state.lock().await;
                    let SessionState {
                        directory,
                        timeline,
                        selection,
                        ..
                    } = &mut *locked;
                    route_push(selection.as_deref(), directory, timeline, pushed)
                };

                if let Routing::Appended { message_id } = outcome {
                    let fetch = fetch.clone();
                    tokio::spawn(async move {
                        if let Err(e) = fetch.mark_seen(&message_id).await {
                            warn!("Seen acknowledgment for {} failed: {}", message_id, e);
                        }
                    });
                }
            }
            debug!("Push channel closed, drain task exiting");
        });

        *slot = Some(Subscription { handle });
    }

    /// Tear down the push subscription
    ///
    /// The session enters the expected disconnected state; pushed events
    /// are no longer consumed until [`attach_push`](Self::attach_push) is
    /// called with a fresh source.
    pub async fn detach_push(&self) {
        self.subscription.lock().await.take();
    }

    /// The operator's identity
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Snapshot of the peer roster
    pub async fn peers(&self) -> Vec<Peer> {
        self.state.lock().await.directory.peers().to_vec()
    }

    /// Snapshot of the unseen-counter map
    pub async fn unseen(&self) -> HashMap<String, u32> {
        self.state.lock().await.directory.unseen().clone()
    }

    /// Unseen count for one peer (0 when absent)
    pub async fn unseen_for(&self, peer_id: &str) -> u32 {
        self.state.lock().await.directory.unseen_for(peer_id)
    }

    /// Snapshot of the active timeline
    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.timeline.messages().to_vec()
    }

    /// The active selection, if any
    pub async fn selection(&self) -> Option<String> {
        self.state.lock().await.selection.clone()
    }

    /// Emit a notice and log the failure; never fatal, never retried
    fn surface(&self, context: &str, error: &Error) {
        warn!("{} failed: {}", context, error);
        let notice = match error {
            Error::Rejected(msg) => Notice::Rejected(msg.clone()),
            other => Notice::Transport(format!("{}: {}", context, other)),
        };
        let _ = self.notices.send(notice);
    }
}
