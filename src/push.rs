//! Push-event channel
//!
//! A single-consumer queue between the push transport and the session's
//! reconciler. The transport side holds a [`PushHandle`] and emits events;
//! the session drains the matching [`PushSource`] sequentially, which makes
//! the "at most one live handler" invariant structural instead of
//! convention-based.

use crate::protocol::PushEvent;
use tokio::sync::mpsc;
use tracing::debug;

/// Sending side of the push channel, held by the transport integration
#[derive(Debug, Clone)]
pub struct PushHandle {
    tx: mpsc::UnboundedSender<PushEvent>,
}

impl PushHandle {
    /// Emit one event toward the session
    ///
    /// Returns false once the consuming side is gone; the transport treats
    /// that as an expected disconnected state, not an error.
    pub fn emit(&self, event: PushEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(_) => {
                debug!("Push event dropped: no live subscription");
                false
            }
        }
    }
}

/// Receiving side of the push channel, consumed by [`ChatSession::attach_push`]
///
/// [`ChatSession::attach_push`]: crate::session::ChatSession::attach_push
#[derive(Debug)]
pub struct PushSource {
    pub(crate) rx: mpsc::UnboundedReceiver<PushEvent>,
}

/// Create a connected push handle/source pair
pub fn push_channel() -> (PushHandle, PushSource) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PushHandle { tx }, PushSource { rx })
}
